//! Deferred execution: the queue contract and a worker-thread implementation.

mod worker;

pub use worker::{QueueHandle, QueueStats, WorkQueue};

use std::fmt;

/// A unit of work handed to an execution queue.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The queue's worker has stopped; the task was not accepted.
    Closed,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::Closed => write!(f, "execution queue is closed"),
        }
    }
}

impl std::error::Error for QueueError {}

/// Accepts units of work for eventual execution off the caller's thread.
///
/// Fire-and-forget: an accepted task runs exactly once, but no result channel
/// is part of this contract. Callers needing completion signals layer their
/// own on top.
pub trait TaskSubmitter: Send + Sync {
    fn submit(&self, task: Task) -> Result<(), QueueError>;
}
