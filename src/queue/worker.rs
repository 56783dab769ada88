//! Background worker that drains submitted tasks in order.

use std::sync::mpsc::{channel, Sender};
use std::thread::{self, JoinHandle};

use tracing::debug;

use super::{QueueError, Task, TaskSubmitter};

enum Message {
    Run(Task),
    Stop,
}

/// Statistics from a stopped work queue.
#[derive(Debug, Default, Clone)]
pub struct QueueStats {
    pub tasks_run: usize,
}

/// A single worker thread executing tasks in submission order.
///
/// ## Example
///
/// ```ignore
/// use flexrow::{TaskSubmitter, WorkQueue};
///
/// let queue = WorkQueue::spawn();
/// queue.submit(Box::new(|| println!("ran off-thread"))).unwrap();
///
/// // Stop drains already-submitted tasks, then joins.
/// let stats = queue.stop();
/// assert_eq!(stats.tasks_run, 1);
/// ```
pub struct WorkQueue {
    tx: Sender<Message>,
    handle: Option<JoinHandle<QueueStats>>,
}

impl WorkQueue {
    /// Spawn the worker thread.
    pub fn spawn() -> Self {
        let (tx, rx) = channel();

        let handle = thread::spawn(move || {
            let mut stats = QueueStats::default();
            while let Ok(message) = rx.recv() {
                match message {
                    Message::Run(task) => {
                        task();
                        stats.tasks_run += 1;
                    }
                    Message::Stop => break,
                }
            }
            debug!(tasks_run = stats.tasks_run, "work queue stopped");
            stats
        });

        WorkQueue {
            tx,
            handle: Some(handle),
        }
    }

    /// A cloneable submitter for this queue, shareable across threads.
    pub fn handle(&self) -> QueueHandle {
        QueueHandle {
            tx: self.tx.clone(),
        }
    }

    /// Signal the worker to stop after draining already-submitted tasks and
    /// wait for it to finish.
    pub fn stop(mut self) -> QueueStats {
        let _ = self.tx.send(Message::Stop);
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap_or_default()
        } else {
            QueueStats::default()
        }
    }

    /// Signal the worker to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.tx.send(Message::Stop);
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        let _ = self.tx.send(Message::Stop);
        // Don't join on drop - let the thread finish naturally
    }
}

impl TaskSubmitter for WorkQueue {
    fn submit(&self, task: Task) -> Result<(), QueueError> {
        self.tx
            .send(Message::Run(task))
            .map_err(|_| QueueError::Closed)
    }
}

/// Detached submitter for a [`WorkQueue`].
#[derive(Clone)]
pub struct QueueHandle {
    tx: Sender<Message>,
}

impl TaskSubmitter for QueueHandle {
    fn submit(&self, task: Task) -> Result<(), QueueError> {
        self.tx
            .send(Message::Run(task))
            .map_err(|_| QueueError::Closed)
    }
}
