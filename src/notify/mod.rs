//! Post-mutation change notifications.
//!
//! A [`ChangeNotifier`] broadcasts table-level change events to registered
//! listeners after each successful mutation. Listeners receive the change
//! kind's wire name (`"saved"`, `"inserted"`, `"updated"`, `"deleted"`).

use std::sync::Mutex;

use event_emitter_rs::EventEmitter;

use crate::writer::ChangeKind;

/// Table-keyed change broadcast over an [`EventEmitter`].
///
/// ## Example
///
/// ```ignore
/// use std::sync::Arc;
/// use flexrow::ChangeNotifier;
///
/// let notifier = Arc::new(ChangeNotifier::new());
/// notifier.on("todos", |kind| println!("todos changed: {}", kind));
///
/// let writer = writer.with_notifier(Arc::clone(&notifier));
/// ```
pub struct ChangeNotifier {
    emitter: Mutex<EventEmitter>,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        ChangeNotifier {
            emitter: Mutex::new(EventEmitter::new()),
        }
    }

    /// Register a listener for one table's changes.
    pub fn on<F>(&self, table: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.emitter.lock().unwrap().on(table, listener);
    }

    /// Broadcast a change to the table's listeners, on the current thread.
    pub fn notify(&self, table: &str, kind: ChangeKind) {
        self.emitter
            .lock()
            .unwrap()
            .emit(table, kind.as_str().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn listener_receives_kind_name() {
        let notifier = ChangeNotifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        notifier.on("todos", move |kind| sink.lock().unwrap().push(kind));

        notifier.notify("todos", ChangeKind::Inserted);
        notifier.notify("todos", ChangeKind::Deleted);

        assert_eq!(*seen.lock().unwrap(), vec!["inserted", "deleted"]);
    }

    #[test]
    fn tables_are_independent() {
        let notifier = ChangeNotifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        notifier.on("todos", move |kind| sink.lock().unwrap().push(kind));

        notifier.notify("tags", ChangeKind::Updated);
        assert!(seen.lock().unwrap().is_empty());
    }
}
