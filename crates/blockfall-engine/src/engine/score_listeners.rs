use std::fmt;

use serde::Serialize;

/// Score before and after a lock that changed it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreChange {
    pub old_score: f64,
    pub new_score: f64,
}

impl ScoreChange {
    /// Score added by the change.
    #[must_use]
    pub fn gained(&self) -> f64 {
        self.new_score - self.old_score
    }
}

/// Handle returned by [`ScoreListeners::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(ScoreChange) + Send>;

/// Callbacks run synchronously, in registration order, whenever a lock
/// changes the score.
///
/// Cloning yields an empty list: snapshots of an engine (such as the ones the
/// planner replays moves on) must not call back into the driver.
#[derive(Default)]
pub struct ScoreListeners {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl fmt::Debug for ScoreListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreListeners")
            .field("len", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Clone for ScoreListeners {
    fn clone(&self) -> Self {
        Self {
            next_id: self.next_id,
            listeners: Vec::new(),
        }
    }
}

impl ScoreListeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener and returns the id that removes it.
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(ScoreChange) + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener; returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Calls every listener in subscription order.
    pub fn notify(&mut self, change: ScoreChange) {
        for (_, listener) in &mut self.listeners {
            listener(change);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_notify_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = ScoreListeners::new();
        for name in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            listeners.subscribe(move |change: ScoreChange| {
                log.lock().unwrap().push((name, change.old_score, change.new_score));
            });
        }
        listeners.notify(ScoreChange {
            old_score: 0.0,
            new_score: 5.0,
        });
        assert_eq!(
            *log.lock().unwrap(),
            vec![("first", 0.0, 5.0), ("second", 0.0, 5.0), ("third", 0.0, 5.0)]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let count = Arc::new(Mutex::new(0));
        let mut listeners = ScoreListeners::new();
        let id = {
            let count = Arc::clone(&count);
            listeners.subscribe(move |_| *count.lock().unwrap() += 1)
        };
        let change = ScoreChange {
            old_score: 1.0,
            new_score: 2.0,
        };
        listeners.notify(change);
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.notify(change);
        assert_eq!(*count.lock().unwrap(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_clone_drops_listeners_but_keeps_ids_unique() {
        let mut listeners = ScoreListeners::new();
        let first = listeners.subscribe(|_| {});
        let mut cloned = listeners.clone();
        assert!(cloned.is_empty());
        assert_eq!(listeners.len(), 1);

        let second = cloned.subscribe(|_| {});
        assert_ne!(first, second);
    }
}
