//! Fan-in for `validate_all`.

use std::sync::{Arc, Mutex, PoisonError};

pub(crate) type JoinCallback = Box<dyn FnOnce(bool) + Send>;

/// Counts completions of one `validate_all` call.
///
/// Every call gets its own join, so overlapping or re-entrant calls never
/// share a counter.
pub(crate) struct Join {
    total: usize,
    state: Mutex<JoinState>,
}

struct JoinState {
    completed: usize,
    all_valid: bool,
    callback: Option<JoinCallback>,
}

impl Join {
    pub fn new(total: usize, callback: JoinCallback) -> Arc<Self> {
        Arc::new(Self {
            total,
            state: Mutex::new(JoinState {
                completed: 0,
                all_valid: true,
                callback: Some(callback),
            }),
        })
    }

    /// Record one completion.
    ///
    /// Returns the aggregate outcome together with the callback exactly once:
    /// to whichever completion brings the count to `total`.
    pub fn record(&self, valid: bool) -> Option<(bool, JoinCallback)> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.completed += 1;
        state.all_valid &= valid;
        log::debug!(
            "[join] {}/{} complete, all valid so far: {}",
            state.completed,
            self.total,
            state.all_valid
        );

        if state.completed < self.total {
            return None;
        }
        let all_valid = state.all_valid;
        state.callback.take().map(|callback| (all_valid, callback))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_fires_once_on_last() {
        let join = Join::new(3, Box::new(|_| {}));
        assert!(join.record(true).is_none());
        assert!(join.record(true).is_none());
        let (all_valid, _) = join.record(true).unwrap();
        assert!(all_valid);
        assert!(join.record(true).is_none());
    }

    #[test]
    fn test_and_reduces() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let join = Join::new(2, Box::new(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        }));
        assert!(join.record(false).is_none());
        let (all_valid, callback) = join.record(true).unwrap();
        assert!(!all_valid);
        callback(all_valid);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
