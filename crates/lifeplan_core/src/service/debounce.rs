//! Save debouncing for bursty edits.
//!
//! # Responsibility
//! - Collapse rapid successive mutations into one deferred save.
//!
//! # Invariants
//! - Every `touch` restarts the quiet window; only the trailing edge fires.
//! - `poll` reports readiness at most once per armed window.

use std::time::{Duration, Instant};

/// Default quiet window between the last edit and the save.
pub const DEFAULT_QUIET: Duration = Duration::from_millis(200);

/// Trailing-edge debouncer driven by caller polling.
///
/// The planner runs single-threaded, so the debouncer keeps no timer thread:
/// the owner calls [`SaveDebouncer::poll`] from its event loop and performs
/// the save when it returns `true`.
#[derive(Debug)]
pub struct SaveDebouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Default for SaveDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET)
    }
}

impl SaveDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Arms (or re-arms) the quiet window after a mutation.
    pub fn touch(&mut self) {
        self.deadline = Some(Instant::now() + self.quiet);
    }

    /// Drops any armed window without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True while a save is armed and not yet fired.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fires once when the quiet window has elapsed.
    pub fn poll(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
