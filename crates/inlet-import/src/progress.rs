//! Progress counters shared with an external display.
//!
//! A [`Progress`] is written by exactly one component (the converter or the
//! orchestrator) and may be read at any time from another thread. All state
//! is atomic, so readers never block the writer.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// An open-ended counter with activation and completion flags.
#[derive(Debug)]
pub struct Progress {
    label: String,
    current: AtomicU64,
    active: AtomicBool,
    completed: AtomicBool,
}

impl Progress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            current: AtomicU64::new(0),
            active: AtomicBool::new(false),
            completed: AtomicBool::new(false),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Mark the counter as started; displays ignore inactive counters.
    pub fn activate(&self) {
        self.active.store(true, Ordering::Release);
    }

    /// Zero the count and clear completion, keeping the counter active.
    pub fn reset(&self) {
        self.completed.store(false, Ordering::Release);
        self.current.store(0, Ordering::Relaxed);
    }

    pub fn increment(&self) {
        self.current.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_completed(&self, completed: bool) {
        self.completed.store(completed, Ordering::Release);
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// A point-in-time copy for rendering or serialization.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            label: self.label.clone(),
            current: self.current(),
            active: self.is_active(),
            completed: self.is_completed(),
        }
    }
}

/// A point-in-time view of a [`Progress`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub label: String,
    pub current: u64,
    pub active: bool,
    pub completed: bool,
}
