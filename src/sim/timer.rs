//! One-shot countdown timers on the simulation clock

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Which countdown a timer drives (reported in errors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    Tracking,
    Charge,
    Thrown,
}

impl TimerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerKind::Tracking => "tracking",
            TimerKind::Charge => "charge",
            TimerKind::Thrown => "thrown",
        }
    }
}

impl std::fmt::Display for TimerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stores when it was started; `None` means "not started".
///
/// Asking an unstarted timer whether it has finished is a programming error
/// and comes back as [`SimError::TimerNotStarted`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    kind: TimerKind,
    started_at: Option<f64>,
}

impl Timer {
    pub const fn new(kind: TimerKind) -> Self {
        Self {
            kind,
            started_at: None,
        }
    }

    pub fn start(&mut self, now: f64) {
        self.started_at = Some(now);
    }

    pub fn reset(&mut self) {
        self.started_at = None;
    }

    /// `now >= start + threshold`
    pub fn is_finished(&self, now: f64, threshold_secs: f64) -> SimResult<bool> {
        let started_at = self
            .started_at
            .ok_or(SimError::TimerNotStarted { timer: self.kind })?;
        Ok(now >= started_at + threshold_secs)
    }
}
