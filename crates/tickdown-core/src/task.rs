//! Task model and per-task countdown state machine.
//!
//! Timers are wall-clock based: a running timer stores its absolute
//! deadline, not a count of elapsed ticks, so remaining time can be
//! recomputed from the clock at any instant. A process that sleeps for
//! an hour wakes up with every overdue timer exactly one reconcile
//! away from completion.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TransitionError;

/// Upper bound on a countdown length, in seconds (a hundred years).
/// Totals this size always land on a representable deadline; the
/// store rejects anything longer at creation.
pub const MAX_DURATION_SECS: u64 = 60 * 60 * 24 * 365 * 100;

/// Countdown state for a single task.
///
/// Valid transitions:
/// - Idle → Running (start: deadline = now + full duration)
/// - Paused → Running (start: deadline = now + paused snapshot)
/// - Running → Paused (stop: snapshot whole seconds left)
/// - Running → Idle (expiry via reconciliation, or force-stop when
///   another task starts; remaining time is discarded)
/// - any → Idle (toggling completion clears the countdown)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TimerState {
    /// No countdown in flight.
    Idle,
    /// Counting down toward an absolute deadline.
    Running { end_at: DateTime<Utc> },
    /// Stopped partway; the snapshot is re-armed on the next start.
    Paused { remaining_secs: u64 },
}

impl Default for TimerState {
    fn default() -> Self {
        TimerState::Idle
    }
}

/// A single task. Identity, name and duration are fixed at creation;
/// only the completion flag and the timer state change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "TaskRecord")]
pub struct Task {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Display name, trimmed and non-empty
    pub name: String,
    /// Nominal countdown length in seconds
    pub duration_secs: u64,
    /// Whether the task carries a countdown at all
    pub has_timer: bool,
    /// Completion flag
    pub completed: bool,
    /// Countdown state
    pub timer: TimerState,
}

/// Stored shape of a task.
///
/// Snapshots written before `has_timer` existed re-derive it from the
/// duration; missing completion and timer fields fall back to their
/// defaults instead of failing the whole load.
#[derive(Deserialize)]
struct TaskRecord {
    id: String,
    name: String,
    duration_secs: u64,
    has_timer: Option<bool>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    timer: TimerState,
}

impl From<TaskRecord> for Task {
    fn from(rec: TaskRecord) -> Self {
        let has_timer = rec.has_timer.unwrap_or(rec.duration_secs > 0);
        Self {
            id: rec.id,
            name: rec.name,
            duration_secs: rec.duration_secs,
            has_timer,
            completed: rec.completed,
            timer: rec.timer,
        }
    }
}

impl Task {
    /// Create a new idle task. Callers validate the name and bound the
    /// duration first; the store's `add_task` is the public creation
    /// path.
    pub fn new(name: impl Into<String>, duration_secs: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            duration_secs,
            has_timer: duration_secs > 0,
            completed: false,
            timer: TimerState::Idle,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        matches!(self.timer, TimerState::Running { .. })
    }

    /// Whole seconds left on the countdown at `now`.
    ///
    /// Idle timers report the full duration; overdue running timers
    /// report zero.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        match self.timer {
            TimerState::Idle => self.duration_secs,
            TimerState::Running { end_at } => (end_at - now).num_seconds().max(0) as u64,
            TimerState::Paused { remaining_secs } => remaining_secs,
        }
    }

    pub(crate) fn startable(&self) -> Result<(), TransitionError> {
        if !self.has_timer {
            Err(TransitionError::NoTimer)
        } else if self.completed {
            Err(TransitionError::Completed)
        } else if self.is_running() {
            Err(TransitionError::AlreadyRunning)
        } else {
            Ok(())
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Start or resume the countdown. Idle timers run for the full
    /// duration; paused timers resume from the snapshot. Returns the
    /// computed deadline.
    ///
    /// # Errors
    /// Rejects tasks without a timer, completed tasks, and tasks that
    /// are already running.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<DateTime<Utc>, TransitionError> {
        self.startable()?;
        let secs = match self.timer {
            TimerState::Paused { remaining_secs } => remaining_secs,
            _ => self.duration_secs,
        };
        let end_at = deadline_after(now, secs);
        self.timer = TimerState::Running { end_at };
        Ok(end_at)
    }

    /// Pause the countdown, snapshotting the whole seconds left. A stop
    /// issued at or past the deadline snapshots zero.
    ///
    /// # Errors
    /// Rejects tasks without a timer and timers that are not running.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<u64, TransitionError> {
        if !self.has_timer {
            return Err(TransitionError::NoTimer);
        }
        match self.timer {
            TimerState::Running { end_at } => {
                let remaining_secs = (end_at - now).num_seconds().max(0) as u64;
                self.timer = TimerState::Paused { remaining_secs };
                Ok(remaining_secs)
            }
            _ => Err(TransitionError::NotRunning),
        }
    }

    /// Flip the completion flag. Completing or un-completing always
    /// clears the countdown back to idle; a paused snapshot does not
    /// survive the round trip.
    pub fn toggle_complete(&mut self) -> bool {
        self.completed = !self.completed;
        self.timer = TimerState::Idle;
        self.completed
    }

    /// Mark an expired running timer as done. Reconciliation only.
    pub(crate) fn expire(&mut self) {
        self.timer = TimerState::Idle;
        self.completed = true;
    }

    /// Drop the countdown without snapshotting remaining time.
    pub(crate) fn force_idle(&mut self) {
        self.timer = TimerState::Idle;
    }
}

/// Deadline `secs` after `now`. Totals no date can hold clamp to the
/// far future instead of overflowing the arithmetic; only hand-edited
/// snapshots can carry them, since new tasks are bounded at creation.
fn deadline_after(now: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
