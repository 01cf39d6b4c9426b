use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::DateKey;

/// Every state change in the store produces an Event.
/// Frontends render them; the watch loop turns expiries into alerts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TaskAdded {
        id: String,
        name: String,
        duration_secs: u64,
        has_timer: bool,
        date: DateKey,
        at: DateTime<Utc>,
    },
    TimerStarted {
        id: String,
        name: String,
        end_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// A running timer was forcibly cleared so another task could start.
    /// Its remaining time is discarded, not paused.
    TimerStopped {
        id: String,
        name: String,
        at: DateTime<Utc>,
    },
    TimerPaused {
        id: String,
        name: String,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A running countdown reached its deadline; the task is now done.
    TimerExpired {
        id: String,
        name: String,
        at: DateTime<Utc>,
    },
    CompletionToggled {
        id: String,
        name: String,
        completed: bool,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        id: String,
        name: String,
        at: DateTime<Utc>,
    },
}
