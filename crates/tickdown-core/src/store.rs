//! Day-bucketed task store.
//!
//! Tasks live in per-day buckets keyed by local calendar date, ordered
//! by insertion within a day. The store owns the single-runner rule:
//! at most one task is running across all buckets, and the only way to
//! start a second one is to stop the first.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Confirmation, CoreError, ValidationError};
use crate::events::Event;
use crate::storage::KvStore;
use crate::task::{Task, MAX_DURATION_SECS};

/// The kv entry holding every bucket as one JSON blob.
const TASK_DATA_KEY: &str = "task_data";

/// Calendar date key in `YYYY-MM-DD` form. Local time decides which
/// date is "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(pub NaiveDate);

impl DateKey {
    /// Today's bucket, by local time.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for DateKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(NaiveDate::parse_from_str(s, "%Y-%m-%d")?))
    }
}

/// All tasks, bucketed by day.
///
/// Persists as a mapping from date key to ordered task list, the same
/// shape it has in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStore {
    days: BTreeMap<DateKey, Vec<Task>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Load the store from the `task_data` entry, or start empty when
    /// the entry is missing.
    ///
    /// # Errors
    /// Propagates storage failures and malformed JSON. A parse error is
    /// surfaced rather than swallowed so a later save cannot overwrite
    /// data the user could still recover by hand.
    pub fn load(kv: &dyn KvStore) -> Result<Self, CoreError> {
        match kv.get(TASK_DATA_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Self::default()),
        }
    }

    /// Persist the store under the `task_data` entry.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub fn save(&self, kv: &dyn KvStore) -> Result<(), CoreError> {
        let json = serde_json::to_string(self)?;
        kv.set(TASK_DATA_KEY, &json)?;
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.days.values().flatten().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.days.values_mut().flatten().find(|t| t.id == id)
    }

    /// The running task, if any. The store keeps at most one.
    pub fn running(&self) -> Option<&Task> {
        self.days.values().flatten().find(|t| t.is_running())
    }

    pub fn tasks_on(&self, date: DateKey) -> &[Task] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Snapshot of every bucket dated strictly before `cutoff`, for
    /// non-destructive report export.
    pub fn tasks_before(&self, cutoff: DateKey) -> BTreeMap<DateKey, Vec<Task>> {
        self.days
            .range(..cutoff)
            .map(|(date, tasks)| (*date, tasks.clone()))
            .collect()
    }

    pub fn days(&self) -> &BTreeMap<DateKey, Vec<Task>> {
        &self.days
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Total task count across all buckets.
    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub(crate) fn tasks_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.days.values_mut().flatten()
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Create a task in `today`'s bucket from user-entered minutes and
    /// seconds. Names are trimmed; a total duration of zero makes a
    /// plain task without a countdown.
    ///
    /// # Errors
    /// Rejects empty names and durations past [`MAX_DURATION_SECS`].
    pub fn add_task(
        &mut self,
        name: &str,
        minutes: u64,
        seconds: u64,
        today: DateKey,
    ) -> Result<(Task, Event), CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyTaskName.into());
        }
        let duration_secs = minutes
            .checked_mul(60)
            .and_then(|mins| mins.checked_add(seconds))
            .filter(|&total| total <= MAX_DURATION_SECS)
            .ok_or(ValidationError::DurationTooLong)?;
        let task = Task::new(name, duration_secs);
        let event = Event::TaskAdded {
            id: task.id.clone(),
            name: task.name.clone(),
            duration_secs: task.duration_secs,
            has_timer: task.has_timer,
            date: today,
            at: Utc::now(),
        };
        self.days.entry(today).or_default().push(task.clone());
        Ok((task, event))
    }

    /// Start `id`'s countdown.
    ///
    /// If a different task is already running this refuses with
    /// [`Confirmation::StopRunning`] and leaves the store untouched;
    /// call [`TaskStore::start_task_confirmed`] to proceed.
    ///
    /// # Errors
    /// Unknown ids, confirmation-required, and rejected transitions.
    pub fn start_task(&mut self, id: &str, now: DateTime<Utc>) -> Result<Event, CoreError> {
        if self.get(id).is_none() {
            return Err(CoreError::UnknownTask { id: id.to_string() });
        }
        if let Some(other) = self.running() {
            if other.id != id {
                return Err(CoreError::ConfirmationRequired(Confirmation::StopRunning {
                    running_id: other.id.clone(),
                    running_name: other.name.clone(),
                }));
            }
        }
        self.apply_start(id, now)
    }

    /// Start `id`, force-stopping any running task to idle first. The
    /// stopped task loses its remaining time; it is not paused.
    ///
    /// The whole update is atomic: a start that would be rejected
    /// leaves the current runner untouched.
    ///
    /// # Errors
    /// Unknown ids and rejected transitions.
    pub fn start_task_confirmed(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, CoreError> {
        let target = self
            .get(id)
            .ok_or_else(|| CoreError::UnknownTask { id: id.to_string() })?;
        target.startable()?;

        // A well-formed store has at most one runner; a hand-edited
        // snapshot can hold several. Idle them all. The target is not
        // among them: startable() rejects a running task.
        let mut events = Vec::new();
        for task in self.tasks_mut().filter(|t| t.is_running()) {
            task.force_idle();
            events.push(Event::TimerStopped {
                id: task.id.clone(),
                name: task.name.clone(),
                at: Utc::now(),
            });
        }
        events.push(self.apply_start(id, now)?);
        Ok(events)
    }

    fn apply_start(&mut self, id: &str, now: DateTime<Utc>) -> Result<Event, CoreError> {
        let task = self
            .get_mut(id)
            .ok_or_else(|| CoreError::UnknownTask { id: id.to_string() })?;
        let end_at = task.start(now)?;
        Ok(Event::TimerStarted {
            id: task.id.clone(),
            name: task.name.clone(),
            end_at,
            at: Utc::now(),
        })
    }

    /// Pause `id`'s running countdown, snapshotting the time left.
    ///
    /// # Errors
    /// Unknown ids and rejected transitions.
    pub fn stop_task(&mut self, id: &str, now: DateTime<Utc>) -> Result<Event, CoreError> {
        let task = self
            .get_mut(id)
            .ok_or_else(|| CoreError::UnknownTask { id: id.to_string() })?;
        let remaining_secs = task.stop(now)?;
        Ok(Event::TimerPaused {
            id: task.id.clone(),
            name: task.name.clone(),
            remaining_secs,
            at: Utc::now(),
        })
    }

    /// Flip `id`'s completion flag, clearing its countdown either way.
    ///
    /// # Errors
    /// Unknown ids.
    pub fn toggle_complete(&mut self, id: &str) -> Result<Event, CoreError> {
        let task = self
            .get_mut(id)
            .ok_or_else(|| CoreError::UnknownTask { id: id.to_string() })?;
        let completed = task.toggle_complete();
        Ok(Event::CompletionToggled {
            id: task.id.clone(),
            name: task.name.clone(),
            completed,
            at: Utc::now(),
        })
    }

    /// Remove `id`.
    ///
    /// Refuses with [`Confirmation::DeleteRunning`] when the task is
    /// currently running; call [`TaskStore::delete_task_confirmed`] to
    /// proceed. Idle, paused and completed tasks are removed directly.
    ///
    /// # Errors
    /// Unknown ids and confirmation-required.
    pub fn delete_task(&mut self, id: &str) -> Result<Event, CoreError> {
        let task = self
            .get(id)
            .ok_or_else(|| CoreError::UnknownTask { id: id.to_string() })?;
        if task.is_running() {
            return Err(CoreError::ConfirmationRequired(Confirmation::DeleteRunning {
                id: task.id.clone(),
                name: task.name.clone(),
            }));
        }
        self.delete_task_confirmed(id)
    }

    /// Remove `id` even if it is running. Empty buckets are dropped.
    ///
    /// # Errors
    /// Unknown ids.
    pub fn delete_task_confirmed(&mut self, id: &str) -> Result<Event, CoreError> {
        let mut found = None;
        for (date, tasks) in self.days.iter_mut() {
            if let Some(pos) = tasks.iter().position(|t| t.id == id) {
                let task = tasks.remove(pos);
                found = Some((*date, task));
                break;
            }
        }
        match found {
            Some((date, task)) => {
                if self.days.get(&date).is_some_and(|tasks| tasks.is_empty()) {
                    self.days.remove(&date);
                }
                Ok(Event::TaskDeleted {
                    id: task.id,
                    name: task.name,
                    at: Utc::now(),
                })
            }
            None => Err(CoreError::UnknownTask { id: id.to_string() }),
        }
    }

    /// Remove every bucket dated strictly before `cutoff` and return
    /// the removed buckets, so callers can export them before anything
    /// is discarded.
    pub fn purge_before(&mut self, cutoff: DateKey) -> BTreeMap<DateKey, Vec<Task>> {
        let kept = self.days.split_off(&cutoff);
        std::mem::replace(&mut self.days, kept)
    }
}
