//! Timer reconciliation.
//!
//! A countdown finishes because the wall clock passes its deadline, not
//! because anything counted. [`reconcile`] compares every running task
//! against `now` and settles the ones whose deadline has passed, so a
//! sweep that runs late (after sleep, or with a slow tick) still lands
//! on the same outcome.

use chrono::{DateTime, Utc};

use crate::alert::AlertSink;
use crate::error::PlaybackError;
use crate::events::Event;
use crate::store::TaskStore;
use crate::task::TimerState;

/// What a reconciliation sweep did.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    /// One `TimerExpired` per task settled by this sweep.
    pub events: Vec<Event>,
    /// Whether the store changed and should be persisted.
    pub changed: bool,
}

/// Settle every running task whose deadline has passed: the task goes
/// idle and is marked completed. A deadline is passed once `now` is at
/// or beyond it, so a 5 second timer started at `t0` expires at
/// `t0 + 5s` exactly and not a millisecond sooner.
///
/// Tasks already settled by an earlier sweep are no longer running, so
/// each expiry is observed exactly once.
pub fn reconcile(store: &mut TaskStore, now: DateTime<Utc>) -> ReconcileOutcome {
    let mut outcome = ReconcileOutcome::default();
    for task in store.tasks_mut() {
        let TimerState::Running { end_at } = task.timer else {
            continue;
        };
        if now < end_at {
            continue;
        }
        task.expire();
        outcome.events.push(Event::TimerExpired {
            id: task.id.clone(),
            name: task.name.clone(),
            at: now,
        });
        outcome.changed = true;
    }
    outcome
}

/// Deliver expiry alerts for a sweep's events.
///
/// The textual notification always goes out; the audible cue only when
/// `audio_enabled`. Alert failures do not stop delivery for the
/// remaining events.
///
/// # Errors
/// Returns the first playback failure after every event was handled.
pub fn dispatch_alerts(
    sink: &mut dyn AlertSink,
    events: &[Event],
    audio_enabled: bool,
) -> Result<(), PlaybackError> {
    let mut first_failure = None;
    for event in events {
        let Event::TimerExpired { name, .. } = event else {
            continue;
        };
        sink.notify_expired(name);
        if audio_enabled {
            if let Err(e) = sink.play_alert() {
                first_failure.get_or_insert(e);
            }
        }
    }
    match first_failure {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DateKey;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, s).unwrap()
    }

    fn day(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn running_store(secs: u64, started: DateTime<Utc>) -> (TaskStore, String) {
        let mut store = TaskStore::new();
        let (task, _) = store.add_task("t", 0, secs, day("2026-03-14")).unwrap();
        store.start_task(&task.id, started).unwrap();
        (store, task.id)
    }

    #[test]
    fn expires_at_deadline_not_before() {
        let t0 = at(9, 0, 0);
        let (mut store, id) = running_store(5, t0);

        // 4999 ms in: still running.
        let outcome = reconcile(&mut store, t0 + Duration::milliseconds(4999));
        assert!(outcome.events.is_empty());
        assert!(!outcome.changed);
        assert!(store.get(&id).unwrap().is_running());

        // 5000 ms in: expired and completed.
        let outcome = reconcile(&mut store, t0 + Duration::milliseconds(5000));
        assert_eq!(outcome.events.len(), 1);
        assert!(outcome.changed);
        let task = store.get(&id).unwrap();
        assert!(task.completed);
        assert_eq!(task.timer, TimerState::Idle);
    }

    #[test]
    fn late_sweep_settles_once() {
        let t0 = at(9, 0, 0);
        let (mut store, _) = running_store(5, t0);

        // The process was asleep for an hour. One expiry, not many.
        let late = t0 + Duration::hours(1);
        let outcome = reconcile(&mut store, late);
        assert_eq!(outcome.events.len(), 1);
        assert!(matches!(
            &outcome.events[0],
            Event::TimerExpired { at, .. } if *at == late
        ));

        let outcome = reconcile(&mut store, late + Duration::seconds(1));
        assert!(outcome.events.is_empty());
        assert!(!outcome.changed);
    }

    #[test]
    fn resume_at_zero_expires_next_sweep() {
        let t0 = at(9, 0, 0);
        let mut store = TaskStore::new();
        let (task, _) = store.add_task("t", 0, 5, day("2026-03-14")).unwrap();
        store.start_task(&task.id, t0).unwrap();
        // Paused exactly at the deadline: zero seconds left.
        store.stop_task(&task.id, t0 + Duration::seconds(5)).unwrap();

        let t1 = at(10, 0, 0);
        store.start_task(&task.id, t1).unwrap();
        let outcome = reconcile(&mut store, t1);
        assert_eq!(outcome.events.len(), 1);
        assert!(store.get(&task.id).unwrap().completed);
    }

    #[test]
    fn settles_every_stale_runner_across_days() {
        // Two runners cannot happen through the store API, but a stale
        // or hand-edited snapshot can hold anything; the sweep settles
        // whatever it finds, across all day buckets.
        let json = r#"{
            "2026-03-13": [
                {"id": "a", "name": "a", "duration_secs": 5, "has_timer": true,
                 "completed": false,
                 "timer": {"state": "running", "end_at": "2026-03-13T09:00:05Z"}}
            ],
            "2026-03-14": [
                {"id": "b", "name": "b", "duration_secs": 5, "has_timer": true,
                 "completed": false,
                 "timer": {"state": "running", "end_at": "2026-03-14T09:00:05Z"}},
                {"id": "c", "name": "c", "duration_secs": 60, "has_timer": true,
                 "completed": false,
                 "timer": {"state": "paused", "remaining_secs": 59}}
            ]
        }"#;
        let mut store: TaskStore = serde_json::from_str(json).unwrap();

        let outcome = reconcile(&mut store, at(10, 0, 0));
        assert_eq!(outcome.events.len(), 2);
        assert!(store.get("a").unwrap().completed);
        assert!(store.get("b").unwrap().completed);
        // The paused bystander is untouched.
        assert!(matches!(
            store.get("c").unwrap().timer,
            TimerState::Paused { remaining_secs: 59 }
        ));
    }

    struct RecordingSink {
        notified: Vec<String>,
        played: usize,
        fail_playback: bool,
    }

    impl AlertSink for RecordingSink {
        fn play_alert(&mut self) -> Result<(), PlaybackError> {
            self.played += 1;
            if self.fail_playback {
                Err(PlaybackError("no audio device".into()))
            } else {
                Ok(())
            }
        }

        fn notify_expired(&mut self, task_name: &str) {
            self.notified.push(task_name.to_string());
        }
    }

    #[test]
    fn alerts_notify_always_and_play_only_with_audio() {
        let events = vec![
            Event::TimerExpired {
                id: "1".into(),
                name: "a".into(),
                at: at(9, 0, 0),
            },
            Event::TimerExpired {
                id: "2".into(),
                name: "b".into(),
                at: at(9, 0, 0),
            },
        ];

        let mut sink = RecordingSink {
            notified: Vec::new(),
            played: 0,
            fail_playback: false,
        };
        dispatch_alerts(&mut sink, &events, true).unwrap();
        assert_eq!(sink.notified, vec!["a", "b"]);
        assert_eq!(sink.played, 2);

        let mut silent = RecordingSink {
            notified: Vec::new(),
            played: 0,
            fail_playback: false,
        };
        dispatch_alerts(&mut silent, &events, false).unwrap();
        assert_eq!(silent.notified, vec!["a", "b"]);
        assert_eq!(silent.played, 0);
    }

    #[test]
    fn playback_failure_does_not_stop_notifications() {
        let events = vec![
            Event::TimerExpired {
                id: "1".into(),
                name: "a".into(),
                at: at(9, 0, 0),
            },
            Event::TimerExpired {
                id: "2".into(),
                name: "b".into(),
                at: at(9, 0, 0),
            },
        ];

        let mut sink = RecordingSink {
            notified: Vec::new(),
            played: 0,
            fail_playback: true,
        };
        let err = dispatch_alerts(&mut sink, &events, true).unwrap_err();
        assert_eq!(err.0, "no audio device");
        // Both events were still notified and both playbacks attempted.
        assert_eq!(sink.notified, vec!["a", "b"]);
        assert_eq!(sink.played, 2);
    }
}
