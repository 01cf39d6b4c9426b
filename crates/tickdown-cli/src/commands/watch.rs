//! Foreground countdown loop.
//!
//! Reconciles running timers against the wall clock on a fixed cadence
//! and redraws a one-line countdown for the running task. Expiries are
//! settled by the sweep itself, so a paused laptop or a slow tick only
//! delays the announcement, never the outcome.

use std::io::Write;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tickdown_core::report::fmt_mm_ss;
use tickdown_core::{
    dispatch_alerts, reconcile, AlertSink, Config, CoreError, Event, KvStore, PlaybackError,
    Profile, TaskStore,
};

use super::common::open_kv;

/// Terminal alert sink: one line per expiry, BEL for the audible cue.
struct TerminalAlert;

impl AlertSink for TerminalAlert {
    fn play_alert(&mut self) -> Result<(), PlaybackError> {
        print!("\x07");
        std::io::stdout()
            .flush()
            .map_err(|e| PlaybackError(e.to_string()))
    }

    fn notify_expired(&mut self, task_name: &str) {
        println!("Time's up: {task_name}");
    }
}

/// In-memory state carried between sweeps.
///
/// Each sweep reloads the store so changes made by other invocations
/// of the CLI are picked up. While storage is unavailable the
/// session's own copy stays authoritative: reloads pause so a settled
/// expiry cannot be re-announced from a stale snapshot, and the save
/// is retried every tick until one lands.
struct WatchSession {
    store: TaskStore,
    /// Reconcile results not yet persisted; a reload would drop them.
    dirty: bool,
    storage_warned: bool,
}

impl WatchSession {
    fn new() -> Self {
        Self {
            store: TaskStore::new(),
            dirty: false,
            storage_warned: false,
        }
    }

    /// One reconciliation sweep: reload, settle expiries, persist.
    /// Storage failures never escape; they are logged once per outage
    /// and the sweep carries on with the in-memory store.
    fn sweep(&mut self, kv: &dyn KvStore, now: DateTime<Utc>) -> Vec<Event> {
        if !self.dirty {
            match TaskStore::load(kv) {
                Ok(store) => {
                    self.store = store;
                    self.storage_warned = false;
                }
                Err(e) => self.warn_once(&e),
            }
        }
        let outcome = reconcile(&mut self.store, now);
        if outcome.changed {
            self.dirty = true;
        }
        if self.dirty {
            match self.store.save(kv) {
                Ok(()) => {
                    self.dirty = false;
                    self.storage_warned = false;
                }
                Err(e) => self.warn_once(&e),
            }
        }
        outcome.events
    }

    fn warn_once(&mut self, e: &CoreError) {
        if !self.storage_warned {
            tracing::warn!("storage unavailable, continuing from memory: {e}");
            self.storage_warned = true;
        }
    }
}

pub fn run(interval_ms: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(watch_loop(interval_ms));
    Ok(())
}

async fn watch_loop(interval_ms: Option<u64>) {
    let config = Config::load_or_default();
    let interval_ms = interval_ms.unwrap_or(config.timer.tick_interval_ms).max(1);

    let kv = open_kv();
    let profile = Profile::load(kv.as_ref()).unwrap_or_else(|e| {
        tracing::warn!("profile unavailable, using defaults: {e}");
        Profile::default()
    });
    let mut sink = TerminalAlert;
    let mut playback_warned = false;
    let mut session = WatchSession::new();

    let mut tick = tokio::time::interval(Duration::from_millis(interval_ms));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    println!("Watching timers every {interval_ms} ms. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = tick.tick() => {
                let now = Utc::now();
                let events = session.sweep(kv.as_ref(), now);

                if !events.is_empty() {
                    println!();
                    if let Err(e) = dispatch_alerts(&mut sink, &events, profile.audio_enabled) {
                        if !playback_warned {
                            tracing::warn!("{e}");
                            playback_warned = true;
                        }
                    }
                }

                match session.store.running() {
                    Some(task) => {
                        print!(
                            "\r{}: {} remaining   ",
                            task.name,
                            fmt_mm_ss(task.remaining_secs(now))
                        );
                    }
                    None => print!("\rno running task          "),
                }
                let _ = std::io::stdout().flush();
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use chrono::{Duration, TimeZone};
    use tickdown_core::{DateKey, MemoryKv, StorageError};

    /// Kv double that can be switched off mid-test.
    struct FlakyKv {
        inner: MemoryKv,
        down: Cell<bool>,
    }

    impl FlakyKv {
        fn new() -> Self {
            Self {
                inner: MemoryKv::new(),
                down: Cell::new(false),
            }
        }
    }

    impl KvStore for FlakyKv {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.down.get() {
                return Err(StorageError::Locked);
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.down.get() {
                return Err(StorageError::Locked);
            }
            self.inner.set(key, value)
        }
    }

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, s).unwrap()
    }

    #[test]
    fn sweep_survives_a_storage_outage() {
        let kv = FlakyKv::new();
        let t0 = at(9, 0, 0);
        let today: DateKey = "2026-03-14".parse().unwrap();
        let mut seeded = TaskStore::new();
        let (task, _) = seeded.add_task("Đọc sách", 0, 5, today).unwrap();
        seeded.start_task(&task.id, t0).unwrap();
        seeded.save(&kv).unwrap();

        let mut session = WatchSession::new();
        assert!(session.sweep(&kv, t0 + Duration::seconds(1)).is_empty());

        // Storage goes away right as the timer expires: the expiry is
        // still settled and announced from the in-memory copy.
        kv.down.set(true);
        let events = session.sweep(&kv, t0 + Duration::seconds(5));
        assert_eq!(events.len(), 1);
        assert!(session.dirty);
        assert!(session.storage_warned);

        // Still down: the settled expiry is not announced again.
        assert!(session.sweep(&kv, t0 + Duration::seconds(6)).is_empty());
        assert!(session.dirty);

        // Back up: the pending save lands and reloads resume.
        kv.down.set(false);
        assert!(session.sweep(&kv, t0 + Duration::seconds(7)).is_empty());
        assert!(!session.dirty);
        assert!(!session.storage_warned);
        let persisted = TaskStore::load(&kv).unwrap();
        assert!(persisted.get(&task.id).unwrap().completed);
    }

    #[test]
    fn sweep_never_saves_over_unreadable_task_data() {
        let kv = MemoryKv::new();
        kv.set("task_data", "{not json").unwrap();

        let mut session = WatchSession::new();
        let events = session.sweep(&kv, at(9, 0, 0));
        assert!(events.is_empty());
        assert!(!session.dirty);
        assert_eq!(kv.get("task_data").unwrap().unwrap(), "{not json");
    }
}
