//! Expiry alert delivery.

use crate::error::PlaybackError;

/// Where expiry alerts go. The core announces expiries through this
/// trait; frontends decide what a notification or an audio cue means
/// on their platform.
pub trait AlertSink {
    /// Play the audible cue.
    ///
    /// # Errors
    /// Returns a playback error when the cue cannot be produced. The
    /// caller treats this as non-fatal.
    fn play_alert(&mut self) -> Result<(), PlaybackError>;

    /// Announce that `task_name`'s countdown finished.
    fn notify_expired(&mut self, task_name: &str);
}
