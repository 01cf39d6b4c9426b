//! Persisted user preferences.
//!
//! Two small kv entries alongside the task data: the display name used
//! in report headers, and whether expiries play an audible cue.

use crate::error::{CoreError, ValidationError};
use crate::storage::KvStore;

const USER_NAME_KEY: &str = "user_name";
const AUDIO_ENABLED_KEY: &str = "audio_enabled";

/// User preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Display name for report headers; `None` until the user sets one.
    pub user_name: Option<String>,
    /// Whether expiry alerts play sound. On by default.
    pub audio_enabled: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            user_name: None,
            audio_enabled: true,
        }
    }
}

impl Profile {
    /// Load preferences, falling back to defaults for missing or
    /// malformed entries.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub fn load(kv: &dyn KvStore) -> Result<Self, CoreError> {
        let user_name = kv.get(USER_NAME_KEY)?.filter(|name| !name.is_empty());
        let audio_enabled = kv
            .get(AUDIO_ENABLED_KEY)?
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or(true);
        Ok(Self {
            user_name,
            audio_enabled,
        })
    }

    /// Persist both preference entries.
    ///
    /// # Errors
    /// Propagates storage failures.
    pub fn save(&self, kv: &dyn KvStore) -> Result<(), CoreError> {
        kv.set(USER_NAME_KEY, self.user_name.as_deref().unwrap_or(""))?;
        kv.set(AUDIO_ENABLED_KEY, &self.audio_enabled.to_string())?;
        Ok(())
    }

    /// Set the display name. Names are trimmed and must be non-empty.
    ///
    /// # Errors
    /// Rejects empty names.
    pub fn set_user_name(&mut self, name: &str) -> Result<(), CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyUserName.into());
        }
        self.user_name = Some(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKv;

    #[test]
    fn defaults_when_nothing_saved() {
        let kv = MemoryKv::new();
        let profile = Profile::load(&kv).unwrap();
        assert_eq!(profile.user_name, None);
        assert!(profile.audio_enabled);
    }

    #[test]
    fn round_trip() {
        let kv = MemoryKv::new();
        let mut profile = Profile::default();
        profile.set_user_name("  Minh  ").unwrap();
        profile.audio_enabled = false;
        profile.save(&kv).unwrap();

        let loaded = Profile::load(&kv).unwrap();
        assert_eq!(loaded.user_name.as_deref(), Some("Minh"));
        assert!(!loaded.audio_enabled);
    }

    #[test]
    fn empty_name_rejected() {
        let mut profile = Profile::default();
        let err = profile.set_user_name("   ").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::EmptyUserName)
        ));
        assert_eq!(profile.user_name, None);
    }

    #[test]
    fn malformed_audio_flag_falls_back_to_default() {
        let kv = MemoryKv::new();
        kv.set("audio_enabled", "not json").unwrap();
        kv.set("user_name", "").unwrap();
        let profile = Profile::load(&kv).unwrap();
        assert!(profile.audio_enabled);
        assert_eq!(profile.user_name, None);
    }
}
