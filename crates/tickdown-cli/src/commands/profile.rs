//! User profile commands.

use clap::Subcommand;
use tickdown_core::Profile;

use super::common::open_kv;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the stored profile
    Show,
    /// Set the display name used in report headers
    Name {
        /// New name
        name: String,
    },
    /// Turn the audible expiry cue on or off
    Audio {
        /// "on" or "off"
        state: String,
    },
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let kv = open_kv();
    let mut profile = Profile::load(kv.as_ref())?;

    match action {
        ProfileAction::Show => {
            println!(
                "name: {}",
                profile.user_name.as_deref().unwrap_or("(not set)")
            );
            println!("audio: {}", if profile.audio_enabled { "on" } else { "off" });
        }
        ProfileAction::Name { name } => {
            profile.set_user_name(&name)?;
            profile.save(kv.as_ref())?;
            println!("ok");
        }
        ProfileAction::Audio { state } => {
            profile.audio_enabled = match state.as_str() {
                "on" => true,
                "off" => false,
                other => return Err(format!("expected 'on' or 'off', got '{other}'").into()),
            };
            profile.save(kv.as_ref())?;
            println!("ok");
        }
    }
    Ok(())
}
