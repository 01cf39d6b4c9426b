//! Configuration commands over the dotted config keys.

use clap::Subcommand;
use tickdown_core::{Config, ConfigError};

/// Keys exposed through `get`, `set` and `list`.
const KEYS: [&str; 2] = ["timer.tick_interval_ms", "report.output_dir"];

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one config value
    Get {
        /// Config key (e.g. "timer.tick_interval_ms")
        key: String,
    },
    /// Change a config value and persist it
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// Print every config value as key = value lines
    List,
    /// Restore the default configuration
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load_or_default();
            let value = config
                .get(&key)
                .ok_or_else(|| ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_or_default();
            config.set(&key, &value)?;
            println!("{key} = {value}");
        }
        ConfigAction::List => {
            let config = Config::load_or_default();
            for key in KEYS {
                let value = config.get(key).unwrap_or_default();
                println!("{key} = {value}");
            }
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("configuration reset to defaults");
        }
    }
    Ok(())
}
