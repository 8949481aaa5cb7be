use clap::Subcommand;
use feewatch_core::SettingsStore;
use std::error::Error;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a settings value
    Get {
        /// Settings key (e.g. "selected_priority", "alert_threshold")
        key: String,
    },
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// New value ("none" clears alert_threshold)
        value: String,
    },
    /// List all settings
    List,
    /// Reset settings to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn Error>> {
    let store = SettingsStore::open_default()?;
    match action {
        ConfigAction::Get { key } => match store.get(&key)? {
            Some(value) => println!("{value}"),
            None => {
                eprintln!("unknown key: {key}");
                std::process::exit(1);
            }
        },
        ConfigAction::Set { key, value } => {
            store.set(&key, &value)?;
            println!("ok");
        }
        ConfigAction::List => {
            println!("{}", serde_json::to_string_pretty(&store.settings()?)?);
        }
        ConfigAction::Reset => {
            store.reset()?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
