use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::config;
use crate::console::Console;
use crate::notify::SilentNotifier;
use crate::session::FileCredentialStore;

pub const CREDENTIALS_FILE: &str = "credentials.json";

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("EBBING_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("ebbing").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn credentials_path() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join(CREDENTIALS_FILE))
}

/// Build the console over the persisted credentials. Errors are printed by
/// the command handlers, so the pipeline gets a silent notifier.
pub fn open_console() -> anyhow::Result<Console> {
    let credentials = Arc::new(FileCredentialStore::new(credentials_path()?));
    Ok(Console::from_config_with(config(), credentials, Arc::new(SilentNotifier))?)
}
