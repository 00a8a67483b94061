//! Configuration management for muni.
//!
//! Loads configuration from ${MUNI_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the procedure `.txt` files.
    /// Defaults to ${MUNI_HOME}/procedures.
    pub kb_dir: Option<PathBuf>,

    /// URL of a remote chat backend. When unset, the local knowledge
    /// base answers directly.
    pub backend_url: Option<String>,

    /// Milliseconds between reveal ticks.
    pub reveal_interval_ms: u64,

    /// Maximum number of transcript entries kept per session.
    pub history_limit: usize,

    /// Greeting revealed when a chat session starts.
    pub greeting: String,
}

impl Config {
    const DEFAULT_REVEAL_INTERVAL_MS: u64 = 4;
    const DEFAULT_HISTORY_LIMIT: usize = 6;
    const DEFAULT_GREETING: &str = "¡Hola! Soy el asistente virtual de la municipalidad. \
         Pregúntame por un **trámite** y te daré sus requisitos, costos y plazos.";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Resolved procedure directory.
    pub fn kb_dir(&self) -> PathBuf {
        self.kb_dir
            .clone()
            .unwrap_or_else(|| paths::muni_home().join("procedures"))
    }

    /// Reveal tick cadence as a [`Duration`].
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kb_dir: None,
            backend_url: None,
            reveal_interval_ms: Self::DEFAULT_REVEAL_INTERVAL_MS,
            history_limit: Self::DEFAULT_HISTORY_LIMIT,
            greeting: Self::DEFAULT_GREETING.to_string(),
        }
    }
}

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for muni configuration and data directories.
    //!
    //! MUNI_HOME resolution order:
    //! 1. MUNI_HOME environment variable (if set)
    //! 2. ~/.config/muni (default)

    use std::path::PathBuf;

    /// Returns the muni home directory.
    ///
    /// Checks MUNI_HOME env var first, falls back to ~/.config/muni
    pub fn muni_home() -> PathBuf {
        if let Ok(home) = std::env::var("MUNI_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("muni"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        muni_home().join("config.toml")
    }

    /// Returns the path to the log directory.
    pub fn logs_dir() -> PathBuf {
        muni_home().join("logs")
    }
}
