/// Shell configuration
use crate::error::{Result, ShellError};
use encore_core::{UserContext, UserId};
use encore_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "encore.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShellConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub player: PlaybackConfig,

    #[serde(default = "default_shell")]
    pub shell: ShellSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionSettings {
    /// Signed-in user; anonymous when unset
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShellSettings {
    /// Interval of the simulated playback clock
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

impl ShellConfig {
    /// Load configuration from file and environment
    ///
    /// `path` falls back to `encore.toml`; a missing file is not an error.
    /// `ENCORE_` variables override the file, with `__` between nested keys
    /// (`ENCORE_STORAGE__DATABASE_URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), Path::to_path_buf);
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        } else if path.is_some() {
            return Err(ShellError::Config(format!(
                "config file not found: {}",
                config_path.display()
            )));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ENCORE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Self::build(settings)
    }

    /// Parse configuration from TOML text, without the environment
    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml));
        Self::build(settings)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ShellError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.shell.tick_millis == 0 {
            return Err(ShellError::Config(
                "shell.tick_millis must be greater than zero".to_string(),
            ));
        }

        let volume = self.player.volume;
        if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
            return Err(ShellError::Config(format!(
                "player.volume must be between 0.0 and 1.0, got {}",
                volume
            )));
        }

        if !self.player.restart_threshold_secs.is_finite() || self.player.restart_threshold_secs < 0.0 {
            return Err(ShellError::Config(
                "player.restart_threshold_secs must be a non-negative number".to_string(),
            ));
        }

        if let Some(user_id) = &self.session.user_id {
            if user_id.trim().is_empty() {
                return Err(ShellError::Config(
                    "session.user_id must not be blank (unset it to run anonymously)".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// User the session acts as
    pub fn user(&self) -> UserContext {
        UserContext::from(self.session.user_id.as_deref().map(UserId::new))
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.shell.tick_millis)
    }

    fn build(settings: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let config = settings
            .build()
            .map_err(|e| ShellError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ShellError::Config(e.to_string()))
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/encore.db".to_string()
}

fn default_shell() -> ShellSettings {
    ShellSettings {
        tick_millis: default_tick_millis(),
    }
}

fn default_tick_millis() -> u64 {
    1000
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            session: SessionSettings::default(),
            player: PlaybackConfig::default(),
            shell: default_shell(),
        }
    }
}
