//! # Terminal Configuration
//!
//! Configuration for the counter terminal.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BISTRO_DB_PATH=/srv/bistro/bistro.db                               │
//! │     BISTRO_CURRENCY_SYMBOL=$                                           │
//! │     BISTRO_UTC_OFFSET_MINUTES=330                                      │
//! │     BISTRO_SEED_MENU=false                                             │
//! │                                                                         │
//! │  2. TOML Config File (--config <path>, or the default location)        │
//! │     ~/.config/bistro-pos/bistro.toml (Linux)                           │
//! │     ~/Library/Application Support/com.bistro.pos/bistro.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # bistro.toml
//! [store]
//! database_path = "/srv/bistro/bistro.db"
//! in_memory = false
//!
//! [menu]
//! seed_defaults = true
//!
//! [display]
//! currency_symbol = "₹"
//!
//! [report]
//! utc_offset_minutes = 330   # omit to use the machine's local time zone
//! ```

use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use bistro_core::display::DEFAULT_CURRENCY_SYMBOL;

use crate::error::{AppError, AppResult};

/// Largest accepted distance from UTC, in minutes.
pub const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

const CONFIG_FILE_NAME: &str = "bistro.toml";
const DATABASE_FILE_NAME: &str = "bistro.db";

// =============================================================================
// Sections
// =============================================================================

/// Where records are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// SQLite file. Default: `bistro.db` in the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Keep everything in memory for this run only.
    #[serde(default)]
    pub in_memory: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSettings {
    /// Write the starter menu when the stored menu is empty.
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
}

impl Default for MenuSettings {
    fn default() -> Self {
        MenuSettings {
            seed_defaults: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency_symbol: default_currency_symbol(),
        }
    }
}

/// Settings for the calendar the report groups by.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Fixed offset from UTC. `None` uses the machine's local time zone.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

fn default_true() -> bool {
    true
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

// =============================================================================
// App Config
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub menu: MenuSettings,

    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub report: ReportSettings,
}

/// The time zone whose calendar dates and clock times are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    Local,
    Fixed(FixedOffset),
}

impl AppConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Override with the TOML file, if it exists
    /// 3. Override with environment variables
    /// 4. Validate
    ///
    /// An explicitly given path must exist; the default location may not.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        match config_path {
            Some(path) => {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path).map_err(|e| {
                    AppError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                config = toml::from_str(&contents)?;
            }
            None => {
                if let Some(path) = Self::default_config_path() {
                    if path.exists() {
                        info!(?path, "Loading config from file");
                        let contents = std::fs::read_to_string(&path)?;
                        config = toml::from_str(&contents)?;
                    } else {
                        debug!(?path, "Config file not found, using defaults");
                    }
                }
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            let mut config = Self::default();
            config.apply_env_overrides();
            if let Err(e) = config.validate() {
                warn!("Environment overrides rejected: {}", e);
                config = Self::default();
            }
            config
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> AppResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| AppError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.display.currency_symbol.trim().is_empty() {
            return Err(AppError::Config(
                "display.currency_symbol must not be empty".into(),
            ));
        }

        if let Some(minutes) = self.report.utc_offset_minutes {
            if minutes.unsigned_abs() > MAX_UTC_OFFSET_MINUTES.unsigned_abs() {
                return Err(AppError::Config(format!(
                    "report.utc_offset_minutes must be within ±{}, got {}",
                    MAX_UTC_OFFSET_MINUTES, minutes
                )));
            }
        }

        if let Some(path) = &self.store.database_path {
            if path.as_os_str().is_empty() {
                return Err(AppError::Config(
                    "store.database_path must not be empty".into(),
                ));
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from a variable lookup.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("BISTRO_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.store.database_path = Some(PathBuf::from(path));
        }

        if let Some(symbol) = lookup("BISTRO_CURRENCY_SYMBOL") {
            self.display.currency_symbol = symbol;
        }

        if let Some(offset) = lookup("BISTRO_UTC_OFFSET_MINUTES") {
            match offset.trim().parse::<i32>() {
                Ok(minutes) => {
                    debug!(minutes, "Overriding report UTC offset from environment");
                    self.report.utc_offset_minutes = Some(minutes);
                }
                Err(_) => warn!(value = %offset, "Ignoring invalid BISTRO_UTC_OFFSET_MINUTES"),
            }
        }

        if let Some(seed) = lookup("BISTRO_SEED_MENU") {
            match seed.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.menu.seed_defaults = true,
                "0" | "false" | "no" | "off" => self.menu.seed_defaults = false,
                _ => warn!(value = %seed, "Ignoring invalid BISTRO_SEED_MENU"),
            }
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "bistro", "pos")
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The SQLite file to open, creating its directory if needed.
    pub fn database_path(&self) -> AppResult<PathBuf> {
        let path = match &self.store.database_path {
            Some(path) => path.clone(),
            None => Self::project_dirs()
                .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
                .ok_or_else(|| AppError::Config("Could not determine app data directory".into()))?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Ok(path)
    }

    /// The time zone report days and receipt times are taken in.
    pub fn display_zone(&self) -> AppResult<DisplayZone> {
        match self.report.utc_offset_minutes {
            None => Ok(DisplayZone::Local),
            Some(minutes) => minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .map(DisplayZone::Fixed)
                .ok_or_else(|| {
                    AppError::Config(format!("invalid UTC offset: {} minutes", minutes))
                }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
