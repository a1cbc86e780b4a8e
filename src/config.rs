//! Configuration management for Vantage gateway
//!
//! Precedence: environment (`VANTAGE_*`) > `~/.config/omni/vantage/config.toml`
//! > built-in defaults. The TOML file is a partial overlay; every field is
//! optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Default API server port
const DEFAULT_PORT: u16 = 18810;

/// Default durable slot name
const DEFAULT_SLOT: &str = "ui-context";

/// Default save debounce in milliseconds
const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Vantage gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to data directory (database lives here)
    pub data_dir: PathBuf,

    /// HTTP API server configuration
    pub api: ApiConfig,

    /// Context store configuration
    pub store: StoreConfig,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Port to listen on
    pub port: u16,
}

/// Context store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Durable slot the session projection persists to
    pub slot_name: String,

    /// Delay between the last mutation and the slot write
    pub debounce: Duration,

    /// Page a fresh session starts on
    pub initial_page: String,

    /// View a fresh session starts on
    pub initial_view: String,

    /// Assumed viewport width until the shell reports geometry
    pub viewport_width: f64,

    /// Assumed viewport height until the shell reports geometry
    pub viewport_height: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            slot_name: DEFAULT_SLOT.to_string(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            initial_page: "dashboard".to_string(),
            initial_view: "default".to_string(),
            viewport_width: 1920.0,
            viewport_height: 1080.0,
        }
    }
}

impl Config {
    /// Load configuration (env > toml > default)
    #[must_use]
    pub fn load() -> Self {
        let fc = load_config_file();

        // Data directory (~/.local/share/omni/vantage on Linux)
        let data_dir = std::env::var("VANTAGE_DATA_DIR").map_or_else(
            |_| {
                fc.data_dir.clone().map_or_else(default_data_dir, PathBuf::from)
            },
            PathBuf::from,
        );
        std::fs::create_dir_all(&data_dir).ok();

        let api = ApiConfig {
            port: std::env::var("VANTAGE_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
        };

        let defaults = StoreConfig::default();
        let store = StoreConfig {
            slot_name: std::env::var("VANTAGE_SLOT")
                .ok()
                .or(fc.store.slot_name)
                .unwrap_or(defaults.slot_name),
            debounce: std::env::var("VANTAGE_DEBOUNCE_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.store.debounce_ms)
                .map_or(defaults.debounce, Duration::from_millis),
            initial_page: fc.store.initial_page.unwrap_or(defaults.initial_page),
            initial_view: fc.store.initial_view.unwrap_or(defaults.initial_view),
            viewport_width: fc.store.viewport_width.unwrap_or(defaults.viewport_width),
            viewport_height: fc.store.viewport_height.unwrap_or(defaults.viewport_height),
        };

        Self {
            data_dir,
            api,
            store,
        }
    }

    /// Path of the `SQLite` database inside the data directory
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("vantage.db")
    }

    /// Configuration rooted at an explicit data directory (tests, CLI overrides)
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: &Path) -> Self {
        self.data_dir = data_dir.to_path_buf();
        self
    }
}

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
struct VantageConfigFile {
    /// Data directory override
    #[serde(default)]
    data_dir: Option<String>,

    /// Server/runtime configuration
    #[serde(default)]
    server: ServerFileConfig,

    /// Context store configuration
    #[serde(default)]
    store: StoreFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
struct ServerFileConfig {
    /// API server port
    port: Option<u16>,
}

/// Context store configuration
#[derive(Debug, Default, Deserialize)]
struct StoreFileConfig {
    /// Durable slot name
    slot_name: Option<String>,

    /// Save debounce in milliseconds
    debounce_ms: Option<u64>,

    /// Initial page for a fresh session
    initial_page: Option<String>,

    /// Initial view for a fresh session
    initial_view: Option<String>,

    /// Assumed viewport width
    viewport_width: Option<f64>,

    /// Assumed viewport height
    viewport_height: Option<f64>,
}

/// Load the TOML config file from the standard path
///
/// Returns defaults if the file doesn't exist or can't be parsed.
fn load_config_file() -> VantageConfigFile {
    let Some(path) = config_file_path() else {
        return VantageConfigFile::default();
    };

    if !path.exists() {
        return VantageConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                VantageConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            VantageConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/omni/vantage/config.toml`
fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("omni")
            .join("vantage")
            .join("config.toml")
    })
}

/// Default data directory: `~/.local/share/omni/vantage` on Linux
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("."),
        |d| d.data_dir().join("omni").join("vantage"),
    )
}
