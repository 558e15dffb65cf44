//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.spark/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::state::{
    DEFAULT_INITIAL_BATCH, DEFAULT_REFILL_BATCH, DEFAULT_REFILL_THRESHOLD, DeckSettings,
};
use crate::inference::providers::gemini::{
    DEFAULT_GEMINI_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL,
};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SparkConfig {
    #[serde(default)]
    pub deck: DeckConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DeckConfig {
    pub initial_batch: Option<usize>,
    pub refill_batch: Option<usize>,
    pub refill_threshold: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub text_model: Option<String>,
    pub image_model: Option<String>,
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub deck: DeckSettings,
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.spark/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".spark").join("config.toml"))
}

/// Loads `~/.spark/config.toml`, writing a commented-out default on first run.
/// Without a home directory every setting falls back to its default.
pub fn load_config() -> Result<SparkConfig, ConfigError> {
    match config_path() {
        Some(path) => load_or_init(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(SparkConfig::default())
        }
    }
}

/// Parses the file at `path`. A missing file is created from the commented
/// template and yields defaults; any other read failure is `ConfigError::Io`.
pub fn load_or_init(path: &Path) -> Result<SparkConfig, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("No config file found, generating default at {}", path.display());
            if let Err(e) = write_default_config(path) {
                warn!("Failed to write default config: {}", e);
            }
            return Ok(SparkConfig::default());
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };

    let config: SparkConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!(
        "Config: deck={:?}, gemini.base_url={:?}, api_key set={}",
        config.deck,
        config.gemini.base_url,
        config.gemini.api_key.is_some()
    );
    Ok(config)
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Spark Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [deck]
# initial_batch = 5         # profiles loaded when a session starts
# refill_batch = 3          # profiles fetched by each background top-up
# refill_threshold = 2      # top up once this many profiles remain

# [gemini]
# api_key = "AIza..."       # Or set GEMINI_API_KEY (or API_KEY) env var
# base_url = "https://generativelanguage.googleapis.com/v1beta"
# text_model = "gemini-2.5-flash"
# image_model = "imagen-4.0-generate-001"
"#;

fn write_default_config(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_text_model` comes from the `--model` flag (None = not specified).
pub fn resolve(config: &SparkConfig, cli_text_model: Option<&str>) -> ResolvedConfig {
    resolve_with(config, cli_text_model, |key| std::env::var(key).ok())
}

/// `resolve` with an injectable environment lookup.
fn resolve_with(
    config: &SparkConfig,
    cli_text_model: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // API key: env (GEMINI_API_KEY, then API_KEY) → config
    let api_key = env("GEMINI_API_KEY")
        .or_else(|| env("API_KEY"))
        .or_else(|| config.gemini.api_key.clone())
        .filter(|k| !k.trim().is_empty());

    // Base URL: env → config → default
    let base_url = env("GEMINI_BASE_URL")
        .or_else(|| config.gemini.base_url.clone())
        .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string());

    // Text model: CLI → env → config → default
    let text_model = cli_text_model
        .map(|s| s.to_string())
        .or_else(|| env("SPARK_TEXT_MODEL"))
        .or_else(|| config.gemini.text_model.clone())
        .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string());

    // Image model: env → config → default
    let image_model = env("SPARK_IMAGE_MODEL")
        .or_else(|| config.gemini.image_model.clone())
        .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());

    ResolvedConfig {
        deck: DeckSettings {
            initial_batch: config.deck.initial_batch.unwrap_or(DEFAULT_INITIAL_BATCH),
            refill_batch: config.deck.refill_batch.unwrap_or(DEFAULT_REFILL_BATCH),
            refill_threshold: config
                .deck
                .refill_threshold
                .unwrap_or(DEFAULT_REFILL_THRESHOLD),
        },
        api_key,
        base_url,
        text_model,
        image_model,
    }
}
