//! Application configuration for VenueScout.
//!
//! User config lives at `~/.venuescout/venuescout.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VenueScoutError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "venuescout.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".venuescout";

// ---------------------------------------------------------------------------
// Config structs (matching venuescout.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language-model endpoint used for generation and enrichment.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Primary (HTML directory) source.
    #[serde(default)]
    pub primary: PrimaryConfig,

    /// Secondary (catalog API) source.
    #[serde(default)]
    pub secondary: SecondaryConfig,

    /// Fallback cascade thresholds.
    #[serde(default)]
    pub thresholds: ThresholdConfig,
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible endpoint.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,

    #[serde(default = "default_enrichment_timeout")]
    pub enrichment_timeout_secs: u64,

    #[serde(default = "default_generation_temperature")]
    pub generation_temperature: f32,

    #[serde(default = "default_enrichment_temperature")]
    pub enrichment_temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_llm_base_url(),
            model: default_model(),
            generation_timeout_secs: default_generation_timeout(),
            enrichment_timeout_secs: default_enrichment_timeout(),
            generation_temperature: default_generation_temperature(),
            enrichment_temperature: default_enrichment_temperature(),
        }
    }
}

fn default_api_key_env() -> String {
    "FASTROUTER_API_KEY".into()
}
fn default_llm_base_url() -> String {
    "https://fastrouter.302.ai/v1".into()
}
fn default_model() -> String {
    "meta-llama/llama-3-8b-instruct".into()
}
fn default_generation_timeout() -> u64 {
    20
}
fn default_enrichment_timeout() -> u64 {
    25
}
fn default_generation_temperature() -> f32 {
    0.3
}
fn default_enrichment_temperature() -> f32 {
    0.2
}

/// `[primary]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryConfig {
    /// Directory origin; the search servlet path is appended.
    #[serde(default = "default_primary_base_url")]
    pub base_url: String,

    /// Maximum number of result pages fetched per request.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Rows per result page, used to compute the `skip` offset.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Pause between consecutive page requests.
    #[serde(default = "default_page_delay")]
    pub page_delay_ms: u64,

    #[serde(default = "default_primary_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            base_url: default_primary_base_url(),
            max_pages: default_max_pages(),
            page_size: default_page_size(),
            page_delay_ms: default_page_delay(),
            timeout_secs: default_primary_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_primary_base_url() -> String {
    "http://www.wikicfp.com".into()
}
fn default_max_pages() -> u32 {
    3
}
fn default_page_size() -> u32 {
    20
}
fn default_page_delay() -> u64 {
    500
}
fn default_primary_timeout() -> u64 {
    10
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
        .into()
}

/// `[secondary]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryConfig {
    #[serde(default = "default_secondary_base_url")]
    pub base_url: String,

    /// Page size requested from the catalog API.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    #[serde(default = "default_secondary_timeout")]
    pub timeout_secs: u64,
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        Self {
            base_url: default_secondary_base_url(),
            per_page: default_per_page(),
            timeout_secs: default_secondary_timeout(),
        }
    }
}

fn default_secondary_base_url() -> String {
    "https://api.openalex.org".into()
}
fn default_per_page() -> u32 {
    15
}
fn default_secondary_timeout() -> u64 {
    5
}

/// `[thresholds]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Below this many records, the generative fallback runs.
    #[serde(default = "default_generative_low_water")]
    pub generative_low_water: usize,

    /// Below this many unique acronyms after generation, the static table is appended.
    #[serde(default = "default_static_floor")]
    pub static_floor: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            generative_low_water: default_generative_low_water(),
            static_floor: default_static_floor(),
        }
    }
}

fn default_generative_low_water() -> usize {
    5
}
fn default_static_floor() -> usize {
    3
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.venuescout/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| VenueScoutError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.venuescout/venuescout.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| VenueScoutError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        VenueScoutError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| VenueScoutError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| VenueScoutError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| VenueScoutError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the language-model API key from the configured env var.
///
/// Returns `None` when the variable is unset or empty; callers treat that as
/// "generation and enrichment disabled", not as an error.
pub fn resolve_api_key(config: &LlmConfig) -> Option<SecretString> {
    match std::env::var(&config.api_key_env) {
        Ok(val) if !val.trim().is_empty() => Some(SecretString::new(val)),
        _ => {
            tracing::debug!(
                var = %config.api_key_env,
                "language-model API key not set; generation and enrichment disabled"
            );
            None
        }
    }
}
