use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use crate::mutate::MilestonePolicy;
use crate::store;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "YEARPLAN_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub suggest: SuggestConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// How calendar edits add days to a milestone slot.
    #[serde(default)]
    pub milestone_policy: MilestonePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub user: UserConfig,
    pub config_path: Option<PathBuf>,
    pub data_dir: PathBuf,
    pub resolved_output: String,
}

/// Location of the user config file, honoring `$YEARPLAN_CONFIG`.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    if let Some(explicit) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(explicit));
    }
    dirs::config_dir().map(|d| d.join("yearplan/config.toml"))
}

pub fn load_user_config() -> Result<UserConfig> {
    match user_config_path() {
        Some(path) => load_config_file(&path),
        None => Ok(UserConfig::default()),
    }
}

/// Parse `path`, or return defaults when it does not exist.
pub fn load_config_file(path: &Path) -> Result<UserConfig> {
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn resolve_config(cli_json: bool) -> Result<EffectiveConfig> {
    let user = load_user_config()?;

    let env_format = env::var("FORMAT").ok();
    let resolved_output = resolve_output(cli_json, user.output.clone(), env_format)?;
    let data_dir = resolve_data_dir(
        env::var_os(store::HOME_ENV).map(PathBuf::from),
        user.data_dir.clone(),
        dirs::data_dir(),
    )
    .context("could not determine a state directory; set YEARPLAN_HOME")?;

    Ok(EffectiveConfig {
        user,
        config_path: user_config_path(),
        data_dir,
        resolved_output,
    })
}

/// `$YEARPLAN_HOME`, then the configured `data_dir`, then the platform data
/// directory.
fn resolve_data_dir(
    env_home: Option<PathBuf>,
    configured: Option<PathBuf>,
    platform: Option<PathBuf>,
) -> Option<PathBuf> {
    env_home
        .filter(|p| !p.as_os_str().is_empty())
        .or(configured)
        .or_else(|| platform.map(|d| d.join("yearplan")))
}

fn resolve_output(
    cli_json: bool,
    user_output: Option<String>,
    env_format: Option<String>,
) -> Result<String> {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "plain" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return Ok("json".to_string());
    }

    if let Some(mode) = env_format.as_deref().and_then(normalize_output_mode) {
        return Ok(mode.to_string());
    }

    if let Some(mode) = user_output.as_deref().and_then(normalize_output_mode) {
        return Ok(mode.to_string());
    }

    if std::io::stdout().is_terminal() {
        Ok("pretty".to_string())
    } else {
        Ok("text".to_string())
    }
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}
