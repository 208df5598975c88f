//! Application configuration for MedNexa.
//!
//! User config lives at `~/.mednexa/mednexa.toml`. Every field has a default,
//! so a missing file or a partial file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MednexaError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "mednexa.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".mednexa";

// ---------------------------------------------------------------------------
// Config structs (matching mednexa.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Narrative generator settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Data-source settings.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Report output settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Per-stage time budgets.
    #[serde(default)]
    pub workflow: WorkflowTimeouts,
}

/// `[gemini]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for summaries.
    #[serde(default = "default_model")]
    pub model: String,

    /// API origin; overridable for proxies and tests.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// HTTP client timeout in seconds.
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_http_timeout(),
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_model() -> String {
    "gemini-2.0-flash".into()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_http_timeout() -> u64 {
    60
}

/// `[sources]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Directory holding `<source>.json` datasets. Empty means embedded datasets.
    #[serde(default)]
    pub data_dir: String,
}

impl SourcesConfig {
    /// The configured dataset directory, if any.
    pub fn data_dir(&self) -> Option<PathBuf> {
        if self.data_dir.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.data_dir))
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory rendered reports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "outputs".into()
}

/// `[workflow]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowTimeouts {
    #[serde(default = "default_source_timeout")]
    pub source_timeout_ms: u64,

    #[serde(default = "default_narrative_timeout")]
    pub narrative_timeout_ms: u64,

    #[serde(default = "default_render_timeout")]
    pub render_timeout_ms: u64,
}

impl Default for WorkflowTimeouts {
    fn default() -> Self {
        Self {
            source_timeout_ms: default_source_timeout(),
            narrative_timeout_ms: default_narrative_timeout(),
            render_timeout_ms: default_render_timeout(),
        }
    }
}

fn default_source_timeout() -> u64 {
    10_000
}
fn default_narrative_timeout() -> u64 {
    90_000
}
fn default_render_timeout() -> u64 {
    30_000
}

// ---------------------------------------------------------------------------
// Workflow config (runtime, derived from AppConfig)
// ---------------------------------------------------------------------------

/// Runtime time budgets for each collaborator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub source_timeout: Duration,
    pub narrative_timeout: Duration,
    pub render_timeout: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for WorkflowConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            source_timeout: Duration::from_millis(config.workflow.source_timeout_ms),
            narrative_timeout: Duration::from_millis(config.workflow.narrative_timeout_ms),
            render_timeout: Duration::from_millis(config.workflow.render_timeout_ms),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// `~/.mednexa/`, where the user config lives.
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| MednexaError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// `~/.mednexa/mednexa.toml`.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_file_in(&config_dir()?))
}

/// The config file inside `dir`.
pub fn config_file_in(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load the user config, or defaults when none has been written.
pub fn load_config() -> Result<AppConfig> {
    load_config_in(&config_dir()?)
}

/// Load `mednexa.toml` from `dir`. A missing file yields defaults.
pub fn load_config_in(dir: &Path) -> Result<AppConfig> {
    let path = config_file_in(dir);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(AppConfig::default());
    }
    load_config_from(&path)
}

/// Parse a config file at an explicit path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MednexaError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| MednexaError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write the default config to `~/.mednexa/mednexa.toml`.
pub fn init_config() -> Result<PathBuf> {
    init_config_in(&config_dir()?)
}

/// Write the default config into `dir` and return the file path.
///
/// An existing file is left untouched.
pub fn init_config_in(dir: &Path) -> Result<PathBuf> {
    let path = config_file_in(dir);
    if path.exists() {
        tracing::info!(path = %path.display(), "config file already exists");
        return Ok(path);
    }

    std::fs::create_dir_all(dir).map_err(|e| MednexaError::io(dir, e))?;
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| MednexaError::config(format!("failed to serialize default config: {e}")))?;
    std::fs::write(&path, content).map_err(|e| MednexaError::io(&path, e))?;

    tracing::info!(path = %path.display(), "created default config file");
    Ok(path)
}

/// Read the narrative generator API key from the configured env var.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.gemini.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(MednexaError::config(format!(
            "Gemini API key not found. Set the {var_name} environment variable."
        ))),
    }
}

/// Check that the narrative generator API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    resolve_api_key(config).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.gemini.model, "gemini-2.0-flash");
        assert_eq!(parsed.workflow.source_timeout_ms, 10_000);
        assert!(parsed.sources.data_dir().is_none());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[gemini]
model = "gemini-1.5-pro"

[sources]
data_dir = "/srv/mednexa/data"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.gemini.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.sources.data_dir(), Some(PathBuf::from("/srv/mednexa/data")));
        assert_eq!(config.report.output_dir, "outputs");
    }

    #[test]
    fn workflow_config_from_app_config() {
        let mut app = AppConfig::default();
        app.workflow.render_timeout_ms = 1_500;
        let wf = WorkflowConfig::from(&app);
        assert_eq!(wf.source_timeout, Duration::from_secs(10));
        assert_eq!(wf.narrative_timeout, Duration::from_secs(90));
        assert_eq!(wf.render_timeout, Duration::from_millis(1_500));
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("mednexa-config-{}", uuid::Uuid::now_v7()))
    }

    #[test]
    fn load_config_from_file() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        let path = config_file_in(&dir);
        std::fs::write(&path, "[report]\noutput_dir = \"/tmp/reports\"\n").unwrap();

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.report.output_dir, "/tmp/reports");

        std::fs::write(&path, "[report\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = temp_dir();
        let config = load_config_in(&dir).expect("defaults");
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.report.output_dir, "outputs");
        assert!(!dir.exists());
    }

    #[test]
    fn init_config_writes_loadable_defaults() {
        let dir = temp_dir().join("nested");
        let path = init_config_in(&dir).expect("init");
        assert_eq!(path, dir.join("mednexa.toml"));

        let config = load_config_in(&dir).expect("load");
        assert_eq!(config.gemini.api_key_env, "GEMINI_API_KEY");
        assert_eq!(config.workflow.narrative_timeout_ms, 90_000);

        let _ = std::fs::remove_dir_all(dir.parent().unwrap());
    }

    #[test]
    fn init_config_keeps_existing_file() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(config_file_in(&dir), "[gemini]\nmodel = \"gemini-1.5-pro\"\n").unwrap();

        init_config_in(&dir).expect("init");
        let config = load_config_in(&dir).expect("load");
        assert_eq!(config.gemini.model, "gemini-1.5-pro");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn user_config_lives_under_home() {
        let Ok(path) = config_file_path() else {
            return;
        };
        assert!(path.ends_with(".mednexa/mednexa.toml"));
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.gemini.api_key_env = "MEDNEXA_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }

    #[test]
    fn api_key_resolves_from_env() {
        let mut config = AppConfig::default();
        // PATH is set in every test environment.
        config.gemini.api_key_env = "PATH".into();
        let key = resolve_api_key(&config).expect("PATH is set");
        assert!(!key.is_empty());
    }
}
