use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const WATSONX_PROJECT_ID: &str = "WATSONX_AI_PROJECT_ID";
pub const WATSONX_SPACE_ID: &str = "WATSONX_AI_SPACE_ID";
pub const WATSONX_SERVICE_URL: &str = "WATSONX_AI_SERVICE_URL";
pub const WATSONX_API_KEY: &str = "WATSONX_AI_APIKEY";
pub const FLICKR_API_KEY: &str = "FLICKR_API_KEY";
pub const OLLAMA_HOST: &str = "OLLAMA_HOST";
pub const OLLAMA_PORT: &str = "OLLAMA_PORT";
pub const OLLAMA_MODEL: &str = "OLLAMA_MODEL";
pub const CONFIG_PATH: &str = "IMAGE_AGENT_CONFIG";
pub const DOTENV_FILE: &str = ".env";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot parse config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Cannot load env file {path}: {source}")]
    Dotenv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// Variables from a dotenv file, without touching the process environment.
/// A missing file yields no variables.
pub fn load_dotenv(path: impl AsRef<Path>) -> Result<HashMap<String, String>, ConfigError> {
    let path = path.as_ref();
    let failed = |source: dotenvy::Error| ConfigError::Dotenv {
        path: path.to_path_buf(),
        source,
    };
    match dotenvy::from_path_iter(path) {
        Ok(entries) => entries.collect::<Result<HashMap<_, _>, _>>().map_err(failed),
        Err(err) if err.not_found() => Ok(HashMap::new()),
        Err(err) => Err(failed(err)),
    }
}

/// Where watsonx requests are billed. A project id wins over a space id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatsonxScope {
    Project(String),
    Space(String),
}

#[derive(Debug, Clone)]
pub struct WatsonxConfig {
    pub scope: WatsonxScope,
    pub service_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".to_string(),
            port: 11434,
            model: crate::llm::ollama::DEFAULT_MODEL.to_string(),
        }
    }
}

/// Execution limits and memory size for the agent runtime.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub max_iterations: usize,
    pub max_retries_per_step: usize,
    pub total_max_retries: usize,
    /// Number of past user/assistant messages carried into the next turn.
    pub memory_limit: usize,
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 8,
            max_retries_per_step: 3,
            total_max_retries: 10,
            memory_limit: 20,
            system_prompt: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub host: String,
    pub port: u16,
    pub open_browser: bool,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            open_browser: true,
        }
    }
}

impl GalleryConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Optional TOML overrides, read from the file named by `IMAGE_AGENT_CONFIG`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub agent: AgentConfig,
    pub gallery: GalleryConfig,
}

impl FileConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub watsonx: WatsonxConfig,
    pub flickr_api_key: String,
    pub ollama: OllamaConfig,
    pub agent: AgentConfig,
    pub gallery: GalleryConfig,
}

impl Config {
    /// Build the configuration from the process environment, falling back to
    /// `.env` in the working directory. Real environment variables win.
    pub fn from_env() -> Result<Self, ConfigError> {
        let dotenv = load_dotenv(DOTENV_FILE)?;
        if !dotenv.is_empty() {
            tracing::debug!(file = DOTENV_FILE, vars = dotenv.len(), "loaded env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| dotenv.get(key).cloned()))
    }

    /// Build the configuration from an arbitrary variable lookup.
    /// Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &str| {
            get(key).ok_or_else(|| ConfigError::MissingConfig(format!("{} is not set in the environment or the .env file", key)))
        };

        let scope = match (get(WATSONX_PROJECT_ID), get(WATSONX_SPACE_ID)) {
            (Some(project), _) => WatsonxScope::Project(project),
            (None, Some(space)) => WatsonxScope::Space(space),
            (None, None) => {
                return Err(ConfigError::MissingConfig(format!(
                    "set {} (or {} as a fallback) in the environment or the .env file",
                    WATSONX_PROJECT_ID, WATSONX_SPACE_ID
                )));
            }
        };
        let watsonx = WatsonxConfig {
            scope,
            service_url: require(WATSONX_SERVICE_URL)?,
            api_key: require(WATSONX_API_KEY)?,
        };
        let flickr_api_key = require(FLICKR_API_KEY)?;

        let mut ollama = OllamaConfig::default();
        if let Some(host) = get(OLLAMA_HOST) {
            let invalid = |reason: String| {
                ConfigError::InvalidConfig(format!("{} must be a URL such as http://localhost, got '{}': {}", OLLAMA_HOST, host, reason))
            };
            let url = url::Url::parse(&host).map_err(|e| invalid(e.to_string()))?;
            if url.host_str().is_none() || url.cannot_be_a_base() {
                return Err(invalid("no host".into()));
            }
            ollama.host = host;
        }
        if let Some(port) = get(OLLAMA_PORT) {
            ollama.port = port.parse().map_err(|_| {
                ConfigError::InvalidConfig(format!("{} must be a port number, got '{}'", OLLAMA_PORT, port))
            })?;
        }
        if let Some(model) = get(OLLAMA_MODEL) {
            ollama.model = model;
        }

        let file = match get(CONFIG_PATH) {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        if file.agent.max_iterations == 0 {
            return Err(ConfigError::InvalidConfig("agent.max_iterations must be at least 1".into()));
        }

        Ok(Self {
            watsonx,
            flickr_api_key,
            ollama,
            agent: file.agent,
            gallery: file.gallery,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn complete() -> HashMap<String, String> {
        env(&[
            (WATSONX_PROJECT_ID, "proj-1"),
            (WATSONX_SERVICE_URL, "https://us-south.ml.cloud.ibm.com"),
            (WATSONX_API_KEY, "key"),
            (FLICKR_API_KEY, "flickr"),
        ])
    }

    #[test]
    fn loads_required_values_with_defaults() {
        let vars = complete();
        let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.watsonx.scope, WatsonxScope::Project("proj-1".into()));
        assert_eq!(config.flickr_api_key, "flickr");
        assert_eq!(config.agent.max_iterations, 8);
        assert_eq!(config.agent.max_retries_per_step, 3);
        assert_eq!(config.agent.total_max_retries, 10);
        assert_eq!(config.gallery.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.ollama.port, 11434);
    }

    #[test]
    fn space_id_is_used_when_project_is_absent() {
        let mut vars = complete();
        vars.remove(WATSONX_PROJECT_ID);
        vars.insert(WATSONX_SPACE_ID.into(), "space-9".into());
        let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.watsonx.scope, WatsonxScope::Space("space-9".into()));
    }

    #[test]
    fn project_id_wins_over_space_id() {
        let mut vars = complete();
        vars.insert(WATSONX_SPACE_ID.into(), "space-9".into());
        let config = Config::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.watsonx.scope, WatsonxScope::Project("proj-1".into()));
    }

    #[test]
    fn missing_flickr_key_is_reported_by_name() {
        let mut vars = complete();
        vars.remove(FLICKR_API_KEY);
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        match err {
            ConfigError::MissingConfig(msg) => assert!(msg.contains(FLICKR_API_KEY)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut vars = complete();
        vars.insert(WATSONX_SERVICE_URL.into(), "   ".into());
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingConfig(msg) if msg.contains(WATSONX_SERVICE_URL)));
    }

    #[test]
    fn missing_both_watsonx_scopes_fails() {
        let mut vars = complete();
        vars.remove(WATSONX_PROJECT_ID);
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingConfig(_)));
    }

    #[test]
    fn bad_ollama_port_is_invalid() {
        let mut vars = complete();
        vars.insert(OLLAMA_PORT.into(), "eleven".into());
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(_)));
    }

    #[test]
    fn ollama_host_must_be_a_url() {
        let mut vars = complete();
        vars.insert(OLLAMA_HOST.into(), "localhost with spaces".into());
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(msg) if msg.contains(OLLAMA_HOST)));
    }

    #[test]
    fn ollama_host_needs_a_host_part() {
        let mut vars = complete();
        vars.insert(OLLAMA_HOST.into(), "mailto:ollama@example.com".into());
        let err = Config::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConfig(msg) if msg.contains("no host")));
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("image-agent-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn dotenv_file_supplies_missing_values() {
        let path = temp_file("complete.env", "FLICKR_API_KEY=from-file\n# comment\nWATSONX_AI_SPACE_ID=\"space 7\"\n");
        let dotenv = load_dotenv(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(dotenv.get(FLICKR_API_KEY).map(String::as_str), Some("from-file"));
        assert_eq!(dotenv.get(WATSONX_SPACE_ID).map(String::as_str), Some("space 7"));

        let mut vars = complete();
        vars.remove(FLICKR_API_KEY);
        vars.insert(WATSONX_PROJECT_ID.into(), "proj-env".into());
        let config = Config::from_lookup(|k| vars.get(k).cloned().or_else(|| dotenv.get(k).cloned())).unwrap();
        assert_eq!(config.flickr_api_key, "from-file");
        assert_eq!(config.watsonx.scope, WatsonxScope::Project("proj-env".into()));
    }

    #[test]
    fn missing_dotenv_file_is_empty() {
        let path = std::env::temp_dir().join(format!("image-agent-{}-absent.env", std::process::id()));
        assert!(load_dotenv(path).unwrap().is_empty());
    }

    #[test]
    fn file_config_overrides_sections_partially() {
        let file = FileConfig::parse(
            r#"
            [agent]
            max_iterations = 4

            [gallery]
            port = 8080
            open_browser = false
            "#,
        )
        .unwrap();
        assert_eq!(file.agent.max_iterations, 4);
        assert_eq!(file.agent.total_max_retries, 10);
        assert_eq!(file.gallery.port, 8080);
        assert_eq!(file.gallery.host, "127.0.0.1");
        assert!(!file.gallery.open_browser);
    }
}
