use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use notedeck_egress::{DEFAULT_BACKEND_URL, HttpClientConfig, NotesApiConfig};

/// Config file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "~/.notedeck/config.yaml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    #[serde(default = "default_state_dir")]
    pub state_dir: String,

    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout. Unset means requests may wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            state_dir: default_state_dir(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ClientConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?
        };

        Ok(config)
    }

    /// Load the explicit config file, else the default one if it exists, else defaults
    pub fn load(explicit: Option<&str>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            let path = shellexpand::tilde(path).to_string();
            tracing::debug!("Loading configuration from {}", path);
            return Self::from_file(path);
        }

        let default_path = PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).to_string());
        if default_path.exists() {
            tracing::debug!("Loading configuration from {}", default_path.display());
            return Self::from_file(default_path);
        }

        Ok(Self::default())
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("NOTEDECK_BACKEND_URL") {
            self.backend_url = val;
        }

        if let Ok(val) = std::env::var("NOTEDECK_STATE_DIR") {
            self.state_dir = val;
        }

        if let Ok(val) = std::env::var("NOTEDECK_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("NOTEDECK_HTTP_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => self.http.timeout_secs = Some(secs),
                Err(_) => eprintln!(
                    "Warning: Invalid NOTEDECK_HTTP_TIMEOUT_SECS '{}', ignoring",
                    val
                ),
            }
        }
    }

    pub fn state_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.state_dir).to_string())
    }

    pub fn api_config(&self) -> NotesApiConfig {
        NotesApiConfig::new(self.backend_url.clone()).with_client_config(HttpClientConfig {
            timeout_secs: self.http.timeout_secs,
            connect_timeout_secs: self.http.connect_timeout_secs,
            ..HttpClientConfig::default()
        })
    }
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_state_dir() -> String {
    "~/.notedeck".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const ENV_VARS: [&str; 4] = [
        "NOTEDECK_BACKEND_URL",
        "NOTEDECK_STATE_DIR",
        "NOTEDECK_LOG_LEVEL",
        "NOTEDECK_HTTP_TIMEOUT_SECS",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.backend_url, "https://notes-app-0nri.onrender.com");
        assert_eq!(config.http.timeout_secs, None);
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_yaml_file_with_partial_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "backend_url: http://localhost:8080\nhttp:\n  timeout_secs: 30\n",
        )
        .unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.backend_url, "http://localhost:8080");
        assert_eq!(config.http.timeout_secs, Some(30));
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert_eq!(config.state_dir, "~/.notedeck");
    }

    #[test]
    fn test_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "backend_url = \"http://localhost:9000\"\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.backend_url, "http://localhost:9000");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yaml");
        assert!(ClientConfig::load(Some(path.to_str().unwrap())).is_err());
    }

    #[test]
    fn test_api_config_trims_trailing_slash() {
        let config = ClientConfig {
            backend_url: "http://localhost:8080/".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(config.api_config().base_url, "http://localhost:8080");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("NOTEDECK_BACKEND_URL", "http://env.test");
            std::env::set_var("NOTEDECK_STATE_DIR", "/tmp/notedeck-env");
            std::env::set_var("NOTEDECK_HTTP_TIMEOUT_SECS", "15");
        }

        let mut config = ClientConfig::default();
        config.merge_env();
        clear_env();

        assert_eq!(config.backend_url, "http://env.test");
        assert_eq!(config.state_dir(), PathBuf::from("/tmp/notedeck-env"));
        assert_eq!(config.http.timeout_secs, Some(15));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    #[serial]
    fn test_invalid_timeout_env_is_ignored() {
        clear_env();
        unsafe { std::env::set_var("NOTEDECK_HTTP_TIMEOUT_SECS", "soon") };

        let mut config = ClientConfig::default();
        config.merge_env();
        clear_env();

        assert_eq!(config.http.timeout_secs, None);
    }
}
