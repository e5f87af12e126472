//! Client configuration loaded from `jobbuddy.toml`.
//!
//! Missing values fall back to sensible defaults. The `JOBBUDDY_API_TOKEN`
//! environment variable takes precedence over the file for the token.

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration for the JobBuddy client.
#[derive(Debug, Clone, Deserialize)]
pub struct JobBuddyConfig {
    /// Base URL of the JobBuddy backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for authenticated endpoints.
    #[serde(default)]
    pub api_token: String,

    /// Delay between status polls in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Give up with a timeout after this many polls; unbounded when absent.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_poll_interval_ms() -> u64 {
    3000
}

impl Default for JobBuddyConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: String::new(),
            poll_interval_ms: default_poll_interval_ms(),
            max_attempts: None,
        }
    }
}

impl JobBuddyConfig {
    /// Load configuration from `jobbuddy.toml` in the current directory,
    /// falling back to defaults if the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("jobbuddy.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<JobBuddyConfig>(&contents)?
        } else {
            Self::default()
        };

        // The environment wins over the file for the token.
        if let Ok(token) = std::env::var("JOBBUDDY_API_TOKEN")
            && !token.is_empty()
        {
            config.api_token = token;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = JobBuddyConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.poll_interval_ms, 3000);
        assert_eq!(config.max_attempts, None);
        assert!(config.api_token.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_token = "jwt-test-123"
            max_attempts = 40
        "#;
        let config: JobBuddyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_token, "jwt-test-123");
        assert_eq!(config.max_attempts, Some(40));
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.poll_interval_ms, 3000);
    }

    #[test]
    fn load_from_reads_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobbuddy.toml");
        std::fs::write(
            &path,
            "base_url = \"https://jobbuddy.example\"\npoll_interval_ms = 500\n",
        )
        .unwrap();

        let config = JobBuddyConfig::load_from(&path).unwrap();
        assert_eq!(config.base_url, "https://jobbuddy.example");
        assert_eq!(config.poll_interval_ms, 500);
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = JobBuddyConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.poll_interval_ms, 3000);
    }
}
