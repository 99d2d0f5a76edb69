//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.cue/config.json`) and environment.
//! It identifies the remote agent and carries the bearer token for its endpoint;
//! credential minting itself happens outside this client.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Remote agent identity and endpoint.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Auth settings for the dialog endpoint.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Which agent to talk to, and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    /// Cloud project that hosts the agent.
    #[serde(default)]
    pub project_id: String,

    /// Region the agent is deployed in (e.g. "global", "us-central1").
    #[serde(default)]
    pub location_id: String,

    /// The agent's own id within the project/location.
    #[serde(default)]
    pub agent_id: String,

    /// Base URL of the dialog service (default "https://dialogflow.googleapis.com").
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Language tag sent with every turn (default "en-US").
    #[serde(default = "default_language_code")]
    pub language_code: String,
}

fn default_endpoint() -> String {
    "https://dialogflow.googleapis.com".to_string()
}

fn default_language_code() -> String {
    "en-US".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            location_id: String::new(),
            agent_id: String::new(),
            endpoint: default_endpoint(),
            language_code: default_language_code(),
        }
    }
}

/// Auth for the dialog endpoint: a bearer token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// Bearer token sent with every request. Overridden by CUE_ACCESS_TOKEN env.
    pub access_token: Option<String>,
}

/// Resolve the access token: env CUE_ACCESS_TOKEN overrides config.
pub fn resolve_access_token(config: &Config) -> Option<String> {
    std::env::var("CUE_ACCESS_TOKEN")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .auth
                .access_token
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("CUE_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".cue").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the default path (or CUE_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used (for diagnostics).
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint_and_language() {
        let a = AgentConfig::default();
        assert_eq!(a.endpoint, "https://dialogflow.googleapis.com");
        assert_eq!(a.language_code, "en-US");
        assert!(a.project_id.is_empty());
    }

    #[test]
    fn parse_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "agent": { "projectId": "p1", "locationId": "global", "agentId": "a1" } }"#,
        )
        .unwrap();
        assert_eq!(config.agent.project_id, "p1");
        assert_eq!(config.agent.endpoint, "https://dialogflow.googleapis.com");
        assert_eq!(config.agent.language_code, "en-US");
        assert!(config.auth.access_token.is_none());
    }

    #[test]
    fn access_token_from_config_trimmed() {
        let mut config = Config::default();
        config.auth.access_token = Some("  tok-123  ".to_string());
        assert_eq!(resolve_access_token(&config), Some("tok-123".to_string()));
    }

    #[test]
    fn blank_access_token_is_none() {
        let mut config = Config::default();
        config.auth.access_token = Some("   ".to_string());
        assert_eq!(resolve_access_token(&config), None);
    }
}
