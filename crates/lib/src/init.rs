//! Initialize the configuration directory: create ~/.cue and a placeholder config.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config;

static DEFAULT_CONFIG: &str = r#"{
  "agent": {
    "projectId": "",
    "locationId": "",
    "agentId": ""
  },
  "auth": {
    "accessToken": ""
  }
}
"#;

/// Create the config directory and a placeholder config file if they do not exist.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        std::fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    } else {
        log::debug!("config already exists at {}, skipping", config_path.display());
    }

    Ok(config_dir.to_path_buf())
}

/// Fail with a setup diagnostic when the agent identity or token is missing.
/// Without this, a misconfigured client would sit silently non-functional.
pub fn require_configured(config: &config::Config) -> Result<()> {
    let agent = &config.agent;
    if agent.project_id.trim().is_empty()
        || agent.location_id.trim().is_empty()
        || agent.agent_id.trim().is_empty()
    {
        anyhow::bail!(
            "agent not configured; set agent.projectId, agent.locationId, and agent.agentId \
             in the config file (run `cue init` to create one)"
        );
    }
    if config::resolve_access_token(config).is_none() {
        anyhow::bail!("no access token; set auth.accessToken in the config file or CUE_ACCESS_TOKEN");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn configured() -> Config {
        let mut config = Config::default();
        config.agent.project_id = "p".to_string();
        config.agent.location_id = "global".to_string();
        config.agent.agent_id = "a".to_string();
        config.auth.access_token = Some("tok".to_string());
        config
    }

    #[test]
    fn placeholder_config_parses() {
        let config: Config = serde_json::from_str(DEFAULT_CONFIG).unwrap();
        assert!(config.agent.project_id.is_empty());
        assert!(require_configured(&config).is_err());
    }

    #[test]
    fn configured_agent_passes() {
        assert!(require_configured(&configured()).is_ok());
    }

    #[test]
    fn missing_token_fails() {
        let mut config = configured();
        config.auth.access_token = None;
        assert!(require_configured(&config).is_err());
    }

    #[test]
    fn init_creates_dir_and_placeholder() {
        let dir = std::env::temp_dir().join(format!("cue-init-test-{}", uuid::Uuid::new_v4()));
        let config_path = dir.join("config.json");
        init_config_dir(&config_path).expect("init config dir");
        assert!(config_path.exists());
        let written = std::fs::read_to_string(&config_path).unwrap();
        assert_eq!(written, DEFAULT_CONFIG);
        // Second run leaves the existing file alone.
        init_config_dir(&config_path).expect("re-init config dir");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
