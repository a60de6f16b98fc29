use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::{info, warn};

/// Console configuration. The OIDC session is external to this app, so
/// the API location, bearer token and role claims arrive either through
/// the environment or from `config.json` under the per-user config dir.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    pub api_url: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl AppConfig {
    /// Environment first (`PVMS_API_URL`, `PVMS_API_TOKEN`, `PVMS_ROLES`),
    /// config file second.
    pub fn load() -> Result<Self> {
        if let Ok(api_url) = env::var("PVMS_API_URL") {
            info!("configuring api from environment");
            let access_token = env::var("PVMS_API_TOKEN").unwrap_or_else(|_| {
                warn!("PVMS_API_TOKEN not set, requests will be unauthenticated");
                String::new()
            });
            let roles = env::var("PVMS_ROLES")
                .map(|raw| split_roles(&raw))
                .unwrap_or_default();
            return Ok(AppConfig {
                api_url,
                access_token,
                roles,
            });
        }

        let path = default_config_path()?;
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        Ok(config)
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "pvms", "console")
        .ok_or_else(|| anyhow!("unable to resolve config directory"))?;
    Ok(project_dirs.config_dir().join("config.json"))
}

fn split_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_parses_with_optional_fields_defaulted() {
        let raw = r#"{"api_url": "https://pvms.example/api"}"#;
        let config: AppConfig = serde_json::from_str(raw).expect("config should parse");
        assert_eq!(config.api_url, "https://pvms.example/api");
        assert!(config.access_token.is_empty());
        assert!(config.roles.is_empty());
    }

    #[test]
    fn config_file_carries_roles() {
        let raw = r#"{
            "api_url": "https://pvms.example/api",
            "access_token": "tok",
            "roles": ["PVMS-viewer", "PVMS-upload"]
        }"#;
        let config: AppConfig = serde_json::from_str(raw).expect("config should parse");
        assert_eq!(config.roles, vec!["PVMS-viewer", "PVMS-upload"]);
    }

    #[test]
    fn roles_split_on_commas_and_trim() {
        assert_eq!(
            split_roles(" PVMS-viewer , PVMS-upload ,"),
            vec!["PVMS-viewer", "PVMS-upload"]
        );
        assert!(split_roles("").is_empty());
    }
}
