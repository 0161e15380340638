use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::AppError;
use crate::page::ElementIds;
use crate::poll::DEFAULT_POLL_INTERVAL;

pub const ENV_CONFIG: &str = "NOTIBELL_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub server_url: String,
    /// Cookie header value of an existing host session, e.g. `JSESSIONID=...`.
    #[serde(default)]
    pub session_cookie: Option<String>,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub discard_stale_responses: bool,
    #[serde(default)]
    pub elements: ElementIds,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

impl ClientConfig {
    /// Config with defaults for everything but the server.
    pub fn for_server(server_url: &str) -> Result<Self, AppError> {
        Ok(Self {
            server_url: validate_server_url(server_url)?,
            session_cookie: None,
            poll_interval_secs: default_poll_interval(),
            discard_stale_responses: false,
            elements: ElementIds::default(),
        })
    }

    /// Resolves the config path and loads it. Returns the path used.
    pub fn find_and_load(cli_value: Option<PathBuf>) -> Result<(PathBuf, Self), AppError> {
        let path = resolve_config_path(cli_value)?;
        let cfg = load_config(&path)?;
        Ok((path, cfg))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

pub fn resolve_config_path(cli_value: Option<PathBuf>) -> Result<PathBuf, AppError> {
    if let Some(p) = cli_value {
        return Ok(p);
    }
    if let Ok(p) = std::env::var(ENV_CONFIG) {
        return Ok(PathBuf::from(p));
    }
    default_config_path().ok_or_else(|| AppError::Config("could not determine config dir".into()))
}

pub fn default_config_path() -> Option<PathBuf> {
    let pd = ProjectDirs::from("dev", "notibell", "notibell")?;
    Some(pd.config_dir().join("client.yaml"))
}

pub fn load_config(path: &Path) -> Result<ClientConfig, AppError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("read {} failed: {e}", path.display())))?;
    let mut cfg: ClientConfig = serde_yaml::from_str(&data)
        .map_err(|e| AppError::Config(format!("parse {} failed: {e}", path.display())))?;
    cfg.server_url = validate_server_url(&cfg.server_url)?;
    Ok(cfg)
}

pub fn normalize_server_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", trimmed.trim_end_matches('/'))
    }
}

/// Normalizes `input` and checks that it parses as an http(s) URL with a host.
pub fn validate_server_url(input: &str) -> Result<String, AppError> {
    let normalized = normalize_server_url(input);
    let parsed = url::Url::parse(&normalized)
        .map_err(|e| AppError::Config(format!("invalid server_url {input:?}: {e}")))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::Config(format!(
            "invalid server_url {input:?}: missing host"
        )));
    }
    Ok(normalized)
}
