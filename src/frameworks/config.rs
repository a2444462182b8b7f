use secrecy::Secret;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::interface_adapters::clients::controller::ControllerSettings;
use crate::use_cases::SiteSettings;

pub const DEFAULT_CONFIG_FILE: &str = "portal.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Runtime configuration, built once at startup and passed down.
#[derive(Clone, Debug, Deserialize)]
pub struct PortalConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub controller: ControllerConfig,
    pub portal: PageConfig,
    pub audit: AuditConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            asset_dir: default_asset_dir(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ControllerConfig {
    pub url: String,
    pub username: String,
    // May be left out of the file and supplied through CONTROLLER_PASSWORD.
    #[serde(default = "empty_secret")]
    pub password: Secret<String>,
    #[serde(default = "default_site")]
    pub site: String,
    pub session_minutes: u32,
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PageConfig {
    pub title: String,
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub terms: String,
    pub default_redirect_url: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "empty_secret")]
    pub database_url: Secret<String>,
    #[serde(default = "default_table_name")]
    pub table_name: String,
    #[serde(default = "default_timeout_ms")]
    pub write_timeout_ms: u64,
}

fn default_listen_address() -> String {
    "0.0.0.0:4646".to_string()
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_site() -> String {
    "default".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_table_name() -> String {
    "guest_authorizations".to_string()
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

impl PortalConfig {
    // Read, apply environment overrides, then validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&raw)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    // Secrets may come from the environment (or a `.env` file) instead of the TOML file.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATABASE_URL").filter(|value| !value.is_empty()) {
            self.audit.database_url = Secret::new(url);
        }
        if let Some(password) = lookup("CONTROLLER_PASSWORD").filter(|value| !value.is_empty()) {
            self.controller.password = Secret::new(password);
        }
    }

    pub fn validate(&mut self) -> Result<(), ConfigError> {
        use secrecy::ExposeSecret;

        let parsed = Url::parse(&self.controller.url).map_err(|err| ConfigError::Invalid {
            field: "controller.url",
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                field: "controller.url",
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }
        let trimmed = self.controller.url.trim_end_matches('/').to_string();
        self.controller.url = trimmed;

        require_non_empty("controller.username", &self.controller.username)?;
        require_non_empty("controller.password", self.controller.password.expose_secret())?;
        require_non_empty("controller.site", &self.controller.site)?;
        require_non_empty("portal.title", &self.portal.title)?;
        require_non_empty("portal.default_redirect_url", &self.portal.default_redirect_url)?;
        require_non_empty("audit.database_url", self.audit.database_url.expose_secret())?;

        if self.controller.session_minutes == 0 {
            return Err(ConfigError::Invalid {
                field: "controller.session_minutes",
                reason: "must be greater than zero".to_string(),
            });
        }
        if !is_plain_identifier(&self.audit.table_name) {
            return Err(ConfigError::Invalid {
                field: "audit.table_name",
                reason: format!("{:?} is not a plain identifier", self.audit.table_name),
            });
        }

        Ok(())
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            base_url: self.controller.url.clone(),
            username: self.controller.username.clone(),
            password: self.controller.password.clone(),
            site: self.controller.site.clone(),
            session_minutes: self.controller.session_minutes,
            request_timeout: Duration::from_millis(self.controller.request_timeout_ms),
            insecure_skip_verify: self.controller.insecure_skip_verify,
        }
    }

    pub fn site_settings(&self) -> SiteSettings {
        SiteSettings {
            site: self.controller.site.clone(),
            title: self.portal.title.clone(),
            intro: self.portal.intro.clone(),
            terms: self.portal.terms.clone(),
            default_redirect_url: self.portal.default_redirect_url.clone(),
        }
    }

    pub fn audit_write_timeout(&self) -> Duration {
        Duration::from_millis(self.audit.write_timeout_ms)
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

// The table name is interpolated into SQL, so only `[A-Za-z_][A-Za-z0-9_]*` is accepted.
fn is_plain_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
