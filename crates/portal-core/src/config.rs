//! Portal configuration: upstream agent URLs, sentinel marker, listener settings.
//!
//! Precedence: defaults < TOML file (`PORTAL_CONFIG` path, else `config/portal.toml`)
//! < environment (`PORTAL__PRIMARY_URL`, `PORTAL__SENTINEL_MARKER`, ...).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Primary agent (Confluence entities knowledge source).
pub const DEFAULT_PRIMARY_URL: &str =
    "https://rryvg55fyi.execute-api.us-east-1.amazonaws.com/default/Agente-Experto-Confluence";
/// Secondary agent (BIAN 12 service landscape), consulted on sentinel only.
pub const DEFAULT_SECONDARY_URL: &str =
    "https://451mknt4hg.execute-api.us-east-1.amazonaws.com/default/Agente-de-Consultas";
/// Marker the primary agent embeds in its answer when it does not know.
pub const DEFAULT_SENTINEL_MARKER: &str = "NO_SÉ:";

const DEFAULT_CONFIG_PATH: &str = "config/portal";

/// Gateway configuration. Load with [`PortalConfig::load`].
///
/// | Key | Default | Description |
/// |-----|---------|-------------|
/// | app_name | Data Domain Portal | Identity reported by `/api/v1/status`. |
/// | bind_address | 127.0.0.1 | Listener address. |
/// | port | 8001 | Listener port. |
/// | primary_url | Agente-Experto-Confluence | Upstream A. |
/// | secondary_url | Agente-de-Consultas | Upstream B. |
/// | services_url | unset | Upstream for the services-catalog agent. |
/// | sentinel_marker | `NO_SÉ:` | Escalation marker in primary answers. |
/// | upstream_timeout_secs | unset | No timeout unless set. |
/// | log_dir | unset | Daily-rolling log file directory. |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub app_name: String,
    pub bind_address: String,
    pub port: u16,
    pub primary_url: String,
    pub secondary_url: String,
    #[serde(default)]
    pub services_url: Option<String>,
    pub sentinel_marker: String,
    #[serde(default)]
    pub upstream_timeout_secs: Option<u64>,
    #[serde(default)]
    pub log_dir: Option<String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            app_name: "Data Domain Portal".to_string(),
            bind_address: "127.0.0.1".to_string(),
            port: 8001,
            primary_url: DEFAULT_PRIMARY_URL.to_string(),
            secondary_url: DEFAULT_SECONDARY_URL.to_string(),
            services_url: None,
            sentinel_marker: DEFAULT_SENTINEL_MARKER.to_string(),
            upstream_timeout_secs: None,
            log_dir: None,
        }
    }
}

impl PortalConfig {
    /// Load config from file and environment. Precedence: env `PORTAL_CONFIG` path > `config/portal.toml` > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("PORTAL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Load from an explicit file path (skipped when it does not exist), then environment.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("app_name", defaults.app_name)?
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("primary_url", defaults.primary_url)?
            .set_default("secondary_url", defaults.secondary_url)?
            .set_default("sentinel_marker", defaults.sentinel_marker)?;

        let with_toml = path.with_extension("toml");
        let builder = if path.is_file() {
            builder.add_source(config::File::from(path))
        } else if with_toml.is_file() {
            builder.add_source(config::File::from(with_toml.as_path()))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("PORTAL").separator("__"))
            .build()?;

        let loaded: Self = built.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject configurations the gateway cannot serve with.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        check_url("primary_url", &self.primary_url)?;
        check_url("secondary_url", &self.secondary_url)?;
        // Blank means unset, as in `ProxyGateway::with_services_url`.
        if let Some(url) = self.services_url.as_deref().filter(|u| !u.trim().is_empty()) {
            check_url("services_url", url)?;
        }
        if self.sentinel_marker.is_empty() {
            return Err(config::ConfigError::Message(
                "sentinel_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }

    /// `bind_address:port` for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn check_url(key: &str, value: &str) -> Result<(), config::ConfigError> {
    reqwest::Url::parse(value.trim())
        .map(|_| ())
        .map_err(|e| config::ConfigError::Message(format!("{key} is not a valid URL ({value}): {e}")))
}
