//! Configuration module for istar-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;

use crate::config::file::{FileConfig, WebhookMode};
use istar_core::config::WebhookVerification;
use istar_sdk::client::ClientConfig;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Environment fallback for `upstream.api_key`.
pub const UPSTREAM_API_KEY_ENV: &str = "ISTAR_API_KEY";
/// Environment fallback for `webhook.secret`.
pub const WEBHOOK_SECRET_ENV: &str = "WEBHOOK_SECRET";
/// Environment fallback for `access.api_key`.
pub const ACCESS_API_KEY_ENV: &str = "GATEWAY_API_KEY";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    /// Key inbound callers must present.
    pub access_api_key: String,
    pub upstream: ClientConfig,
    pub webhook: WebhookVerification,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and validate the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Fill missing secrets from the environment
    /// 4. Validate the result
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_from_str(&config_content, |name| std::env::var(name).ok())
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn load_from_str(
        &self,
        content: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        let access_api_key = secret(file_config.access.api_key.take(), ACCESS_API_KEY_ENV, &env)
            .ok_or_else(|| missing("access.api_key", ACCESS_API_KEY_ENV))?;
        let upstream_api_key = secret(file_config.upstream.api_key.take(), UPSTREAM_API_KEY_ENV, &env)
            .ok_or_else(|| missing("upstream.api_key", UPSTREAM_API_KEY_ENV))?;

        let upstream = file_config.upstream;
        if !matches!(upstream.base_url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "upstream.base_url must be an http(s) URL, got {}",
                upstream.base_url
            )));
        }
        if upstream.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "upstream.timeout_secs must be positive".to_string(),
            ));
        }

        let webhook = match file_config.webhook.mode {
            WebhookMode::Hmac => {
                let secret = secret(file_config.webhook.secret, WEBHOOK_SECRET_ENV, &env)
                    .ok_or_else(|| missing("webhook.secret", WEBHOOK_SECRET_ENV))?;
                WebhookVerification::Hmac { secret }
            }
            WebhookMode::Disabled => WebhookVerification::Disabled,
        };

        let mut client = ClientConfig::new(upstream.base_url, upstream_api_key);
        client.timeout = Duration::from_secs(upstream.timeout_secs);
        client.max_idle_per_host = upstream.max_idle_per_host;
        client.max_retries = upstream.max_retries;

        Ok(LoadedConfig {
            listen: file_config.server.listen,
            access_api_key,
            upstream: client,
            webhook,
        })
    }
}

/// A secret from the file, or from `env_name` when the file leaves it out.
/// Blank values count as absent.
fn secret(
    from_file: Option<String>,
    env_name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    from_file
        .filter(|value| !value.trim().is_empty())
        .or_else(|| env(env_name).filter(|value| !value.trim().is_empty()))
}

fn missing(field: &str, env_name: &str) -> ConfigError {
    ConfigError::ValidationError(format!("{field} is not set (config file or {env_name})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const BASE: &str = r#"
[upstream]
base_url = "https://api.istar.example"
"#;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    fn loader() -> ConfigLoader {
        ConfigLoader::new("unused.toml", None)
    }

    #[test]
    fn test_secrets_from_environment() {
        let loaded = loader()
            .load_from_str(
                BASE,
                env(&[
                    (ACCESS_API_KEY_ENV, "inbound"),
                    (UPSTREAM_API_KEY_ENV, "upstream"),
                    (WEBHOOK_SECRET_ENV, "hook"),
                ]),
            )
            .unwrap();
        assert_eq!(loaded.access_api_key, "inbound");
        assert_eq!(loaded.upstream.api_key, "upstream");
        assert_eq!(loaded.upstream.timeout, Duration::from_secs(10));
        assert_eq!(loaded.upstream.max_idle_per_host, 20);
        assert_eq!(loaded.upstream.max_retries, 3);
        assert_eq!(
            loaded.webhook,
            WebhookVerification::Hmac {
                secret: "hook".to_string()
            }
        );
    }

    #[test]
    fn test_file_values_win_over_environment() {
        let content = r#"
[access]
api_key = "file-inbound"

[upstream]
base_url = "https://api.istar.example"
api_key = "file-upstream"
timeout_secs = 3

[webhook]
secret = "file-hook"
"#;
        let loaded = loader()
            .load_from_str(
                content,
                env(&[
                    (ACCESS_API_KEY_ENV, "env-inbound"),
                    (UPSTREAM_API_KEY_ENV, "env-upstream"),
                    (WEBHOOK_SECRET_ENV, "env-hook"),
                ]),
            )
            .unwrap();
        assert_eq!(loaded.access_api_key, "file-inbound");
        assert_eq!(loaded.upstream.api_key, "file-upstream");
        assert_eq!(loaded.upstream.timeout, Duration::from_secs(3));
        assert_eq!(
            loaded.webhook,
            WebhookVerification::Hmac {
                secret: "file-hook".to_string()
            }
        );
    }

    #[test]
    fn test_empty_webhook_secret_is_an_error() {
        let content = r#"
[access]
api_key = "inbound"

[upstream]
base_url = "https://api.istar.example"
api_key = "upstream"

[webhook]
mode = "hmac"
secret = "   "
"#;
        let err = loader().load_from_str(content, env(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("webhook.secret")));
    }

    #[test]
    fn test_disabled_webhook_needs_no_secret() {
        let content = r#"
[access]
api_key = "inbound"

[upstream]
base_url = "https://api.istar.example"
api_key = "upstream"

[webhook]
mode = "disabled"
"#;
        let loaded = loader().load_from_str(content, env(&[])).unwrap();
        assert_eq!(loaded.webhook, WebhookVerification::Disabled);
    }

    #[test]
    fn test_missing_keys_are_errors() {
        let err = loader()
            .load_from_str(BASE, env(&[(UPSTREAM_API_KEY_ENV, "u"), (WEBHOOK_SECRET_ENV, "w")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("access.api_key")));

        let err = loader()
            .load_from_str(BASE, env(&[(ACCESS_API_KEY_ENV, "a"), (WEBHOOK_SECRET_ENV, "w")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("upstream.api_key")));
    }

    #[test]
    fn test_invalid_upstream_settings() {
        let keys = env(&[
            (ACCESS_API_KEY_ENV, "a"),
            (UPSTREAM_API_KEY_ENV, "u"),
            (WEBHOOK_SECRET_ENV, "w"),
        ]);
        let zero_timeout = r#"
[upstream]
base_url = "https://api.istar.example"
timeout_secs = 0
"#;
        assert!(matches!(
            loader().load_from_str(zero_timeout, &keys),
            Err(ConfigError::ValidationError(_))
        ));

        let ftp = r#"
[upstream]
base_url = "ftp://api.istar.example"
"#;
        assert!(matches!(
            loader().load_from_str(ftp, &keys),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_listen_override() {
        let loader = ConfigLoader::new("unused.toml", Some("127.0.0.1:9999".parse().unwrap()));
        let loaded = loader
            .load_from_str(
                BASE,
                env(&[
                    (ACCESS_API_KEY_ENV, "a"),
                    (UPSTREAM_API_KEY_ENV, "u"),
                    (WEBHOOK_SECRET_ENV, "w"),
                ]),
            )
            .unwrap();
        assert_eq!(loaded.listen.port(), 9999);
    }

    #[test]
    fn test_missing_file() {
        let loader = ConfigLoader::new("/nonexistent/istar-gateway.toml", None);
        assert!(matches!(loader.load(), Err(ConfigError::IoError(_))));
    }
}
