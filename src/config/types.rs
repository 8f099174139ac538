//! Configuration types.

use serde::{Deserialize, Serialize};

/// Default environment variable holding the provider credential.
pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Default port for the HTTP API.
pub const DEFAULT_PORT: u16 = 8000;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Text-generation provider settings.
    pub provider: ProviderConfig,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Host address to bind to.
    pub host: String,
    /// Whether to enable permissive CORS.
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: "127.0.0.1".to_string(),
            cors_permissive: true,
        }
    }
}

/// Configuration for the text-generation provider client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL for the chat-completions API.
    pub base_url: String,
    /// Environment variable consulted when a start request carries no key.
    pub api_key_env: String,
    /// Attach the provider's web-search plugin to streamed turns.
    pub web_search: bool,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            web_search: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.cors_permissive);
    }

    #[test]
    fn test_provider_config_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.api_key_env, "OPENROUTER_API_KEY");
        assert!(config.web_search);
    }

    #[test]
    fn test_app_config_partial_toml() {
        let toml = r#"
            [server]
            port = 9000

            [provider]
            web_search = false
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(!config.provider.web_search);
        assert_eq!(config.provider.api_key_env, "OPENROUTER_API_KEY");
    }
}
