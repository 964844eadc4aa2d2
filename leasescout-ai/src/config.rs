//! Secret resolution for leasescout-ai
//!
//! Every secret resolves ENV → TOML. Missing provider keys are logged and
//! tolerated: the server still starts and only the affected provider fails.

use leasescout_common::config::{resolve_secret, TomlConfig};
use tracing::warn;

use crate::services::ai_gateway::{Provider, ProviderKeys};
use crate::services::docs_exporter::GoogleCredentials;

/// Resolved secrets for one process
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub provider_keys: ProviderKeys,
    pub census_api_key: Option<String>,
    pub google: Option<GoogleCredentials>,
    pub google_folder_id: Option<String>,
}

fn provider_key(provider: Provider, toml_value: Option<&str>) -> Option<String> {
    let name = format!("{} API key", provider);
    let key = resolve_secret(&name, provider.key_env(), toml_value);
    if key.is_none() {
        warn!(
            "{} not configured ({} or [api_keys] in TOML); {} calls will fail",
            name,
            provider.key_env(),
            provider
        );
    }
    key
}

impl ServiceConfig {
    pub fn resolve(toml: &TomlConfig) -> Self {
        let keys = &toml.api_keys;
        let provider_keys = ProviderKeys {
            openai: provider_key(Provider::OpenAi, keys.openai.as_deref()),
            gemini: provider_key(Provider::Gemini, keys.gemini.as_deref()),
            claude: provider_key(Provider::Claude, keys.claude.as_deref()),
        };

        let census_api_key = resolve_secret("Census API key", "CENSUS_API_KEY", keys.census.as_deref());
        if census_api_key.is_none() {
            warn!("Census API key not configured; Census requests run unauthenticated");
        }

        let google_toml = &toml.google;
        let client_id = resolve_secret("Google client id", "GOOGLE_CLIENT_ID", google_toml.client_id.as_deref());
        let client_secret = resolve_secret(
            "Google client secret",
            "GOOGLE_CLIENT_SECRET",
            google_toml.client_secret.as_deref(),
        );
        let refresh_token = resolve_secret(
            "Google refresh token",
            "GOOGLE_REFRESH_TOKEN",
            google_toml.refresh_token.as_deref(),
        );
        let google = match (client_id, client_secret, refresh_token) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => Some(GoogleCredentials {
                client_id,
                client_secret,
                refresh_token,
            }),
            _ => None,
        };
        let google_folder_id = resolve_secret(
            "Google Drive folder id",
            "GOOGLE_DRIVE_FOLDER_ID",
            google_toml.folder_id.as_deref(),
        );

        Self {
            provider_keys,
            census_api_key,
            google,
            google_folder_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leasescout_common::config::{ApiKeysConfig, GoogleConfig};
    use serial_test::serial;

    const VARS: [&str; 8] = [
        "OPENAI_API_KEY",
        "GEMINI_API_KEY",
        "ANTHROPIC_API_KEY",
        "CENSUS_API_KEY",
        "GOOGLE_CLIENT_ID",
        "GOOGLE_CLIENT_SECRET",
        "GOOGLE_REFRESH_TOKEN",
        "GOOGLE_DRIVE_FOLDER_ID",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_env_overrides_toml() {
        clear_env();
        std::env::set_var("OPENAI_API_KEY", "sk-env");

        let toml = TomlConfig {
            api_keys: ApiKeysConfig {
                openai: Some("sk-toml".to_string()),
                gemini: Some("g-toml".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let config = ServiceConfig::resolve(&toml);

        assert_eq!(config.provider_keys.openai.as_deref(), Some("sk-env"));
        assert_eq!(config.provider_keys.gemini.as_deref(), Some("g-toml"));
        assert!(config.provider_keys.claude.is_none());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_partial_google_credentials_disable_export() {
        clear_env();
        let toml = TomlConfig {
            google: GoogleConfig {
                client_id: Some("id".to_string()),
                client_secret: Some("secret".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(ServiceConfig::resolve(&toml).google.is_none());

        std::env::set_var("GOOGLE_REFRESH_TOKEN", "refresh");
        let config = ServiceConfig::resolve(&toml);
        assert_eq!(config.google.map(|g| g.refresh_token), Some("refresh".to_string()));
        clear_env();
    }
}
