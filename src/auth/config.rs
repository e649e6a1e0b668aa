//! OAuth2 Configuration
//!
//! Centraliza as configurações do app HubSpot usadas no fluxo OAuth2

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::HubSpotSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Config {
    /// Client ID do app HubSpot
    pub client_id: String,

    /// Client Secret do app HubSpot
    pub client_secret: String,

    /// URL de callback registrada no app
    pub redirect_uri: String,

    /// Escopos solicitados, separados por espaço
    pub scope: String,

    pub authorization_url: String,
    pub token_url: String,

    /// Tempo de vida do state aguardando callback
    pub state_ttl: Duration,

    /// Tempo de vida das credenciais aguardando retirada
    pub credentials_ttl: Duration,
}

impl OAuth2Config {
    pub fn from_settings(settings: &HubSpotSettings) -> Self {
        Self {
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            redirect_uri: settings.redirect_uri.clone(),
            scope: settings.scope.clone(),
            authorization_url: settings.authorization_url.clone(),
            token_url: settings.token_url.clone(),
            state_ttl: Duration::from_secs(settings.state_ttl_secs),
            credentials_ttl: Duration::from_secs(settings.credentials_ttl_secs),
        }
    }

    /// Gerar URL de autorização do HubSpot com o state já codificado
    pub fn authorization_url(&self, encoded_state: &str) -> String {
        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
            self.authorization_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&self.scope),
            urlencoding::encode(encoded_state)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url() {
        let config = OAuth2Config {
            client_id: "test_client_id".to_string(),
            client_secret: "test_secret".to_string(),
            redirect_uri: "https://example.com/callback".to_string(),
            scope: "crm.objects.contacts.read crm.objects.deals.read".to_string(),
            authorization_url: "https://app.hubspot.com/oauth/authorize".to_string(),
            token_url: "https://api.hubapi.com/oauth/v1/token".to_string(),
            state_ttl: Duration::from_secs(600),
            credentials_ttl: Duration::from_secs(600),
        };

        let url = config.authorization_url("eyJzdGF0ZSI6ImFiYyJ9");
        assert!(url.starts_with("https://app.hubspot.com/oauth/authorize?"));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fexample.com%2Fcallback"));
        assert!(url.contains("scope=crm.objects.contacts.read%20crm.objects.deals.read"));
        assert!(url.contains("state=eyJzdGF0ZSI6ImFiYyJ9"));
    }

    #[test]
    fn test_padding_in_state_is_percent_encoded() {
        let config = OAuth2Config::from_settings(&HubSpotSettings {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://localhost:8000/cb".to_string(),
            scope: "crm.objects.contacts.read".to_string(),
            authorization_url: "https://app.hubspot.com/oauth/authorize".to_string(),
            token_url: "https://api.hubapi.com/oauth/v1/token".to_string(),
            api_base_url: "https://api.hubapi.com".to_string(),
            object_type: "contacts".to_string(),
            item_type: "Contact".to_string(),
            request_timeout_secs: 30,
            state_ttl_secs: 600,
            credentials_ttl_secs: 120,
        });

        assert_eq!(config.credentials_ttl, Duration::from_secs(120));
        assert!(config.authorization_url("abc=").ends_with("state=abc%3D"));
    }
}
