//! OAuth2 HTTP Client
//!
//! Cliente HTTP isolado para o token endpoint do HubSpot

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::logging::*;
use crate::utils::truncate_safe;
use super::{AuthError, AuthResult, OAuth2Config};

/// Credenciais devolvidas pelo token endpoint.
///
/// Campos específicos do provedor ficam em `extra` e são preservados.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Cliente OAuth2 para HubSpot
#[derive(Clone)]
pub struct OAuth2Client {
    config: OAuth2Config,
    http_client: Client,
}

impl OAuth2Client {
    pub fn new(config: OAuth2Config, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &OAuth2Config {
        &self.config
    }

    /// Trocar authorization code por access token
    ///
    /// # Retorno
    /// - `Ok(String)`: corpo original da resposta 2xx, já validado como `Credentials`
    /// - `Err(AuthError::TokenExchangeFailed)`: erro de rede, status não-2xx ou corpo inválido
    pub async fn exchange_code_for_token(&self, code: &str) -> AuthResult<String> {
        log_info(&format!(
            "📤 [OAuth2] POST {} - client_id: {}, code: {}...",
            self.config.token_url,
            self.config.client_id,
            truncate_safe(code, 6)
        ));

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&self.config.token_url)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                log_error(&format!("❌ [OAuth2] Falha ao conectar com o token endpoint: {}", e));
                AuthError::TokenExchangeFailed(format!("falha de conexão: {}", e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::TokenExchangeFailed(format!("falha ao ler resposta: {}", e)))?;

        if !status.is_success() {
            log_error(&format!("❌ [OAuth2] Token exchange failed: {} - {}", status, body));
            return Err(AuthError::TokenExchangeFailed(format!("[{}] {}", status, body)));
        }

        let credentials: Credentials = serde_json::from_str(&body).map_err(|e| {
            log_error(&format!("❌ [OAuth2] Resposta do token endpoint sem access_token: {}", e));
            AuthError::TokenExchangeFailed(format!("resposta inválida: {}", e))
        })?;

        log_info(&format!(
            "✅ [OAuth2] Access token obtido: {}...",
            truncate_safe(&credentials.access_token, 8)
        ));

        Ok(body)
    }
}
