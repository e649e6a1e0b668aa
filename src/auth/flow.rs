//! Fluxo OAuth2 (authorization code) com o HubSpot
//!
//! 1. `authorize`: gera o state, salva em `state:{org}:{user}` e monta a URL
//! 2. `handle_callback`: valida e consome o state, troca o code e salva as credenciais
//! 3. `get_credentials`: entrega as credenciais uma única vez

use serde::{Deserialize, Serialize};

use crate::cache::{credentials_key, state_key, SharedStore, KEY_SEPARATOR};
use crate::utils::logging::*;
use super::client::{Credentials, OAuth2Client};
use super::state::OAuthState;
use super::{AuthError, AuthResult};

/// Parâmetros de query do callback OAuth2
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Erro retornado pelo HubSpot (ex: usuário negou acesso)
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Par org/usuário cujo callback foi concluído
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizedSession {
    pub user_id: String,
    pub org_id: String,
}

/// Etapa observável do fluxo para um par org/usuário.
///
/// "Nunca iniciado" e "credenciais já retiradas" deixam o cache no mesmo
/// estado e por isso aparecem ambos como `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStage {
    Idle,
    AwaitingCallback,
    Exchanged,
}

pub struct OAuthFlow {
    client: OAuth2Client,
    store: SharedStore,
}

impl OAuthFlow {
    pub fn new(client: OAuth2Client, store: SharedStore) -> Self {
        Self { client, store }
    }

    /// Inicia a autorização e retorna a URL para onde o usuário deve ir
    pub async fn authorize(&self, user_id: &str, org_id: &str) -> AuthResult<String> {
        let (user_id, org_id) = require_ids(user_id, org_id)?;

        let config = self.client.config();
        let encoded = OAuthState::new(user_id, org_id).encode()?;

        self.store
            .put(&state_key(org_id, user_id), &encoded, Some(config.state_ttl))
            .await?;

        log_info(&format!(
            "🚀 [OAuth2] Autorização iniciada para org={} user={}",
            org_id, user_id
        ));

        Ok(config.authorization_url(&encoded))
    }

    /// Valida o callback, troca o code e guarda as credenciais
    pub async fn handle_callback(&self, params: &OAuthCallbackParams) -> AuthResult<AuthorizedSession> {
        if let Some(error) = params.error.as_deref().filter(|e| !e.is_empty()) {
            let reason = match params.error_description.as_deref() {
                Some(desc) if !desc.is_empty() => format!("{}: {}", error, desc),
                _ => error.to_string(),
            };
            log_warning(&format!("⚠️ [OAuth2] Autorização negada: {}", reason));
            return Err(AuthError::AuthorizationDenied(reason));
        }

        // parâmetros primeiro: nada de cache ou rede antes disso
        let code = require("code", params.code.as_deref())?;
        let encoded_state = require("state", params.state.as_deref())?;

        let received = OAuthState::decode(encoded_state)?;
        let key = state_key(&received.org_id, &received.user_id);

        let saved = self
            .store
            .get(&key)
            .await?
            .ok_or_else(|| {
                log_warning(&format!("⚠️ [OAuth2] Nenhum state pendente em {}", key));
                AuthError::StateMismatch
            })?;

        let expected = OAuthState::decode(&saved).map_err(|_| AuthError::StateMismatch)?;
        if !received.nonce_matches(&expected) {
            log_warning(&format!("⚠️ [OAuth2] Nonce divergente em {}", key));
            return Err(AuthError::StateMismatch);
        }

        // consome só o state validado; um state novo gravado nesse meio tempo fica intacto
        if !self.store.take_if_eq(&key, &saved).await? {
            log_warning(&format!("⚠️ [OAuth2] State {} já consumido ou substituído", key));
            return Err(AuthError::StateMismatch);
        }

        let raw_credentials = self.client.exchange_code_for_token(code).await?;

        self.store
            .put(
                &credentials_key(&received.org_id, &received.user_id),
                &raw_credentials,
                Some(self.client.config().credentials_ttl),
            )
            .await?;

        log_info(&format!(
            "✅ [OAuth2] Credenciais salvas para org={} user={}",
            received.org_id, received.user_id
        ));

        Ok(AuthorizedSession {
            user_id: received.user_id,
            org_id: received.org_id,
        })
    }

    /// Retira as credenciais do cache (uso único)
    pub async fn get_credentials(&self, user_id: &str, org_id: &str) -> AuthResult<Credentials> {
        let (user_id, org_id) = require_ids(user_id, org_id)?;
        let key = credentials_key(org_id, user_id);

        let raw = self.store.take(&key).await?.ok_or(AuthError::NoCredentials)?;

        serde_json::from_str(&raw).map_err(|e| {
            log_error(&format!("❌ [OAuth2] Credenciais inválidas em {}: {}", key, e));
            AuthError::InvalidCredentials(e.to_string())
        })
    }

    pub async fn status(&self, user_id: &str, org_id: &str) -> AuthResult<FlowStage> {
        let (user_id, org_id) = require_ids(user_id, org_id)?;
        if self.store.get(&credentials_key(org_id, user_id)).await?.is_some() {
            return Ok(FlowStage::Exchanged);
        }
        if self.store.get(&state_key(org_id, user_id)).await?.is_some() {
            return Ok(FlowStage::AwaitingCallback);
        }
        Ok(FlowStage::Idle)
    }
}

/// Ids entram na chave do cache exatamente como recebidos: sem trim, e sem
/// o separador de chave.
fn require_ids<'a>(user_id: &'a str, org_id: &'a str) -> AuthResult<(&'a str, &'a str)> {
    for (name, value) in [("user_id", user_id), ("org_id", org_id)] {
        if value.trim().is_empty() {
            return Err(AuthError::MissingParameter(name));
        }
        if value.contains(KEY_SEPARATOR) {
            return Err(AuthError::InvalidParameter(format!(
                "{} não pode conter '{}'",
                name, KEY_SEPARATOR
            )));
        }
    }
    Ok((user_id, org_id))
}

fn require<'a>(name: &'static str, value: Option<&'a str>) -> AuthResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AuthError::MissingParameter(name)),
    }
}
