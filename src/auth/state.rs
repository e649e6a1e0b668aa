//! State OAuth2 anti-forgery
//!
//! O state enviado ao HubSpot é o JSON `{"state": nonce, "user_id", "org_id"}`
//! codificado em base64 URL-safe. O HubSpot devolve o valor intacto no
//! callback, e o nonce é comparado com o que foi salvo no cache.

use base64::alphabet::URL_SAFE;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::cache::KEY_SEPARATOR;
use super::{AuthError, AuthResult};

/// Bytes de entropia do nonce
pub const NONCE_BYTES: usize = 32;

/// Codifica com padding e aceita valores com ou sem padding na decodificação
const STATE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthState {
    #[serde(rename = "state")]
    pub nonce: String,
    pub user_id: String,
    pub org_id: String,
}

impl OAuthState {
    /// Cria um state com nonce novo para o par org/usuário
    pub fn new(user_id: &str, org_id: &str) -> Self {
        Self {
            nonce: generate_nonce(),
            user_id: user_id.to_string(),
            org_id: org_id.to_string(),
        }
    }

    pub fn encode(&self) -> AuthResult<String> {
        let json = serde_json::to_vec(self)
            .map_err(|e| AuthError::MalformedState(format!("falha ao serializar: {}", e)))?;
        Ok(STATE_ENGINE.encode(json))
    }

    pub fn decode(encoded: &str) -> AuthResult<Self> {
        let bytes = STATE_ENGINE
            .decode(encoded.trim())
            .map_err(|e| AuthError::MalformedState(format!("base64 inválido: {}", e)))?;

        let state: OAuthState = serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::MalformedState(format!("JSON inválido: {}", e)))?;

        if state.user_id.is_empty() || state.org_id.is_empty() {
            return Err(AuthError::MalformedState("user_id/org_id vazios".to_string()));
        }
        if state.user_id.contains(KEY_SEPARATOR) || state.org_id.contains(KEY_SEPARATOR) {
            return Err(AuthError::MalformedState(format!(
                "user_id/org_id contêm '{}'",
                KEY_SEPARATOR
            )));
        }

        Ok(state)
    }

    /// Compara apenas o nonce, em tempo constante
    pub fn nonce_matches(&self, other: &OAuthState) -> bool {
        constant_time_eq(self.nonce.as_bytes(), other.nonce.as_bytes())
    }
}

/// Nonce URL-safe com `NONCE_BYTES` bytes do CSPRNG
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// Comparação de tempo constante para evitar timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
