use axum::http::StatusCode;
use thiserror::Error;

use crate::cache::CacheError;

/// Falhas do fluxo OAuth2 e do acesso à API do HubSpot
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("parâmetro obrigatório ausente: {0}")]
    MissingParameter(&'static str),

    #[error("parâmetro inválido: {0}")]
    InvalidParameter(String),

    #[error("state OAuth malformado: {0}")]
    MalformedState(String),

    #[error("state não confere com o armazenado")]
    StateMismatch,

    #[error("autorização negada pelo provedor: {0}")]
    AuthorizationDenied(String),

    #[error("falha na troca do authorization code: {0}")]
    TokenExchangeFailed(String),

    #[error("nenhuma credencial encontrada")]
    NoCredentials,

    #[error("credenciais armazenadas inválidas: {0}")]
    InvalidCredentials(String),

    #[error("falha na requisição ao HubSpot: {0}")]
    ProviderRequestFailed(String),

    #[error(transparent)]
    CacheUnavailable(#[from] CacheError),
}

impl AuthError {
    /// Identificador estável usado no corpo JSON de erro
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::MissingParameter(_) => "missing_parameter",
            AuthError::InvalidParameter(_) => "invalid_parameter",
            AuthError::MalformedState(_) => "malformed_state",
            AuthError::StateMismatch => "state_mismatch",
            AuthError::AuthorizationDenied(_) => "authorization_denied",
            AuthError::TokenExchangeFailed(_) => "token_exchange_failed",
            AuthError::NoCredentials => "no_credentials",
            AuthError::InvalidCredentials(_) => "invalid_credentials",
            AuthError::ProviderRequestFailed(_) => "provider_request_failed",
            AuthError::CacheUnavailable(_) => "cache_unavailable",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingParameter(_)
            | AuthError::InvalidParameter(_)
            | AuthError::MalformedState(_)
            | AuthError::StateMismatch
            | AuthError::AuthorizationDenied(_)
            | AuthError::NoCredentials => StatusCode::BAD_REQUEST,
            AuthError::TokenExchangeFailed(_) | AuthError::ProviderRequestFailed(_) => {
                StatusCode::BAD_GATEWAY
            }
            AuthError::InvalidCredentials(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::CacheUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
