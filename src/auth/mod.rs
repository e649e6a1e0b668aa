//! # HubSpot OAuth2 Authentication Module
//!
//! Fluxo authorization code com o HubSpot, usando o cache para o state
//! anti-forgery e para entregar as credenciais ao chamador.
//!
//! ## Estrutura:
//! - `config.rs`: Configurações OAuth2
//! - `state.rs`: State codificado enviado ao provedor
//! - `client.rs`: Cliente HTTP do token endpoint
//! - `flow.rs`: Controlador do fluxo (authorize, callback, credenciais)
//! - `handlers.rs`: Handlers HTTP
//! - `error.rs`: Taxonomia de erros

pub mod config;
pub mod error;
pub mod state;
pub mod client;
pub mod flow;
pub mod handlers;

pub use config::OAuth2Config;
pub use error::{AuthError, AuthResult};
pub use state::OAuthState;
pub use client::{Credentials, OAuth2Client};
pub use flow::{AuthorizedSession, FlowStage, OAuthCallbackParams, OAuthFlow};
