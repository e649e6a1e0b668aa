// Biblioteca do middleware de integração HubSpot
// Expõe módulos para uso em testes e no binário

pub mod auth;
pub mod cache;
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use auth::{OAuth2Client, OAuth2Config, OAuthFlow};
use cache::SharedStore;
use utils::{AppError, AppResult};

// AppState é definido aqui para ser compartilhado
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub oauth: Arc<OAuthFlow>,
    pub hubspot: services::HubSpotService,
}

impl AppState {
    /// Monta o estado com um único client HTTP compartilhado
    pub fn new(settings: &config::Settings, store: SharedStore) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.hubspot.request_timeout_secs))
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let oauth_client = OAuth2Client::new(
            OAuth2Config::from_settings(&settings.hubspot),
            http_client.clone(),
        );
        let oauth = Arc::new(OAuthFlow::new(oauth_client, store.clone()));
        let hubspot = services::HubSpotService::new(&settings.hubspot, http_client);

        Ok(Self {
            store,
            oauth,
            hubspot,
        })
    }
}

/// Rotas da aplicação
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::ready_check))
        .route("/integrations/hubspot/authorize", post(auth::handlers::authorize_hubspot))
        .route("/integrations/hubspot/oauth2callback", get(auth::handlers::oauth2callback_hubspot))
        .route("/integrations/hubspot/credentials", post(auth::handlers::get_hubspot_credentials))
        .route("/integrations/hubspot/load", post(auth::handlers::load_hubspot_items))
        .route("/integrations/hubspot/status", get(auth::handlers::hubspot_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
