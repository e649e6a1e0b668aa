/// Middleware de integração HubSpot
///
/// Fluxo:
/// - Frontend pede a URL de autorização (POST /integrations/hubspot/authorize)
/// - HubSpot redireciona para o callback com code + state
/// - Tokens ficam no cache por tempo limitado e são entregues uma única vez
/// - Itens do CRM são listados com as credenciais entregues

use std::sync::Arc;
use tokio::net::TcpListener;

use hubspot_integration_middleware::{app, cache, config::Settings, utils, AppState};
use utils::{logging::*, AppError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Carregar .env em desenvolvimento
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::new()
        .map_err(|e| AppError::ConfigError(format!("Failed to load settings: {}", e)))?;
    settings.validate().map_err(AppError::ConfigError)?;

    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
    log_config_loaded(&run_mode);

    let store = cache::build_store(&settings.cache)
        .map_err(|e| AppError::InternalError(format!("Failed to build cache store: {}", e)))?;

    // Cache fora do ar não impede o boot; /ready reporta o estado
    match store.ping().await {
        Ok(()) => log_cache_backend(store.backend_name(), true),
        Err(e) => {
            log_cache_backend(store.backend_name(), false);
            log_warning(&format!("⚠️  Cache ping failed: {}", e));
        }
    }

    let port = settings.server.port;
    let app_state = Arc::new(AppState::new(&settings, store)?);
    let router = app(app_state);

    let addr = format!("{}:{}", settings.server.host, port);
    let listener = TcpListener::bind(&addr).await?;

    log_server_startup(port);
    log_server_ready(&addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_info("🛑 Server shut down gracefully");
    Ok(())
}

/// Signal handler para graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_error(&format!("❌ Failed to install Ctrl+C handler: {}", e));
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log_error(&format!("❌ Failed to install SIGTERM handler: {}", e));
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log_info("🛑 Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            log_info("🛑 Received SIGTERM, shutting down gracefully...");
        }
    }
}
