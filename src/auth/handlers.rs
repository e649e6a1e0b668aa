//! OAuth2 HTTP Handlers
//!
//! Endpoints HTTP para iniciar e completar o fluxo OAuth2 e retirar as credenciais

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::IntegrationItem;
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use crate::AppState;
use super::{AuthError, Credentials, OAuthCallbackParams};

/// Identificação do par org/usuário enviada pelo frontend
#[derive(Debug, Default, Deserialize)]
pub struct UserOrgParams {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub org_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoadItemsForm {
    /// Credenciais em JSON, como devolvidas por /credentials
    #[serde(default)]
    pub credentials: String,
}

/// POST /integrations/hubspot/authorize
///
/// Retorna a URL de autorização do HubSpot (string JSON)
pub async fn authorize_hubspot(
    State(state): State<Arc<AppState>>,
    Form(params): Form<UserOrgParams>,
) -> AppResult<Json<String>> {
    log_request_received("/integrations/hubspot/authorize", "POST");

    let url = state.oauth.authorize(&params.user_id, &params.org_id).await?;
    Ok(Json(url))
}

/// GET /integrations/hubspot/oauth2callback?code=XXX&state=YYY
///
/// # Retorno
/// - Página que fecha a janela do popup OAuth
/// - Página de erro se o usuário negou o acesso
/// - JSON de erro nos demais casos
pub async fn oauth2callback_hubspot(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OAuthCallbackParams>,
) -> Response {
    log_info("📥 [OAuth2] Callback recebido");

    match state.oauth.handle_callback(&params).await {
        Ok(_) => render_close_window_page().into_response(),
        Err(AuthError::AuthorizationDenied(reason)) => {
            (StatusCode::BAD_REQUEST, render_error_page(&reason)).into_response()
        }
        Err(e) => {
            log_error(&format!("❌ [OAuth2] Callback rejeitado: {}", e));
            AppError::from(e).into_response()
        }
    }
}

/// POST /integrations/hubspot/credentials
///
/// Entrega as credenciais uma única vez; a segunda chamada recebe 400
pub async fn get_hubspot_credentials(
    State(state): State<Arc<AppState>>,
    Form(params): Form<UserOrgParams>,
) -> AppResult<Json<Credentials>> {
    log_request_received("/integrations/hubspot/credentials", "POST");

    let credentials = state
        .oauth
        .get_credentials(&params.user_id, &params.org_id)
        .await?;
    Ok(Json(credentials))
}

/// POST /integrations/hubspot/load
pub async fn load_hubspot_items(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoadItemsForm>,
) -> AppResult<Json<Vec<IntegrationItem>>> {
    log_request_received("/integrations/hubspot/load", "POST");
    let started = Instant::now();

    if form.credentials.trim().is_empty() {
        log_validation_error("credentials", "campo vazio");
        return Err(AppError::ValidationError("credentials é obrigatório".to_string()));
    }

    let credentials: Credentials = serde_json::from_str(&form.credentials)?;
    let items = state.hubspot.list_items(&credentials).await?;

    log_request_processed(
        "/integrations/hubspot/load",
        200,
        started.elapsed().as_millis() as u64,
    );
    Ok(Json(items))
}

/// GET /integrations/hubspot/status?user_id=..&org_id=..
pub async fn hubspot_status(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UserOrgParams>,
) -> AppResult<Json<Value>> {
    let stage = state.oauth.status(&params.user_id, &params.org_id).await?;
    Ok(Json(json!({
        "user_id": params.user_id,
        "org_id": params.org_id,
        "stage": stage
    })))
}

/// Página que fecha a janela aberta para a autorização
fn render_close_window_page() -> Html<&'static str> {
    Html(
        r#"<html>
    <script>
        window.close();
    </script>
</html>"#,
    )
}

/// Renderizar página de erro
fn render_error_page(error: &str) -> Html<String> {
    Html(format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>HubSpot OAuth - Erro</title>
            <meta charset="UTF-8">
            <style>
                body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif;
                       max-width: 600px; margin: 50px auto; padding: 20px; background: #f5f5f5; }}
                .error {{ background: #f8d7da; border: 2px solid #dc3545; padding: 20px; border-radius: 8px; }}
                h1 {{ color: #721c24; margin-top: 0; }}
            </style>
        </head>
        <body>
            <div class="error">
                <h1>❌ Erro na Autorização</h1>
                <p><strong>Erro:</strong> {}</p>
                <p>Você pode fechar esta janela e tentar novamente.</p>
            </div>
        </body>
        </html>
        "#,
        escape_html(error)
    ))
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
