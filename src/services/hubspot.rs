use reqwest::Client;
use serde_json::Value;

use crate::auth::{AuthError, AuthResult, Credentials};
use crate::config::HubSpotSettings;
use crate::models::IntegrationItem;
use crate::utils::logging::*;
use crate::utils::truncate_with_suffix;

#[derive(Clone)]
pub struct HubSpotService {
    client: Client,
    api_base_url: String,
    object_type: String,
    item_type: String,
}

impl HubSpotService {
    pub fn new(settings: &HubSpotSettings, client: Client) -> Self {
        Self {
            client,
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            object_type: settings.object_type.clone(),
            item_type: settings.item_type.clone(),
        }
    }

    fn objects_url(&self) -> String {
        format!("{}/crm/v3/objects/{}", self.api_base_url, self.object_type)
    }

    /// Lista os objetos do CRM com o token das credenciais.
    ///
    /// Qualquer falha (rede, status não-2xx, corpo inválido) vira
    /// `ProviderRequestFailed`, sem resultados parciais.
    pub async fn list_items(&self, credentials: &Credentials) -> AuthResult<Vec<IntegrationItem>> {
        let url = self.objects_url();

        let response = self
            .client
            .get(&url)
            .bearer_auth(&credentials.access_token)
            .send()
            .await
            .map_err(|e| {
                log_hubspot_api_error(&url, None, &e.to_string());
                AuthError::ProviderRequestFailed(format!("falha de conexão: {}", e))
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log_hubspot_api_error(
                &url,
                Some(status.as_u16()),
                &truncate_with_suffix(&error_text, 500, "..."),
            );
            return Err(AuthError::ProviderRequestFailed(format!(
                "Status: {} - {}",
                status, error_text
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            log_hubspot_api_error(&url, Some(status.as_u16()), &e.to_string());
            AuthError::ProviderRequestFailed(format!("resposta inválida: {}", e))
        })?;

        let items: Vec<IntegrationItem> = body
            .get("results")
            .and_then(Value::as_array)
            .map(|results| {
                results
                    .iter()
                    .map(|object| IntegrationItem::from_provider_object(object, &self.item_type))
                    .collect()
            })
            .unwrap_or_default();

        log_info(&format!("✅ [HubSpot] {} {} carregados", items.len(), self.object_type));

        Ok(items)
    }
}
