use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub hubspot: HubSpotSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HubSpotSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Escopos separados por espaço
    pub scope: String,
    pub authorization_url: String,
    pub token_url: String,
    pub api_base_url: String,
    /// Objeto do CRM listado em /crm/v3/objects/{object_type}
    pub object_type: String,
    /// Rótulo gravado em `IntegrationItem.type`
    pub item_type: String,
    pub request_timeout_secs: u64,
    pub state_ttl_secs: u64,
    pub credentials_ttl_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Redis,
    Memory,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub host: String,
    pub port: u16,
    pub db: i64,
}

impl CacheSettings {
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("hubspot.client_id", "")?
            .set_default("hubspot.client_secret", "")?
            .set_default(
                "hubspot.redirect_uri",
                "http://localhost:8000/integrations/hubspot/oauth2callback",
            )?
            .set_default("hubspot.scope", "crm.objects.contacts.read")?
            .set_default("hubspot.authorization_url", "https://app.hubspot.com/oauth/authorize")?
            .set_default("hubspot.token_url", "https://api.hubapi.com/oauth/v1/token")?
            .set_default("hubspot.api_base_url", "https://api.hubapi.com")?
            .set_default("hubspot.object_type", "contacts")?
            .set_default("hubspot.item_type", "Contact")?
            .set_default("hubspot.request_timeout_secs", 30)?
            .set_default("hubspot.state_ttl_secs", 600)?
            .set_default("hubspot.credentials_ttl_secs", 600)?
            .set_default("cache.backend", "redis")?
            .set_default("cache.host", "localhost")?
            .set_default("cache.port", 6379)?
            .set_default("cache.db", 0)?
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        // Variáveis de ambiente "curtas" usadas no deploy
        let overrides = [
            ("HUBSPOT_CLIENT_ID", "hubspot.client_id"),
            ("HUBSPOT_CLIENT_SECRET", "hubspot.client_secret"),
            ("HUBSPOT_REDIRECT_URI", "hubspot.redirect_uri"),
            ("HUBSPOT_SCOPE", "hubspot.scope"),
            ("REDIS_HOST", "cache.host"),
            ("REDIS_PORT", "cache.port"),
            ("REDIS_DB", "cache.db"),
            ("CACHE_BACKEND", "cache.backend"),
            ("PORT", "server.port"),
        ];
        for (var, key) in overrides {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("HUBSPOT_MIDDLEWARE")
                .prefix_separator("__")
                .separator("__"),
        );

        let s = builder.build()?;

        s.try_deserialize()
    }

    /// Garante que as credenciais do app HubSpot foram fornecidas
    pub fn validate(&self) -> Result<(), String> {
        if self.hubspot.client_id.trim().is_empty() {
            return Err("HUBSPOT_CLIENT_ID não configurado".to_string());
        }
        if self.hubspot.client_secret.trim().is_empty() {
            return Err("HUBSPOT_CLIENT_SECRET não configurado".to_string());
        }
        if self.hubspot.redirect_uri.trim().is_empty() {
            return Err("HUBSPOT_REDIRECT_URI não configurado".to_string());
        }
        Ok(())
    }
}
