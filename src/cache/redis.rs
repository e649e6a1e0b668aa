use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError, Script};
use tokio::sync::Mutex;

use super::{CacheError, CacheResult, KeyValueStore};
use crate::config::CacheSettings;
use crate::utils::logging::*;

/// DEL apenas se o valor ainda for o esperado; atômico no servidor
const COMPARE_AND_DELETE: &str = r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
    return redis.call('DEL', KEYS[1])
end
return 0
"#;

/// Store Redis com uma conexão multiplexada reaproveitada e reconexão sob demanda
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    connection: Arc<Mutex<Option<MultiplexedConnection>>>,
    address: String,
}

impl RedisStore {
    /// Abre o client (apenas valida a URL; a conexão é feita no primeiro uso)
    pub fn new(settings: &CacheSettings) -> CacheResult<Self> {
        let url = settings.redis_url();
        let client = Client::open(url.as_str())
            .map_err(|e| CacheError::Backend(format!("URL Redis inválida '{}': {}", url, e)))?;

        Ok(Self {
            client,
            connection: Arc::new(Mutex::new(None)),
            address: format!("{}:{}", settings.host, settings.port),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn connection(&self) -> CacheResult<MultiplexedConnection> {
        let mut guard = self.connection.lock().await;

        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self
            .client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| {
                log_warning(&format!(
                    "⚠️ [Cache] Não foi possível conectar ao Redis em {}: {}",
                    self.address, e
                ));
                CacheError::Unavailable(e.to_string())
            })?;

        *guard = Some(conn.clone());
        Ok(conn)
    }

    /// Converte o erro do Redis e descarta a conexão quando ela caiu
    async fn fail(&self, op: &str, key: &str, err: RedisError) -> CacheError {
        let connection_lost = err.is_io_error()
            || err.is_connection_dropped()
            || err.is_connection_refusal()
            || err.is_timeout();

        if connection_lost {
            self.connection.lock().await.take();
            log_warning(&format!(
                "⚠️ [Cache] {} '{}' falhou, Redis indisponível: {}",
                op, key, err
            ));
            CacheError::Unavailable(err.to_string())
        } else {
            log_error(&format!("❌ [Cache] {} '{}' falhou: {}", op, key, err));
            CacheError::Backend(err.to_string())
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let mut conn = self.connection().await?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl {
            // SET com EX aplica valor e expiração juntos
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }

        match cmd.query_async::<_, ()>(&mut conn).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail("SET", key, e).await),
        }
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;

        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => Ok(value),
            Err(e) => Err(self.fail("GET", key, e).await),
        }
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection().await?;

        match conn.del::<_, ()>(key).await {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail("DEL", key, e).await),
        }
    }

    async fn take(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;

        // GETDEL (Redis >= 6.2)
        match redis::cmd("GETDEL")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await
        {
            Ok(value) => Ok(value),
            Err(e) => Err(self.fail("GETDEL", key, e).await),
        }
    }

    async fn take_if_eq(&self, key: &str, expected: &str) -> CacheResult<bool> {
        let mut conn = self.connection().await?;

        let script = Script::new(COMPARE_AND_DELETE);
        let result = script
            .key(key)
            .arg(expected)
            .invoke_async::<_, i64>(&mut conn)
            .await;

        match result {
            Ok(deleted) => Ok(deleted == 1),
            Err(e) => Err(self.fail("EVALSHA", key, e).await),
        }
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection().await?;

        match redis::cmd("PING").query_async::<_, String>(&mut conn).await {
            Ok(_) => Ok(()),
            Err(e) => Err(self.fail("PING", "-", e).await),
        }
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
