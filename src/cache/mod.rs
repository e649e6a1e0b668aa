//! # Cache de estado OAuth e credenciais
//!
//! Abstração chave-valor com expiração por chave. Guarda dois tipos de dado
//! de vida curta:
//! - `state:{org_id}:{user_id}`: state OAuth aguardando o callback
//! - `credentials:{org_id}:{user_id}`: resposta do token endpoint, entregue uma única vez
//!
//! Falhas de conectividade não são engolidas: toda operação retorna
//! `CacheResult`, e `CacheError::Unavailable` é distinto de "chave ausente".

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{CacheBackend, CacheSettings};

pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache indisponível: {0}")]
    Unavailable(String),

    #[error("erro no backend de cache: {0}")]
    Backend(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Operações mínimas que o fluxo OAuth precisa do store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Grava `value`; com `ttl`, a chave expira depois do prazo. Sobrescreve silenciosamente.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()>;

    /// Valor atual, ou `None` se ausente/expirado
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Remove a chave; não faz nada se ela não existir
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Lê e remove numa única operação atômica.
    ///
    /// Entre chamadas concorrentes para a mesma chave, no máximo uma observa o valor.
    async fn take(&self, key: &str) -> CacheResult<Option<String>>;

    /// Remove a chave somente se o valor atual for `expected` (compare-and-delete).
    ///
    /// Retorna `false` se a chave sumiu, expirou ou foi sobrescrita.
    async fn take_if_eq(&self, key: &str, expected: &str) -> CacheResult<bool>;

    async fn ping(&self) -> CacheResult<()>;

    fn backend_name(&self) -> &'static str;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

/// Separador dos componentes da chave. Ids com `:` tornariam a chave
/// ambígua (org `a:b` + user `c` == org `a` + user `b:c`), por isso o fluxo
/// OAuth os rejeita antes de montar qualquer chave.
pub const KEY_SEPARATOR: char = ':';

/// Chave do state OAuth de um par org/usuário
pub fn state_key(org_id: &str, user_id: &str) -> String {
    format!("state:{}:{}", org_id, user_id)
}

/// Chave das credenciais trocadas de um par org/usuário
pub fn credentials_key(org_id: &str, user_id: &str) -> String {
    format!("credentials:{}:{}", org_id, user_id)
}

/// Constrói o store configurado. O Redis conecta sob demanda, então um
/// servidor fora do ar aqui não impede a inicialização.
pub fn build_store(settings: &CacheSettings) -> CacheResult<SharedStore> {
    match settings.backend {
        CacheBackend::Redis => Ok(Arc::new(RedisStore::new(settings)?)),
        CacheBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
