use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::{cmd, Client, RedisError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

#[derive(Clone)]
pub(crate) struct RedisHandle {
    url: String,
    manager: Arc<RwLock<Option<ConnectionManager>>>,
}

#[derive(Debug, Clone)]
pub(crate) enum RedisHealth {
    Healthy,
    Disconnected,
    Unhealthy(String),
}

impl RedisHandle {
    pub(crate) fn new(url: String) -> Self {
        Self { url, manager: Arc::new(RwLock::new(None)) }
    }

    pub(crate) async fn connect(&self) -> Result<(), RedisError> {
        let client = Client::open(self.url.clone())?;
        let manager = ConnectionManager::new(client).await?;
        let mut guard = self.manager.write().await;
        *guard = Some(manager);
        Ok(())
    }

    pub(crate) async fn disconnect(&self) {
        let mut guard = self.manager.write().await;
        *guard = None;
    }

    pub(crate) async fn health(&self) -> RedisHealth {
        let manager = { self.manager.read().await.clone() };
        let Some(mut manager) = manager else {
            return RedisHealth::Disconnected;
        };

        match cmd("PING").query_async::<_, String>(&mut manager).await {
            Ok(_) => RedisHealth::Healthy,
            Err(err) => RedisHealth::Unhealthy(err.to_string()),
        }
    }

    pub(crate) async fn rate_limit(
        &self,
        key: &str,
        limit: u64,
        window_seconds: u64,
    ) -> Result<bool, RedisError> {
        let manager = { self.manager.read().await.clone() };
        let Some(mut manager) = manager else {
            return Ok(true);
        };

        let script = redis::Script::new(
            r#"
            local current = redis.call("INCR", KEYS[1])
            if current == 1 then
                redis.call("EXPIRE", KEYS[1], ARGV[1])
            end
            return current
        "#,
        );

        let current: i64 =
            script.key(key).arg(window_seconds as i64).invoke_async(&mut manager).await?;

        Ok(current <= limit as i64)
    }

    /// Time-boxed JSON cache read. Any redis or decode failure is a miss.
    pub(crate) async fn cache_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let manager = { self.manager.read().await.clone() };
        let mut manager = manager?;

        let raw: Option<String> = match cmd("GET").arg(key).query_async(&mut manager).await {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(error = %err, key, "Cache read failed");
                return None;
            }
        };

        raw.and_then(|value| serde_json::from_str(&value).ok())
    }

    pub(crate) async fn cache_set<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) {
        let manager = { self.manager.read().await.clone() };
        let Some(mut manager) = manager else {
            return;
        };

        let Ok(raw) = serde_json::to_string(value) else {
            return;
        };

        if let Err(err) = cmd("SET")
            .arg(key)
            .arg(raw)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async::<_, ()>(&mut manager)
            .await
        {
            tracing::debug!(error = %err, key, "Cache write failed");
        }
    }

    pub(crate) async fn cache_delete(&self, key: &str) {
        let manager = { self.manager.read().await.clone() };
        let Some(mut manager) = manager else {
            return;
        };

        if let Err(err) = cmd("DEL").arg(key).query_async::<_, ()>(&mut manager).await {
            tracing::debug!(error = %err, key, "Cache invalidation failed");
        }
    }
}
