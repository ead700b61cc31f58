use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

/// TokenBlacklist
///
/// Contract for revoking access tokens before their natural expiry. Tokens are
/// identified by their `jti` claim. An entry only needs to live until the token's
/// own `exp`, after which signature validation rejects the token anyway.
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Revokes `jti` until `expires_at` (UTC Unix seconds).
    async fn revoke(&self, jti: &str, expires_at: usize);

    async fn is_revoked(&self, jti: &str) -> bool;
}

/// Shared handle stored in `AppState`.
pub type BlacklistState = Arc<dyn TokenBlacklist>;

/// InMemoryTokenBlacklist
///
/// Process-local blacklist. Revocations are lost on restart, which is acceptable
/// because tokens are short-lived. Expired entries are pruned on every revoke.
#[derive(Default)]
pub struct InMemoryTokenBlacklist {
    entries: RwLock<HashMap<String, usize>>,
}

impl InMemoryTokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

#[async_trait]
impl TokenBlacklist for InMemoryTokenBlacklist {
    async fn revoke(&self, jti: &str, expires_at: usize) {
        let now = now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, exp| *exp > now);
        if expires_at > now {
            entries.insert(jti.to_string(), expires_at);
        }
        tracing::debug!(jti, remaining = entries.len(), "Token revoked");
    }

    async fn is_revoked(&self, jti: &str) -> bool {
        match self.entries.read().await.get(jti) {
            Some(exp) => *exp > now(),
            None => false,
        }
    }
}
