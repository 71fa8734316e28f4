//! Chat message cap.
//!
//! Each client identity may have a fixed number of chat requests admitted
//! for the lifetime of the process. There is no decay: once an identity
//! reaches the limit it stays limited until restart.

use async_trait::async_trait;
use dashmap::DashMap;

use folio_core::types::ClientIdentity;

/// Counts admitted chat requests per client.
///
/// The gateway depends only on this trait, so the in-memory map can be
/// replaced by a shared store without touching the handlers.
#[async_trait]
pub trait ChatLimiter: Send + Sync {
    /// Whether `identity` has used up its allowance.
    async fn is_limited(&self, identity: &ClientIdentity) -> bool;

    /// Record one admitted request for `identity`.
    async fn admit(&self, identity: &ClientIdentity);

    /// Number of requests admitted so far for `identity`.
    async fn admitted(&self, identity: &ClientIdentity) -> u32;

    /// Admit `identity` unless it is limited. Returns whether it was admitted.
    ///
    /// Implementations should override this to make the check and the
    /// increment one atomic step.
    async fn try_admit(&self, identity: &ClientIdentity) -> bool {
        if self.is_limited(identity).await {
            return false;
        }
        self.admit(identity).await;
        true
    }
}

/// Process-local limiter backed by a concurrent map.
#[derive(Debug)]
pub struct InMemoryChatLimiter {
    limit: u32,
    counts: DashMap<ClientIdentity, u32>,
}

impl InMemoryChatLimiter {
    /// Create a limiter admitting `limit` requests per identity.
    #[must_use]
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            counts: DashMap::new(),
        }
    }

    /// Number of identities seen so far.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.counts.len()
    }
}

impl Default for InMemoryChatLimiter {
    fn default() -> Self {
        Self::new(3)
    }
}

#[async_trait]
impl ChatLimiter for InMemoryChatLimiter {
    async fn is_limited(&self, identity: &ClientIdentity) -> bool {
        self.counts
            .get(identity)
            .is_some_and(|count| *count >= self.limit)
    }

    async fn admit(&self, identity: &ClientIdentity) {
        *self.counts.entry(identity.clone()).or_insert(0) += 1;
    }

    async fn admitted(&self, identity: &ClientIdentity) -> u32 {
        self.counts.get(identity).map_or(0, |count| *count)
    }

    async fn try_admit(&self, identity: &ClientIdentity) -> bool {
        // The entry guard holds the shard lock across check and increment.
        let mut count = self.counts.entry(identity.clone()).or_insert(0);
        if *count >= self.limit {
            return false;
        }
        *count += 1;
        true
    }
}
