//! Conversation caching with single-flight fetches.
//!
//! The cache is keyed by the full (source, project, session) identity and
//! lives as long as the page session: entries are never evicted
//! individually, only cleared wholesale on source change or manual resync.
//! Concurrent requests for the same key attach to one shared in-flight
//! fetch; a failed fetch leaves the key absent so a later retry can succeed.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use tracing::warn;

use crate::error::{LensError, Result};
use crate::model::Conversation;
use crate::source::DataSource;

type SharedResult<V> = std::result::Result<V, Arc<LensError>>;
type PendingFetch<V> = Shared<BoxFuture<'static, SharedResult<V>>>;

enum Slot<V> {
    /// Resolved value, returned synchronously from now on.
    Ready(V),
    /// In-flight fetch that later requests attach to.
    Pending(PendingFetch<V>),
}

/// A memo map guaranteeing at most one in-flight fetch per key.
///
/// Values must be cheap to clone (wrap them in `Arc`).
pub struct SingleFlight<K, V> {
    slots: Arc<Mutex<HashMap<K, Slot<V>>>>,
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Return the resolved value for a key without fetching.
    #[must_use]
    pub fn peek(&self, key: &K) -> Option<V> {
        match self.slots.lock().get(key) {
            Some(Slot::Ready(v)) => Some(v.clone()),
            _ => None,
        }
    }

    /// Whether a fetch for this key is currently in flight.
    #[must_use]
    pub fn is_pending(&self, key: &K) -> bool {
        matches!(self.slots.lock().get(key), Some(Slot::Pending(_)))
    }

    /// Get the value for a key, fetching it at most once.
    ///
    /// A resolved entry returns synchronously. If a fetch for the key is in
    /// flight, this call awaits the same shared operation instead of issuing
    /// another. On failure the slot is vacated (no negative caching) and
    /// every attached waiter receives the originating error's message.
    pub async fn get_or_fetch<F>(&self, key: K, fetch: F) -> Result<V>
    where
        F: FnOnce() -> BoxFuture<'static, Result<V>>,
    {
        let pending = {
            let mut slots = self.slots.lock();
            match slots.get(&key) {
                Some(Slot::Ready(v)) => return Ok(v.clone()),
                Some(Slot::Pending(p)) => p.clone(),
                None => {
                    let slots_ref = Arc::clone(&self.slots);
                    let slot_key = key.clone();
                    let fut = fetch();
                    let shared = async move {
                        let result = fut.await;
                        let mut slots = slots_ref.lock();
                        match result {
                            Ok(v) => {
                                slots.insert(slot_key, Slot::Ready(v.clone()));
                                Ok(v)
                            }
                            Err(e) => {
                                slots.remove(&slot_key);
                                warn!(error = %e, "Fetch failed; slot vacated for retry");
                                Err(Arc::new(e))
                            }
                        }
                    }
                    .boxed()
                    .shared();
                    slots.insert(key, Slot::Pending(shared.clone()));
                    shared
                }
            }
        };

        pending.await.map_err(|e| e.for_waiter())
    }

    /// Drop every entry, resolved and pending alike. In-flight fetches may
    /// still complete but their results are not retained.
    pub fn clear(&self) {
        self.slots.lock().clear();
    }

    /// Drop one entry. Used when a fetch completes for a context that is no
    /// longer current and its late-inserted result must not be reused.
    pub fn remove(&self, key: &K) {
        self.slots.lock().remove(key);
    }

    /// Number of resolved entries.
    #[must_use]
    pub fn resolved_len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> std::fmt::Debug for SingleFlight<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("entries", &self.slots.lock().len())
            .finish()
    }
}

/// Composite identity of a cached conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    /// Source the session was browsed under.
    pub source: String,
    /// Project the session belongs to.
    pub project: String,
    /// Session id.
    pub session: String,
}

impl ConversationKey {
    /// Build a key from its parts.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        project: impl Into<String>,
        session: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            project: project.into(),
            session: session.into(),
        }
    }
}

/// Memoized fully-loaded conversations.
#[derive(Debug, Default)]
pub struct ConversationCache {
    inner: SingleFlight<ConversationKey, Arc<Conversation>>,
}

impl ConversationCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: SingleFlight::new(),
        }
    }

    /// Return a cached conversation without fetching.
    #[must_use]
    pub fn peek(&self, key: &ConversationKey) -> Option<Arc<Conversation>> {
        self.inner.peek(key)
    }

    /// Get a conversation, fetching and normalizing it at most once per key.
    pub async fn get_or_fetch(
        &self,
        key: ConversationKey,
        source: Arc<dyn DataSource>,
    ) -> Result<Arc<Conversation>> {
        self.inner
            .get_or_fetch(key.clone(), move || {
                async move {
                    let conversation = source
                        .fetch_conversation(&key.source, &key.project, &key.session)
                        .await?;
                    Ok(Arc::new(conversation.normalized()))
                }
                .boxed()
            })
            .await
    }

    /// Drop all entries (source switch or manual resync).
    pub fn clear(&self) {
        self.inner.clear();
    }

    /// Drop one entry (late arrival for a stale context).
    pub fn remove(&self, key: &ConversationKey) {
        self.inner.remove(key);
    }

    /// Number of fully loaded conversations held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.resolved_len()
    }

    /// Whether the cache holds no resolved conversations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
