//! Lazily fetched, cached, idempotently toggled sub-agent session lists.
//!
//! A session's child list is fetched on first expand and cached by session
//! id for the remainder of the source session. Collapse is pure UI state:
//! the cache is kept, so re-expanding renders without a network round trip.
//! The list is flat; sub-agents of sub-agents are not expanded further.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::Mutex;

use crate::cache::SingleFlight;
use crate::error::Result;
use crate::model::Session;

/// Result of a toggle call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubagentToggle {
    /// The list was rendered and is now collapsed.
    Collapsed,
    /// The list is now rendered (fetched or served from cache).
    Expanded(Arc<Vec<Session>>),
    /// A fetch for this session is already in flight; nothing to do.
    AlreadyPending,
}

/// Per-session expand/collapse state over a single-flight list cache.
#[derive(Debug, Default)]
pub struct SubagentExpander {
    lists: SingleFlight<String, Arc<Vec<Session>>>,
    expanded: Mutex<HashSet<String>>,
    pending: Mutex<HashSet<String>>,
}

impl SubagentExpander {
    /// Create an empty expander.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session's list is currently rendered.
    #[must_use]
    pub fn is_expanded(&self, session_id: &str) -> bool {
        self.expanded.lock().contains(session_id)
    }

    /// The currently rendered lists, keyed by parent session id.
    #[must_use]
    pub fn expanded_lists(&self) -> HashMap<String, Arc<Vec<Session>>> {
        let expanded = self.expanded.lock();
        expanded
            .iter()
            .filter_map(|id| self.lists.peek(id).map(|list| (id.clone(), list)))
            .collect()
    }

    /// Toggle a session's list. Expanding fetches through the single-flight
    /// cache; collapsing only forgets the rendered state. Repeated calls
    /// while a fetch is pending are no-ops.
    pub async fn toggle<F>(&self, session_id: &str, fetch: F) -> Result<SubagentToggle>
    where
        F: FnOnce() -> BoxFuture<'static, Result<Arc<Vec<Session>>>>,
    {
        if self.expanded.lock().remove(session_id) {
            return Ok(SubagentToggle::Collapsed);
        }
        if !self.pending.lock().insert(session_id.to_string()) {
            return Ok(SubagentToggle::AlreadyPending);
        }

        let result = self.lists.get_or_fetch(session_id.to_string(), fetch).await;
        self.pending.lock().remove(session_id);

        match result {
            Ok(list) => {
                self.expanded.lock().insert(session_id.to_string());
                Ok(SubagentToggle::Expanded(list))
            }
            Err(e) => Err(e),
        }
    }

    /// Drop one session's cached list and rendered state. Used when a fetch
    /// completes after the source it was issued under is no longer active.
    pub fn discard(&self, session_id: &str) {
        self.expanded.lock().remove(session_id);
        self.lists.remove(&session_id.to_string());
    }

    /// Forget everything: cache, rendered state, and pending markers.
    /// Called when the active source changes.
    pub fn clear(&self) {
        self.lists.clear();
        self.expanded.lock().clear();
        self.pending.lock().clear();
    }
}
