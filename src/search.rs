//! Debounced free-text search with last-request-wins semantics.
//!
//! Network completion order is not guaranteed to match issue order, so the
//! coordinator does not rely on timer cancellation alone: a monotonically
//! increasing generation counter is checked both after the debounce window
//! and again when a result arrives. Only the most recently admitted query
//! may publish its outcome.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::SearchConfig;
use crate::model::SearchResult;

/// What the search panel currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchPane {
    /// Query too short; invite the user to type.
    #[default]
    Prompt,
    /// A query is in flight.
    Loading,
    /// Results arrived (possibly empty, which is distinct from failure).
    Results(Vec<SearchResult>),
    /// The search itself failed. The query box is left untouched.
    Failed,
}

/// Outcome of admitting one input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryDisposition {
    /// Query too short after trimming: clear to the prompt state, and
    /// invalidate any in-flight query.
    Cleared,
    /// A newer input event arrived during the debounce window.
    Superseded,
    /// The query survived the window; run it and publish under `ticket`.
    Run {
        /// Generation ticket to present when the result arrives.
        ticket: u64,
        /// The trimmed query to send to the source.
        query: String,
    },
}

/// Debounce and staleness bookkeeping for free-text search.
#[derive(Debug)]
pub struct SearchCoordinator {
    generation: AtomicU64,
    config: SearchConfig,
}

impl SearchCoordinator {
    /// Create a coordinator with the given settings.
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self {
            generation: AtomicU64::new(0),
            config,
        }
    }

    /// Result list cap.
    #[must_use]
    pub fn max_results(&self) -> usize {
        self.config.max_results
    }

    /// Admit one input event: trim, length-gate, debounce, and decide
    /// whether this query is still the latest.
    pub async fn admit(&self, raw_query: &str) -> QueryDisposition {
        let trimmed = raw_query.trim();
        if trimmed.chars().count() < self.config.min_query_len {
            // Short queries clear results and supersede anything in flight.
            self.invalidate();
            return QueryDisposition::Cleared;
        }

        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = trimmed.to_string();

        tokio::time::sleep(self.config.debounce()).await;

        if !self.accepts(ticket) {
            return QueryDisposition::Superseded;
        }
        QueryDisposition::Run { ticket, query }
    }

    /// Whether a ticket still identifies the latest query. Checked when a
    /// result arrives; stale results must be discarded, not rendered.
    #[must_use]
    pub fn accepts(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }

    /// Invalidate every outstanding ticket (source switch, cleared query).
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> SearchCoordinator {
        SearchCoordinator::new(SearchConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_clears() {
        let search = coordinator();
        assert_eq!(search.admit("a").await, QueryDisposition::Cleared);
        assert_eq!(search.admit("  b  ").await, QueryDisposition::Cleared);
        assert_eq!(search.admit("").await, QueryDisposition::Cleared);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lone_query_runs_after_debounce() {
        let search = coordinator();
        match search.admit("alpha").await {
            QueryDisposition::Run { ticket, query } => {
                assert_eq!(query, "alpha");
                assert!(search.accepts(ticket));
            }
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_query_supersedes_older() {
        let search = std::sync::Arc::new(coordinator());

        // "ab" arrives, then "abc" before the debounce window elapses
        let older = tokio::spawn({
            let search = std::sync::Arc::clone(&search);
            async move { search.admit("ab").await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let newer = tokio::spawn({
            let search = std::sync::Arc::clone(&search);
            async move { search.admit("abc").await }
        });

        assert_eq!(older.await.unwrap(), QueryDisposition::Superseded);
        match newer.await.unwrap() {
            QueryDisposition::Run { query, .. } => assert_eq!(query, "abc"),
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_ticket_rejected_on_arrival() {
        let search = coordinator();

        // First query admitted and already searching...
        let first = match search.admit("ab").await {
            QueryDisposition::Run { ticket, .. } => ticket,
            other => panic!("expected Run, got {other:?}"),
        };

        // ...when a second query is admitted
        let second = match search.admit("abc").await {
            QueryDisposition::Run { ticket, .. } => ticket,
            other => panic!("expected Run, got {other:?}"),
        };

        // The first result arrives late and must be discarded
        assert!(!search.accepts(first));
        assert!(search.accepts(second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_discards_in_flight_query() {
        let search = coordinator();
        let ticket = match search.admit("alpha").await {
            QueryDisposition::Run { ticket, .. } => ticket,
            other => panic!("expected Run, got {other:?}"),
        };

        search.invalidate();
        assert!(!search.accepts(ticket));
    }
}
