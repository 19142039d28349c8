//! The abstract data-source boundary and the active-source context.
//!
//! Transport details (HTTP, filesystem, whatever the backend is) live behind
//! [`DataSource`]; the controller only sees these logical operations. All of
//! them cross the boundary asynchronously and may suspend; nothing else in
//! the crate does.

use futures::future::BoxFuture;

use crate::error::Result;
use crate::model::{
    Conversation, Project, ProjectMetaUpdate, SearchResult, Session, SourceCatalog, SourceInfo,
    SyncStatus,
};

/// Abstract backend the viewer browses.
///
/// Object-safe so the controller can hold an `Arc<dyn DataSource>`. The
/// fetch primitives are not assumed to support true cancellation; staleness
/// is handled by the caller on arrival.
pub trait DataSource: Send + Sync {
    /// List all sources and which one the backend considers current.
    fn list_sources(&self) -> BoxFuture<'_, Result<SourceCatalog>>;

    /// List the projects of a source.
    fn list_projects<'a>(&'a self, source: &'a str) -> BoxFuture<'a, Result<Vec<Project>>>;

    /// Update a project's custom name and/or tags.
    fn update_project_meta<'a>(
        &'a self,
        source: &'a str,
        project: &'a str,
        update: ProjectMetaUpdate,
    ) -> BoxFuture<'a, Result<()>>;

    /// List the sessions of a project.
    fn list_sessions<'a>(
        &'a self,
        source: &'a str,
        project: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Session>>>;

    /// List the sub-agent sessions spawned from a session.
    fn list_subagents<'a>(
        &'a self,
        source: &'a str,
        project: &'a str,
        session: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Session>>>;

    /// Fetch the full conversation for a session.
    fn fetch_conversation<'a>(
        &'a self,
        source: &'a str,
        project: &'a str,
        session: &'a str,
    ) -> BoxFuture<'a, Result<Conversation>>;

    /// Run a free-text search scoped to a source.
    fn search<'a>(
        &'a self,
        source: &'a str,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Vec<SearchResult>>>;

    /// Trigger a manual resync of a source.
    fn resync<'a>(&'a self, source: &'a str) -> BoxFuture<'a, Result<SyncStatus>>;

    /// Report a source's last-sync timestamp.
    fn sync_status<'a>(&'a self, source: &'a str) -> BoxFuture<'a, Result<SyncStatus>>;
}

/// The set of available sources and the single active one.
#[derive(Debug, Clone, Default)]
pub struct SourceContext {
    sources: Vec<SourceInfo>,
    active: Option<String>,
}

impl SourceContext {
    /// Replace the source list wholesale. The active id is kept if still
    /// listed, otherwise it falls back to the given current id.
    pub fn replace(&mut self, catalog: SourceCatalog) {
        self.sources = catalog.sources;
        let keep = self
            .active
            .as_deref()
            .is_some_and(|id| self.contains(id));
        if !keep {
            self.active = if catalog.current.is_empty() {
                self.sources.first().map(|s| s.id.clone())
            } else {
                Some(catalog.current)
            };
        }
    }

    /// All known sources.
    #[must_use]
    pub fn sources(&self) -> &[SourceInfo] {
        &self.sources
    }

    /// The active source id, if any.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Whether a source id is in the list.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.sources.iter().any(|s| s.id == id)
    }

    /// Switch the active source. Returns `false` (a no-op) when `id` is
    /// already active.
    pub fn set_active(&mut self, id: &str) -> bool {
        if self.active.as_deref() == Some(id) {
            return false;
        }
        self.active = Some(id.to_string());
        true
    }
}
