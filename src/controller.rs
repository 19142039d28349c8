//! The view controller: single owner of all mutable view state.
//!
//! Everything the render collaborator sees flows through here. State lives
//! behind one lock inside the controller; mutation is routed through
//! controller methods, and each change publishes an immutable
//! [`ViewSnapshot`] on a `tokio::sync::watch` channel that the collaborator
//! subscribes to (replace-on-change; no incremental diffing in the core).
//!
//! Staleness discipline: `epoch` bumps when the active source changes and
//! `view_epoch` bumps when the conversation context changes. Every
//! asynchronous completion re-validates its captured epoch (and selection)
//! before touching state, so results that arrive late for a stale
//! source/project/session are discarded rather than rendered.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::cache::{ConversationCache, ConversationKey};
use crate::config::ViewerConfig;
use crate::filters::{filter_projects, filter_sessions, SessionFilters};
use crate::model::{Conversation, Project, ProjectMetaUpdate, Session, SourceInfo};
use crate::pager::{MessagePager, PagerPhase, RoleFilter, RoleFilterSet};
use crate::search::{QueryDisposition, SearchCoordinator, SearchPane};
use crate::source::{DataSource, SourceContext};
use crate::subagents::{SubagentExpander, SubagentToggle};

/// Load state of a catalog list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum PaneStatus {
    /// Nothing requested yet.
    #[default]
    Empty,
    /// A fetch is in flight.
    Loading,
    /// Data loaded.
    Ready,
    /// The fetch failed; an error placeholder shows in place of the list.
    Failed,
}

/// A list pane as the render collaborator sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListPane<T> {
    /// Nothing requested yet (e.g. no project selected).
    #[default]
    Empty,
    /// A fetch is in flight.
    Loading,
    /// The fetch failed; show an error placeholder, keep the rest intact.
    Failed,
    /// The (already filtered and sorted) list to render.
    Ready(Vec<T>),
}

/// The conversation pane as the render collaborator sees it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConversationPane {
    /// No session selected.
    #[default]
    Empty,
    /// A conversation fetch is in flight.
    Loading {
        /// Session being loaded.
        session_id: String,
    },
    /// The fetch failed; re-selecting the session retries.
    Failed {
        /// Session that failed to load.
        session_id: String,
    },
    /// A conversation with its progressively disclosed message prefix.
    Ready(RenderedConversation),
}

/// A loaded conversation plus its pagination and filter view.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedConversation {
    /// The immutable cached conversation.
    pub conversation: Arc<Conversation>,
    /// Length of the rendered message prefix. Monotonically non-decreasing
    /// until the conversation changes.
    pub rendered: usize,
    /// Indices within the rendered prefix that pass the role filter.
    pub visible: Vec<usize>,
    /// Pagination phase.
    pub phase: PagerPhase,
    /// Token the adapter must pass to [`ViewController::load_more_messages`];
    /// triggers carrying a stale token are ignored.
    pub view_epoch: u64,
}

/// Sync indicator state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncState {
    /// Status not retrieved yet.
    #[default]
    Unknown,
    /// A manual resync is in flight.
    Syncing,
    /// The source has never synced.
    NeverSynced,
    /// Last successful sync time.
    Synced(DateTime<Utc>),
    /// The last manual resync failed.
    Failed,
}

/// Immutable replace-on-change snapshot of everything the render
/// collaborator needs.
#[derive(Debug, Clone, Default)]
pub struct ViewSnapshot {
    /// All known sources.
    pub sources: Vec<SourceInfo>,
    /// The active source id.
    pub active_source: Option<String>,
    /// Filtered project list.
    pub projects: ListPane<Project>,
    /// Sorted union of all tags across the (unfiltered) catalog.
    pub available_tags: Vec<String>,
    /// Active tag filter.
    pub active_tag: Option<String>,
    /// Current project text query.
    pub text_query: String,
    /// Selected project id.
    pub selected_project: Option<String>,
    /// Filtered, sorted session list for the selected project.
    pub sessions: ListPane<Session>,
    /// Active session filter/sort state.
    pub session_filters: SessionFilters,
    /// Selected session id.
    pub selected_session: Option<String>,
    /// The conversation pane.
    pub conversation: ConversationPane,
    /// Active role/type filters.
    pub role_filters: RoleFilterSet,
    /// Expanded sub-agent lists, keyed by parent session id.
    pub subagents: HashMap<String, Arc<Vec<Session>>>,
    /// The search panel.
    pub search: SearchPane,
    /// Sync indicator.
    pub sync: SyncState,
}

/// All mutable view state, single-writer behind the controller's lock.
#[derive(Debug, Default)]
struct ViewState {
    sources: SourceContext,
    /// Bumps when the active source changes.
    epoch: u64,
    /// Bumps when the conversation context changes.
    view_epoch: u64,
    projects: Vec<Project>,
    projects_status: PaneStatus,
    sessions: Vec<Session>,
    sessions_status: PaneStatus,
    selected_project: Option<String>,
    selected_session: Option<String>,
    text_query: String,
    active_tag: Option<String>,
    session_filters: SessionFilters,
    role_filters: RoleFilterSet,
    conversation: ConversationPane,
    pager: Option<MessagePager>,
    search_pane: SearchPane,
    sync: SyncState,
}

/// The conversation/session state controller.
pub struct ViewController {
    source: Arc<dyn DataSource>,
    config: ViewerConfig,
    conversations: ConversationCache,
    subagents: SubagentExpander,
    search: SearchCoordinator,
    state: Mutex<ViewState>,
    snapshot_tx: watch::Sender<ViewSnapshot>,
}

impl ViewController {
    /// Create a controller over a data source. Returns the controller and
    /// the snapshot subscription for the render collaborator.
    #[must_use]
    pub fn new(
        source: Arc<dyn DataSource>,
        config: ViewerConfig,
    ) -> (Arc<Self>, watch::Receiver<ViewSnapshot>) {
        let (snapshot_tx, snapshot_rx) = watch::channel(ViewSnapshot::default());
        let search = SearchCoordinator::new(config.search.clone());
        let controller = Arc::new(Self {
            source,
            config,
            conversations: ConversationCache::new(),
            subagents: SubagentExpander::new(),
            search,
            state: Mutex::new(ViewState::default()),
            snapshot_tx,
        });
        (controller, snapshot_rx)
    }

    /// The latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> ViewSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Load the source list, the initial project catalog, and sync status.
    /// A failed source-list fetch logs and leaves the prior (empty) state
    /// visible rather than crashing the view.
    pub async fn init(&self) {
        match self.source.list_sources().await {
            Ok(catalog) => {
                let mut state = self.state.lock();
                state.sources.replace(catalog);
                self.publish(&state);
            }
            Err(e) => {
                warn!(error = %e, "Failed to load source list; keeping prior state");
                return;
            }
        }
        self.reload_projects().await;
        self.refresh_sync_status().await;
    }

    /// Switch the active source. A no-op for the already-active id.
    /// Otherwise atomically clears every piece of downstream state (caches,
    /// filters, selection), then reloads the catalog for the new source.
    pub async fn set_active_source(&self, source_id: &str) {
        {
            let mut state = self.state.lock();
            if state.sources.active() == Some(source_id) {
                return;
            }
            if !state.sources.contains(source_id) {
                warn!(source = %source_id, "Ignoring switch to unknown source");
                return;
            }
            state.sources.set_active(source_id);
            state.epoch += 1;
            state.view_epoch += 1;
            state.selected_project = None;
            state.selected_session = None;
            state.sessions = Vec::new();
            state.sessions_status = PaneStatus::Empty;
            state.text_query.clear();
            state.active_tag = None;
            state.session_filters = SessionFilters::default();
            state.role_filters.clear();
            state.conversation = ConversationPane::Empty;
            state.pager = None;
            state.search_pane = SearchPane::Prompt;
            state.sync = SyncState::Unknown;
            self.conversations.clear();
            self.subagents.clear();
            self.search.invalidate();
            debug!(source = %source_id, "Source switched; downstream state cleared");
            self.publish(&state);
        }
        self.reload_projects().await;
        self.refresh_sync_status().await;
    }

    /// Reload the project catalog for the active source. The list is
    /// replaced wholesale; failure shows an error placeholder in place of
    /// the list and leaves the rest of the state intact.
    pub async fn reload_projects(&self) {
        let (source_id, epoch) = {
            let mut state = self.state.lock();
            let Some(id) = state.sources.active().map(String::from) else {
                return;
            };
            state.projects_status = PaneStatus::Loading;
            self.publish(&state);
            (id, state.epoch)
        };

        let result = self.source.list_projects(&source_id).await;

        let mut state = self.state.lock();
        if state.epoch != epoch {
            debug!(source = %source_id, "Discarding stale project catalog");
            return;
        }
        match result {
            Ok(projects) => {
                debug!(source = %source_id, count = projects.len(), "Project catalog loaded");
                state.projects = projects;
                state.projects_status = PaneStatus::Ready;
            }
            Err(e) => {
                warn!(source = %source_id, error = %e, "Failed to load project catalog");
                state.projects = Vec::new();
                state.projects_status = PaneStatus::Failed;
            }
        }
        self.publish(&state);
    }

    /// Select a project and load its session list.
    pub async fn select_project(&self, project_id: &str) {
        let (source_id, epoch) = {
            let mut state = self.state.lock();
            let Some(id) = state.sources.active().map(String::from) else {
                return;
            };
            state.selected_project = Some(project_id.to_string());
            state.selected_session = None;
            state.view_epoch += 1;
            state.conversation = ConversationPane::Empty;
            state.pager = None;
            state.sessions_status = PaneStatus::Loading;
            self.publish(&state);
            (id, state.epoch)
        };

        let result = self.source.list_sessions(&source_id, project_id).await;

        let mut state = self.state.lock();
        if state.epoch != epoch || state.selected_project.as_deref() != Some(project_id) {
            debug!(project = %project_id, "Discarding stale session list");
            return;
        }
        match result {
            Ok(sessions) => {
                state.sessions = sessions;
                state.sessions_status = PaneStatus::Ready;
            }
            Err(e) => {
                warn!(project = %project_id, error = %e, "Failed to load session list");
                state.sessions = Vec::new();
                state.sessions_status = PaneStatus::Failed;
            }
        }
        self.publish(&state);
    }

    /// Select a session and load its conversation through the cache. A
    /// cached conversation renders without touching the network; otherwise
    /// concurrent selections of the same session share one fetch. On
    /// failure the cache key stays unpopulated, so re-selecting retries.
    pub async fn select_session(&self, session_id: &str) {
        let (key, epoch) = {
            let mut state = self.state.lock();
            let Some(source_id) = state.sources.active().map(String::from) else {
                return;
            };
            let Some(project_id) = state.selected_project.clone() else {
                return;
            };
            state.selected_session = Some(session_id.to_string());
            // Outstanding pagination triggers die with the old conversation
            state.view_epoch += 1;
            state.pager = None;
            state.conversation = ConversationPane::Loading {
                session_id: session_id.to_string(),
            };
            self.publish(&state);
            (
                ConversationKey::new(source_id, project_id, session_id),
                state.epoch,
            )
        };

        let result = self
            .conversations
            .get_or_fetch(key.clone(), Arc::clone(&self.source))
            .await;

        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.epoch != epoch {
            debug!(session = %session_id, "Discarding conversation for stale source");
            self.conversations.remove(&key);
            return;
        }
        if state.selected_session.as_deref() != Some(session_id) {
            debug!(session = %session_id, "Selection moved on; conversation not rendered");
            return;
        }
        match result {
            Ok(conversation) => {
                state.view_epoch += 1;
                let mut pager = MessagePager::new(
                    conversation.messages.len(),
                    self.config.pager.batch_size,
                );
                pager.next_batch();
                state.role_filters.clear();
                state.conversation = ConversationPane::Ready(RenderedConversation {
                    rendered: pager.rendered(),
                    visible: state
                        .role_filters
                        .visible_indices(&conversation.messages, pager.rendered()),
                    phase: pager.phase(),
                    view_epoch: state.view_epoch,
                    conversation,
                });
                state.pager = Some(pager);
            }
            Err(e) => {
                warn!(session = %session_id, error = %e, "Conversation fetch failed");
                state.conversation = ConversationPane::Failed {
                    session_id: session_id.to_string(),
                };
                state.pager = None;
            }
        }
        self.publish(state);
    }

    /// Render the next message batch. The adapter calls this when its
    /// visibility sentinel fires or on an explicit "load more"; `view_epoch`
    /// must come from the current [`RenderedConversation`], so triggers left
    /// over from a previous conversation are ignored. The role filter is
    /// re-applied across the grown prefix.
    pub fn load_more_messages(&self, view_epoch: u64) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.view_epoch != view_epoch {
            debug!("Ignoring pagination trigger from a previous conversation");
            return;
        }
        let Some(pager) = state.pager.as_mut() else {
            return;
        };
        if pager.next_batch().is_none() {
            return;
        }
        if let ConversationPane::Ready(view) = &mut state.conversation {
            view.rendered = pager.rendered();
            view.phase = pager.phase();
            view.visible = state
                .role_filters
                .visible_indices(&view.conversation.messages, view.rendered);
        }
        self.publish(state);
    }

    /// Toggle a role/type filter and re-apply it to the rendered prefix.
    pub fn toggle_role_filter(&self, filter: RoleFilter) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.role_filters.toggle(filter);
        if let ConversationPane::Ready(view) = &mut state.conversation {
            view.visible = state
                .role_filters
                .visible_indices(&view.conversation.messages, view.rendered);
        }
        self.publish(state);
    }

    /// Set the project text query.
    pub fn set_text_query(&self, query: &str) {
        let mut state = self.state.lock();
        state.text_query = query.to_string();
        self.publish(&state);
    }

    /// Toggle the active tag filter; clicking the active tag clears it.
    pub fn toggle_tag_filter(&self, tag: &str) {
        let mut state = self.state.lock();
        state.active_tag = if state.active_tag.as_deref() == Some(tag) {
            None
        } else {
            Some(tag.to_string())
        };
        self.publish(&state);
    }

    /// Replace the session filter/sort state.
    pub fn set_session_filters(&self, filters: SessionFilters) {
        let mut state = self.state.lock();
        state.session_filters = filters;
        self.publish(&state);
    }

    /// Reset session filters to defaults (all sizes, all dates, newest).
    pub fn reset_session_filters(&self) {
        self.set_session_filters(SessionFilters::default());
    }

    /// Handle one search input event: debounce, length-gate, fetch, and
    /// publish under last-request-wins. Call once per keystroke; superseded
    /// calls dissolve without touching state.
    pub async fn search(&self, raw_query: &str) {
        let epoch = self.state.lock().epoch;

        match self.search.admit(raw_query).await {
            QueryDisposition::Cleared => {
                let mut state = self.state.lock();
                if state.epoch != epoch {
                    return;
                }
                state.search_pane = SearchPane::Prompt;
                self.publish(&state);
            }
            QueryDisposition::Superseded => {}
            QueryDisposition::Run { ticket, query } => {
                let source_id = {
                    let mut state = self.state.lock();
                    if state.epoch != epoch {
                        return;
                    }
                    let Some(id) = state.sources.active().map(String::from) else {
                        return;
                    };
                    state.search_pane = SearchPane::Loading;
                    self.publish(&state);
                    id
                };

                let result = self.source.search(&source_id, &query).await;

                if !self.search.accepts(ticket) {
                    debug!(query = %query, "Discarding superseded search result");
                    return;
                }
                let mut state = self.state.lock();
                if state.epoch != epoch {
                    return;
                }
                state.search_pane = match result {
                    Ok(mut results) => {
                        results.truncate(self.search.max_results());
                        SearchPane::Results(results)
                    }
                    Err(e) => {
                        warn!(query = %query, error = %e, "Search failed");
                        SearchPane::Failed
                    }
                };
                self.publish(&state);
            }
        }
    }

    /// Navigate to a search hit: select its project, then its session.
    pub async fn open_search_result(&self, project_id: &str, session_id: &str) {
        self.select_project(project_id).await;
        self.select_session(session_id).await;
    }

    /// Expand or collapse a session's sub-agent list (flat, non-recursive).
    /// The list is fetched at most once per source session; repeated toggles
    /// while the fetch is pending are no-ops.
    pub async fn toggle_subagents(&self, session_id: &str) {
        let (source_id, project_id, epoch) = {
            let state = self.state.lock();
            let Some(source_id) = state.sources.active().map(String::from) else {
                return;
            };
            let Some(project_id) = state.selected_project.clone() else {
                return;
            };
            (source_id, project_id, state.epoch)
        };

        let source = Arc::clone(&self.source);
        let parent = session_id.to_string();
        let fetch_source = source_id.clone();
        let result = self
            .subagents
            .toggle(session_id, move || {
                async move {
                    let sessions = source
                        .list_subagents(&fetch_source, &project_id, &parent)
                        .await?;
                    Ok(Arc::new(sessions))
                }
                .boxed()
            })
            .await;

        let state = self.state.lock();
        if state.epoch != epoch {
            debug!(session = %session_id, "Discarding sub-agent list for stale source");
            self.subagents.discard(session_id);
            return;
        }
        match result {
            Ok(SubagentToggle::AlreadyPending) => {}
            Ok(_) => self.publish(&state),
            Err(e) => {
                warn!(session = %session_id, error = %e, "Sub-agent list fetch failed");
                self.publish(&state);
            }
        }
    }

    /// Update a project's custom name/tags. On failure the change is logged
    /// and not applied; either way the catalog is re-fetched from the source
    /// of truth rather than patched locally.
    pub async fn update_project_meta(&self, project_id: &str, update: ProjectMetaUpdate) {
        let Some(source_id) = self.state.lock().sources.active().map(String::from) else {
            return;
        };

        if let Err(e) = self
            .source
            .update_project_meta(&source_id, project_id, update)
            .await
        {
            warn!(project = %project_id, error = %e, "Metadata update rejected; not applied");
        }
        self.reload_projects().await;
    }

    /// Trigger a manual resync of the active source. Success invalidates the
    /// whole conversation cache and reloads the catalog; cached
    /// conversations are never patched in place.
    pub async fn resync(&self) {
        let (source_id, epoch) = {
            let mut state = self.state.lock();
            let Some(id) = state.sources.active().map(String::from) else {
                return;
            };
            state.sync = SyncState::Syncing;
            self.publish(&state);
            (id, state.epoch)
        };

        let result = self.source.resync(&source_id).await;
        let succeeded = result.is_ok();

        {
            let mut state = self.state.lock();
            if state.epoch != epoch {
                debug!(source = %source_id, "Discarding resync outcome for stale source");
                return;
            }
            match result {
                Ok(status) => {
                    state.sync = status
                        .last_sync
                        .map_or(SyncState::NeverSynced, SyncState::Synced);
                    self.conversations.clear();
                }
                Err(e) => {
                    warn!(source = %source_id, error = %e, "Manual resync failed");
                    state.sync = SyncState::Failed;
                }
            }
            self.publish(&state);
        }

        if succeeded {
            self.reload_projects().await;
        }
    }

    /// Refresh the sync indicator from the source. The polling interval
    /// belongs to the adapter.
    pub async fn refresh_sync_status(&self) {
        let (source_id, epoch) = {
            let state = self.state.lock();
            let Some(id) = state.sources.active().map(String::from) else {
                return;
            };
            (id, state.epoch)
        };

        let result = self.source.sync_status(&source_id).await;

        let mut state = self.state.lock();
        if state.epoch != epoch {
            return;
        }
        match result {
            Ok(status) => {
                state.sync = status
                    .last_sync
                    .map_or(SyncState::NeverSynced, SyncState::Synced);
            }
            Err(e) => {
                debug!(source = %source_id, error = %e, "Sync status unavailable");
            }
        }
        self.publish(&state);
    }

    /// Build and publish a snapshot from the current state.
    fn publish(&self, state: &ViewState) {
        let now = Utc::now();

        let projects = match state.projects_status {
            PaneStatus::Empty => ListPane::Empty,
            PaneStatus::Loading => ListPane::Loading,
            PaneStatus::Failed => ListPane::Failed,
            PaneStatus::Ready => ListPane::Ready(filter_projects(
                &state.projects,
                &state.text_query,
                state.active_tag.as_deref(),
            )),
        };
        let sessions = match state.sessions_status {
            PaneStatus::Empty => ListPane::Empty,
            PaneStatus::Loading => ListPane::Loading,
            PaneStatus::Failed => ListPane::Failed,
            PaneStatus::Ready => ListPane::Ready(filter_sessions(
                &state.sessions,
                &state.session_filters,
                now,
            )),
        };

        let mut available_tags: Vec<String> = state
            .projects
            .iter()
            .flat_map(|p| p.tags.iter().cloned())
            .collect();
        available_tags.sort();
        available_tags.dedup();

        let snapshot = ViewSnapshot {
            sources: state.sources.sources().to_vec(),
            active_source: state.sources.active().map(String::from),
            projects,
            available_tags,
            active_tag: state.active_tag.clone(),
            text_query: state.text_query.clone(),
            selected_project: state.selected_project.clone(),
            sessions,
            session_filters: state.session_filters,
            selected_session: state.selected_session.clone(),
            conversation: state.conversation.clone(),
            role_filters: state.role_filters,
            subagents: self.subagents.expanded_lists(),
            search: state.search_pane.clone(),
            sync: state.sync,
        };
        self.snapshot_tx.send_replace(snapshot);
    }
}

impl std::fmt::Debug for ViewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ViewController")
            .field("active_source", &state.sources.active())
            .field("selected_project", &state.selected_project)
            .field("selected_session", &state.selected_session)
            .field("cached_conversations", &self.conversations.len())
            .finish()
    }
}
