//! In-memory `DataSource` for controller tests.
//!
//! Holds fixture catalogs, counts every boundary crossing, and supports
//! per-query/per-session delays and switchable failures so tests can
//! exercise overlapping fetches and staleness handling deterministically
//! under tokio's paused clock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;

use convo_lens::error::{LensError, Result};
use convo_lens::model::{
    Conversation, Message, Project, ProjectMetaUpdate, Role, SearchResult, Session, SourceCatalog,
    SourceInfo, SyncStatus,
};
use convo_lens::source::DataSource;

/// Install a test subscriber so `RUST_LOG=debug cargo test` shows the
/// controller's staleness decisions. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fixture-backed data source with call counters and failure switches.
#[derive(Default)]
pub struct MockSource {
    pub catalog: SourceCatalog,
    pub projects: Mutex<HashMap<String, Vec<Project>>>,
    pub sessions: HashMap<(String, String), Vec<Session>>,
    pub subagents: HashMap<String, Vec<Session>>,
    pub conversations: HashMap<(String, String, String), Conversation>,
    /// Extra latency per session id for conversation fetches.
    pub conversation_delays: HashMap<String, u64>,
    /// Extra latency per query for searches.
    pub search_delays: HashMap<String, u64>,
    /// Latency for sub-agent list fetches.
    pub subagent_delay_ms: u64,

    pub fail_projects: AtomicBool,
    pub fail_conversations: AtomicBool,
    pub fail_search: AtomicBool,
    pub fail_meta_updates: AtomicBool,

    pub project_fetches: AtomicUsize,
    pub session_fetches: AtomicUsize,
    pub subagent_fetches: AtomicUsize,
    pub conversation_fetches: AtomicUsize,
    pub search_calls: AtomicUsize,
    pub resync_calls: AtomicUsize,

    pub last_sync: Mutex<Option<DateTime<Utc>>>,
}

impl MockSource {
    /// The standard two-source fixture used by most tests.
    pub fn fixture() -> Self {
        let catalog = SourceCatalog {
            sources: vec![
                source_info("claude-code", "Claude Code", true),
                source_info("codex", "OpenAI Codex", true),
                source_info("gemini", "Google Gemini", false),
            ],
            current: "claude-code".to_string(),
        };

        let mut projects = HashMap::new();
        projects.insert(
            "claude-code".to_string(),
            vec![project("alpha", &["x"]), project("beta", &["y"])],
        );
        projects.insert("codex".to_string(), vec![project("gamma", &[])]);

        let mut sessions = HashMap::new();
        sessions.insert(
            ("claude-code".to_string(), "alpha".to_string()),
            vec![
                session("s1", 120, 20_000, Some("2026-08-03T10:00:00Z"), 2),
                session("s2", 2, 500, Some("2026-08-01T10:00:00Z"), 0),
            ],
        );
        sessions.insert(
            ("codex".to_string(), "gamma".to_string()),
            vec![session("g1", 4, 1_000, Some("2026-08-02T10:00:00Z"), 0)],
        );

        let mut subagents = HashMap::new();
        subagents.insert(
            "s1".to_string(),
            vec![
                session("agent-aa", 5, 900, Some("2026-08-03T10:05:00Z"), 0),
                session("agent-bb", 7, 1_200, Some("2026-08-03T10:06:00Z"), 0),
            ],
        );

        let mut conversations = HashMap::new();
        conversations.insert(
            key("claude-code", "alpha", "s1"),
            long_conversation("s1", 120),
        );
        conversations.insert(key("claude-code", "alpha", "s2"), ack_conversation("s2"));
        conversations.insert(
            key("codex", "gamma", "g1"),
            long_conversation("g1", 4),
        );

        let mut fixture = Self {
            catalog,
            projects: Mutex::new(projects),
            sessions,
            subagents,
            conversations,
            ..Default::default()
        };
        *fixture.last_sync.get_mut() = Some("2026-08-04T09:00:00Z".parse().unwrap());
        fixture
    }
}

fn source_info(id: &str, name: &str, available: bool) -> SourceInfo {
    SourceInfo {
        id: id.to_string(),
        name: name.to_string(),
        available,
    }
}

fn project(name: &str, tags: &[&str]) -> Project {
    Project {
        id: name.to_string(),
        name: name.to_string(),
        tags: tags.iter().map(|t| (*t).to_string()).collect(),
        session_count: 2,
        ..Default::default()
    }
}

fn session(id: &str, messages: usize, size: u64, last: Option<&str>, subs: usize) -> Session {
    Session {
        id: id.to_string(),
        summary: format!("summary of {id}"),
        message_count: messages,
        size,
        last_timestamp: last.map(|ts| ts.parse().unwrap()),
        subagent_count: subs,
        ..Default::default()
    }
}

fn key(source: &str, project: &str, session: &str) -> (String, String, String) {
    (
        source.to_string(),
        project.to_string(),
        session.to_string(),
    )
}

/// Alternating user/assistant turns, every one carrying visible text.
pub fn long_conversation(session_id: &str, turns: usize) -> Conversation {
    let messages = (0..turns)
        .map(|i| {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            let mut msg = Message::new(role);
            msg.content = Some(format!("turn {i}"));
            msg
        })
        .collect();
    Conversation {
        session_id: session_id.to_string(),
        summaries: vec!["fixture conversation".to_string()],
        messages,
    }
}

/// A protocol acknowledgement turn followed by one assistant reply.
pub fn ack_conversation(session_id: &str) -> Conversation {
    let ack = Message::new(Role::User);
    let mut reply = Message::new(Role::Assistant);
    reply.content = Some("hi".to_string());
    Conversation {
        session_id: session_id.to_string(),
        summaries: Vec::new(),
        messages: vec![ack, reply],
    }
}

async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

impl DataSource for MockSource {
    fn list_sources(&self) -> BoxFuture<'_, Result<SourceCatalog>> {
        async move { Ok(self.catalog.clone()) }.boxed()
    }

    fn list_projects<'a>(&'a self, source: &'a str) -> BoxFuture<'a, Result<Vec<Project>>> {
        async move {
            self.project_fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_projects.load(Ordering::SeqCst) {
                return Err(LensError::catalog(source, "mock catalog failure"));
            }
            Ok(self.projects.lock().get(source).cloned().unwrap_or_default())
        }
        .boxed()
    }

    fn update_project_meta<'a>(
        &'a self,
        source: &'a str,
        project: &'a str,
        update: ProjectMetaUpdate,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            if self.fail_meta_updates.load(Ordering::SeqCst) {
                return Err(LensError::MetadataUpdate {
                    project: project.to_string(),
                    message: "mock metadata failure".to_string(),
                });
            }
            let mut projects = self.projects.lock();
            let entry = projects
                .get_mut(source)
                .and_then(|list| list.iter_mut().find(|p| p.id == project))
                .ok_or_else(|| LensError::MetadataUpdate {
                    project: project.to_string(),
                    message: "no such project".to_string(),
                })?;
            if let Some(custom_name) = update.custom_name {
                entry.custom_name = if custom_name.is_empty() {
                    None
                } else {
                    Some(custom_name)
                };
            }
            if let Some(tags) = update.tags {
                entry.tags = tags;
            }
            Ok(())
        }
        .boxed()
    }

    fn list_sessions<'a>(
        &'a self,
        source: &'a str,
        project: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Session>>> {
        async move {
            self.session_fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .sessions
                .get(&(source.to_string(), project.to_string()))
                .cloned()
                .unwrap_or_default())
        }
        .boxed()
    }

    fn list_subagents<'a>(
        &'a self,
        _source: &'a str,
        _project: &'a str,
        session: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Session>>> {
        async move {
            self.subagent_fetches.fetch_add(1, Ordering::SeqCst);
            pause(self.subagent_delay_ms).await;
            Ok(self.subagents.get(session).cloned().unwrap_or_default())
        }
        .boxed()
    }

    fn fetch_conversation<'a>(
        &'a self,
        source: &'a str,
        project: &'a str,
        session: &'a str,
    ) -> BoxFuture<'a, Result<Conversation>> {
        async move {
            self.conversation_fetches.fetch_add(1, Ordering::SeqCst);
            pause(self.conversation_delays.get(session).copied().unwrap_or(0)).await;
            if self.fail_conversations.load(Ordering::SeqCst) {
                return Err(LensError::conversation(session, "mock fetch failure"));
            }
            self.conversations
                .get(&key(source, project, session))
                .cloned()
                .ok_or_else(|| LensError::conversation(session, "not found"))
        }
        .boxed()
    }

    fn search<'a>(
        &'a self,
        _source: &'a str,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Vec<SearchResult>>> {
        async move {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            pause(self.search_delays.get(query).copied().unwrap_or(0)).await;
            if self.fail_search.load(Ordering::SeqCst) {
                return Err(LensError::search("mock search failure"));
            }
            // Results echo the query so tests can tell whose result landed
            Ok(vec![SearchResult {
                project_id: "alpha".to_string(),
                session_id: "s1".to_string(),
                session_label: query.to_string(),
                project_name: "alpha".to_string(),
            }])
        }
        .boxed()
    }

    fn resync<'a>(&'a self, _source: &'a str) -> BoxFuture<'a, Result<SyncStatus>> {
        async move {
            self.resync_calls.fetch_add(1, Ordering::SeqCst);
            let now: DateTime<Utc> = "2026-08-04T12:00:00Z".parse().unwrap();
            *self.last_sync.lock() = Some(now);
            Ok(SyncStatus {
                last_sync: Some(now),
            })
        }
        .boxed()
    }

    fn sync_status<'a>(&'a self, _source: &'a str) -> BoxFuture<'a, Result<SyncStatus>> {
        async move {
            Ok(SyncStatus {
                last_sync: *self.last_sync.lock(),
            })
        }
        .boxed()
    }
}
