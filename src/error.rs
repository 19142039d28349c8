//! Error types for convo-lens.
//!
//! Every failure in the controller degrades to a visible, retryable UI
//! state; nothing here is fatal to the controller's process-wide state.
//! Variants map onto the panes that display them: catalog, session list,
//! conversation, search, metadata, sync.

use thiserror::Error;

/// Primary error type for convo-lens operations.
#[derive(Error, Debug)]
pub enum LensError {
    /// The source list could not be retrieved.
    #[error("Failed to load source list: {message}")]
    SourceList {
        /// Human-readable error message.
        message: String,
    },

    /// The project catalog for a source could not be loaded.
    #[error("Failed to load projects for source '{source}': {message}")]
    Catalog {
        /// Source the catalog belongs to.
        source: String,
        /// Human-readable error message.
        message: String,
    },

    /// The session list for a project could not be loaded.
    #[error("Failed to load sessions for project '{project}': {message}")]
    SessionList {
        /// Project the sessions belong to.
        project: String,
        /// Human-readable error message.
        message: String,
    },

    /// A conversation fetch failed. The cache key stays unpopulated so
    /// re-selecting the session retries.
    #[error("Failed to fetch conversation '{session}': {message}")]
    Conversation {
        /// Session whose conversation was requested.
        session: String,
        /// Human-readable error message.
        message: String,
    },

    /// A sub-agent session list fetch failed.
    #[error("Failed to load sub-agents for session '{session}': {message}")]
    Subagents {
        /// Parent session id.
        session: String,
        /// Human-readable error message.
        message: String,
    },

    /// Search failed. Rendered distinctly from "no results".
    #[error("Search failed: {message}")]
    Search {
        /// Human-readable error message.
        message: String,
    },

    /// A project metadata update was rejected by the source.
    #[error("Failed to update metadata for project '{project}': {message}")]
    MetadataUpdate {
        /// Project whose metadata was being updated.
        project: String,
        /// Human-readable error message.
        message: String,
    },

    /// A manual resync failed.
    #[error("Resync failed for source '{source}': {message}")]
    Sync {
        /// Source being resynced.
        source: String,
        /// Human-readable error message.
        message: String,
    },

    /// The requested source id is not in the source list.
    #[error("Unknown source: {id}")]
    UnknownSource {
        /// The unknown source id.
        id: String,
    },

    /// A failure delivered to a waiter that attached to another request's
    /// in-flight fetch. Carries the originating error's message; the typed
    /// original is logged at the fetch site.
    #[error("{message}")]
    SharedFetch {
        /// Message of the originating error.
        message: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    Io {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {context}")]
    Serialization {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },
}

impl LensError {
    /// Create a new catalog error.
    #[must_use]
    pub fn catalog(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Catalog {
            source: source.into(),
            message: message.into(),
        }
    }

    /// Create a new session list error.
    #[must_use]
    pub fn session_list(project: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SessionList {
            project: project.into(),
            message: message.into(),
        }
    }

    /// Create a new conversation fetch error.
    #[must_use]
    pub fn conversation(session: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversation {
            session: session.into(),
            message: message.into(),
        }
    }

    /// Create a new search error.
    #[must_use]
    pub fn search(message: impl Into<String>) -> Self {
        Self::Search {
            message: message.into(),
        }
    }

    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Derive the error handed to waiters sharing an in-flight fetch.
    #[must_use]
    pub fn for_waiter(&self) -> Self {
        Self::SharedFetch {
            message: self.to_string(),
        }
    }

    /// Check whether retrying is purely user-initiated (re-select, re-type,
    /// manual resync). True for every data-boundary failure.
    #[must_use]
    pub const fn is_user_retryable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidConfig { .. } | Self::Io { .. } | Self::Serialization { .. }
        )
    }
}

/// Result type alias for convo-lens operations.
pub type Result<T> = std::result::Result<T, LensError>;

impl From<std::io::Error> for LensError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for LensError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            context: "JSON operation failed".to_string(),
            source: err,
        }
    }
}
