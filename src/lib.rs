//! convo-lens: state controller for browsing multi-source AI assistant
//! conversation logs.
//!
//! This crate is the decision-making core of a log viewer: it reconciles
//! source switching, project/session selection, multi-axis filtering,
//! bounded-batch rendering of unbounded message lists, and debounced
//! asynchronous search — without stale views and without re-fetching data
//! already held. Rendering and the backend are both collaborators behind
//! narrow interfaces: the backend implements [`source::DataSource`], and the
//! render layer subscribes to immutable [`controller::ViewSnapshot`]s.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use convo_lens::config::ViewerConfig;
//! use convo_lens::controller::ViewController;
//! use convo_lens::source::DataSource;
//!
//! async fn run(backend: Arc<dyn DataSource>) {
//!     let (controller, mut snapshots) = ViewController::new(backend, ViewerConfig::default());
//!     controller.init().await;
//!
//!     // The render collaborator re-renders wholesale on each snapshot
//!     tokio::spawn(async move {
//!         while snapshots.changed().await.is_ok() {
//!             let snapshot = snapshots.borrow().clone();
//!             println!("sources: {}", snapshot.sources.len());
//!         }
//!     });
//!
//!     controller.select_project("my-project").await;
//!     controller.select_session("session-1").await;
//! }
//! ```
//!
//! # Architecture
//!
//! - [`model`]: catalog and conversation data types
//! - [`source`]: the abstract data-source boundary and active-source context
//! - [`cache`]: single-flight conversation cache
//! - [`filters`]: pure catalog filtering and sorting
//! - [`pager`]: bounded-batch message pagination and role filters
//! - [`search`]: debounced last-request-wins search
//! - [`subagents`]: lazily fetched sub-agent session lists
//! - [`controller`]: the single owner of all mutable view state
//! - [`config`]: tunable knobs (batch size, debounce window)
//! - [`error`]: error types and handling
//! - [`util`]: display helpers shared with the render collaborator

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod filters;
pub mod model;
pub mod pager;
pub mod search;
pub mod source;
pub mod subagents;
pub mod util;

// Re-export commonly used types at the crate root
pub use error::{LensError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Prelude module for convenient imports.
pub mod prelude {

    pub use crate::config::ViewerConfig;
    pub use crate::controller::{ConversationPane, ViewController, ViewSnapshot};
    pub use crate::error::{LensError, Result};
    pub use crate::model::{Conversation, Message, Project, Role, Session, SourceInfo};
    pub use crate::source::DataSource;
}
