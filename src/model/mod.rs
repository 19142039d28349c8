//! Data model for the conversation viewer.
//!
//! Catalog records (sources, projects, sessions) are replaced wholesale on
//! every fetch; conversations are immutable once cached. Unknown fields on
//! messages are preserved for forward compatibility with newer log formats.

pub mod catalog;
pub mod conversation;
pub mod message;

pub use catalog::*;
pub use conversation::*;
pub use message::*;

use indexmap::IndexMap;
use serde_json::Value;

/// Unknown fields preserved for forward compatibility.
pub type UnknownFields = IndexMap<String, Value>;
