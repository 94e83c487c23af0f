#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Bounded least-recently-used map.
pub mod cache;
/// Dataset location and serving configuration.
pub mod config;
/// Centralized constants for page files, link expansion, tables, and splits.
pub mod constants;
/// Dataset document models: conversations, turns, and candidates.
pub mod data;
/// Read-only dataset facade.
pub mod dataset;
/// Reusable inspector runner shared by the demo binary.
pub mod example_apps;
mod hash;
/// Introductory-text lookup used for link expansion.
pub mod links;
/// Per-page records and the filesystem page store.
pub mod page;
/// Conversation splits over the document ordering.
pub mod splits;
/// Table identifier parsing and resolved-table construction.
pub mod tables;
/// Shared type aliases.
pub mod types;

mod errors;

pub use cache::LruCache;
pub use config::DatasetConfig;
pub use data::{Candidate, CandidateType, DatasetDocument, Turn};
pub use dataset::HybridDialogueDataset;
pub use errors::DatasetError;
pub use hash::{page_file_name, sha256_hex};
pub use links::{LinkResolver, page_key_from_link};
pub use page::{Cell, PageRecord, PageSource, PageStore, Passage, TableRecord};
pub use splits::{SplitCutoffs, SplitLabel, SplitPlan, SplitSummary};
pub use tables::{ResolvedTable, TableResolver, TableView, parse_table_id};
pub use types::{CandidateId, CellText, ConversationId, LinkTarget, PageKey, TableId, TurnId};
