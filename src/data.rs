use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::errors::DatasetError;
pub use crate::types::{CandidateId, ConversationId, PageKey, TableId, TurnId};

/// Granularity of a candidate response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateType {
    /// Free-text passage.
    Paragraph,
    /// Whole table.
    Table,
    /// One table row.
    Row,
    /// One table cell.
    Cell,
}

/// Candidate response object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
    /// Candidate granularity.
    pub the_type: CandidateType,
    /// Content as captured (text, row, or cell payload).
    #[serde(default)]
    pub raw_content: Value,
    /// Linearized textual form used as model input.
    #[serde(default)]
    pub linearized_input: String,
    /// Row index for row and cell candidates.
    #[serde(default)]
    pub row: Option<usize>,
    /// Column index for cell candidates.
    #[serde(default)]
    pub col: Option<usize>,
    /// Page the candidate was taken from.
    #[serde(default)]
    pub page_key: Option<PageKey>,
    /// Table the candidate was taken from, for table-derived candidates.
    #[serde(default)]
    pub table_key: Option<TableId>,
}

/// One dialogue turn.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Turn {
    /// Conversation this turn belongs to.
    pub conversation_id: ConversationId,
    /// User query text.
    #[serde(default)]
    pub current_query: String,
    /// Candidates grounding the current turn.
    #[serde(default)]
    pub current_cands_ids: Vec<CandidateId>,
    /// Candidates eligible for the next turn.
    #[serde(default)]
    pub possible_next_cands_ids: Vec<CandidateId>,
    /// Candidates actually used by the next turn.
    #[serde(default)]
    pub correct_next_cands_ids: Vec<CandidateId>,
    /// Short answer to the query; empty when the document omits it.
    #[serde(default)]
    pub short_response_to_query: String,
    /// Full conversational answer to the query.
    #[serde(default)]
    pub long_response_to_query: String,
    /// Zero-based index of the turn within its conversation.
    #[serde(default)]
    pub position: usize,
}

/// The dataset document: conversations, candidates, and turns.
///
/// Conversation order is the document order and drives split membership.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DatasetDocument {
    /// Conversation id to ordered turn ids.
    pub conversations: IndexMap<ConversationId, Vec<TurnId>>,
    /// Candidate id to candidate object.
    pub all_candidates: IndexMap<CandidateId, Candidate>,
    /// Turn id to turn object.
    pub qas: IndexMap<TurnId, Turn>,
}

impl DatasetDocument {
    /// Read and parse the dataset document at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let document: Self =
            serde_json::from_slice(&bytes).map_err(|source| DatasetError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(
            path = %path.display(),
            conversations = document.conversations.len(),
            candidates = document.all_candidates.len(),
            turns = document.qas.len(),
            "loaded dataset document"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn conversation_order_follows_document_order() {
        let document: DatasetDocument = serde_json::from_value(json!({
            "conversations": {"zeta": ["zeta_0"], "alpha": ["alpha_0", "alpha_1"]},
            "all_candidates": {},
            "qas": {}
        }))
        .unwrap();
        let ids: Vec<_> = document.conversations.keys().cloned().collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
    }

    #[test]
    fn candidate_optional_fields_default_to_none() {
        let candidate: Candidate = serde_json::from_value(json!({
            "the_type": "paragraph",
            "raw_content": "Paris is the capital of France.",
            "linearized_input": "Paris is the capital of France.",
            "page_key": "Paris"
        }))
        .unwrap();
        assert_eq!(candidate.the_type, CandidateType::Paragraph);
        assert!(candidate.row.is_none());
        assert!(candidate.table_key.is_none());
        assert_eq!(candidate.page_key.as_deref(), Some("Paris"));
    }

    #[test]
    fn turn_responses_default_to_empty() {
        let turn: Turn = serde_json::from_value(json!({
            "conversation_id": "conv_1",
            "current_query": "Who won in 1964?",
            "long_response_to_query": "Anton Geesink won the open category.",
            "position": 0
        }))
        .unwrap();
        assert_eq!(turn.short_response_to_query, "");
        assert_eq!(turn.long_response_to_query, "Anton Geesink won the open category.");
    }

    #[test]
    fn unknown_candidate_type_is_rejected() {
        let result = serde_json::from_value::<Candidate>(json!({"the_type": "image"}));
        assert!(result.is_err());
    }
}
