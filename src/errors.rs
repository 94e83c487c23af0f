use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{CandidateId, ConversationId, PageKey, TableId, TurnId};

/// Error type for dataset loading, page parsing, and table resolution failures.
///
/// A page file that is simply absent is not an error; see `PageSource::load`.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to parse '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("malformed table id '{table_id}': expected '{{page_key}}_{{ordinal}}'")]
    MalformedTableId { table_id: TableId },
    #[error("page '{page_key}' has no captured data")]
    PageNotFound { page_key: PageKey },
    #[error("page '{page_key}' holds a passage where a table collection was expected")]
    PassageWhereTableExpected { page_key: PageKey },
    #[error("table '{table_id}' is not present in page '{page_key}'")]
    TableNotFound { table_id: TableId, page_key: PageKey },
    #[error("cell ({row}, {col}) is outside table '{table_id}'")]
    CellOutOfRange {
        table_id: TableId,
        row: usize,
        col: usize,
    },
    #[error("unknown conversation '{0}'")]
    UnknownConversation(ConversationId),
    #[error("unknown turn '{0}'")]
    UnknownTurn(TurnId),
    #[error("unknown candidate '{0}'")]
    UnknownCandidate(CandidateId),
    #[error("unknown split '{0}': expected train, validate, or test")]
    UnknownSplit(String),
}

impl DatasetError {
    /// True for errors caused by caller/dataset inconsistency rather than IO or parsing.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            DatasetError::MalformedTableId { .. }
                | DatasetError::PageNotFound { .. }
                | DatasetError::PassageWhereTableExpected { .. }
                | DatasetError::TableNotFound { .. }
        )
    }
}
