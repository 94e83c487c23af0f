use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

use crate::config::DatasetConfig;
use crate::data::{Candidate, DatasetDocument, Turn};
use crate::errors::DatasetError;
use crate::page::{PageRecord, PageSource, PageStore};
use crate::splits::{SplitCutoffs, SplitLabel, SplitPlan, SplitSummary};
use crate::tables::{ResolvedTable, TableResolver};
use crate::types::{CandidateId, CellText, ConversationId, TurnId};

/// Read-only access to conversations, turns, candidates, and resolved tables.
///
/// The dataset document is loaded once and shared immutably; split boundaries
/// are fixed at construction.
pub struct HybridDialogueDataset {
    document: Arc<DatasetDocument>,
    plan: SplitPlan,
    pages: Arc<dyn PageSource>,
    tables: TableResolver,
}

impl HybridDialogueDataset {
    /// Load the dataset document and page store described by `config`.
    pub fn open(config: &DatasetConfig) -> Result<Self, DatasetError> {
        let document = DatasetDocument::from_path(&config.dataset_path)?;
        let pages: Arc<dyn PageSource> = Arc::new(PageStore::new(&config.pages_dir));
        Self::from_parts(
            Arc::new(document),
            pages,
            config.split,
            config.table_cache_capacity,
        )
    }

    /// Assemble a dataset from an already-loaded document and a page source.
    pub fn from_parts(
        document: Arc<DatasetDocument>,
        pages: Arc<dyn PageSource>,
        split: SplitCutoffs,
        table_cache_capacity: usize,
    ) -> Result<Self, DatasetError> {
        let plan = SplitPlan::new(document.conversations.len(), split)?;
        debug!(
            conversations = plan.total(),
            train = plan.len(SplitLabel::Train),
            validate = plan.len(SplitLabel::Validate),
            test = plan.len(SplitLabel::Test),
            "computed conversation splits"
        );
        Ok(Self {
            tables: TableResolver::with_cache_capacity(Arc::clone(&pages), table_cache_capacity),
            document,
            plan,
            pages,
        })
    }

    /// Shared handle to the underlying document.
    pub fn document(&self) -> Arc<DatasetDocument> {
        Arc::clone(&self.document)
    }

    /// Split boundaries over the conversation ordering.
    pub fn split_plan(&self) -> &SplitPlan {
        &self.plan
    }

    /// Every candidate keyed by id.
    pub fn all_candidates(&self) -> &IndexMap<CandidateId, Candidate> {
        &self.document.all_candidates
    }

    /// Candidate with id `candidate_id`.
    pub fn candidate(&self, candidate_id: &str) -> Result<&Candidate, DatasetError> {
        self.document
            .all_candidates
            .get(candidate_id)
            .ok_or_else(|| DatasetError::UnknownCandidate(candidate_id.to_string()))
    }

    /// Candidates taken from table `table_id`, in document order.
    pub fn candidates_for_table<'a>(
        &'a self,
        table_id: &'a str,
    ) -> impl Iterator<Item = (&'a CandidateId, &'a Candidate)> + 'a {
        self.document
            .all_candidates
            .iter()
            .filter(move |(_, candidate)| candidate.table_key.as_deref() == Some(table_id))
    }

    /// Conversation ids of `split`, in document order.
    pub fn conversation_ids(&self, split: SplitLabel) -> Vec<&ConversationId> {
        self.split_entries(split).map(|(id, _)| id).collect()
    }

    /// Conversations of `split` mapped to their ordered turn ids.
    pub fn conversations(&self, split: SplitLabel) -> IndexMap<&ConversationId, &[TurnId]> {
        self.split_entries(split)
            .map(|(id, turns)| (id, turns.as_slice()))
            .collect()
    }

    /// Turn ids of conversation `conversation_id`.
    pub fn conversation(&self, conversation_id: &str) -> Result<&[TurnId], DatasetError> {
        self.document
            .conversations
            .get(conversation_id)
            .map(Vec::as_slice)
            .ok_or_else(|| DatasetError::UnknownConversation(conversation_id.to_string()))
    }

    /// Split that conversation `conversation_id` belongs to.
    pub fn split_of(&self, conversation_id: &str) -> Option<SplitLabel> {
        let index = self.document.conversations.get_index_of(conversation_id)?;
        self.plan.label_for_index(index)
    }

    /// Turn with id `turn_id`.
    pub fn turn(&self, turn_id: &str) -> Result<&Turn, DatasetError> {
        self.document
            .qas
            .get(turn_id)
            .ok_or_else(|| DatasetError::UnknownTurn(turn_id.to_string()))
    }

    /// Turn ids of `split`, conversation by conversation.
    pub fn turn_ids(&self, split: SplitLabel) -> Vec<&TurnId> {
        self.split_entries(split)
            .flat_map(|(_, turns)| turns.iter())
            .collect()
    }

    /// Turns of `split` keyed by turn id.
    ///
    /// Fails if a conversation references a turn missing from the document.
    pub fn turns(&self, split: SplitLabel) -> Result<IndexMap<&TurnId, &Turn>, DatasetError> {
        self.turn_ids(split)
            .into_iter()
            .map(|turn_id| Ok((turn_id, self.turn(turn_id)?)))
            .collect()
    }

    /// Conversation and turn counts for every split.
    pub fn split_summary(&self) -> Vec<SplitSummary> {
        SplitLabel::ALL
            .into_iter()
            .map(|label| SplitSummary {
                label,
                conversations: self.plan.len(label),
                turns: self.split_entries(label).map(|(_, turns)| turns.len()).sum(),
            })
            .collect()
    }

    /// Resolved table `table_id`, expanding hyperlinks when `expand_links` is set.
    pub fn table(
        &self,
        table_id: &str,
        expand_links: bool,
    ) -> Result<Arc<ResolvedTable>, DatasetError> {
        self.tables.resolve(table_id, expand_links)
    }

    /// Resolved cell at `(row, col)` of `table_id`.
    pub fn cell(
        &self,
        row: usize,
        col: usize,
        table_id: &str,
        expand_links: bool,
    ) -> Result<CellText, DatasetError> {
        self.tables.cell(row, col, table_id, expand_links)
    }

    /// Introductory text of `page_key`; empty when the page was never captured.
    pub fn intro_text(&self, page_key: &str) -> Result<String, DatasetError> {
        self.tables.links().intro_text(page_key)
    }

    /// Raw page content of `page_key`, or `None` when it was never captured.
    pub fn page(&self, page_key: &str) -> Result<Option<PageRecord>, DatasetError> {
        self.pages.load(page_key)
    }

    /// Table resolver backing `table` and `cell`.
    pub fn table_resolver(&self) -> &TableResolver {
        &self.tables
    }

    fn split_entries(
        &self,
        split: SplitLabel,
    ) -> impl Iterator<Item = (&ConversationId, &Vec<TurnId>)> + '_ {
        self.plan
            .range(split)
            .filter_map(move |index| self.document.conversations.get_index(index))
    }
}
