use std::sync::Arc;
use tracing::{debug, warn};

use crate::constants::links::WIKI_LINK_PREFIX;
use crate::errors::DatasetError;
use crate::page::{PageRecord, PageSource};

/// Resolves a page key to the page's introductory text for link expansion.
#[derive(Clone)]
pub struct LinkResolver {
    pages: Arc<dyn PageSource>,
}

impl LinkResolver {
    /// Create a resolver reading pages from `pages`.
    pub fn new(pages: Arc<dyn PageSource>) -> Self {
        Self { pages }
    }

    /// Introductory text of `page_key`, or an empty string when none was captured.
    ///
    /// Passage pages return their passage. Table pages return the `intro` of the
    /// first table in the collection.
    pub fn intro_text(&self, page_key: &str) -> Result<String, DatasetError> {
        let Some(record) = self.pages.load(page_key)? else {
            warn!(page_key = %page_key, "no page data");
            return Ok(String::new());
        };
        match record {
            PageRecord::Passage(passage) => Ok(passage.passage),
            PageRecord::Tables(tables) => {
                match tables.into_iter().next().and_then(|table| table.intro) {
                    Some(intro) => Ok(intro),
                    None => {
                        warn!(page_key = %page_key, "linked page has no intro on its first table");
                        Ok(String::new())
                    }
                }
            }
        }
    }
}

/// Page key addressed by a cell link target.
///
/// Targets carrying the wiki scheme prefix lose it; other targets are used as-is.
pub fn page_key_from_link(target: &str) -> &str {
    match target.strip_prefix(WIKI_LINK_PREFIX) {
        Some(page_key) => page_key,
        None => {
            debug!(target = %target, "link target without wiki prefix");
            target
        }
    }
}
