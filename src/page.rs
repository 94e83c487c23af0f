use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::DatasetError;
use crate::hash::page_file_name;
use crate::types::{LinkTarget, TableId};

/// One table cell: parallel text fragments and link targets.
///
/// Stored on disk as `[[fragment, ...], [link_target, ...]]`. Null entries and a
/// missing link list are read as empty targets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<Vec<Option<String>>>")]
pub struct Cell {
    /// Text fragments in display order.
    pub fragments: Vec<String>,
    /// Link target for each fragment; an empty string means no link.
    pub links: Vec<LinkTarget>,
}

impl Cell {
    /// Build a cell from fragment and link lists.
    pub fn new<F, L>(fragments: F, links: L) -> Self
    where
        F: IntoIterator,
        F::Item: Into<String>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            links: links.into_iter().map(Into::into).collect(),
        }
    }

    /// Iterate `(fragment, link)` pairs up to the shorter of the two lists.
    ///
    /// Extra fragments or links are dropped.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fragments
            .iter()
            .zip(self.links.iter())
            .map(|(fragment, link)| (fragment.as_str(), link.as_str()))
    }
}

impl From<Vec<Vec<Option<String>>>> for Cell {
    fn from(parts: Vec<Vec<Option<String>>>) -> Self {
        let mut parts = parts.into_iter();
        let fragments = parts
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        let links = parts
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        Self { fragments, links }
    }
}

/// One captured table inside a page's table collection.
#[derive(Clone, Debug, Deserialize)]
pub struct TableRecord {
    /// Identifier of the form `{page_key}_{ordinal}`.
    pub uid: TableId,
    /// One cell per column.
    #[serde(default)]
    pub header: Vec<Cell>,
    /// Rows of cells.
    #[serde(default)]
    pub data: Vec<Vec<Cell>>,
    /// Introductory paragraph of the page, by capture convention set on the first table.
    #[serde(default)]
    pub intro: Option<String>,
}

/// Free-text page payload.
#[derive(Clone, Debug, Deserialize)]
pub struct Passage {
    /// The page's text.
    pub passage: String,
}

/// Loaded page content, discriminated once at load time.
#[derive(Clone, Debug)]
pub enum PageRecord {
    /// Page captured as free text only.
    Passage(Passage),
    /// Page captured as an ordered table collection.
    Tables(Vec<TableRecord>),
}

impl PageRecord {
    /// Parse raw page JSON: a top-level array is a table collection, anything else a passage.
    pub fn from_json_value(value: Value) -> Result<Self, serde_json::Error> {
        if value.is_array() {
            Ok(PageRecord::Tables(serde_json::from_value(value)?))
        } else {
            Ok(PageRecord::Passage(serde_json::from_value(value)?))
        }
    }

    /// True when the page holds free text rather than tables.
    pub fn is_passage_only(&self) -> bool {
        matches!(self, PageRecord::Passage(_))
    }

    /// Table collection, if the page has one.
    pub fn tables(&self) -> Option<&[TableRecord]> {
        match self {
            PageRecord::Tables(tables) => Some(tables),
            PageRecord::Passage(_) => None,
        }
    }
}

/// Lookup of page content by page key.
///
/// `Ok(None)` means the page was never captured; it is not an error.
pub trait PageSource: Send + Sync {
    /// Load the page named `page_key`.
    fn load(&self, page_key: &str) -> Result<Option<PageRecord>, DatasetError>;
}

/// Filesystem page store reading `{sha256(page_key)}.json` files under a root directory.
#[derive(Clone, Debug)]
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the page files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the file that would hold `page_key`.
    pub fn path_for(&self, page_key: &str) -> PathBuf {
        self.root.join(page_file_name(page_key))
    }
}

impl PageSource for PageStore {
    fn load(&self, page_key: &str) -> Result<Option<PageRecord>, DatasetError> {
        let path = self.path_for(page_key);
        if !path.is_file() {
            debug!(page_key = %page_key, path = %path.display(), "page file absent");
            return Ok(None);
        }
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let record = serde_json::from_slice::<Value>(&bytes)
            .and_then(PageRecord::from_json_value)
            .map_err(|source| DatasetError::Json {
                path: path.clone(),
                source,
            })?;
        debug!(
            page_key = %page_key,
            path = %path.display(),
            passage_only = record.is_passage_only(),
            "loaded page"
        );
        Ok(Some(record))
    }
}
