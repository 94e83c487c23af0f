//! Table lookup and resolution.
//!
//! A table identifier names its page (`{page_key}_{ordinal}`). Resolution loads
//! that page, finds the table with a matching `uid`, and renders every cell to a
//! display string, optionally replacing hyperlinks with the linked page's intro.
//! Results are memoized per `(table_id, expand_links)` in a bounded LRU cache.

use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::cache::LruCache;
use crate::constants::tables::{
    CELL_PAIR_SEPARATOR, CELL_TRAILING_STRIP_CHARS, DEFAULT_TABLE_CACHE_CAPACITY,
    HEADER_FRAGMENT_SEPARATOR, LINK_EXPANSION_SEPARATOR, TABLE_ID_SEPARATOR,
};
use crate::errors::DatasetError;
use crate::links::{LinkResolver, page_key_from_link};
use crate::page::{Cell, PageRecord, PageSource, TableRecord};
use crate::types::{CellText, TableId};

/// Split `table_id` into its page key and ordinal.
///
/// The ordinal is everything after the last `_` and must be non-empty ASCII digits.
/// It is returned as written, so ordinals wider than any integer type still parse.
pub fn parse_table_id(table_id: &str) -> Result<(&str, &str), DatasetError> {
    let malformed = || DatasetError::MalformedTableId {
        table_id: table_id.to_string(),
    };
    let (page_key, ordinal) = table_id.rsplit_once(TABLE_ID_SEPARATOR).ok_or_else(malformed)?;
    if ordinal.is_empty() || !ordinal.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(malformed());
    }
    Ok((page_key, ordinal))
}

/// Display name of a header cell: fragments joined by spaces, links ignored.
pub fn resolve_header(cell: &Cell) -> String {
    cell.fragments.join(HEADER_FRAGMENT_SEPARATOR)
}

/// Drop the last `count` characters of `text` (all of it if shorter).
pub fn strip_trailing_chars(text: &mut String, count: usize) {
    if count == 0 {
        return;
    }
    let cut = text
        .char_indices()
        .rev()
        .nth(count - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    text.truncate(cut);
}

/// A fully resolved table: header names plus the grid of cell strings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTable {
    table_id: TableId,
    expand_links: bool,
    headers: Vec<String>,
    grid: Vec<Vec<CellText>>,
}

impl ResolvedTable {
    /// Identifier this table was resolved from.
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    /// Whether link targets were expanded into intro text.
    pub fn expand_links(&self) -> bool {
        self.expand_links
    }

    /// Resolved header names, one per column.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Resolved rows of cell strings.
    pub fn grid(&self) -> &[Vec<CellText>] {
        &self.grid
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.grid.len()
    }

    /// Cell at `(row, col)`, if present.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.grid.get(row)?.get(col).map(String::as_str)
    }

    /// Column-named view over the grid.
    pub fn view(&self) -> TableView<'_> {
        TableView {
            headers: &self.headers,
            grid: &self.grid,
        }
    }
}

/// Tabular view addressing cells by resolved header name.
///
/// Rows whose width differs from the header count are kept as-is; lookups past a
/// row's end yield `None`. With duplicate header names the first column wins.
#[derive(Clone, Copy, Debug)]
pub struct TableView<'a> {
    headers: &'a [String],
    grid: &'a [Vec<CellText>],
}

impl<'a> TableView<'a> {
    /// Column names.
    pub fn headers(&self) -> &'a [String] {
        self.headers
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    /// Returns `true` when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Position of the first column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Every row's value in the column named `name`.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&'a str>>> {
        let idx = self.column_index(name)?;
        Some(
            self.grid
                .iter()
                .map(|row| row.get(idx).map(String::as_str))
                .collect(),
        )
    }

    /// `(header, value)` pairs of row `idx`, in column order.
    pub fn row(&self, idx: usize) -> Option<Vec<(&'a str, Option<&'a str>)>> {
        let row = self.grid.get(idx)?;
        Some(
            self.headers
                .iter()
                .enumerate()
                .map(|(col, header)| (header.as_str(), row.get(col).map(String::as_str)))
                .collect(),
        )
    }

    /// Value of row `idx` in the column named `name`.
    pub fn value(&self, idx: usize, name: &str) -> Option<&'a str> {
        let col = self.column_index(name)?;
        self.grid.get(idx)?.get(col).map(String::as_str)
    }
}

type CacheKey = (TableId, bool);

/// Resolves table identifiers into `ResolvedTable`s with per-key memoization.
///
/// The cache lock is held across lookup-or-compute so each key is computed at
/// most once while its entry is live.
pub struct TableResolver {
    pages: Arc<dyn PageSource>,
    links: LinkResolver,
    cache: Mutex<LruCache<CacheKey, Arc<ResolvedTable>>>,
}

impl TableResolver {
    /// Create a resolver with the default cache capacity.
    pub fn new(pages: Arc<dyn PageSource>) -> Self {
        Self::with_cache_capacity(pages, DEFAULT_TABLE_CACHE_CAPACITY)
    }

    /// Create a resolver caching at most `capacity` resolved tables.
    pub fn with_cache_capacity(pages: Arc<dyn PageSource>, capacity: usize) -> Self {
        Self {
            links: LinkResolver::new(Arc::clone(&pages)),
            pages,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Link resolver used for cell expansion.
    pub fn links(&self) -> &LinkResolver {
        &self.links
    }

    /// Resolve `table_id`, expanding hyperlinked fragments when `expand_links` is set.
    pub fn resolve(
        &self,
        table_id: &str,
        expand_links: bool,
    ) -> Result<Arc<ResolvedTable>, DatasetError> {
        let (page_key, _) = parse_table_id(table_id)?;
        let key = (table_id.to_string(), expand_links);
        let mut cache = self.cache.lock().expect("table cache poisoned");
        if let Some(hit) = cache.get(&key) {
            debug!(table_id = %table_id, expand_links, "table cache hit");
            return Ok(Arc::clone(hit));
        }
        debug!(table_id = %table_id, expand_links, "table cache miss");
        let table = self.find_table(page_key, table_id)?;
        let resolved = Arc::new(self.build(&table, expand_links)?);
        if let Some(((evicted_id, evicted_expand), _)) = cache.insert(key, Arc::clone(&resolved)) {
            debug!(
                table_id = %evicted_id,
                expand_links = evicted_expand,
                "evicted resolved table"
            );
        }
        Ok(resolved)
    }

    /// Resolved string of the cell at `(row, col)` in `table_id`.
    pub fn cell(
        &self,
        row: usize,
        col: usize,
        table_id: &str,
        expand_links: bool,
    ) -> Result<CellText, DatasetError> {
        let table = self.resolve(table_id, expand_links)?;
        table
            .cell(row, col)
            .map(str::to_string)
            .ok_or_else(|| DatasetError::CellOutOfRange {
                table_id: table_id.to_string(),
                row,
                col,
            })
    }

    /// Number of live cache entries.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().expect("table cache poisoned").len()
    }

    /// Drop every cached table.
    pub fn clear_cache(&self) {
        self.cache.lock().expect("table cache poisoned").clear();
    }

    fn find_table(&self, page_key: &str, table_id: &str) -> Result<TableRecord, DatasetError> {
        let tables = match self.pages.load(page_key)? {
            Some(PageRecord::Tables(tables)) => tables,
            Some(PageRecord::Passage(_)) => {
                return Err(DatasetError::PassageWhereTableExpected {
                    page_key: page_key.to_string(),
                });
            }
            None => {
                return Err(DatasetError::PageNotFound {
                    page_key: page_key.to_string(),
                });
            }
        };
        tables
            .into_iter()
            .find(|table| table.uid == table_id)
            .ok_or_else(|| DatasetError::TableNotFound {
                table_id: table_id.to_string(),
                page_key: page_key.to_string(),
            })
    }

    fn build(&self, table: &TableRecord, expand_links: bool) -> Result<ResolvedTable, DatasetError> {
        let grid = table
            .data
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| self.resolve_cell(cell, expand_links))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        let headers = table.header.iter().map(resolve_header).collect();
        Ok(ResolvedTable {
            table_id: table.uid.clone(),
            expand_links,
            headers,
            grid,
        })
    }

    fn resolve_cell(&self, cell: &Cell, expand_links: bool) -> Result<CellText, DatasetError> {
        let mut text = self.assemble_cell(cell, expand_links)?;
        strip_trailing_chars(&mut text, CELL_TRAILING_STRIP_CHARS);
        Ok(text)
    }

    /// Cell string before the trailing strip: every pair followed by the pair separator.
    fn assemble_cell(&self, cell: &Cell, expand_links: bool) -> Result<CellText, DatasetError> {
        let mut text = String::new();
        for (fragment, link) in cell.pairs() {
            text.push_str(fragment);
            if expand_links && !link.is_empty() {
                let intro = self.links.intro_text(page_key_from_link(link))?;
                text.push_str(LINK_EXPANSION_SEPARATOR);
                text.push_str(&intro);
            }
            text.push_str(CELL_PAIR_SEPARATOR);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Passage;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingPages {
        pages: HashMap<String, PageRecord>,
        loads: AtomicUsize,
    }

    impl CountingPages {
        fn with_page(mut self, key: &str, record: PageRecord) -> Self {
            self.pages.insert(key.to_string(), record);
            self
        }
    }

    impl PageSource for CountingPages {
        fn load(&self, page_key: &str) -> Result<Option<PageRecord>, DatasetError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.pages.get(page_key).cloned())
        }
    }

    fn passage(text: &str) -> PageRecord {
        PageRecord::Passage(Passage {
            passage: text.to_string(),
        })
    }

    fn people_table() -> TableRecord {
        TableRecord {
            uid: "People_0".to_string(),
            header: vec![
                Cell::new(["Full", "name"], ["/wiki/X", ""]),
                Cell::new(["Notes"], [""]),
            ],
            data: vec![
                vec![
                    Cell::new(["A", "B"], ["/wiki/X", ""]),
                    Cell::new(["plain"], [""]),
                ],
                vec![
                    Cell::new(["Zoë"], ["/wiki/Missing"]),
                    Cell::new(["dropped", "extra"], [""]),
                ],
            ],
            intro: Some("People listed.".to_string()),
        }
    }

    fn pages() -> Arc<CountingPages> {
        Arc::new(
            CountingPages::default()
                .with_page("People", PageRecord::Tables(vec![people_table()]))
                .with_page("X", passage("hello"))
                .with_page("Essay", passage("Just text.")),
        )
    }

    #[test]
    fn parse_table_id_accepts_page_keys_with_underscores() {
        assert_eq!(
            parse_table_id("New_York_City_12").unwrap(),
            ("New_York_City", "12")
        );
    }

    #[test]
    fn ordinals_wider_than_usize_still_resolve() {
        let table_id = "Huge_184467440737095516160";
        assert_eq!(
            parse_table_id(table_id).unwrap(),
            ("Huge", "184467440737095516160")
        );
        let mut table = people_table();
        table.uid = table_id.to_string();
        let pages = CountingPages::default().with_page("Huge", PageRecord::Tables(vec![table]));
        let resolver = TableResolver::new(Arc::new(pages));
        let resolved = resolver.resolve(table_id, false).unwrap();
        assert_eq!(resolved.table_id(), table_id);
        assert_eq!(resolved.cell(0, 1), Some("plain"));
    }

    #[test]
    fn parse_table_id_rejects_non_numeric_ordinals() {
        for table_id in ["pagekey_abc", "pagekey_", "pagekey", "page_-1", "page_1a"] {
            let err = parse_table_id(table_id).unwrap_err();
            assert!(
                matches!(err, DatasetError::MalformedTableId { .. }),
                "{table_id} should be malformed"
            );
        }
    }

    #[test]
    fn link_expansion_matches_documented_assembly() {
        let resolver = TableResolver::new(pages());
        let cell = Cell::new(["A", "B"], ["/wiki/X", ""]);
        assert_eq!(resolver.assemble_cell(&cell, true).unwrap(), "A: hello; B; ");
        assert_eq!(resolver.resolve_cell(&cell, true).unwrap(), "A: hello; B");
        assert_eq!(resolver.resolve_cell(&cell, false).unwrap(), "A; B");
    }

    #[test]
    fn trailing_strip_counts_characters_not_bytes() {
        let mut text = "Zoë; ".to_string();
        strip_trailing_chars(&mut text, 2);
        assert_eq!(text, "Zoë");

        let mut text = "éé".to_string();
        strip_trailing_chars(&mut text, 3);
        assert_eq!(text, "");

        let mut empty = String::new();
        strip_trailing_chars(&mut empty, 2);
        assert_eq!(empty, "");
    }

    #[test]
    fn resolve_builds_grid_and_headers() {
        let resolver = TableResolver::new(pages());
        let table = resolver.resolve("People_0", true).unwrap();
        assert_eq!(table.table_id(), "People_0");
        assert!(table.expand_links());
        assert_eq!(table.headers(), ["Full name", "Notes"]);
        assert_eq!(
            table.grid(),
            [
                vec!["A: hello; B".to_string(), "plain".to_string()],
                vec!["Zoë: ".to_string(), "dropped".to_string()],
            ]
        );
    }

    #[test]
    fn headers_ignore_link_expansion() {
        let resolver = TableResolver::new(pages());
        let expanded = resolver.resolve("People_0", true).unwrap();
        let plain = resolver.resolve("People_0", false).unwrap();
        assert_eq!(expanded.headers(), plain.headers());
        assert!(expanded.headers().iter().all(|h| !h.contains("hello")));
    }

    #[test]
    fn repeated_resolve_reuses_cached_table() {
        let pages = pages();
        let resolver = TableResolver::new(pages.clone());
        let first = resolver.resolve("People_0", false).unwrap();
        let loads = pages.loads.load(Ordering::SeqCst);
        let second = resolver.resolve("People_0", false).unwrap();
        assert_eq!(pages.loads.load(Ordering::SeqCst), loads);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.cached_len(), 1);
    }

    #[test]
    fn expand_flag_is_part_of_the_cache_key() {
        let pages = pages();
        let resolver = TableResolver::new(pages.clone());
        resolver.resolve("People_0", false).unwrap();
        let loads = pages.loads.load(Ordering::SeqCst);
        resolver.resolve("People_0", true).unwrap();
        assert!(pages.loads.load(Ordering::SeqCst) > loads);
        assert_eq!(resolver.cached_len(), 2);
    }

    #[test]
    fn evicted_tables_are_recomputed_identically() {
        let pages = pages();
        let resolver = TableResolver::with_cache_capacity(pages.clone(), 1);
        let first = resolver.resolve("People_0", false).unwrap();
        resolver.resolve("People_0", true).unwrap();
        let loads = pages.loads.load(Ordering::SeqCst);
        let again = resolver.resolve("People_0", false).unwrap();
        assert_eq!(pages.loads.load(Ordering::SeqCst), loads + 1);
        assert_eq!(*first, *again);
    }

    #[test]
    fn contract_violations_are_reported() {
        let resolver = TableResolver::new(pages());
        assert!(matches!(
            resolver.resolve("pagekey_abc", true).unwrap_err(),
            DatasetError::MalformedTableId { .. }
        ));
        assert!(matches!(
            resolver.resolve("People_999", true).unwrap_err(),
            DatasetError::TableNotFound { .. }
        ));
        assert!(matches!(
            resolver.resolve("Essay_0", true).unwrap_err(),
            DatasetError::PassageWhereTableExpected { .. }
        ));
        let err = resolver.resolve("Nowhere_0", true).unwrap_err();
        assert!(matches!(err, DatasetError::PageNotFound { .. }));
        assert!(err.is_contract_violation());
        assert_eq!(resolver.cached_len(), 0);
    }

    #[test]
    fn cell_lookup_checks_bounds() {
        let resolver = TableResolver::new(pages());
        assert_eq!(resolver.cell(0, 1, "People_0", true).unwrap(), "plain");
        assert!(matches!(
            resolver.cell(5, 0, "People_0", true).unwrap_err(),
            DatasetError::CellOutOfRange { row: 5, col: 0, .. }
        ));
    }

    #[test]
    fn view_addresses_columns_by_header_name() {
        let resolver = TableResolver::new(pages());
        let table = resolver.resolve("People_0", false).unwrap();
        let view = table.view();
        assert_eq!(view.len(), 2);
        assert_eq!(view.column("Notes").unwrap(), vec![Some("plain"), Some("dropped")]);
        assert_eq!(view.value(0, "Full name"), Some("A; B"));
        assert_eq!(
            view.row(1).unwrap(),
            vec![("Full name", Some("Zoë")), ("Notes", Some("dropped"))]
        );
        assert!(view.column("Missing").is_none());
    }

    #[test]
    fn ragged_rows_are_kept_in_the_view() {
        let table = TableRecord {
            uid: "Ragged_0".to_string(),
            header: vec![Cell::new(["Year"], [""]), Cell::new(["City"], [""])],
            data: vec![
                vec![Cell::new(["1964"], [""])],
                vec![
                    Cell::new(["1972"], [""]),
                    Cell::new(["Munich"], [""]),
                    Cell::new(["extra"], [""]),
                ],
            ],
            intro: None,
        };
        let pages = CountingPages::default().with_page("Ragged", PageRecord::Tables(vec![table]));
        let resolver = TableResolver::new(Arc::new(pages));
        let table = resolver.resolve("Ragged_0", false).unwrap();
        let view = table.view();
        assert_eq!(view.column("City").unwrap(), vec![None, Some("Munich")]);
        assert_eq!(view.row(0).unwrap(), vec![("Year", Some("1964")), ("City", None)]);
        assert_eq!(table.cell(1, 2), Some("extra"));
    }
}
