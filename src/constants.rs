/// Constants used to locate and interpret per-page files.
pub mod pages {
    /// Extension appended to the hashed page key to form a page filename.
    pub const PAGE_FILE_EXTENSION: &str = "json";
    /// Directory holding per-page files when no override is configured.
    pub const DEFAULT_PAGES_DIR: &str = "../../Conv_generated_json_files/";
}

/// Constants used when turning link targets into page keys.
pub mod links {
    /// Scheme prefix stripped from a cell link target to obtain the page key.
    pub const WIKI_LINK_PREFIX: &str = "/wiki/";
}

/// Constants used while assembling resolved table strings.
pub mod tables {
    /// Separator appended after every (fragment, link) pair in a cell.
    pub const CELL_PAIR_SEPARATOR: &str = "; ";
    /// Separator placed between a fragment and its expanded link text.
    pub const LINK_EXPANSION_SEPARATOR: &str = ": ";
    /// Number of characters dropped from the end of every assembled cell.
    ///
    /// Always two, independent of `CELL_PAIR_SEPARATOR`.
    pub const CELL_TRAILING_STRIP_CHARS: usize = 2;
    /// Separator placed between header fragments.
    pub const HEADER_FRAGMENT_SEPARATOR: &str = " ";
    /// Separator between the page key and ordinal in a table identifier.
    pub const TABLE_ID_SEPARATOR: char = '_';
    /// Default number of resolved tables kept in memory.
    pub const DEFAULT_TABLE_CACHE_CAPACITY: usize = 10;
}

/// Constants used by split boundary computation.
pub mod splits {
    /// Cumulative fraction of conversations assigned to train.
    pub const TRAIN_END: f64 = 0.90;
    /// Cumulative fraction of conversations assigned to train plus validate.
    pub const VALIDATE_END: f64 = 0.95;
}

/// Constants used by dataset loading and configuration.
pub mod dataset {
    /// Dataset document filename when no override is configured.
    pub const DEFAULT_DATASET_PATH: &str = "experimental_data.json";
    /// Environment variable overriding the dataset document path.
    pub const ENV_DATASET_PATH: &str = "HYBRID_DIALOGUE_DATASET";
    /// Environment variable overriding the per-page directory.
    pub const ENV_PAGES_DIR: &str = "HYBRID_DIALOGUE_PAGES_DIR";
    /// Environment variable overriding the resolved-table cache capacity.
    pub const ENV_TABLE_CACHE_CAPACITY: &str = "HYBRID_DIALOGUE_TABLE_CACHE";
}
