use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, ValueEnum, error::ErrorKind};

use crate::config::DatasetConfig;
use crate::dataset::HybridDialogueDataset;
use crate::splits::SplitLabel;
use crate::tables::ResolvedTable;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SplitArg {
    Train,
    Validate,
    Test,
}

impl From<SplitArg> for SplitLabel {
    fn from(value: SplitArg) -> Self {
        match value {
            SplitArg::Train => SplitLabel::Train,
            SplitArg::Validate => SplitLabel::Validate,
            SplitArg::Test => SplitLabel::Test,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "table_inspector",
    disable_help_subcommand = true,
    about = "Inspect conversations, turns, and resolved tables",
    long_about = "Print split summaries, list a split's conversations, show a turn, or render a table with hyperlinked cells expanded into the linked page's intro text.",
    after_help = "Paths default to HYBRID_DIALOGUE_DATASET / HYBRID_DIALOGUE_PAGES_DIR when set, then to the conventional locations."
)]
/// CLI for `table_inspector`.
///
/// Common usage:
/// - Split sizes: `table_inspector --dataset data.json`
/// - One split's conversations: `--split validate`
/// - A turn: `--turn conv_00042_3`
/// - A table: `--table Nelson_Mandela_0 [--no-expand-links] [--cell 2,1]`
struct TableInspectorCli {
    #[arg(long, value_name = "PATH", help = "Dataset JSON document")]
    dataset: Option<PathBuf>,
    #[arg(long = "pages-dir", value_name = "PATH", help = "Directory of per-page JSON files")]
    pages_dir: Option<PathBuf>,
    #[arg(
        long = "cache-capacity",
        value_name = "N",
        help = "Number of resolved tables kept in memory"
    )]
    cache_capacity: Option<usize>,
    #[arg(long, value_enum, help = "List conversations of this split")]
    split: Option<SplitArg>,
    #[arg(long, value_name = "TURN_ID", help = "Print one turn")]
    turn: Option<String>,
    #[arg(long, value_name = "TABLE_ID", help = "Render a resolved table")]
    table: Option<String>,
    #[arg(
        long,
        value_name = "ROW,COL",
        value_parser = parse_cell_arg,
        requires = "table",
        help = "Print a single cell of --table"
    )]
    cell: Option<(usize, usize)>,
    #[arg(
        long = "no-expand-links",
        help = "Keep hyperlinked fragments as plain text"
    )]
    no_expand_links: bool,
}

/// Run the `table_inspector` demo with `args_iter` (program name excluded).
pub fn run_table_inspector<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<TableInspectorCli, _>(
        std::iter::once("table_inspector".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let mut config = DatasetConfig::from_env()?;
    if let Some(path) = cli.dataset {
        config.dataset_path = path;
    }
    if let Some(dir) = cli.pages_dir {
        config.pages_dir = dir;
    }
    if let Some(capacity) = cli.cache_capacity {
        config.table_cache_capacity = capacity;
    }
    let dataset = HybridDialogueDataset::open(&config)?;
    let expand_links = !cli.no_expand_links;

    if let Some(table_id) = cli.table {
        match cli.cell {
            Some((row, col)) => {
                println!("{}", dataset.cell(row, col, &table_id, expand_links)?);
            }
            None => print_table(&*dataset.table(&table_id, expand_links)?),
        }
    } else if let Some(turn_id) = cli.turn {
        let turn = dataset.turn(&turn_id)?;
        println!(
            "turn {turn_id} (conversation {}, position {})",
            turn.conversation_id, turn.position
        );
        println!("  query: {}", turn.current_query);
        println!("  short response: {}", turn.short_response_to_query);
        println!("  long response: {}", turn.long_response_to_query);
        println!("  current candidates: {}", turn.current_cands_ids.join(", "));
        println!(
            "  correct next candidates: {}",
            turn.correct_next_cands_ids.join(", ")
        );
    } else if let Some(split) = cli.split {
        let label = SplitLabel::from(split);
        let conversations = dataset.conversations(label);
        println!("{label}: {} conversations", conversations.len());
        for (conversation_id, turns) in conversations {
            println!("  {conversation_id} ({} turns)", turns.len());
        }
    } else {
        for summary in dataset.split_summary() {
            println!(
                "{:<8} conversations={:<6} turns={}",
                summary.label, summary.conversations, summary.turns
            );
        }
        println!("candidates={}", dataset.all_candidates().len());
    }

    Ok(())
}

fn print_table(table: &ResolvedTable) {
    println!(
        "table {} ({} rows, links {})",
        table.table_id(),
        table.row_count(),
        if table.expand_links() { "expanded" } else { "plain" }
    );
    println!("{}", table.headers().join(" | "));
    for row in table.grid() {
        println!("{}", row.join(" | "));
    }
}

fn parse_cell_arg(raw: &str) -> Result<(usize, usize), String> {
    let (row, col) = raw
        .split_once(',')
        .ok_or_else(|| "--cell expects ROW,COL".to_string())?;
    let row = row
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid row '{}': must be a non-negative integer", row.trim()))?;
    let col = col
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid column '{}': must be a non-negative integer", col.trim()))?;
    Ok((row, col))
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_arg_parses_row_and_column() {
        assert_eq!(parse_cell_arg("2, 5").unwrap(), (2, 5));
        assert!(parse_cell_arg("2").unwrap_err().contains("ROW,COL"));
        assert!(parse_cell_arg("x,1").unwrap_err().contains("invalid row"));
        assert!(parse_cell_arg("1,-1").unwrap_err().contains("invalid column"));
    }

    #[test]
    fn help_exits_cleanly() {
        run_table_inspector(["--help".to_string()].into_iter()).unwrap();
    }

    #[test]
    fn cell_requires_table() {
        let result = parse_cli::<TableInspectorCli, _>(["table_inspector", "--cell", "0,0"]);
        assert!(result.is_err());
    }

    #[test]
    fn flags_map_to_cli_fields() {
        let cli = parse_cli::<TableInspectorCli, _>([
            "table_inspector",
            "--table",
            "Medals_0",
            "--cell",
            "1,2",
            "--no-expand-links",
            "--split",
            "validate",
        ])
        .unwrap()
        .unwrap();
        assert_eq!(cli.table.as_deref(), Some("Medals_0"));
        assert_eq!(cli.cell, Some((1, 2)));
        assert!(cli.no_expand_links);
        assert_eq!(SplitLabel::from(cli.split.unwrap()), SplitLabel::Validate);
    }
}
