use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use reindex::config::{self, Filters};

#[derive(Parser)]
#[command(
    name = "reindex",
    version,
    about = "Re-save documents in searchable collections so search indexing hooks fire again"
)]
struct Cli {
    /// Database file [env: REINDEX_DATABASE, default: app.db]
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Disable coloured output
    #[arg(long, global = true)]
    no_color: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Touch every document of every searchable collection (default)
    #[command(name = "search.reindex")]
    Reindex(ReindexArgs),
    /// List collections with their search flag and document count
    Collections,
}

#[derive(Args)]
struct ReindexArgs {
    /// Collections to reindex (comma-separated) [env: REINDEX_COLLECTION]
    #[arg(long)]
    collection: Option<String>,
    /// Document IDs to reindex (comma-separated) [env: REINDEX_ID]
    #[arg(long)]
    id: Option<String>,
    /// Only reindex documents with an ID after this one [env: REINDEX_FROM]
    #[arg(long)]
    from: Option<String>,
    /// Documents fetched per cursor page
    #[arg(long, default_value_t = config::DEFAULT_BATCH_SIZE, value_parser = parse_batch_size)]
    batch_size: usize,
}

impl Default for ReindexArgs {
    fn default() -> Self {
        Self {
            collection: None,
            id: None,
            from: None,
            batch_size: config::DEFAULT_BATCH_SIZE,
        }
    }
}

fn parse_batch_size(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("batch size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn run(cli: Cli) -> reindex::error::Result<()> {
    let db_path = config::resolve_database(cli.db);
    match cli.command.unwrap_or_else(|| Commands::Reindex(ReindexArgs::default())) {
        Commands::Reindex(args) => {
            let filters = Filters::resolve(args.collection, args.id, args.from);
            reindex::commands::reindex::run(&db_path, &filters, args.batch_size)
        }
        Commands::Collections => reindex::commands::collections::run(&db_path),
    }
}


fn main() {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }
    if let Err(e) = run(cli) {
        eprintln!("error: {e} [{}]", e.code());
        std::process::exit(1);
    }
}
