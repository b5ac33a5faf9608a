use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scanshelf::logging::{self, LogTarget};
use scanshelf::{output, tui, watch};
use scanshelf_core::config::{self, AppConfig};
use scanshelf_core::tags::{parse_tag_args, parse_tag_list};
use scanshelf_core::Organizer;
use std::path::PathBuf;
use storage::DocumentQuery;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref())?;
    apply_overrides(&mut cfg, cli.dir, cli.db);

    let command = cli.command.unwrap_or(Commands::Browse);
    let target = match command {
        Commands::Browse | Commands::Watch => LogTarget::File,
        _ => LogTarget::Stderr,
    };
    logging::init(&cfg.logging, target)?;

    let organizer = Organizer::from_config(&cfg)
        .await
        .with_context(|| format!("open catalog {}", cfg.database.path))?;

    match command {
        Commands::Browse => tui::launch(organizer).await,
        Commands::Import { json } => {
            let summary = organizer.import().await?;
            output::print_import(&summary, json)
        }
        Commands::Pending { json } => {
            let pending = organizer.pending_files().await?;
            output::print_pending(&pending, json)
        }
        Commands::List {
            tags,
            text,
            untagged,
            json,
        } => {
            let query = list_query(&tags, text, untagged);
            let docs = organizer.browse(&query).await?;
            output::print_documents(&docs, json)
        }
        Commands::Tags { json } => {
            let tags = organizer.tags().await?;
            output::print_tags(&tags, json)
        }
        Commands::Tag { file, tags, json } => {
            let names = parse_tag_args(&tags);
            let doc = organizer.add_tags(&file, &names).await?;
            output::print_document(&doc, json)
        }
        Commands::Untag { file, tags, json } => {
            let names = parse_tag_args(&tags);
            let doc = organizer.remove_tags(&file, &names).await?;
            output::print_document(&doc, json)
        }
        Commands::SetTags { file, tags, json } => {
            let names = parse_tag_args(&tags);
            let doc = organizer.set_tags(&file, &names).await?;
            output::print_document(&doc, json)
        }
        Commands::Preview { file } => {
            let path = organizer.quicklook(&file).await?;
            println!("previewing {}", path.display());
            Ok(())
        }
        Commands::Watch => watch::watch_scan_dir(&organizer).await,
    }
}

#[derive(Parser)]
#[command(name = "scanshelf")]
#[command(about = "Tag and browse scanned documents", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Watched scan directory (overrides scan.dir)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Catalog database path or sqlite: URL (overrides database.path)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive browser (default)
    Browse,
    /// Catalog every new file in the scan directory
    Import {
        #[arg(long)]
        json: bool,
    },
    /// Show files waiting to be imported
    Pending {
        #[arg(long)]
        json: bool,
    },
    /// List documents, optionally filtered
    List {
        /// Comma or space separated tags; a document must carry all of them
        #[arg(long, default_value = "")]
        tags: String,
        /// Case-insensitive filename substring
        #[arg(long)]
        text: Option<String>,
        /// Only documents without tags
        #[arg(long)]
        untagged: bool,
        #[arg(long)]
        json: bool,
    },
    /// List tags with document counts
    Tags {
        #[arg(long)]
        json: bool,
    },
    /// Add tags to a document
    Tag {
        file: String,
        #[arg(required = true)]
        tags: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Remove tags from a document
    Untag {
        file: String,
        #[arg(required = true)]
        tags: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Replace a document's tags; no tags clears them
    SetTags {
        file: String,
        tags: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Open a document in the platform previewer
    Preview { file: String },
    /// Import continuously as scans arrive
    Watch,
}

fn apply_overrides(cfg: &mut AppConfig, dir: Option<PathBuf>, db: Option<String>) {
    if let Some(dir) = dir {
        cfg.scan.dir = dir;
    }
    if let Some(db) = db {
        cfg.database.path = db;
    }
}

fn list_query(tags: &str, text: Option<String>, untagged: bool) -> DocumentQuery {
    let tags = parse_tag_list(&tags.replace(',', " "));
    let mut query = DocumentQuery::with_tags(&tags).untagged(untagged);
    if let Some(text) = text {
        query = query.text(text);
    }
    query
}
