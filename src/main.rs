//! # CPE Dictionary CLI (`cpedict`)
//!
//! The `cpedict` binary downloads the NVD CPE dictionary, normalizes every
//! entry and stores it for title lookup.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cpedict init` | Create the SQLite database and schema |
//! | `cpedict fetch` | Download (or read) the feed and store its records |
//! | `cpedict lookup "<title>"` | Find records by exact or substring title |
//! | `cpedict stats` | Show how many records are stored |
//!
//! ## Examples
//!
//! ```bash
//! cpedict init --config ./config/cpedict.toml
//! cpedict fetch --proxy http://proxy.internal:3128
//! cpedict fetch --file ./official-cpe-dictionary_v2.3.xml.gz --chunk-size 1000
//! cpedict lookup "nginx" --like --json
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cpe_dictionary::config;
use cpe_dictionary::ingest::{self, FetchOverrides};
use cpe_dictionary::logging;
use cpe_dictionary::lookup;
use cpe_dictionary::migrate;
use cpe_dictionary::stats;

/// CPE Dictionary CLI: ingest the NVD CPE dictionary and look up titles.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. When the file does not exist, built-in defaults are used.
#[derive(Parser)]
#[command(
    name = "cpedict",
    about = "Ingest the NVD CPE dictionary and look up CPE names by title",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/cpedict.toml")]
    config: PathBuf,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent. Does nothing for the `memory` dialect.
    Init,

    /// Ingest the CPE dictionary.
    ///
    /// Downloads the configured feed, gunzips and parses it, normalizes
    /// every CPE name and inserts the en-US records in chunks.
    Fetch {
        /// Read the feed from a local `.xml` or `.xml.gz` file instead.
        #[arg(long)]
        file: Option<PathBuf>,

        /// HTTP proxy for the download (overrides `feed.proxy`).
        #[arg(long)]
        proxy: Option<String>,

        /// Records per insert transaction (overrides `ingest.chunk_size`).
        #[arg(long, value_parser = clap::value_parser!(usize))]
        chunk_size: Option<usize>,

        /// Skip items whose CPE name is malformed instead of aborting.
        #[arg(long)]
        skip_malformed: bool,
    },

    /// Look up stored records by title.
    Lookup {
        /// Title to search for.
        title: String,

        /// Match titles containing the text instead of equal to it.
        #[arg(long)]
        like: bool,

        /// Print records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show store statistics.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let cfg = config::load_config_or_default(&cli.config)?;

    match cli.command {
        Commands::Init => {
            if migrate::run_migrations(&cfg.db).await? {
                println!("Database initialized successfully.");
            } else {
                println!("Nothing to initialize for dialect '{}'.", cfg.db.dialect);
            }
        }
        Commands::Fetch {
            file,
            proxy,
            chunk_size,
            skip_malformed,
        } => {
            if chunk_size == Some(0) {
                anyhow::bail!("--chunk-size must be > 0");
            }
            let overrides = FetchOverrides {
                proxy,
                chunk_size,
                skip_malformed,
            };
            ingest::run_fetch(&cfg, file.as_deref(), &overrides).await?;
        }
        Commands::Lookup { title, like, json } => {
            lookup::run_lookup(&cfg, &title, like, json).await?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
    }

    Ok(())
}
