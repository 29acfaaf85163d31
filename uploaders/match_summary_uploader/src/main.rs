use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use match_summary_uploader::{
    config::SummaryConfig,
    document_store::{DocumentStore, PgDocumentStore},
    pipeline,
    replay_decoder::ExternalParser,
    storage::S3ObjectStore,
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the last match's summary and upload it with its goal clips
    Run {
        /// Replay to parse instead of the configured one
        #[arg(short, long)]
        replay: Option<PathBuf>,

        /// Print the assembled record without uploading or deleting anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a stored document
    Show {
        /// Collection name, e.g. "matches"
        collection: String,
        /// Document key, e.g. a match start epoch
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = SummaryConfig::from_env();

    match cli.command {
        Commands::Run { replay, dry_run } => {
            let replay = replay.unwrap_or_else(|| config.paths.replay.clone());
            let decoder = ExternalParser::new(&config.paths.parser);

            if dry_run {
                let record = pipeline::assemble(&config, &replay, &decoder)
                    .await
                    .context("Failed to assemble match record")?;
                println!("{}", serde_json::to_string_pretty(&record)?);
                return Ok(());
            }

            let objects = S3ObjectStore::new(&config.storage).context("Object storage is not configured")?;
            let documents = PgDocumentStore::connect(config.database_url()?)
                .await
                .context("Failed to connect to document database")?;

            let summary = pipeline::run(&config, &replay, &decoder, &objects, &documents)
                .await
                .with_context(|| format!("Failed to process replay {:?}", replay))?;
            info!(
                "Uploaded match {} with {} clips",
                summary.match_id, summary.clips_uploaded
            );
        }
        Commands::Show { collection, key } => {
            let documents = PgDocumentStore::connect(config.database_url()?)
                .await
                .context("Failed to connect to document database")?;
            match documents.get_document(&collection, &key).await? {
                Some(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
                None => anyhow::bail!("No document {}/{}", collection, key),
            }
        }
    }

    Ok(())
}
