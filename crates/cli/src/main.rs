//! # vecsql: A CLI for natural-language queries
//!
//! Runs one query through the pipeline and prints the result, or backfills the
//! embedding column of a table. Configuration is loaded the same way the server
//! loads it.

mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use vecsql::{ingest::backfill_embeddings, QueryRequest};
use vecsql_server::{config::get_config, state::build_app_state};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a config.yml file
    #[arg(long, global = true, env = "VECSQL_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a natural-language question against the database
    Query(QueryArgs),
    /// Compute and store embeddings for the rows of a table
    Embed(EmbedArgs),
}

#[derive(Parser, Debug)]
struct QueryArgs {
    /// The question, e.g. "find products similar to an office chair"
    text: String,
    /// Number of rows a similarity search returns
    #[arg(long)]
    top_k: Option<u32>,
}

#[derive(Parser, Debug)]
struct EmbedArgs {
    /// The table whose embedding column to fill (products or orders)
    #[arg(long, default_value = "products")]
    table: String,
    /// Only embed rows that do not have an embedding yet
    #[arg(long)]
    only_missing: bool,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so that stdout carries only results.
    let subscriber = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = get_config(cli.config.as_deref())?;
    let app_state = build_app_state(config).await?;

    match cli.command {
        Commands::Query(args) => {
            let mut request = QueryRequest::new(args.text);
            request.top_k = args.top_k;

            let report = app_state.pipeline.run(request).await;
            info!(state = ?report.state(), "Query finished.");
            print!("{}", render::render_report(&report));
            if report.error().is_some() {
                std::process::exit(1);
            }
        }
        Commands::Embed(args) => {
            let summary = backfill_embeddings(
                app_state.sqlite_provider.as_ref(),
                &app_state.document_embedder,
                &args.table,
                args.only_missing,
            )
            .await?;

            println!(
                "Embedded {} of {} rows in '{}'.",
                summary.embedded, summary.scanned, summary.table
            );
            for failure in &summary.failed {
                eprintln!("  row {}: {}", failure.id, failure.error);
            }
        }
    }

    Ok(())
}
