use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

#[derive(Parser)]
#[command(
    name = "custdev",
    version,
    about = "Simulate how audience segments answer a customer-development survey"
)]
struct Cli {
    /// DuckDB database file (`:memory:` for a throwaway store).
    #[arg(long, global = true, env = "CUSTDEV_DB", default_value = "custdev.duckdb")]
    db: PathBuf,

    /// Chat-completion API key. Without it every step uses the built-in fallbacks.
    #[arg(long, global = true, env = "GLM_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Chat-completion endpoint.
    #[arg(long, global = true, env = "GLM_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a survey from a JSON definition
    Create {
        #[arg(long)]
        file: PathBuf,
    },
    /// Generate the audience segments for a survey
    Segment {
        #[arg(long)]
        survey: i64,
        /// Override the survey's niche in the prompt
        #[arg(long)]
        niche: Option<String>,
    },
    /// Simulate 1000 respondents across the survey's segments
    Simulate {
        #[arg(long)]
        survey: i64,
    },
    /// Show results, segment comparison and insights
    Dashboard {
        #[arg(long)]
        survey: i64,
        /// Segment ids to compare (default: all)
        #[arg(long, value_delimiter = ',')]
        compare: Vec<i64>,
    },
    /// Print the flattened per-option rows as a table
    ExportRows {
        #[arg(long)]
        survey: i64,
    },
    /// Report store and generator status
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("custdev v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let ctx = commands::Context::new(&cli.db, cli.api_key, cli.api_url)?;

    match cli.command {
        Command::Create { file } => commands::create(ctx, &file),
        Command::Segment { survey, niche } => commands::segment(ctx, survey, niche).await,
        Command::Simulate { survey } => commands::simulate(ctx, survey).await,
        Command::Dashboard { survey, compare } => {
            commands::dashboard(ctx, survey, &compare).await
        }
        Command::ExportRows { survey } => commands::export_rows(ctx, survey),
        Command::Health => commands::health(ctx),
    }
}
