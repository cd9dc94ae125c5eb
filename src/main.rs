use anyhow::Result;
use clap::{Parser, Subcommand};

/// lunchbook - school lunch booking and ordering
#[derive(Parser)]
#[command(name = "lunchbook")]
#[command(about = "School lunch delivery booking and teacher ordering", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Server host address (overrides config file)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run database migrations
    Migrate,
    /// Drop the database file and recreate it with migrations
    Reset,
    /// Print the ordering week of a delivery date
    Anchor {
        /// Delivery date, YYYY-MM-DD
        date: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = lunchbook::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    if let Commands::Anchor { date } = &cli.command {
        return lunchbook::cli::anchor::run(&config, date);
    }

    lunchbook::observability::init_observability(
        "lunchbook",
        env!("CARGO_PKG_VERSION"),
        &config.observability,
    )?;

    match cli.command {
        Commands::Serve { host, port } => lunchbook::cli::server::serve(config, host, port).await,
        Commands::Migrate => lunchbook::db::migrate(&config.database.url).await,
        Commands::Reset => lunchbook::db::reset(&config.database.url).await,
        Commands::Anchor { .. } => Ok(()),
    }
}
