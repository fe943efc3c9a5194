use anyhow::Result;
use clap::{Parser, Subcommand};

// CLI Commands (cmd_ prefix)
mod cmd_ls;
mod cmd_purge;
mod cmd_resolve;

// Helper modules (no cmd_ prefix)
mod logger;
mod utils;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(bin_name = "atbrowse")]
#[command(version = VERSION)]
#[command(about = concat!("atbrowse v", env!("CARGO_PKG_VERSION"), " - AT Protocol record browser"))]
#[command(long_about = concat!(
    "atbrowse v", env!("CARGO_PKG_VERSION"), " - AT Protocol record browser\n\n",
    "Lists, filters, and batch-deletes the records of a repository\n",
    "collection over XRPC, with profile status enrichment for follow\n",
    "and list-item collections."
))]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress progress output
    #[arg(long, global = true)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Ls(cmd_ls::LsCommand),
    Purge(cmd_purge::PurgeCommand),
    Resolve(cmd_resolve::ResolveCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logger::init_logger(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Ls(cmd) => cmd_ls::run(cmd, cli.quiet).await?,
        Commands::Purge(cmd) => cmd_purge::run(cmd, cli.quiet).await?,
        Commands::Resolve(cmd) => cmd_resolve::run(cmd).await?,
    }

    Ok(())
}
