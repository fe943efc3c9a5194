use anyhow::Result;
use clap::Args;

#[derive(Args)]
#[command(
    about = "Resolve a handle or DID to its DID and PDS endpoint",
    after_help = "Examples:\n  \
            atbrowse resolve user.bsky.social\n  \
            atbrowse resolve did:plc:ewvi7nxzyoun6zhxrhs64oiz"
)]
pub struct ResolveCommand {
    /// Handle or DID
    pub identifier: String,
}

pub async fn run(cmd: ResolveCommand) -> Result<()> {
    let (did, pds) = super::utils::resolve_repo(&cmd.identifier).await?;
    println!("{}\t{}", did, pds);
    Ok(())
}
