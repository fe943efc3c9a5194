use anyhow::{Result, anyhow, bail};
use atbrowse::format::format_record_count;
use atbrowse::{ListerConfig, RecordLister, SelectionModel, mutation};
use clap::Args;

#[derive(Args)]
#[command(
    about = "Delete records matching a filter, in bounded batches",
    after_help = "Examples:\n  \
            # Show what would be deleted\n  \
            atbrowse purge user.bsky.social app.bsky.graph.follow -f missing\n\n  \
            # Actually delete\n  \
            atbrowse purge user.bsky.social app.bsky.graph.follow -f missing --yes\n\n  \
            # Delete every record of a collection\n  \
            atbrowse purge user.bsky.social app.bsky.feed.like --yes"
)]
pub struct PurgeCommand {
    /// Repository DID or handle (must be the token's account)
    pub repo: String,

    /// Collection NSID
    pub collection: String,

    /// Substring filter; only matching records are selected for deletion
    #[arg(short = 'f', long)]
    pub filter: Option<String>,

    /// Access token (or ATBROWSE_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Apply the deletes instead of printing what would be deleted
    #[arg(long)]
    pub yes: bool,
}

pub async fn run(cmd: PurgeCommand, quiet: bool) -> Result<()> {
    let Some(token) = super::utils::token_or_env(cmd.token) else {
        bail!("purge requires an access token (--token or ATBROWSE_TOKEN)");
    };
    let session = super::utils::create_session(&cmd.repo, Some(&token)).await?;

    // Fetch the whole collection before selecting; enrichment notes
    // participate in the filter, so "-f missing" selects dead follows
    let config = ListerConfig {
        auto_continue: true,
        ..Default::default()
    };
    let mut lister = RecordLister::new(session, &cmd.collection, config);
    lister.fetch().await?;

    let filter = cmd.filter.unwrap_or_default();
    let mut selection = SelectionModel::new();
    selection.set_batch_mode(lister.store_mut(), true);
    selection.select_all_visible(lister.store_mut(), &filter);

    let marked = lister.store().marked_count();
    if marked == 0 {
        if !quiet {
            eprintln!("no records match");
        }
        return Ok(());
    }

    if !cmd.yes {
        for record in lister.store().records().iter().filter(|r| r.marked) {
            println!("{}", record.uri);
        }
        eprintln!(
            "would delete {}; rerun with --yes to apply",
            format_record_count(marked)
        );
        return Ok(());
    }

    let report = mutation::delete_marked(lister.session(), lister.store(), &cmd.collection).await;
    for chunk in &report.chunks {
        match &chunk.error {
            None => {
                if !quiet {
                    eprintln!("chunk {}: {} deleted", chunk.index, chunk.size);
                }
            }
            Some(e) => eprintln!("chunk {}: failed: {}", chunk.index, e),
        }
    }

    if let Some(e) = report.first_error() {
        return Err(anyhow!(
            "batch delete halted after {} of {} records: {}",
            report.applied(),
            marked,
            e
        ));
    }

    if !quiet {
        eprintln!(
            "deleted {}; rerun ls to refresh the view",
            format_record_count(report.applied())
        );
    }
    Ok(())
}
