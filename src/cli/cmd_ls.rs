use anyhow::Result;
use atbrowse::format::{format_record_count, local_date_from_timestamp};
use atbrowse::{ListerConfig, RecordLister};
use clap::Args;

#[derive(Args)]
#[command(
    about = "List records in a collection",
    after_help = "Examples:\n  \
            # First page of someone's posts\n  \
            atbrowse ls user.bsky.social app.bsky.feed.post\n\n  \
            # Every follow, oldest first\n  \
            atbrowse ls user.bsky.social app.bsky.graph.follow --all --reverse\n\n  \
            # Only records containing a substring\n  \
            atbrowse ls did:plc:ewvi7nxzyoun6zhxrhs64oiz app.bsky.feed.like -f bafyrei\n\n  \
            # Full record JSON, one per line\n  \
            atbrowse ls user.bsky.social app.bsky.feed.post --json"
)]
pub struct LsCommand {
    /// Repository DID or handle
    pub repo: String,

    /// Collection NSID (e.g. app.bsky.feed.post)
    pub collection: String,

    /// Fetch every page instead of only the first
    #[arg(long)]
    pub all: bool,

    /// Oldest first
    #[arg(long)]
    pub reverse: bool,

    /// Substring filter over record JSON and enrichment notes
    #[arg(short = 'f', long)]
    pub filter: Option<String>,

    /// Records per page (max 100)
    #[arg(long, default_value = "100")]
    pub limit: usize,

    /// Access token enabling profile enrichment (or ATBROWSE_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Skip profile enrichment even when eligible
    #[arg(long)]
    pub no_enrich: bool,

    /// Print full record JSON instead of a summary line
    #[arg(long)]
    pub json: bool,
}

pub async fn run(cmd: LsCommand, quiet: bool) -> Result<()> {
    let token = super::utils::token_or_env(cmd.token);
    let session = super::utils::create_session(&cmd.repo, token.as_deref()).await?;

    let config = ListerConfig {
        page_limit: cmd.limit,
        auto_continue: cmd.all,
        enrich: !cmd.no_enrich,
        ..Default::default()
    };
    let mut lister = RecordLister::new(session, &cmd.collection, config);
    lister.set_reverse(cmd.reverse);
    lister.fetch().await?;

    let filter = cmd.filter.unwrap_or_default();
    let store = lister.store();
    let now_ms = chrono::Utc::now().timestamp_millis();

    for index in store.visible_indices(&filter) {
        let record = &store.records()[index];
        if cmd.json {
            println!("{}", record.raw_value());
            continue;
        }

        let mut line = record.rkey.clone();
        if let Some(ts) = record.timestamp
            && ts <= now_ms
        {
            line.push_str(&format!("  {}", local_date_from_timestamp(ts)));
        }
        if let Some(note) = &record.note {
            line.push_str(&format!("  [{}]", note));
        }
        println!("{}", line);
    }

    if !quiet {
        eprintln!("{}", format_record_count(store.len()));
        if store.has_more() {
            eprintln!("more records remain; rerun with --all");
        }
    }

    Ok(())
}
