use anyhow::{Context, Result};
use clap::Parser;
use pigeonhole::config::{self, RunOptions};
use pigeonhole::{github, pipeline, tui};
use regex::Regex;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "pigeonhole")]
#[command(about = "Terminal client for browsing and acting on GitHub notifications")]
#[command(version)]
struct Args {
    /// Drop rows matching this regular expression
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN")]
    exclude: Option<String>,

    /// Keep only rows matching this regular expression
    #[arg(short = 'f', long = "filter", value_name = "PATTERN")]
    filter: Option<String>,

    /// Maximum number of notifications to fetch (0 means no limit)
    #[arg(short = 'n', long = "num")]
    num: Option<usize>,

    /// Toggle the subscription state of a GitHub URL and exit
    #[arg(short = 'u', long = "url", value_name = "URL")]
    url: Option<String>,

    /// Only notifications you participate in or were mentioned on
    #[arg(short = 'p', long = "participating")]
    participating: bool,

    /// Include notifications already marked as read
    #[arg(short = 'a', long = "all")]
    all: bool,

    /// Print the table once and exit (non-interactive)
    #[arg(short = 's', long = "static")]
    static_output: bool,

    /// Mark all notifications as read and exit
    #[arg(short = 'r', long = "mark-read")]
    mark_read: bool,

    /// Turn recoverable resolver skips into fatal errors
    #[arg(long)]
    debug: bool,

    /// Path to config file
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Initialize configuration
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("ERROR: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so the TUI's alternate screen stays clean.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pigeonhole=info".parse()?),
        )
        .init();

    if args.init {
        return config::init_wizard();
    }

    let opts = build_options(&args)?;
    let config = Arc::new(config::load(args.config.as_deref())?);

    if let Some(url) = &args.url {
        let state = github::actions::toggle_subscription(&config, url).await?;
        println!("{} is now {}", url, state.label());
        return Ok(());
    }

    if args.mark_read {
        if opts.has_pattern() {
            anyhow::bail!("--mark-read would affect rows hidden by --exclude/--filter; refusing");
        }
        github::actions::mark_all_read(&config, chrono::Utc::now()).await?;
        println!("All notifications marked as read.");
        return Ok(());
    }

    // Initial synchronous collection; a fetch failure here is fatal.
    let source = github::GitHubClient::new(Arc::clone(&config), opts.clone());
    let rows = pipeline::collect(&source, opts.requested).await?;
    let filtered = pipeline::filter::apply(
        rows,
        opts.exclude.as_ref(),
        opts.include.as_ref(),
        pipeline::FilterContext {
            is_reload: false,
            has_query: false,
        },
    );

    if args.static_output {
        match filtered {
            pipeline::Filtered::Rows(rows) if rows.is_empty() => println!("Nothing to show"),
            pipeline::Filtered::Rows(rows) => {
                for row in rows {
                    println!("{}", row.display_line());
                }
            }
            pipeline::Filtered::AllCaughtUp => println!("{}", pipeline::filter::ALL_CAUGHT_UP),
        }
        return Ok(());
    }

    tui::run(config, opts, filtered).await
}

fn build_options(args: &Args) -> Result<RunOptions> {
    let exclude = args
        .exclude
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("Invalid --exclude pattern")?;
    let include = args
        .filter
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("Invalid --filter pattern")?;

    Ok(RunOptions {
        requested: args.num.filter(|n| *n > 0),
        participating: args.participating,
        include_read: args.all,
        exclude,
        include,
        debug: args.debug,
    })
}
