//! # xkcd-search
//!
//! Looks up xkcd comics by keyword against a local full-text index, pulling
//! missing comic metadata from xkcd.com before the first search.
//!
//! ```bash
//! # Find a comic (updates the index first if none exists yet)
//! xkcd-search search woodpecker
//!
//! # Refresh the index explicitly, at most one request every 250ms
//! xkcd-search -l 250 update
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use xkcd_search::{Resolution, UpdateReport, XkcdConfig, XkcdSearch};

#[derive(Parser)]
#[command(
    name = "xkcd-search",
    version,
    about = "Search xkcd comics by keyword using a local full-text index"
)]
struct Cli {
    /// Directory where the index is stored [default: <config dir>/xkcdsearch]
    #[arg(short = 'c', long = "cachedir", global = true)]
    cache_dir: Option<PathBuf>,

    /// Minimum milliseconds between two requests to xkcd.com during an update
    #[arg(short = 'l', long = "rate-limit", global = true, default_value_t = 100)]
    rate_limit_ms: u64,

    /// Maximum number of requests in flight at once (unbounded when omitted)
    #[arg(long, global = true)]
    max_in_flight: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the comic best matching the given terms
    Search {
        /// Search terms, joined with spaces
        #[arg(required = true)]
        terms: Vec<String>,
    },

    /// Fetch comics missing from the index
    Update,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("xkcd_search={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Result<XkcdConfig> {
    let mut builder = XkcdConfig::builder()
        .rate_interval(Duration::from_millis(cli.rate_limit_ms))
        .max_in_flight(cli.max_in_flight);
    if let Some(dir) = &cli.cache_dir {
        builder = builder.index_dir(dir);
    }
    builder.build().context("invalid command line options")
}

/// Cancel `token` on the first Ctrl-C
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, committing comics fetched so far");
            token.cancel();
        }
    });
}

/// Text printed for a search result. Finding nothing is a normal outcome.
fn render_resolution(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Found(hit) => format!(
            "Title    : {}\nNumber   : {}\nURL      : {}\nImageURL : {}\nAlt      : {}",
            hit.title,
            hit.num,
            hit.page_url(),
            hit.img.as_deref().unwrap_or_default(),
            hit.alt
        ),
        Resolution::NotFound => resolution.to_string(),
    }
}

fn print_report(report: &UpdateReport) {
    println!("Latest     : {}", report.latest);
    println!("Indexed    : {} new, {} total", report.indexed, report.total_documents);
    if !report.failed.is_empty() {
        let failed: Vec<String> = report.failed.iter().map(u32::to_string).collect();
        println!("Failed     : {}", failed.join(", "));
    }
    if report.cancelled {
        println!("Cancelled  : update interrupted, run again to continue");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = build_config(&cli)?;
    let mut xkcd = XkcdSearch::new(config)?;

    match cli.command {
        Commands::Search { terms } => {
            let terms = terms.join(" ");
            let resolution = xkcd
                .search(&terms)
                .await
                .with_context(|| format!("search for '{terms}' failed"))?;
            println!("{}", render_resolution(&resolution));
            Ok(())
        }
        Commands::Update => {
            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());
            let report = xkcd.update_with_cancel(&cancel).await?;
            print_report(&report);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xkcd_search::ComicHit;

    #[test]
    fn not_found_prints_plain_message() {
        assert_eq!(render_resolution(&Resolution::NotFound), "not found");
    }

    #[test]
    fn found_prints_comic_details() {
        let rendered = render_resolution(&Resolution::Found(ComicHit {
            num: 614,
            title: "Woodpecker".to_string(),
            alt: "If you don't have an extension cord I can get that too.".to_string(),
            img: Some("https://imgs.xkcd.com/comics/woodpecker.png".to_string()),
            score: 1.0,
        }));

        assert_eq!(
            rendered.lines().collect::<Vec<_>>(),
            vec![
                "Title    : Woodpecker",
                "Number   : 614",
                "URL      : https://xkcd.com/614",
                "ImageURL : https://imgs.xkcd.com/comics/woodpecker.png",
                "Alt      : If you don't have an extension cord I can get that too.",
            ]
        );
    }

    #[test]
    fn search_command_parses_terms() {
        let cli = Cli::try_parse_from(["xkcd-search", "-l", "0", "search", "bobby", "tables"]).unwrap();
        assert_eq!(cli.rate_limit_ms, 0);
        match cli.command {
            Commands::Search { terms } => assert_eq!(terms.join(" "), "bobby tables"),
            Commands::Update => panic!("expected search command"),
        }
    }
}
