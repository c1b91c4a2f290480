//! KMT reaction crawler CLI
//!
//! Crawls reaction listings for one or more DOIs and writes the combined
//! records as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser};
use kmt_crawler::{
    error::Result,
    models::Config,
    pipeline::{CrawlOrchestrator, TargetSource, collect_targets},
    services::{HttpFetcher, NameResolver, PageFetcher, debug_list},
    storage::{LocalStorage, RecordStorage},
    utils::http,
};

/// KMT reaction crawler
#[derive(Parser, Debug)]
#[command(
    name = "kmt-crawler",
    version,
    about = "Crawl KMT reaction listings by DOI and name their solvents"
)]
struct Cli {
    /// DOIs, listing URLs or archive pages to crawl
    targets: Vec<String>,

    /// DOI to crawl (repeatable)
    #[arg(long = "doi", value_name = "DOI")]
    dois: Vec<String>,

    /// Archive page whose DOIs are crawled (repeatable)
    #[arg(long = "archive", value_name = "URL")]
    archives: Vec<String>,

    /// Maximum number of DOIs taken from each later archive page
    #[arg(long, value_name = "N")]
    archive_limit: Vec<String>,

    /// Maximum listing pages per DOI
    #[arg(long, value_name = "N")]
    max_pages: Option<String>,

    /// Output file for the combined records
    #[arg(long, value_name = "PATH")]
    combined_out: Option<String>,

    /// Print listing page diagnostics for the first DOI and exit
    #[arg(long)]
    debug_list: bool,

    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "kmt.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// A target-related argument and where it appeared on the command line.
enum TargetArg<'a> {
    Doi(&'a str),
    Positional(&'a str),
    Archive(&'a str),
    ArchiveLimit(&'a str),
}

/// Values of `id` paired with their command-line indices.
fn indexed<'a>(matches: &'a ArgMatches, id: &str) -> Vec<(usize, &'a str)> {
    let indices = matches.indices_of(id).into_iter().flatten();
    let values = matches
        .get_many::<String>(id)
        .into_iter()
        .flatten()
        .map(String::as_str);
    indices.zip(values).collect()
}

/// Target sources in command-line order.
///
/// `--archive-limit` caps the archives that follow it, up to the next
/// `--archive-limit`.
fn ordered_sources(matches: &ArgMatches) -> Vec<TargetSource> {
    let mut args: Vec<(usize, TargetArg<'_>)> = Vec::new();
    args.extend(indexed(matches, "dois").into_iter().map(|(i, v)| (i, TargetArg::Doi(v))));
    args.extend(
        indexed(matches, "targets")
            .into_iter()
            .map(|(i, v)| (i, TargetArg::Positional(v))),
    );
    args.extend(
        indexed(matches, "archives")
            .into_iter()
            .map(|(i, v)| (i, TargetArg::Archive(v))),
    );
    args.extend(
        indexed(matches, "archive_limit")
            .into_iter()
            .map(|(i, v)| (i, TargetArg::ArchiveLimit(v))),
    );
    args.sort_by_key(|(index, _)| *index);

    let mut limit = None;
    let mut sources = Vec::new();
    for (_, arg) in args {
        match arg {
            TargetArg::Doi(doi) => sources.push(TargetSource::Direct(doi.to_string())),
            TargetArg::Positional(arg) => sources.push(TargetSource::from_arg(arg, limit)),
            TargetArg::Archive(url) => sources.push(TargetSource::archive(url, limit)),
            TargetArg::ArchiveLimit(value) => limit = parse_count("archive-limit", Some(value)),
        }
    }
    sources
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Parse a numeric flag, ignoring values that are not counts.
fn parse_count(flag: &str, value: Option<&str>) -> Option<usize> {
    let value = value?;
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            log::warn!("Ignoring --{} {:?}: not a count", flag, value);
            None
        }
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    if let Some(out) = &cli.combined_out {
        config.output.combined_out = out.clone();
    }
    let max_pages =
        parse_count("max-pages", cli.max_pages.as_deref()).unwrap_or(config.crawler.max_pages);

    let config = Arc::new(config);
    let client = http::create_client(&config.crawler)?;

    if cli.debug_list {
        let doi = cli.dois.first().unwrap_or(&config.crawler.default_doi);
        return debug_list(&client, &config.crawler, doi).await;
    }

    let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(client.clone()));
    let targets = collect_targets(
        fetcher.as_ref(),
        &ordered_sources(&matches),
        &config.crawler.default_doi,
    )
    .await;

    let resolver = NameResolver::from_config(&config.resolver, client);
    let orchestrator = CrawlOrchestrator::new(Arc::clone(&config), fetcher, resolver)?;
    let report = orchestrator.run_report(&targets, max_pages).await;

    if report.records.is_empty() {
        log::warn!("No records collected, nothing written");
        return Ok(());
    }

    let storage = LocalStorage::from_config(&config.output);
    let summary = storage.write_records(&report.records).await?;
    println!("{}", summary.path.display());
    println!("{}", summary.count);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_is_lenient() {
        assert_eq!(parse_count("max-pages", Some("3")), Some(3));
        assert_eq!(parse_count("max-pages", Some(" 7 ")), Some(7));
        assert_eq!(parse_count("max-pages", Some("many")), None);
        assert_eq!(parse_count("max-pages", Some("-1")), None);
        assert_eq!(parse_count("max-pages", None), None);
    }

    fn sources(args: &[&str]) -> Vec<TargetSource> {
        let matches = Cli::command().get_matches_from(args.iter().copied());
        ordered_sources(&matches)
    }

    #[test]
    fn test_sources_keep_command_line_order() {
        assert_eq!(
            sources(&["kmt-crawler", "--doi", "10.1/A", "10.1/B", "--doi", "10.1/C"]),
            vec![
                TargetSource::Direct("10.1/A".to_string()),
                TargetSource::Direct("10.1/B".to_string()),
                TargetSource::Direct("10.1/C".to_string()),
            ]
        );
    }

    #[test]
    fn test_interleaved_sources() {
        assert_eq!(
            sources(&[
                "kmt-crawler",
                "https://kmt.example/data/reaction/doi/10.1/p/start/0",
                "--archive",
                "https://kmt.example/archive/2023",
                "--doi",
                "10.1/d",
                "https://kmt.example/archive/2024",
            ]),
            vec![
                TargetSource::Direct(
                    "https://kmt.example/data/reaction/doi/10.1/p/start/0".to_string()
                ),
                TargetSource::archive("https://kmt.example/archive/2023", None),
                TargetSource::Direct("10.1/d".to_string()),
                TargetSource::archive("https://kmt.example/archive/2024", None),
            ]
        );
    }

    #[test]
    fn test_archive_limit_applies_to_later_archives() {
        assert_eq!(
            sources(&[
                "kmt-crawler",
                "--archive",
                "https://kmt.example/archive/a",
                "--archive-limit",
                "2",
                "--archive",
                "https://kmt.example/archive/b",
                "https://kmt.example/archive/c",
                "--archive-limit",
                "lots",
                "--archive",
                "https://kmt.example/archive/d",
            ]),
            vec![
                TargetSource::archive("https://kmt.example/archive/a", None),
                TargetSource::archive("https://kmt.example/archive/b", Some(2)),
                TargetSource::archive("https://kmt.example/archive/c", Some(2)),
                TargetSource::archive("https://kmt.example/archive/d", None),
            ]
        );
    }

    #[test]
    fn test_numeric_flags_accept_text() {
        let cli = Cli::parse_from(["kmt-crawler", "--max-pages", "ten", "--debug-list"]);
        assert_eq!(cli.max_pages.as_deref(), Some("ten"));
        assert!(cli.debug_list);
        assert_eq!(cli.config, PathBuf::from("kmt.toml"));
    }
}
