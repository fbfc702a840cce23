//! newsdesk - Regional Indian news from the command line
//!
//! Fetches news from NewsData.io through the cache-first client and prints
//! each response envelope as JSON on stdout. Logs go to stderr.

use std::error::Error;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use newsdesk::cache::CacheManager;
use newsdesk::cli::{parse_category_arg, parse_region_arg, CacheAction, Cli, Command};
use newsdesk::data::taxonomy::{categories_response, regions_response};
use newsdesk::data::{HttpNewsSource, NewsClient};
use newsdesk::feed::{load_home, load_region_sections, HOME_FEATURED_LIMIT};

/// Sets up tracing to stderr, filtered by `RUST_LOG` (default `warn`)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Runs a cache maintenance action
fn run_cache_action(
    cache: Option<CacheManager>,
    action: &CacheAction,
) -> Result<(), Box<dyn Error>> {
    let cache = cache.ok_or("No cache directory available")?;
    match action {
        CacheAction::Info => print_json(&cache.info()),
        CacheAction::Clear { pattern: Some(pattern) } => {
            cache.clear_pattern(pattern);
            info!(pattern = %pattern, "Cleared cache entries");
            print_json(&cache.info())
        }
        CacheAction::Clear { pattern: None } => {
            cache.clear_all_news();
            info!("Cleared all cached news");
            print_json(&cache.info())
        }
        CacheAction::Prune { max_age_hours } => {
            let removed = cache.prune(Duration::from_secs(max_age_hours.saturating_mul(60 * 60)));
            info!(removed, "Pruned cache");
            print_json(&serde_json::json!({ "removed": removed }))
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    debug!(command = ?cli.command, "Parsed CLI arguments");

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Dispatches a parsed command
async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let cache = cli.cache_manager();

    match &cli.command {
        Command::Cache { action } => return run_cache_action(cache, action),
        Command::Regions => return print_json(&regions_response()),
        Command::Categories => return print_json(&categories_response()),
        _ => {}
    }

    let config = cli.client_config()?;
    let client = NewsClient::new(HttpNewsSource::new(&config)?, cache);

    match &cli.command {
        Command::Region { code, page } => {
            let code = parse_region_arg(code)?;
            print_json(&client.news_by_region(code, page.page, page.size).await)
        }
        Command::Category { slug, page } => {
            let slug = parse_category_arg(slug)?;
            print_json(&client.news_by_category(slug, page.page, page.size).await)
        }
        Command::RegionCategory { code, slug, page } => {
            let code = parse_region_arg(code)?;
            let slug = parse_category_arg(slug)?;
            print_json(
                &client
                    .news_by_region_and_category(code, slug, page.page, page.size)
                    .await,
            )
        }
        Command::Breaking => print_json(&client.breaking_news().await),
        Command::Featured { limit } => print_json(&client.featured_news(*limit).await),
        Command::Home => print_json(&load_home(&client, HOME_FEATURED_LIMIT).await),
        Command::Sections { code } => {
            let code = parse_region_arg(code)?;
            print_json(&load_region_sections(&client, code).await)
        }
        Command::Search { query, region } => {
            if let Some(region) = region {
                parse_region_arg(region)?;
            }
            print_json(&client.search_news(query, region.as_deref()).await)
        }
        Command::Cache { .. } | Command::Regions | Command::Categories => Ok(()),
    }
}
