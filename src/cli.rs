//! Command-line interface parsing for newsdesk
//!
//! Global options configure the upstream API and the cache; subcommands map
//! one-to-one onto the fetch client's endpoints plus cache maintenance.
//! The API key and base URL can also come from the environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::cache::CacheManager;
use crate::data::client::{ClientConfig, DEFAULT_PAGE_SIZE, NEWSDATA_BASE_URL};
use crate::data::{get_category_by_slug, get_region_by_code};
use crate::feed::HOME_FEATURED_LIMIT;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The region code is not in the region table
    #[error("Invalid region: '{0}'. Valid regions: all, in, punjab, delhi, mumbai, kerala")]
    InvalidRegion(String),

    /// The category slug is not in the category table
    #[error("Invalid category: '{0}'. Valid categories: home, top-news, politics, sports, entertainment, business, technology")]
    InvalidCategory(String),

    /// A network command was run without an API key
    #[error("Missing API key: pass --api-key or set NEWSDATA_API_KEY")]
    MissingApiKey,
}

/// newsdesk - Regional Indian news with a local cache
#[derive(Parser, Debug)]
#[command(name = "newsdesk")]
#[command(about = "Regional Indian news from NewsData.io, cached locally")]
#[command(version)]
pub struct Cli {
    /// NewsData.io API key
    #[arg(long, env = "NEWSDATA_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Base URL of the NewsData.io API
    #[arg(long, env = "NEWSDATA_BASE_URL", default_value = NEWSDATA_BASE_URL, global = true)]
    pub base_url: String,

    /// Timeout for each upstream request, in seconds
    #[arg(long, default_value_t = 10, global = true)]
    pub timeout_secs: u64,

    /// Directory for cache files (defaults to the XDG cache directory)
    #[arg(long, value_name = "DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Bypass the cache entirely
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Page selection shared by listing commands
#[derive(Args, Debug, Clone, Copy)]
pub struct PageArgs {
    /// Page number; each page uses a different search phrase
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Articles per page (at most 10)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub size: u32,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the selectable regions
    Regions,
    /// List the news categories
    Categories,
    /// News for a region
    Region {
        /// Region code (e.g. punjab)
        code: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// News for a category
    Category {
        /// Category slug (e.g. top-news)
        slug: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// News for a category within a region
    RegionCategory {
        code: String,
        slug: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Breaking news
    Breaking,
    /// Latest headlines
    Featured {
        #[arg(long, default_value_t = HOME_FEATURED_LIMIT)]
        limit: u32,
    },
    /// Breaking and featured news together
    Home,
    /// Every category for a region
    Sections {
        code: String,
    },
    /// Free-text search
    Search {
        query: String,
        /// Bias results toward a region
        #[arg(long)]
        region: Option<String>,
    },
    /// Inspect or clear the local cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show cached keys and total size
    Info,
    /// Remove cached news (or only keys containing a pattern)
    Clear {
        #[arg(long)]
        pattern: Option<String>,
    },
    /// Remove entries older than the given age, fresh or not
    Prune {
        #[arg(long, default_value_t = 24)]
        max_age_hours: u64,
    },
}

/// Checks a region argument against the region table
pub fn parse_region_arg(code: &str) -> Result<&'static str, CliError> {
    get_region_by_code(code)
        .map(|region| region.code)
        .ok_or_else(|| CliError::InvalidRegion(code.to_string()))
}

/// Checks a category argument against the category table
pub fn parse_category_arg(slug: &str) -> Result<&'static str, CliError> {
    get_category_by_slug(slug)
        .map(|category| category.slug)
        .ok_or_else(|| CliError::InvalidCategory(slug.to_string()))
}

impl Cli {
    /// Builds the upstream client settings
    pub fn client_config(&self) -> Result<ClientConfig, CliError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(CliError::MissingApiKey)?;

        Ok(ClientConfig::new(api_key)
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }

    /// Builds the cache manager, honouring `--cache-dir` and `--no-cache`
    pub fn cache_manager(&self) -> Option<CacheManager> {
        if self.no_cache {
            return None;
        }
        match &self.cache_dir {
            Some(dir) => Some(CacheManager::with_dir(dir.clone())),
            None => CacheManager::new(),
        }
    }
}
