//! Core data models for newsdesk
//!
//! This module contains the canonical article model, the static region and
//! category tables, and the response envelope every fetch returns.

pub mod client;
pub mod normalize;
pub mod queries;
pub mod taxonomy;

pub use client::{
    bias_for_region, ClientConfig, HttpNewsSource, LatestQuery, NewsClient, NewsSource,
    UpstreamError,
};
pub use normalize::{normalize_results, parse_record, ParsedRecord, RawArticle};
pub use taxonomy::{all_categories, all_regions, get_category_by_slug, get_region_by_code};

use serde::{Deserialize, Serialize};

/// A normalized news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Upstream article id, or the article link when the id is missing
    pub id: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    pub author: String,
    /// Publication time as reported upstream
    pub published_at: String,
    pub image_url: String,
    pub category: String,
    pub region: String,
    /// External link to the full story
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub is_breaking: bool,
    /// Estimated reading time in minutes, at least 1
    pub read_time: u32,
    /// Synthetic view count, not a real metric
    pub views: u32,
    pub tags: Vec<String>,
}

/// A selectable region
///
/// Uses `&'static str` so the region table can be a plain static array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub id: &'static str,
    /// Display name, also used to bias search queries
    pub name: &'static str,
    /// Code used in cache keys and CLI arguments
    pub code: &'static str,
}

/// A news category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub slug: &'static str,
}

/// Where the data in a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Fetched from the upstream API
    Network,
    /// Fresh cache hit
    Cache,
    /// Expired cache entry served because the upstream rate limited us
    StaleCache,
    /// Nothing was returned (soft failure) or the data is static
    None,
}

/// Response envelope returned by every fetch
///
/// Failures are reported as empty data with a non-200 status, never as errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub message: String,
    pub status: u16,
    pub origin: Origin,
}

impl<T> ApiResponse<T> {
    /// Builds a successful response
    pub fn ok(data: T, message: impl Into<String>, origin: Origin) -> Self {
        Self {
            data,
            message: message.into(),
            status: 200,
            origin,
        }
    }

    /// Whether the response carries a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl<T: Default> ApiResponse<T> {
    /// Builds a soft-failure response with empty data
    pub fn failure(message: impl Into<String>, status: u16) -> Self {
        Self {
            data: T::default(),
            message: message.into(),
            status,
            origin: Origin::None,
        }
    }
}
