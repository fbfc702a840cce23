//! Normalization of upstream article records
//!
//! Upstream records are untyped JSON whose fields may be missing or carry the
//! wrong type. Parsing happens in two steps: `parse_record` turns a JSON value
//! into a typed `RawArticle` (or rejects it as `Malformed` when it is not an
//! object at all), and `normalize` applies the defaulting rules that produce
//! the canonical `Article`.

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde_json::{Map, Value};
use tracing::warn;

use super::Article;

/// Image used when an article has none
pub const DEFAULT_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1586339949916-3e9457bef6d3?w=800";

const DEFAULT_TITLE: &str = "No title available";
const DEFAULT_CONTENT: &str = "No content available";
const DEFAULT_AUTHOR: &str = "Unknown";
const DEFAULT_CATEGORY: &str = "General";
const DEFAULT_REGION: &str = "India";

/// Number of title characters kept when a summary has to be synthesized
const SUMMARY_TITLE_CHARS: usize = 150;

const WORDS_PER_MINUTE: usize = 200;

/// Synthetic view counts are drawn from this range
const VIEWS_MIN: u32 = 100;
const VIEWS_MAX: u32 = 2100;

/// An upstream record with every field checked against its expected type
///
/// String fields are `None` when absent or not a string. List fields keep only
/// their string entries and are empty when absent or not an array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawArticle {
    pub article_id: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub pub_date: Option<String>,
    pub image_url: Option<String>,
    pub keywords: Vec<String>,
    pub creator: Vec<String>,
    pub category: Vec<String>,
    pub country: Vec<String>,
}

/// Outcome of validating one upstream record
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRecord {
    Ok(RawArticle),
    /// The record was not a JSON object
    Malformed,
}

fn string_field(record: &Map<String, Value>, field: &str) -> Option<String> {
    record.get(field).and_then(Value::as_str).map(str::to_string)
}

fn string_list_field(record: &Map<String, Value>, field: &str) -> Vec<String> {
    match record.get(field) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Validates a single upstream record
pub fn parse_record(value: &Value) -> ParsedRecord {
    let Some(record) = value.as_object() else {
        return ParsedRecord::Malformed;
    };

    ParsedRecord::Ok(RawArticle {
        article_id: string_field(record, "article_id"),
        title: string_field(record, "title"),
        link: string_field(record, "link"),
        description: string_field(record, "description"),
        content: string_field(record, "content"),
        pub_date: string_field(record, "pubDate"),
        image_url: string_field(record, "image_url"),
        keywords: string_list_field(record, "keywords"),
        creator: string_list_field(record, "creator"),
        category: string_list_field(record, "category"),
        country: string_list_field(record, "country"),
    })
}

/// Estimated reading time in whole minutes, never below 1
pub fn read_time(content: &str) -> u32 {
    let words = content.split(' ').count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

fn summarize(description: Option<&str>, title: &str) -> String {
    match description {
        Some(description) if !description.is_empty() => description.to_string(),
        _ => {
            let truncated: String = title.chars().take(SUMMARY_TITLE_CHARS).collect();
            format!("{}...", truncated)
        }
    }
}

/// Builds an `Article` from a validated record
///
/// `now` is used as the publication time when the record has none.
pub fn normalize_with<R: Rng + ?Sized>(raw: RawArticle, now: &str, rng: &mut R) -> Article {
    let title = raw.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let content = raw
        .content
        .or_else(|| raw.description.clone())
        .unwrap_or_else(|| DEFAULT_CONTENT.to_string());
    let summary = summarize(raw.description.as_deref(), &title);
    let id = raw
        .article_id
        .or_else(|| raw.link.clone())
        .unwrap_or_default();

    Article {
        id,
        summary,
        author: raw
            .creator
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        published_at: raw.pub_date.unwrap_or_else(|| now.to_string()),
        image_url: raw
            .image_url
            .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
        category: raw
            .category
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        region: raw
            .country
            .into_iter()
            .next()
            .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        url: raw.link,
        is_breaking: false,
        read_time: read_time(&content),
        views: rng.random_range(VIEWS_MIN..VIEWS_MAX),
        tags: raw.keywords,
        title,
        content,
    }
}

/// Builds an `Article` using the current time and the thread-local RNG
pub fn normalize(raw: RawArticle) -> Article {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    normalize_with(raw, &now, &mut rand::rng())
}

/// Normalizes every record of an upstream `results` array
///
/// Records that are not objects are skipped; everything else is kept with
/// per-field defaults.
pub fn normalize_results(results: &[Value]) -> Vec<Article> {
    results
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match parse_record(value) {
            ParsedRecord::Ok(raw) => Some(normalize(raw)),
            ParsedRecord::Malformed => {
                warn!(index, "Skipping malformed upstream record");
                None
            }
        })
        .collect()
}
