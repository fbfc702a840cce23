//! Fan-out loaders for the screens that need several feeds at once
//!
//! The home screen loads breaking and featured news together, and a region
//! screen loads one listing per category. Requests run concurrently and the
//! caller gets every envelope back, failed or not.
//!
//! Responses can arrive out of order when the selection changes quickly, so
//! `Generation` hands out tickets and lets callers drop anything that is no
//! longer current.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::debug;

use crate::data::client::DEFAULT_PAGE_SIZE;
use crate::data::{all_categories, ApiResponse, Article, Category, NewsClient, NewsSource};

/// Number of featured articles shown on the home screen
pub const HOME_FEATURED_LIMIT: u32 = 10;

/// Breaking and featured news loaded together
#[derive(Debug, Clone, Serialize)]
pub struct HomeFeed {
    pub breaking: ApiResponse<Vec<Article>>,
    pub featured: ApiResponse<Vec<Article>>,
}

/// One category's listing on a region screen
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub category: Category,
    pub news: ApiResponse<Vec<Article>>,
}

/// Loads breaking and featured news concurrently
pub async fn load_home<S: NewsSource>(client: &NewsClient<S>, featured_limit: u32) -> HomeFeed {
    let (breaking, featured) = tokio::join!(
        client.breaking_news(),
        client.featured_news(featured_limit)
    );
    HomeFeed { breaking, featured }
}

/// Loads the first page of every category for a region, concurrently
///
/// Sections come back in category order.
pub async fn load_region_sections<S: NewsSource>(
    client: &NewsClient<S>,
    region: &str,
) -> Vec<Section> {
    let futures = all_categories().iter().map(|category| async move {
        Section {
            category: *category,
            news: client
                .news_by_region_and_category(region, category.slug, 1, DEFAULT_PAGE_SIZE)
                .await,
        }
    });
    futures::future::join_all(futures).await
}

/// Appends a page of articles, skipping ids already present
///
/// Ids are only unique within a single upstream batch, so pages fetched with
/// different rotation phrases often overlap. Returns how many were added.
pub fn merge_page(existing: &mut Vec<Article>, page: Vec<Article>) -> usize {
    let mut seen: HashSet<String> = existing.iter().map(|a| a.id.clone()).collect();
    let before = existing.len();
    for article in page {
        if seen.insert(article.id.clone()) {
            existing.push(article);
        }
    }
    existing.len() - before
}

/// Identifies one request issued through a `Generation`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Request-generation counter
///
/// Every new request takes a ticket; only the holder of the latest ticket may
/// apply its response.
#[derive(Debug, Default)]
pub struct Generation {
    current: AtomicU64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation, superseding all earlier tickets
    pub fn begin(&self) -> Ticket {
        Ticket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no newer request has started since `ticket` was issued
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }

    /// Returns `value` if `ticket` is still current, otherwise drops it
    pub fn accept<T>(&self, ticket: Ticket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            debug!(ticket = ticket.0, "Dropping superseded response");
            None
        }
    }
}
