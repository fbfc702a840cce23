//! newsdesk library
//!
//! Exposes the cache, the news client and the feed loaders for the binary and
//! for integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod feed;
