//! URL handling module for Catalog-Crawler
//!
//! This module provides the canonical form used as the deduplication key,
//! and resolution of raw `href`/`data-url` attribute values found on pages.

mod normalize;
mod resolve;

pub use normalize::normalize_url;
pub use resolve::resolve_link;
