//! Page content extraction
//!
//! Maps storefront markup to crawl work and product records:
//! - home pages → category links
//! - category pages → sub-category, pagination and product links
//! - product pages → one record plus sibling colour-variation links
//! - variation payloads (JSON) → one record
//!
//! Selectors are compiled once in [`Extractor::new`] and shared read-only by
//! every worker. Parsing is synchronous; `scraper::Html` never crosses an
//! `.await`.

mod navigation;
mod product;
mod variation;

pub use navigation::CategoryLinks;
pub use product::ProductPage;

use crate::record::Record;
use crate::url::resolve_link;
use crate::ExtractError;
use navigation::NavigationSelectors;
use product::ProductSelectors;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Compiles a static CSS selector
fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css))
}

/// Trimmed text content of an element
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolves `attr` of every element matching `selector`, dropping duplicates
/// and unusable links while keeping document order
fn collect_links(document: &Html, selector: &Selector, attr: &str, base_url: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    document
        .select(selector)
        .filter_map(|element| element.value().attr(attr))
        .filter_map(|href| resolve_link(href, base_url))
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}

/// Storefront extractor with precompiled selectors
#[derive(Debug)]
pub struct Extractor {
    navigation: NavigationSelectors,
    product: ProductSelectors,
}

impl Extractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            navigation: NavigationSelectors::new()?,
            product: ProductSelectors::new()?,
        })
    }

    /// Main-menu category links of the home page
    pub fn extract_home(&self, html: &str, base_url: &Url) -> Vec<Url> {
        let document = Html::parse_document(html);
        self.navigation.home_links(&document, base_url)
    }

    /// Links discovered on a category listing
    pub fn extract_category(&self, html: &str, base_url: &Url) -> CategoryLinks {
        let document = Html::parse_document(html);
        self.navigation.category_links(&document, base_url)
    }

    /// Record and colour-variation links of a product detail page
    pub fn extract_product(&self, html: &str, base_url: &Url) -> ProductPage {
        let document = Html::parse_document(html);
        ProductPage {
            record: self.product.details(&document),
            variations: self.product.variation_links(&document, base_url),
        }
    }

    /// Record of a colour-variation JSON payload
    pub fn extract_variation(&self, payload: &str) -> Result<Record, ExtractError> {
        variation::extract(&self.product, payload)
    }
}
