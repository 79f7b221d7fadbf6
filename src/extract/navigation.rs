use super::{collect_links, selector};
use crate::url::resolve_link;
use crate::ExtractError;
use scraper::{Html, Selector};
use url::Url;

const HOME_MENU: &str = "a.b-megasubmenu__link, a.b-megamenu__link";
const SUBCATEGORY: &str = ".b-linkslist a";
const LOAD_MORE: &str = ".b-product-grid__footer-show-more button";
const PRODUCT_TILE: &str = ".b-product-tile a.b-product-tile__image-link";

/// Links found on a category listing page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryLinks {
    /// Sub-navigation entries
    pub subcategories: Vec<Url>,

    /// The "load more" page, absent on the last page of a listing
    pub next_page: Option<Url>,

    /// Product detail pages
    pub products: Vec<Url>,
}

#[derive(Debug)]
pub(super) struct NavigationSelectors {
    home_menu: Selector,
    subcategory: Selector,
    load_more: Selector,
    product_tile: Selector,
}

impl NavigationSelectors {
    pub(super) fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            home_menu: selector(HOME_MENU)?,
            subcategory: selector(SUBCATEGORY)?,
            load_more: selector(LOAD_MORE)?,
            product_tile: selector(PRODUCT_TILE)?,
        })
    }

    pub(super) fn home_links(&self, document: &Html, base_url: &Url) -> Vec<Url> {
        collect_links(document, &self.home_menu, "href", base_url)
    }

    pub(super) fn category_links(&self, document: &Html, base_url: &Url) -> CategoryLinks {
        let next_page = document
            .select(&self.load_more)
            .filter_map(|button| button.value().attr("data-url"))
            .find_map(|href| resolve_link(href, base_url));

        CategoryLinks {
            subcategories: collect_links(document, &self.subcategory, "href", base_url),
            next_page,
            products: collect_links(document, &self.product_tile, "href", base_url),
        }
    }
}
