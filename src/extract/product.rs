use super::{collect_links, element_text, selector};
use crate::record::{FieldValue, Record};
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use url::Url;

const NAME: &str = ".b-pdp__product-name";
const PRICE: &str = ".price__regular";
const SALE_PRICE: &str = ".price__sale .value";
const IMAGES: &str = ".carousel-indicators li img";
const DESCRIPTION: &str = r#"div.b-productinfo[data-product-attr="productDescription"]"#;
const SPECIFICATION: &str = ".b-productinfo li";
const SCRIPT: &str = "script";
const COLOR_VARIANT: &str = "button.color-attribute:not(.m-selected)";

const DATA_LAYER_PREFIX: &str = "pageDataLayer =";
const SCHEMA_PRODUCT_PREFIX: &str = r#"{"@context":"https://schema.org/","@type":"Product"#;

/// Record field → data layer key, for the size availability lists
pub(super) const SIZE_FIELDS: [(&str, &str); 8] = [
    ("available_sizes", "availableSizes"),
    ("unavailable_sizes", "unavailableSizes"),
    ("available_sizes_eu", "availableSizesEU"),
    ("unavailable_sizes_eu", "unavailableSizesEU"),
    ("available_sizes_uk", "availableSizesUK"),
    ("unavailable_sizes_uk", "unavailableSizesUK"),
    ("available_sizes_us", "availableSizesUS"),
    ("unavailable_sizes_us", "unavailableSizesUS"),
];

/// Record field → `eventData` key, for identity and category taxonomy
pub(super) const TAXONOMY_FIELDS: [(&str, &str); 7] = [
    ("sku_id", "sku_id"),
    ("gender", "prod_gender"),
    ("kids_gender", "kids_gender"),
    ("primary_category_id", "primary_categoryid"),
    ("category", "category"),
    ("sub_category", "sub_category"),
    ("sub_category2", "sub_category2"),
];

/// What a product detail page yields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPage {
    /// The product, or None when the page carries no product markup
    pub record: Option<Record>,

    /// Sibling colours other than the one currently selected
    pub variations: Vec<Url>,
}

#[derive(Debug)]
pub(super) struct ProductSelectors {
    name: Selector,
    price: Selector,
    sale_price: Selector,
    images: Selector,
    description: Selector,
    specification: Selector,
    script: Selector,
    color_variant: Selector,
}

impl ProductSelectors {
    pub(super) fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            name: selector(NAME)?,
            price: selector(PRICE)?,
            sale_price: selector(SALE_PRICE)?,
            images: selector(IMAGES)?,
            description: selector(DESCRIPTION)?,
            specification: selector(SPECIFICATION)?,
            script: selector(SCRIPT)?,
            color_variant: selector(COLOR_VARIANT)?,
        })
    }

    pub(super) fn variation_links(&self, document: &Html, base_url: &Url) -> Vec<Url> {
        collect_links(document, &self.color_variant, "data-url", base_url)
    }

    /// Maps a product detail document to a record
    ///
    /// Returns None when neither a product name nor a data layer is present.
    pub(super) fn details(&self, document: &Html) -> Option<Record> {
        let name = self.first_text(document, &self.name);
        let scripts = self.embedded_payloads(document);

        if name.is_none() && scripts.data_layer.is_none() {
            return None;
        }

        let mut record = Record::new();
        record.set("name", name);
        record.set("price", self.first_text(document, &self.price));

        if let Some(element) = document.select(&self.sale_price).next() {
            record.set("sale_price", text_outside_spans(element));
        }

        let images: Vec<String> = document
            .select(&self.images)
            .filter_map(|img| img.value().attr("data-src").or(img.value().attr("src")))
            .map(|src| src.split('?').next().unwrap_or(src).to_string())
            .collect();
        record.set("images", images);

        if let Some(description) = self.first_text(document, &self.description) {
            record.set("description", description);
        }

        let specification: Vec<String> = document
            .select(&self.specification)
            .map(element_text)
            .collect();
        record.set("description_specification", specification);

        if let Some(schema) = scripts.schema_product {
            record.set(
                "brand",
                FieldValue::from_json(schema.get("brand").and_then(|brand| brand.get("name"))),
            );
        }

        if let Some(layer) = scripts.data_layer {
            apply_sizes(&mut record, &layer);
            apply_event_data(&mut record, &layer, &TAXONOMY_FIELDS);
            apply_event_data(&mut record, &layer, &[("color", "color")]);
        }

        Some(record)
    }

    fn first_text(&self, document: &Html, selector: &Selector) -> Option<String> {
        document.select(selector).next().map(element_text)
    }

    fn embedded_payloads(&self, document: &Html) -> EmbeddedPayloads {
        let mut payloads = EmbeddedPayloads::default();

        for script in document.select(&self.script) {
            let content = script.text().collect::<String>();
            let content = content.trim();

            if let Some(rest) = content.strip_prefix(DATA_LAYER_PREFIX) {
                let json = rest.trim().trim_end_matches(';');
                payloads.data_layer = parse_payload(json, "pageDataLayer");
            } else if content.starts_with(SCHEMA_PRODUCT_PREFIX) {
                payloads.schema_product = parse_payload(content, "schema.org product");
            }
        }

        payloads
    }
}

#[derive(Debug, Default)]
struct EmbeddedPayloads {
    data_layer: Option<Value>,
    schema_product: Option<Value>,
}

fn parse_payload(json: &str, context: &'static str) -> Option<Value> {
    match serde_json::from_str(json) {
        Ok(value) => Some(value),
        Err(source) => {
            let err = ExtractError::Json { context, source };
            tracing::warn!("Ignoring embedded payload: {}", err);
            None
        }
    }
}

/// Text of `element` excluding anything nested in a `<span>`
///
/// Sale prices carry screen-reader labels in spans next to the amount.
fn text_outside_spans(element: ElementRef<'_>) -> String {
    element
        .descendants()
        .filter_map(|node| node.value().as_text().map(|text| (node, text)))
        .filter(|(node, _)| {
            node.ancestors()
                .take_while(|ancestor| ancestor.id() != element.id())
                .all(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .map_or(true, |el| el.name() != "span")
                })
        })
        .map(|(_, text)| text.trim())
        .collect::<Vec<_>>()
        .concat()
}

/// Copies the eight size availability lists; absent lists become empty
pub(super) fn apply_sizes(record: &mut Record, layer: &Value) {
    for (field, key) in SIZE_FIELDS {
        record.set(field, FieldValue::list_from_json(layer.get(key)));
    }
}

/// Copies fields from `pageDataMoeEvents[0].eventData`; absent values become null
pub(super) fn apply_event_data(record: &mut Record, layer: &Value, fields: &[(&str, &str)]) {
    let event = layer
        .get("pageDataMoeEvents")
        .and_then(|events| events.get(0))
        .and_then(|first| first.get("eventData"));

    for (field, key) in fields {
        record.set(*field, FieldValue::from_json(event.and_then(|data| data.get(*key))));
    }
}
