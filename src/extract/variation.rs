use super::product::{apply_event_data, apply_sizes, ProductSelectors, TAXONOMY_FIELDS};
use crate::record::{FieldValue, Record};
use crate::ExtractError;
use scraper::Html;
use serde_json::Value;

/// Builds a record from a colour-variation payload
///
/// The payload's `product` object supplies the headline fields. Its
/// `pdpProductHtml` fragment is mapped like a product page, and non-null
/// values from it take precedence. Sizes and taxonomy always come from the
/// payload's own `pageDataLayer`.
pub(super) fn extract(selectors: &ProductSelectors, payload: &str) -> Result<Record, ExtractError> {
    let payload: Value = serde_json::from_str(payload).map_err(|source| ExtractError::Json {
        context: "variation payload",
        source,
    })?;

    let product = payload.get("product").unwrap_or(&Value::Null);

    let mut record = Record::new();
    record.set("name", FieldValue::from_json(product.get("productName")));
    record.set("brand", FieldValue::from_json(product.get("brand")));
    record.set("color", FieldValue::from_json(product.get("color")));
    record.set(
        "description",
        FieldValue::from_json(product.get("shortDescription")),
    );

    if let Some(html) = product.get("pdpProductHtml").and_then(Value::as_str) {
        let fragment = Html::parse_document(html);
        if let Some(details) = selectors.details(&fragment) {
            record.merge_non_null(details);
        }
    }

    let layer = payload.get("pageDataLayer").unwrap_or(&Value::Null);
    apply_sizes(&mut record, layer);
    apply_event_data(&mut record, layer, &TAXONOMY_FIELDS);

    Ok(record)
}
