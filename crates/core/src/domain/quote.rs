use std::fmt;
use std::num::NonZeroU32;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::null_as_default;
use crate::domain::product::ProductId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub i64);

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn default_quantity() -> NonZeroU32 {
    NonZeroU32::MIN
}

/// One draft line in the shape the quoting backend accepts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLineItem {
    pub product_id: ProductId,
    /// Zero is rejected at decode time.
    #[serde(default = "default_quantity")]
    pub quantity: NonZeroU32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kit_order: Option<Vec<ProductId>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateQuoteRequest {
    pub customer: String,
    pub items: Vec<QuoteLineItem>,
}

/// Response to a create call. Only `id` is relied upon; the total is
/// informational and re-read from the confirmed quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedQuote {
    #[serde(default)]
    pub id: Option<QuoteId>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total: Option<Decimal>,
}

/// Server-resolved quote, independent of the draft it was created from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedQuote {
    #[serde(default)]
    pub id: Option<QuoteId>,
    pub customer: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub items: Vec<ConfirmedLine>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedLine {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub quantity: u32,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_kit_component: bool,
}

/// A quote row as resolved by the backend. Kits never appear here directly;
/// they are expanded into one row per component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub color: Option<String>,
    pub order: i64,
    pub is_kit_component: bool,
}

/// A persisted quote. Items are kept in the order they were resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub id: QuoteId,
    pub customer: String,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ResolvedItem>,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use std::num::NonZeroU32;

    use serde_json::json;

    use crate::domain::product::ProductId;

    use super::{ConfirmedQuote, CreatedQuote, QuoteId, QuoteLineItem};

    #[test]
    fn line_item_omits_unset_options() {
        let line = QuoteLineItem {
            product_id: ProductId(1),
            quantity: NonZeroU32::MIN,
            color: None,
            kit_order: None,
        };

        assert_eq!(
            serde_json::to_value(&line).expect("encode"),
            json!({"product_id": 1, "quantity": 1})
        );
    }

    #[test]
    fn line_item_quantity_defaults_to_one_when_absent() {
        let line: QuoteLineItem =
            serde_json::from_value(json!({"product_id": 4, "kit_order": [3, 1]})).expect("decode");

        assert_eq!(line.quantity.get(), 1);
        assert_eq!(line.kit_order, Some(vec![ProductId(3), ProductId(1)]));
    }

    #[test]
    fn line_item_rejects_zero_quantity() {
        let zero = json!({"product_id": 4, "quantity": 0});
        assert!(serde_json::from_value::<QuoteLineItem>(zero).is_err());

        let line: QuoteLineItem =
            serde_json::from_value(json!({"product_id": 4, "quantity": 3})).expect("decode");
        assert_eq!(line.quantity.get(), 3);
    }

    #[test]
    fn created_quote_tolerates_missing_id() {
        let created: CreatedQuote =
            serde_json::from_value(json!({"detail": "oops"})).expect("decode");
        assert_eq!(created.id, None);
        assert_eq!(created.total, None);

        let created: CreatedQuote =
            serde_json::from_value(json!({"id": 7, "total": 205.0})).expect("decode");
        assert_eq!(created.id, Some(QuoteId(7)));
        assert_eq!(created.total, Some(Decimal::from(205)));
    }

    #[test]
    fn confirmed_quote_decodes_backend_shape() {
        let quote: ConfirmedQuote = serde_json::from_value(json!({
            "id": 3,
            "customer": "Jane",
            "total": 230.5,
            "items": [
                {"product_id": 1, "product_name": "ACME Basic AC", "quantity": 1,
                 "color": null, "order": 0, "is_kit_component": false},
                {"product_name": "ACME Pro AC", "quantity": 1, "color": "black"}
            ]
        }))
        .expect("decode");

        assert_eq!(quote.total, Decimal::new(2305, 1));
        assert_eq!(quote.items.len(), 2);
        assert_eq!(quote.items[1].color.as_deref(), Some("black"));
        assert_eq!(quote.items[1].order, None);
        assert!(!quote.items[1].is_kit_component);
    }
}
