use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::null_as_default;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A purchasable product as published by the quoting backend.
///
/// `colors` is only meaningful when `has_colors` is set and `kit_components`
/// only when `is_kit` is set; both decode to empty when absent or `null`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_colors: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub colors: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_kit: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub kit_components: Vec<ProductId>,
}

impl Product {
    pub fn default_color(&self) -> Option<&str> {
        if !self.has_colors {
            return None;
        }
        self.colors.first().map(String::as_str)
    }
}
