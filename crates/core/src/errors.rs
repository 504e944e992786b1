use thiserror::Error;

use crate::domain::product::ProductId;

/// Edits addressed at a draft line that does not exist. Callers are expected
/// to only pass indices they obtained from the draft itself.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("draft line {index} is out of range (draft has {len} lines)")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("product {0} is not in the loaded catalog")]
    ProductNotFound(ProductId),
    #[error(transparent)]
    Draft(#[from] DraftError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    #[error("kit component {component} of product {kit} not found")]
    KitComponentNotFound { kit: ProductId, component: ProductId },
}
