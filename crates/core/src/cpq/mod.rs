pub mod catalog;
pub mod draft;
pub mod pricing;

pub use catalog::{CatalogLoad, ProductCatalog};
pub use draft::{QuoteDraft, ResolvedLine};
pub use pricing::{
    confirm_quote, price_quote, DeterministicPricingEngine, PricedQuote, PricingEngine,
};
