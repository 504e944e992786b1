pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;
pub mod session;

pub use cpq::{
    confirm_quote, price_quote, CatalogLoad, DeterministicPricingEngine, PricedQuote,
    PricingEngine, ProductCatalog, QuoteDraft, ResolvedLine,
};
pub use domain::product::{Product, ProductId};
pub use domain::quote::{
    ConfirmedLine, ConfirmedQuote, CreateQuoteRequest, CreatedQuote, QuoteId, QuoteLineItem,
    QuoteRecord, ResolvedItem,
};
pub use errors::{DraftError, PricingError, SessionError};
pub use session::QuoteSession;
