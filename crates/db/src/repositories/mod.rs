use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use quotedesk_core::cpq::PricedQuote;
use quotedesk_core::domain::product::{Product, ProductId};
use quotedesk_core::domain::quote::{QuoteId, QuoteRecord};

pub mod memory;
pub mod product;
pub mod quote;

pub use memory::{InMemoryProductRepository, InMemoryQuoteRepository};
pub use product::SqlProductRepository;
pub use quote::SqlQuoteRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// A product before the store has assigned its id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub colors: Vec<String>,
    pub kit_components: Vec<ProductId>,
}

impl NewProduct {
    pub fn simple(name: &str, price: Decimal) -> Self {
        Self { name: name.to_string(), price, colors: Vec::new(), kit_components: Vec::new() }
    }

    pub fn colored(name: &str, price: Decimal, colors: &[&str]) -> Self {
        Self {
            colors: colors.iter().map(|color| color.to_string()).collect(),
            ..Self::simple(name, price)
        }
    }

    pub fn kit(name: &str, price: Decimal, components: Vec<ProductId>) -> Self {
        Self { kit_components: components, ..Self::simple(name, price) }
    }

    /// Capability flags follow from the lists: a product has colors iff it
    /// lists any, and is a kit iff it lists components.
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            has_colors: !self.colors.is_empty(),
            colors: self.colors,
            is_kit: !self.kit_components.is_empty(),
            kit_components: self.kit_components,
        }
    }
}

/// One entry of a catalog batch. `kit_of` holds positions of earlier
/// entries in the same batch; they become component ids once assigned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchProduct {
    pub product: NewProduct,
    pub kit_of: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store already held products; nothing was written.
    AlreadySeeded { existing: u64 },
    Seeded { products: Vec<Product> },
}

/// Maps batch positions to the ids assigned so far.
pub(crate) fn resolve_kit_refs(
    entry: &BatchProduct,
    assigned: &[ProductId],
) -> Result<Vec<ProductId>, RepositoryError> {
    entry
        .kit_of
        .iter()
        .map(|position| {
            assigned.get(*position).copied().ok_or_else(|| {
                RepositoryError::Decode(format!(
                    "kit `{}` references batch entry {position} before it is inserted",
                    entry.product.name
                ))
            })
        })
        .collect()
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// All products ordered by id.
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
    /// Inserts the whole batch only if the store is empty. Either every
    /// entry is stored or none is.
    async fn insert_all_if_empty(
        &self,
        batch: Vec<BatchProduct>,
    ) -> Result<SeedOutcome, RepositoryError>;
}

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn create(&self, quote: PricedQuote) -> Result<QuoteRecord, RepositoryError>;
    /// Items come back in the order they were stored.
    async fn find_by_id(&self, id: QuoteId) -> Result<Option<QuoteRecord>, RepositoryError>;
}
