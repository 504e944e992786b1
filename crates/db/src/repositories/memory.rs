use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::RwLock;

use quotedesk_core::cpq::PricedQuote;
use quotedesk_core::domain::product::{Product, ProductId};
use quotedesk_core::domain::quote::{QuoteId, QuoteRecord};

use super::{
    resolve_kit_refs, BatchProduct, NewProduct, ProductRepository, QuoteRepository,
    RepositoryError, SeedOutcome,
};

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<BTreeMap<i64, Product>>,
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.values().cloned().collect())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(&id.0).cloned())
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let mut products = self.products.write().await;
        let next_id = products.keys().next_back().map_or(1, |last| last + 1);
        let product = product.into_product(ProductId(next_id));
        products.insert(next_id, product.clone());
        Ok(product)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.len() as u64)
    }

    async fn insert_all_if_empty(
        &self,
        batch: Vec<BatchProduct>,
    ) -> Result<SeedOutcome, RepositoryError> {
        let mut products = self.products.write().await;
        if !products.is_empty() {
            return Ok(SeedOutcome::AlreadySeeded { existing: products.len() as u64 });
        }

        let mut assigned = Vec::with_capacity(batch.len());
        let mut staged = Vec::with_capacity(batch.len());
        for (offset, entry) in batch.iter().enumerate() {
            let kit_components = resolve_kit_refs(entry, &assigned)?;
            let id = ProductId(offset as i64 + 1);
            let new_product = NewProduct { kit_components, ..entry.product.clone() };
            staged.push(new_product.into_product(id));
            assigned.push(id);
        }

        for product in &staged {
            products.insert(product.id.0, product.clone());
        }
        Ok(SeedOutcome::Seeded { products: staged })
    }
}

#[derive(Default)]
pub struct InMemoryQuoteRepository {
    quotes: RwLock<BTreeMap<i64, QuoteRecord>>,
}

#[async_trait::async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn create(&self, quote: PricedQuote) -> Result<QuoteRecord, RepositoryError> {
        let mut quotes = self.quotes.write().await;
        let next_id = quotes.keys().next_back().map_or(1, |last| last + 1);
        let record = QuoteRecord {
            id: QuoteId(next_id),
            customer: quote.customer,
            total: quote.total,
            created_at: Utc::now(),
            items: quote.items,
        };
        quotes.insert(next_id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: QuoteId) -> Result<Option<QuoteRecord>, RepositoryError> {
        let quotes = self.quotes.read().await;
        Ok(quotes.get(&id.0).cloned())
    }
}
