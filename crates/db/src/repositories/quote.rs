use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;

use quotedesk_core::cpq::PricedQuote;
use quotedesk_core::domain::product::ProductId;
use quotedesk_core::domain::quote::{QuoteId, QuoteRecord, ResolvedItem};

use super::{QuoteRepository, RepositoryError};
use crate::DbPool;

pub struct SqlQuoteRepository {
    pool: DbPool,
}

impl SqlQuoteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> Result<ResolvedItem, RepositoryError> {
    let product_id: i64 =
        row.try_get("product_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let quantity: i64 =
        row.try_get("quantity").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let color: Option<String> =
        row.try_get("color").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let order: i64 =
        row.try_get("sort_order").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let is_kit_component: bool =
        row.try_get("is_kit_component").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let quantity = u32::try_from(quantity)
        .map_err(|_| RepositoryError::Decode(format!("invalid quantity `{quantity}`")))?;

    Ok(ResolvedItem { product_id: ProductId(product_id), quantity, color, order, is_kit_component })
}

#[async_trait::async_trait]
impl QuoteRepository for SqlQuoteRepository {
    async fn create(&self, quote: PricedQuote) -> Result<QuoteRecord, RepositoryError> {
        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result =
            sqlx::query("INSERT INTO quote (customer, total, created_at) VALUES (?, ?, ?)")
                .bind(&quote.customer)
                .bind(quote.total.to_string())
                .bind(created_at.to_rfc3339())
                .execute(&mut *tx)
                .await?;
        let quote_id = result.last_insert_rowid();

        for item in &quote.items {
            sqlx::query(
                "INSERT INTO quote_item
                    (quote_id, product_id, quantity, color, sort_order, is_kit_component)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(quote_id)
            .bind(item.product_id.0)
            .bind(i64::from(item.quantity))
            .bind(item.color.as_deref())
            .bind(item.order)
            .bind(item.is_kit_component)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(QuoteRecord {
            id: QuoteId(quote_id),
            customer: quote.customer,
            total: quote.total,
            created_at,
            items: quote.items,
        })
    }

    async fn find_by_id(&self, id: QuoteId) -> Result<Option<QuoteRecord>, RepositoryError> {
        let row = sqlx::query("SELECT id, customer, total, created_at FROM quote WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let customer: String =
            row.try_get("customer").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let total_str: String =
            row.try_get("total").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let created_at_str: String =
            row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

        let total = Decimal::from_str(&total_str)
            .map_err(|e| RepositoryError::Decode(format!("quote {id} total: {e}")))?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let item_rows = sqlx::query(
            "SELECT product_id, quantity, color, sort_order, is_kit_component
             FROM quote_item WHERE quote_id = ? ORDER BY id",
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await?;
        let items = item_rows.iter().map(row_to_item).collect::<Result<Vec<_>, _>>()?;

        Ok(Some(QuoteRecord { id, customer, total, created_at, items }))
    }
}
