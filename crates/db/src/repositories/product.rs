use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::{Row, SqliteConnection};

use quotedesk_core::domain::product::{Product, ProductId};

use super::{
    resolve_kit_refs, BatchProduct, NewProduct, ProductRepository, RepositoryError, SeedOutcome,
};
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let price_str: String =
        row.try_get("price").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let has_colors: bool =
        row.try_get("has_colors").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let colors_json: String =
        row.try_get("colors").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let is_kit: bool = row.try_get("is_kit").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let kit_json: String =
        row.try_get("kit_components").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let price = Decimal::from_str(&price_str).map_err(|e| {
        RepositoryError::Decode(format!("product {id} has invalid price `{price_str}`: {e}"))
    })?;
    let colors: Vec<String> = serde_json::from_str(&colors_json)
        .map_err(|e| RepositoryError::Decode(format!("product {id} colors: {e}")))?;
    let kit_components: Vec<ProductId> = serde_json::from_str(&kit_json)
        .map_err(|e| RepositoryError::Decode(format!("product {id} kit_components: {e}")))?;

    Ok(Product { id: ProductId(id), name, price, has_colors, colors, is_kit, kit_components })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, price, has_colors, colors, is_kit, kit_components
             FROM product ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_product).collect()
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, price, has_colors, colors, is_kit, kit_components
             FROM product WHERE id = ?",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(ref r) => Ok(Some(row_to_product(r)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        insert_product(&mut conn, product).await
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        count_products(&mut conn).await
    }

    async fn insert_all_if_empty(
        &self,
        batch: Vec<BatchProduct>,
    ) -> Result<SeedOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing = count_products(&mut tx).await?;
        if existing > 0 {
            return Ok(SeedOutcome::AlreadySeeded { existing });
        }

        let mut assigned = Vec::with_capacity(batch.len());
        let mut products = Vec::with_capacity(batch.len());
        for entry in &batch {
            let kit_components = resolve_kit_refs(entry, &assigned)?;
            let new_product = NewProduct { kit_components, ..entry.product.clone() };
            let product = insert_product(&mut tx, new_product).await?;
            assigned.push(product.id);
            products.push(product);
        }

        tx.commit().await?;
        Ok(SeedOutcome::Seeded { products })
    }
}

async fn count_products(conn: &mut SqliteConnection) -> Result<u64, RepositoryError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM product").fetch_one(conn).await?;
    Ok(count.max(0) as u64)
}

async fn insert_product(
    conn: &mut SqliteConnection,
    product: NewProduct,
) -> Result<Product, RepositoryError> {
    let colors_json = serde_json::to_string(&product.colors)
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let kit_json = serde_json::to_string(&product.kit_components)
        .map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let result = sqlx::query(
        "INSERT INTO product (name, price, has_colors, colors, is_kit, kit_components)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&product.name)
    .bind(product.price.to_string())
    .bind(!product.colors.is_empty())
    .bind(&colors_json)
    .bind(!product.kit_components.is_empty())
    .bind(&kit_json)
    .execute(conn)
    .await?;

    Ok(product.into_product(ProductId(result.last_insert_rowid())))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use quotedesk_core::domain::product::ProductId;

    use super::SqlProductRepository;
    use crate::repositories::{NewProduct, ProductRepository, RepositoryError};
    use crate::{connect_with_settings, migrations, DbPool};

    async fn setup() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    #[tokio::test]
    async fn sql_product_repo_round_trip() {
        let pool = setup().await;
        let repo = SqlProductRepository::new(pool.clone());

        let filter = repo
            .insert(NewProduct::colored(
                "ACME Air Filter",
                Decimal::new(1550, 2),
                &["blue", "green"],
            ))
            .await
            .expect("insert filter");
        let kit = repo
            .insert(NewProduct::kit("Kit", Decimal::ZERO, vec![filter.id]))
            .await
            .expect("insert kit");

        let found = repo.find_by_id(filter.id).await.expect("find").expect("present");
        assert_eq!(found, filter);
        assert_eq!(found.price, Decimal::new(1550, 2));
        assert_eq!(found.colors, vec!["blue".to_string(), "green".to_string()]);

        let listed = repo.list().await.expect("list");
        assert_eq!(listed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![filter.id, kit.id]);
        assert!(listed[1].is_kit);
        assert_eq!(listed[1].kit_components, vec![filter.id]);
        assert_eq!(repo.count().await.expect("count"), 2);

        pool.close().await;
    }

    #[tokio::test]
    async fn missing_product_is_none() {
        let pool = setup().await;
        let repo = SqlProductRepository::new(pool.clone());

        assert_eq!(repo.find_by_id(ProductId(404)).await.expect("find"), None);
        pool.close().await;
    }

    #[tokio::test]
    async fn corrupt_price_surfaces_decode_error() {
        let pool = setup().await;
        sqlx::query("INSERT INTO product (name, price) VALUES ('Broken', 'n/a')")
            .execute(&pool)
            .await
            .expect("seed broken row");
        let repo = SqlProductRepository::new(pool.clone());

        let error = repo.list().await.expect_err("decode should fail");
        assert!(matches!(error, RepositoryError::Decode(ref message) if message.contains("n/a")));

        pool.close().await;
    }
}
