//! Quote backend routes: catalog listing, quote creation and lookup, and
//! demo-catalog seeding.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{error, info, warn};

use quotedesk_core::cpq::{
    confirm_quote, DeterministicPricingEngine, PricingEngine, ProductCatalog,
};
use quotedesk_core::domain::product::Product;
use quotedesk_core::domain::quote::{ConfirmedQuote, CreateQuoteRequest, CreatedQuote, QuoteId};
use quotedesk_core::errors::PricingError;
use quotedesk_db::repositories::{
    ProductRepository, QuoteRepository, RepositoryError, SqlProductRepository,
    SqlQuoteRepository,
};
use quotedesk_db::{seed_sample_catalog, DbPool, SeedOutcome};

#[derive(Clone)]
pub struct ApiState {
    products: Arc<dyn ProductRepository>,
    quotes: Arc<dyn QuoteRepository>,
    pricing: Arc<dyn PricingEngine>,
}

impl ApiState {
    pub fn new(products: Arc<dyn ProductRepository>, quotes: Arc<dyn QuoteRepository>) -> Self {
        Self { products, quotes, pricing: Arc::new(DeterministicPricingEngine) }
    }

    pub fn sql(db_pool: DbPool) -> Self {
        Self::new(
            Arc::new(SqlProductRepository::new(db_pool.clone())),
            Arc::new(SqlQuoteRepository::new(db_pool)),
        )
    }

    async fn catalog(&self) -> Result<ProductCatalog, (StatusCode, Json<ApiErrorBody>)> {
        let products = self.products.list().await.map_err(repository_error)?;
        Ok(ProductCatalog::new(products))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub msg: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub status: &'static str,
    pub products: u64,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiErrorBody>)>;

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/products", get(list_products))
        .route("/quotes", post(create_quote))
        .route("/quotes/{id}", get(get_quote))
        .route("/seed", get(seed))
        .with_state(state)
}

async fn index() -> Json<IndexResponse> {
    Json(IndexResponse { msg: "Quote Manager API" })
}

async fn list_products(State(state): State<ApiState>) -> ApiResult<Vec<Product>> {
    let products = state.products.list().await.map_err(repository_error)?;
    Ok(Json(products))
}

async fn create_quote(
    State(state): State<ApiState>,
    payload: Result<Json<CreateQuoteRequest>, JsonRejection>,
) -> ApiResult<CreatedQuote> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(event_name = "api.quote.rejected", error = %rejection, "undecodable quote body");
        api_error(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;

    let correlation_id = uuid::Uuid::new_v4().to_string();
    let catalog = state.catalog().await?;
    let priced = state.pricing.price(&request, &catalog).map_err(|error| {
        info!(
            event_name = "api.quote.pricing_failed",
            correlation_id = %correlation_id,
            error = %error,
            "quote references unknown products"
        );
        pricing_error(error)
    })?;

    let record = state.quotes.create(priced).await.map_err(repository_error)?;

    info!(
        event_name = "api.quote.created",
        correlation_id = %correlation_id,
        quote_id = record.id.0,
        items = record.items.len(),
        total = %record.total,
        "quote created"
    );

    Ok(Json(CreatedQuote { id: Some(record.id), total: Some(record.total) }))
}

async fn get_quote(
    Path(id): Path<i64>,
    State(state): State<ApiState>,
) -> ApiResult<ConfirmedQuote> {
    let record = state
        .quotes
        .find_by_id(QuoteId(id))
        .await
        .map_err(repository_error)?
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "Quote not found"))?;

    let catalog = state.catalog().await?;
    Ok(Json(confirm_quote(&record, &catalog)))
}

async fn seed(State(state): State<ApiState>) -> ApiResult<SeedResponse> {
    let outcome = seed_sample_catalog(state.products.as_ref()).await.map_err(repository_error)?;

    let response = match outcome {
        SeedOutcome::AlreadySeeded { existing } => {
            SeedResponse { status: "already_seeded", products: existing }
        }
        SeedOutcome::Seeded { products } => {
            SeedResponse { status: "seeded", products: products.len() as u64 }
        }
    };
    Ok(Json(response))
}

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiErrorBody>) {
    (status, Json(ApiErrorBody { error: message.into() }))
}

fn pricing_error(error: PricingError) -> (StatusCode, Json<ApiErrorBody>) {
    let message = match error {
        PricingError::ProductNotFound(_) => "Product not found",
        PricingError::KitComponentNotFound { .. } => "Kit component not found",
    };
    api_error(StatusCode::NOT_FOUND, message)
}

fn repository_error(error: RepositoryError) -> (StatusCode, Json<ApiErrorBody>) {
    error!(event_name = "api.repository.error", error = %error, "repository call failed");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "an internal error occurred")
}
