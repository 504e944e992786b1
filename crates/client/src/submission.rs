use thiserror::Error;
use tracing::{info, warn};

use quotedesk_core::cpq::{CatalogLoad, ProductCatalog, QuoteDraft};
use quotedesk_core::domain::quote::{ConfirmedQuote, CreateQuoteRequest};
use quotedesk_core::QuoteSession;

use crate::api::{ApiError, QuoteApi};

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("quote was created but the response carried no id")]
    MissingQuoteId,
}

/// Fetches the product list once. A failed fetch is logged and leaves the
/// catalog empty; the caller gets the status back instead of an error.
pub async fn load_catalog(api: &dyn QuoteApi, catalog: &mut ProductCatalog) -> CatalogLoad {
    let status = catalog.apply_load(api.list_products().await);
    match &status {
        CatalogLoad::Loaded { products } => {
            info!(event_name = "client.catalog.loaded", products, "catalog loaded");
        }
        CatalogLoad::Unavailable { reason } => {
            warn!(event_name = "client.catalog.unavailable", %reason, "catalog load failed");
        }
    }
    status
}

/// Creates the quote, then re-reads it by id. One attempt each.
pub async fn submit_quote(
    api: &dyn QuoteApi,
    customer: &str,
    draft: &QuoteDraft,
) -> Result<ConfirmedQuote, SubmissionError> {
    let request = CreateQuoteRequest { customer: customer.to_string(), items: draft.to_payload() };
    submit_request(api, &request).await
}

async fn submit_request(
    api: &dyn QuoteApi,
    request: &CreateQuoteRequest,
) -> Result<ConfirmedQuote, SubmissionError> {
    let created = api.create_quote(request).await?;
    let quote_id = created.id.ok_or(SubmissionError::MissingQuoteId)?;
    info!(
        event_name = "client.quote.created",
        quote_id = quote_id.0,
        lines = request.items.len(),
        "quote created"
    );

    Ok(api.fetch_quote(quote_id).await?)
}

pub async fn load_session_catalog(
    api: &dyn QuoteApi,
    session: &mut QuoteSession,
) -> CatalogLoad {
    let status = load_catalog(api, &mut session.catalog).await;
    session.record_catalog_load(status.clone());
    status
}

/// Submits the session's draft and records the outcome on the session. The
/// draft survives either way.
pub async fn submit_session(
    api: &dyn QuoteApi,
    session: &mut QuoteSession,
) -> Result<(), SubmissionError> {
    match submit_request(api, &session.submission_request()).await {
        Ok(confirmed) => {
            session.record_confirmation(confirmed);
            Ok(())
        }
        Err(error) => {
            warn!(event_name = "client.quote.submit_failed", error = %error, "submission failed");
            session.record_submission_failure(error.to_string());
            Err(error)
        }
    }
}
