use crate::cpq::catalog::{CatalogLoad, ProductCatalog};
use crate::cpq::draft::QuoteDraft;
use crate::domain::product::ProductId;
use crate::domain::quote::{ConfirmedQuote, CreateQuoteRequest};
use crate::errors::SessionError;

/// Everything one quoting session holds. The catalog, the draft and the
/// confirmed quote are independent values: confirming a quote does not
/// clear the draft and reloading the catalog does not touch the draft.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuoteSession {
    pub catalog: ProductCatalog,
    pub draft: QuoteDraft,
    pub customer: String,
    pub catalog_status: Option<CatalogLoad>,
    pub confirmed: Option<ConfirmedQuote>,
    pub submission_error: Option<String>,
}

impl QuoteSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_customer(&mut self, customer: impl Into<String>) {
        self.customer = customer.into();
    }

    pub fn record_catalog_load(&mut self, status: CatalogLoad) {
        self.catalog_status = Some(status);
    }

    /// Resolves `product_id` against whatever catalog is loaded right now,
    /// which may still be empty.
    pub fn add_product(&mut self, product_id: ProductId) -> Result<usize, SessionError> {
        let product =
            self.catalog.find_by_id(product_id).ok_or(SessionError::ProductNotFound(product_id))?;
        Ok(self.draft.add_item(product))
    }

    pub fn set_color(
        &mut self,
        index: usize,
        color: impl Into<String>,
    ) -> Result<(), SessionError> {
        Ok(self.draft.set_color(index, color)?)
    }

    pub fn reverse_kit_order(&mut self, index: usize) -> Result<(), SessionError> {
        Ok(self.draft.reverse_kit_order(index)?)
    }

    pub fn submission_request(&self) -> CreateQuoteRequest {
        CreateQuoteRequest { customer: self.customer.clone(), items: self.draft.to_payload() }
    }

    pub fn record_confirmation(&mut self, quote: ConfirmedQuote) {
        self.confirmed = Some(quote);
        self.submission_error = None;
    }

    pub fn record_submission_failure(&mut self, message: impl Into<String>) {
        self.submission_error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use crate::cpq::catalog::{CatalogLoad, ProductCatalog};
    use crate::domain::product::{Product, ProductId};
    use crate::domain::quote::ConfirmedQuote;
    use crate::errors::{DraftError, SessionError};

    use super::QuoteSession;

    fn kit_catalog() -> ProductCatalog {
        let kit: Product = serde_json::from_value(json!({
            "id": 2, "name": "Kit", "price": 50, "is_kit": true, "kit_components": [10, 20, 30]
        }))
        .expect("kit");
        ProductCatalog::new(vec![kit])
    }

    fn confirmed() -> ConfirmedQuote {
        ConfirmedQuote {
            id: None,
            customer: "Jane".to_string(),
            total: Decimal::from(50),
            items: Vec::new(),
        }
    }

    #[test]
    fn adding_before_catalog_load_reports_missing_product() {
        let mut session = QuoteSession::new();
        assert_eq!(
            session.add_product(ProductId(2)),
            Err(SessionError::ProductNotFound(ProductId(2)))
        );
        assert!(session.draft.is_empty());
    }

    #[test]
    fn kit_flow_end_to_end() {
        let mut session = QuoteSession { catalog: kit_catalog(), ..QuoteSession::default() };

        let index = session.add_product(ProductId(2)).expect("add kit");
        assert_eq!(
            session.draft.items()[index].kit_order,
            Some(vec![ProductId(10), ProductId(20), ProductId(30)])
        );

        session.reverse_kit_order(index).expect("reverse");
        assert_eq!(
            session.draft.items()[index].kit_order,
            Some(vec![ProductId(30), ProductId(20), ProductId(10)])
        );

        session.reverse_kit_order(index).expect("reverse again");
        assert_eq!(
            session.draft.items()[index].kit_order,
            Some(vec![ProductId(10), ProductId(20), ProductId(30)])
        );
    }

    #[test]
    fn draft_errors_surface_through_session() {
        let mut session = QuoteSession::new();
        assert_eq!(
            session.set_color(0, "red"),
            Err(SessionError::Draft(DraftError::IndexOutOfRange { index: 0, len: 0 }))
        );
    }

    #[test]
    fn submission_request_carries_customer_and_payload() {
        let mut session = QuoteSession { catalog: kit_catalog(), ..QuoteSession::default() };
        session.set_customer("Jane");
        session.add_product(ProductId(2)).expect("add");

        let request = session.submission_request();
        assert_eq!(request.customer, "Jane");
        assert_eq!(request.items, session.draft.to_payload());
    }

    #[test]
    fn confirmation_supersedes_without_clearing_draft() {
        let mut session = QuoteSession { catalog: kit_catalog(), ..QuoteSession::default() };
        session.add_product(ProductId(2)).expect("add");
        session.record_submission_failure("backend unreachable");

        session.record_confirmation(confirmed());

        assert_eq!(session.confirmed, Some(confirmed()));
        assert_eq!(session.submission_error, None);
        assert_eq!(session.draft.len(), 1);
    }

    #[test]
    fn catalog_status_is_kept_for_display() {
        let mut session = QuoteSession::new();
        let status = session.catalog.apply_load(Err("timed out"));
        session.record_catalog_load(status);

        assert_eq!(
            session.catalog_status,
            Some(CatalogLoad::Unavailable { reason: "timed out".to_string() })
        );
    }
}
