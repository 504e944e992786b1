use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::catalog::ProductCatalog;
use crate::domain::quote::{
    ConfirmedLine, ConfirmedQuote, CreateQuoteRequest, QuoteRecord, ResolvedItem,
};
use crate::errors::PricingError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedQuote {
    pub customer: String,
    pub total: Decimal,
    pub items: Vec<ResolvedItem>,
}

pub trait PricingEngine: Send + Sync {
    fn price(
        &self,
        request: &CreateQuoteRequest,
        catalog: &ProductCatalog,
    ) -> Result<PricedQuote, PricingError>;
}

#[derive(Default)]
pub struct DeterministicPricingEngine;

impl PricingEngine for DeterministicPricingEngine {
    fn price(
        &self,
        request: &CreateQuoteRequest,
        catalog: &ProductCatalog,
    ) -> Result<PricedQuote, PricingError> {
        price_quote(request, catalog)
    }
}

/// Expands kits and totals `unit price * quantity` over every resulting row.
///
/// Non-kit rows are ordered by their position in the request; kit component
/// rows by their position inside the kit order.
pub fn price_quote(
    request: &CreateQuoteRequest,
    catalog: &ProductCatalog,
) -> Result<PricedQuote, PricingError> {
    let mut total = Decimal::ZERO;
    let mut items = Vec::with_capacity(request.items.len());

    for (line_index, line) in request.items.iter().enumerate() {
        let product = catalog
            .find_by_id(line.product_id)
            .ok_or(PricingError::ProductNotFound(line.product_id))?;
        let quantity = line.quantity.get();

        if product.is_kit {
            let kit_order =
                line.kit_order.as_deref().unwrap_or(product.kit_components.as_slice());
            for (component_index, component_id) in kit_order.iter().enumerate() {
                let component = catalog.find_by_id(*component_id).ok_or(
                    PricingError::KitComponentNotFound {
                        kit: product.id,
                        component: *component_id,
                    },
                )?;
                total += component.price * Decimal::from(quantity);
                items.push(ResolvedItem {
                    product_id: component.id,
                    quantity,
                    color: None,
                    order: component_index as i64,
                    is_kit_component: true,
                });
            }
        } else {
            total += product.price * Decimal::from(quantity);
            items.push(ResolvedItem {
                product_id: product.id,
                quantity,
                color: line.color.clone(),
                order: line_index as i64,
                is_kit_component: false,
            });
        }
    }

    Ok(PricedQuote { customer: request.customer.clone(), total, items })
}

/// Builds the customer-facing view of a stored quote: rows sorted by their
/// order (stable, so ties keep resolution order) with product names joined
/// from the catalog.
pub fn confirm_quote(record: &QuoteRecord, catalog: &ProductCatalog) -> ConfirmedQuote {
    let mut items = record.items.iter().collect::<Vec<_>>();
    items.sort_by_key(|item| item.order);

    ConfirmedQuote {
        id: Some(record.id),
        customer: record.customer.clone(),
        total: record.total,
        items: items
            .into_iter()
            .map(|item| ConfirmedLine {
                product_id: Some(item.product_id),
                product_name: catalog
                    .find_by_id(item.product_id)
                    .map(|product| product.name.clone())
                    .unwrap_or_else(|| format!("product {}", item.product_id)),
                quantity: item.quantity,
                color: item.color.clone(),
                order: Some(item.order),
                is_kit_component: item.is_kit_component,
            })
            .collect(),
    }
}
