use std::num::NonZeroU32;

use crate::cpq::catalog::ProductCatalog;
use crate::domain::product::Product;
use crate::domain::quote::QuoteLineItem;
use crate::errors::DraftError;

/// Client-local list of quote lines. Insertion order is display order and
/// submission order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuoteDraft {
    items: Vec<QuoteLineItem>,
}

/// A draft line paired with the catalog product it references.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedLine<'a> {
    pub index: usize,
    pub item: &'a QuoteLineItem,
    pub product: &'a Product,
}

impl QuoteDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new line for `product` and returns its index. Adding the
    /// same product twice yields two independent lines.
    pub fn add_item(&mut self, product: &Product) -> usize {
        let item = QuoteLineItem {
            product_id: product.id,
            quantity: NonZeroU32::MIN,
            color: product.default_color().map(str::to_string),
            kit_order: product.is_kit.then(|| product.kit_components.clone()),
        };
        self.items.push(item);
        self.items.len() - 1
    }

    /// Accepts any color label; it is not checked against the product.
    pub fn set_color(
        &mut self,
        index: usize,
        color: impl Into<String>,
    ) -> Result<(), DraftError> {
        let item = self.item_mut(index)?;
        item.color = Some(color.into());
        Ok(())
    }

    /// Reverses the current kit order in place, so two calls restore the
    /// previous order. Lines without a kit order are left untouched.
    pub fn reverse_kit_order(&mut self, index: usize) -> Result<(), DraftError> {
        let item = self.item_mut(index)?;
        if let Some(kit_order) = item.kit_order.as_mut() {
            kit_order.reverse();
        }
        Ok(())
    }

    pub fn to_payload(&self) -> Vec<QuoteLineItem> {
        self.items.clone()
    }

    /// Lines whose product no longer resolves are skipped, not reported.
    pub fn resolved_lines<'a>(
        &'a self,
        catalog: &'a ProductCatalog,
    ) -> impl Iterator<Item = ResolvedLine<'a>> + 'a {
        self.items.iter().enumerate().filter_map(move |(index, item)| {
            catalog.find_by_id(item.product_id).map(|product| ResolvedLine { index, item, product })
        })
    }

    pub fn items(&self) -> &[QuoteLineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn item_mut(&mut self, index: usize) -> Result<&mut QuoteLineItem, DraftError> {
        let len = self.items.len();
        self.items.get_mut(index).ok_or(DraftError::IndexOutOfRange { index, len })
    }
}
