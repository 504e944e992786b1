use crate::domain::product::{Product, ProductId};

/// Outcome of a catalog refresh. A failed load leaves the catalog empty
/// rather than failing the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogLoad {
    Loaded { products: usize },
    Unavailable { reason: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Applies the result of a fetch: success replaces the held products
    /// wholesale, failure degrades to an empty catalog.
    pub fn apply_load<E: std::fmt::Display>(
        &mut self,
        result: Result<Vec<Product>, E>,
    ) -> CatalogLoad {
        match result {
            Ok(products) => {
                let count = products.len();
                self.products = products;
                CatalogLoad::Loaded { products: count }
            }
            Err(error) => {
                self.products.clear();
                CatalogLoad::Unavailable { reason: error.to_string() }
            }
        }
    }

    pub fn find_by_id(&self, product_id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == product_id)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
