use rust_decimal::Decimal;
use tracing::info;

use crate::repositories::{BatchProduct, NewProduct, ProductRepository, RepositoryError};

pub use crate::repositories::SeedOutcome;

/// One entry of the demo catalog. Kit components are named rather than
/// numbered because ids are assigned by the store at insert time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleProduct {
    pub name: &'static str,
    pub price_cents: i64,
    pub colors: &'static [&'static str],
    pub kit_of: &'static [&'static str],
}

impl SampleProduct {
    pub fn price(&self) -> Decimal {
        Decimal::new(self.price_cents, 2)
    }
}

const SAMPLE_CATALOG: &[SampleProduct] = &[
    SampleProduct { name: "ACME Basic AC", price_cents: 10_000, colors: &[], kit_of: &[] },
    SampleProduct {
        name: "ACME Pro AC",
        price_cents: 18_000,
        colors: &["white", "black", "gray"],
        kit_of: &[],
    },
    SampleProduct { name: "ACME Wall Bracket", price_cents: 2_500, colors: &[], kit_of: &[] },
    SampleProduct {
        name: "ACME Air Filter",
        price_cents: 1_500,
        colors: &["blue", "green"],
        kit_of: &[],
    },
    SampleProduct {
        name: "ACME Installation Kit",
        price_cents: 0,
        colors: &[],
        kit_of: &["ACME Pro AC", "ACME Wall Bracket"],
    },
];

/// Demo catalog in insertion order. Components always precede the kits
/// that reference them.
pub fn sample_catalog() -> &'static [SampleProduct] {
    SAMPLE_CATALOG
}

/// Inserts the demo catalog unless the store already has any product.
/// The emptiness check and the inserts are one unit: a failure part way
/// leaves the store empty.
pub async fn seed_sample_catalog(
    repo: &dyn ProductRepository,
) -> Result<SeedOutcome, RepositoryError> {
    let outcome = repo.insert_all_if_empty(sample_batch()?).await?;

    match &outcome {
        SeedOutcome::AlreadySeeded { existing } => {
            info!(event_name = "db.seed.skipped", existing, "catalog already seeded");
        }
        SeedOutcome::Seeded { products } => {
            info!(event_name = "db.seed.completed", products = products.len(), "catalog seeded");
        }
    }
    Ok(outcome)
}

fn sample_batch() -> Result<Vec<BatchProduct>, RepositoryError> {
    SAMPLE_CATALOG
        .iter()
        .enumerate()
        .map(|(position, sample)| {
            let kit_of = sample
                .kit_of
                .iter()
                .map(|name| {
                    SAMPLE_CATALOG[..position]
                        .iter()
                        .position(|earlier| earlier.name == *name)
                        .ok_or_else(|| {
                            RepositoryError::Decode(format!(
                                "kit `{}` references `{name}` before it is seeded",
                                sample.name
                            ))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let product = NewProduct {
                name: sample.name.to_string(),
                price: sample.price(),
                colors: sample.colors.iter().map(|color| color.to_string()).collect(),
                kit_components: Vec::new(),
            };
            Ok(BatchProduct { product, kit_of })
        })
        .collect()
}
