use std::collections::HashSet;

use quotedesk_db::repositories::{InMemoryProductRepository, ProductRepository};
use quotedesk_db::{sample_catalog, seed_sample_catalog, SeedOutcome};
use serde::Deserialize;
use serde_json::Value;

type SeedContractTestResult<T = ()> = Result<T, String>;

macro_rules! require {
    ($cond:expr) => {
        if !$cond {
            return Err(format!("assertion failed: `{}`", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(format!($($arg)*));
        }
    };
}

macro_rules! require_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            return Err(format!(
                "assertion failed: `left == right` (`{:?}` != `{:?}`)",
                $left,
                $right
            ));
        }
    };
    ($left:expr, $right:expr, $($arg:tt)*) => {
        if $left != $right {
            return Err(format!($($arg)*));
        }
    };
}

#[derive(Debug, Deserialize)]
struct ContractProduct {
    name: String,
    price: f64,
    colors: Vec<String>,
    kit_of: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogContract {
    dataset: String,
    products: Vec<ContractProduct>,
}

fn load_contract() -> SeedContractTestResult<CatalogContract> {
    serde_json::from_str(include_str!("../../../config/fixtures/sample_catalog_contract.json"))
        .map_err(|error| format!("catalog contract JSON must parse: {error}"))
}

#[test]
fn sample_catalog_matches_contract_fixture() -> SeedContractTestResult {
    let contract = load_contract()?;
    let catalog = sample_catalog();
    let mut names_seen = HashSet::new();

    require_eq!(contract.dataset, "acme_demo_catalog");
    require_eq!(contract.products.len(), catalog.len());

    for (expected, sample) in contract.products.iter().zip(catalog) {
        require!(names_seen.insert(sample.name), "duplicate product name: {}", sample.name);
        require_eq!(expected.name, sample.name);
        require_eq!(
            (expected.price * 100.0).round() as i64,
            sample.price_cents,
            "price mismatch for {}",
            sample.name
        );
        require_eq!(expected.colors, sample.colors, "colors mismatch for {}", sample.name);
        require_eq!(expected.kit_of, sample.kit_of, "kit mismatch for {}", sample.name);
    }

    Ok(())
}

#[tokio::test]
async fn seeded_catalog_serializes_in_wire_shape() -> SeedContractTestResult {
    let contract = load_contract()?;
    let repo = InMemoryProductRepository::default();

    let outcome = seed_sample_catalog(&repo).await.map_err(|error| error.to_string())?;
    require!(matches!(outcome, SeedOutcome::Seeded { .. }), "first seed should insert");

    let products = repo.list().await.map_err(|error| error.to_string())?;
    let wire = serde_json::to_value(&products).map_err(|error| error.to_string())?;
    let rows = wire.as_array().ok_or("products should serialize to an array")?;
    require_eq!(rows.len(), contract.products.len());

    for (row, expected) in rows.iter().zip(&contract.products) {
        require_eq!(row.get("name").and_then(Value::as_str), Some(expected.name.as_str()));
        require_eq!(row.get("price").and_then(Value::as_f64), Some(expected.price));
        require_eq!(
            row.get("has_colors").and_then(Value::as_bool),
            Some(!expected.colors.is_empty())
        );
        require_eq!(row.get("is_kit").and_then(Value::as_bool), Some(!expected.kit_of.is_empty()));

        let component_ids = row
            .get("kit_components")
            .and_then(Value::as_array)
            .ok_or("kit_components should be an array")?;
        require_eq!(component_ids.len(), expected.kit_of.len());
        for (component_id, component_name) in component_ids.iter().zip(&expected.kit_of) {
            let target = rows
                .iter()
                .find(|candidate| candidate.get("id") == Some(component_id))
                .ok_or_else(|| format!("component {component_id} should be seeded"))?;
            require_eq!(
                target.get("name").and_then(Value::as_str),
                Some(component_name.as_str())
            );
        }
    }

    Ok(())
}
