use quotedesk_client::{load_catalog, HttpQuoteApi};
use quotedesk_core::config::ConfigOverrides;
use quotedesk_core::cpq::{CatalogLoad, ProductCatalog};

use crate::commands::{prepare, CommandResult};
use crate::render;

pub fn run(overrides: ConfigOverrides) -> CommandResult {
    let (config, runtime) = match prepare("products", overrides) {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let api = match HttpQuoteApi::from_config(&config.api) {
        Ok(api) => api,
        Err(error) => {
            return CommandResult::failure("products", "client_build", error.to_string(), 3);
        }
    };

    let mut catalog = ProductCatalog::default();
    match runtime.block_on(load_catalog(&api, &mut catalog)) {
        CatalogLoad::Loaded { .. } => {
            CommandResult::success("products", render::catalog(&catalog))
        }
        CatalogLoad::Unavailable { reason } => CommandResult::failure(
            "products",
            "catalog_unavailable",
            format!("could not load products from {}: {reason}", api.base_url()),
            4,
        ),
    }
}
