use crate::commands::{prepare, CommandResult};
use quotedesk_core::config::ConfigOverrides;
use quotedesk_db::repositories::SqlProductRepository;
use quotedesk_db::{connect_with_config, migrations, seed_sample_catalog, SeedOutcome};

pub fn run(overrides: ConfigOverrides) -> CommandResult {
    let (config, runtime) = match prepare("seed", overrides) {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let repo = SqlProductRepository::new(pool.clone());
        let outcome = seed_sample_catalog(&repo)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 6u8));

        pool.close().await;
        outcome
    });

    match result {
        Ok(outcome) => CommandResult::success("seed", seed_message(&outcome)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn seed_message(outcome: &SeedOutcome) -> String {
    match outcome {
        SeedOutcome::AlreadySeeded { existing } => {
            format!("catalog already holds {existing} products; nothing seeded")
        }
        SeedOutcome::Seeded { products } => {
            let names = products
                .iter()
                .map(|product| format!("  - {}: {}", product.id, product.name))
                .collect::<Vec<_>>();
            format!("seeded {} products:\n{}", products.len(), names.join("\n"))
        }
    }
}
