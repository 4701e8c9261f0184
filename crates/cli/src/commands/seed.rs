use crate::commands::{load_config, runtime, CommandResult};
use lootshelf_core::catalog::{seed_if_empty, SeedOutcome};
use lootshelf_db::open_store;

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let runtime = match runtime("seed") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let store = open_store(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        seed_if_empty(&*store).await.map_err(|error| ("seed_execution", error.to_string(), 5u8))
    });

    match result {
        Ok(SeedOutcome::StoreUnavailable) => CommandResult::failure(
            "seed",
            "db_connectivity",
            outcome_message(SeedOutcome::StoreUnavailable),
            4,
        ),
        Ok(outcome) => CommandResult::success("seed", outcome_message(outcome)),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn outcome_message(outcome: SeedOutcome) -> String {
    match outcome {
        SeedOutcome::Seeded(inserted) => format!("seeded {inserted} sample products"),
        SeedOutcome::AlreadyPopulated(existing) => {
            format!("catalog already holds {existing} products; nothing seeded")
        }
        SeedOutcome::StoreUnavailable => "document store is not available".to_string(),
    }
}
