//! `inkwell migrate` — Create the database schema.
//!
//! Opening the store runs the idempotent schema setup, so this is safe to
//! run repeatedly.

use inkwell_config::AppConfig;

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.database.backend == "memory" {
        println!("ℹ️  The memory backend has no schema to migrate");
        return Ok(());
    }

    println!("🔄 Migrating {}...", config.database.url);
    let stores = inkwell_store::open(&config.database).await?;
    tracing::info!(store = stores.assessments.name(), "Schema is up to date");
    println!("   ✅ Schema is up to date");

    Ok(())
}
