//! Seed command - Inserts placeholder data.

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::db::seed;
use crate::infra::Database;

/// Execute the seed command. Pending migrations run first.
pub async fn execute(config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let report = seed::run(db.connection()).await?;

    println!(
        "Seeded {} users, {} customers, {} invoices",
        report.users, report.customers, report.invoices
    );
    Ok(())
}
