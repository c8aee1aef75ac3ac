//! `migrate` - apply the storefront database migrations.

use secrecy::SecretString;

/// Run pending migrations from `crates/storefront/migrations`.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration cannot be applied.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let database_url = std::env::var("CIRRUS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| "CIRRUS_DATABASE_URL is not set")?;

    let pool = cirrus_storefront::db::create_pool(&SecretString::from(database_url)).await?;

    tracing::info!("applying migrations");
    sqlx::migrate!("../storefront/migrations").run(&pool).await?;
    tracing::info!("migrations up to date");

    Ok(())
}
