//! `remind` - send subscription expiry reminders.
//!
//! Intended to run once a day from a scheduler. Orders whose reminder
//! fails stay unflagged and are retried on the next run.

use chrono::Utc;

use cirrus_storefront::config::StorefrontConfig;
use cirrus_storefront::services::Mailer;
use cirrus_storefront::{db, reminders};

/// Run one reminder sweep.
///
/// # Errors
///
/// Returns an error if configuration, the database connection, or the
/// candidate query fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    let mailer = Mailer::new(&config.email);

    let outcome = reminders::run_sweep(&pool, &mailer, Utc::now()).await?;
    tracing::info!(
        sent = outcome.sent,
        failed = outcome.failed,
        "reminder sweep finished"
    );

    Ok(())
}
