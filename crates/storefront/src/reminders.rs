//! Subscription expiry reminders.
//!
//! Finds completed orders whose subscription expires within the next
//! seven days and have not been reminded, emails each customer, and flips
//! `reminder_sent` only after the email goes out. Orders whose email
//! fails are left unflagged so the next sweep retries them.
//!
//! Run via `cirrus-cli remind`, typically from a daily scheduler.

use chrono::{DateTime, TimeDelta, Utc};
use sqlx::PgPool;
use thiserror::Error;

use cirrus_core::format_usd;

use crate::db::orders::{OrderRepository, ReminderItem, ReminderOrder};
use crate::db::RepositoryError;
use crate::services::Mailer;

/// How far ahead the sweep looks.
const REMINDER_WINDOW_DAYS: i64 = 7;

/// Errors that abort the whole sweep (per-order failures are skipped).
#[derive(Debug, Error)]
pub enum SweepError {
    /// Database error while querying candidates.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Outcome of one sweep run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Reminders sent and flagged.
    pub sent: usize,
    /// Orders skipped because the email or flag update failed.
    pub failed: usize,
}

/// Send expiry reminders for orders expiring within the next 7 days.
///
/// # Errors
///
/// Returns [`SweepError`] only if the candidate query fails; individual
/// order failures are logged and counted in the outcome.
pub async fn run_sweep(
    pool: &PgPool,
    mailer: &Mailer,
    now: DateTime<Utc>,
) -> Result<SweepOutcome, SweepError> {
    let repo = OrderRepository::new(pool);
    let window = TimeDelta::days(REMINDER_WINDOW_DAYS);
    let expiring = repo.find_expiring(now, window).await?;

    tracing::info!(count = expiring.len(), "subscriptions expiring soon");

    let mut outcome = SweepOutcome::default();
    for order in expiring {
        match remind_one(&repo, mailer, &order).await {
            Ok(()) => outcome.sent += 1,
            Err(e) => {
                tracing::warn!(order_id = %order.id, "reminder failed, will retry next sweep: {e}");
                outcome.failed += 1;
            }
        }
    }

    tracing::info!(sent = outcome.sent, failed = outcome.failed, "reminder sweep done");
    Ok(outcome)
}

async fn remind_one(
    repo: &OrderRepository<'_>,
    mailer: &Mailer,
    order: &ReminderOrder,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let items = repo.reminder_items(order.id).await?;
    let html = reminder_html(order, &items);

    mailer
        .send(
            &order.billing_email,
            "Your Cirrus subscription expires soon",
            &html,
        )
        .await?;

    // Flag only after the email went out; a crash in between re-sends,
    // which beats never reminding.
    repo.mark_reminder_sent(order.id).await?;
    Ok(())
}

fn item_rows(items: &[ReminderItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "<tr>\
                 <td style=\"padding: 10px; border-bottom: 1px solid #eee;\">{}</td>\
                 <td style=\"padding: 10px; border-bottom: 1px solid #eee;\">{}</td>\
                 <td style=\"padding: 10px; border-bottom: 1px solid #eee;\">{}</td>\
                 </tr>",
                item.product_name,
                item.quantity,
                format_usd(item.price),
            )
        })
        .collect()
}

/// Render the expiry reminder email.
#[must_use]
pub fn reminder_html(order: &ReminderOrder, items: &[ReminderItem]) -> String {
    let expiration_date = order.expires_at.format("%B %e, %Y");
    let rows = item_rows(items);
    let total = format_usd(order.total_amount);

    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <div style="text-align: center; border-bottom: 2px solid #333; padding-bottom: 20px; margin-bottom: 20px;">
    <h1 style="color: #333; margin: 0;">Cirrus</h1>
    <h2 style="color: #333; margin: 10px 0 0 0;">Subscription Reminder</h2>
  </div>
  <p>Hi {name},</p>
  <p>This is a friendly reminder that your Cirrus subscription will expire on <strong>{expiration_date}</strong>.</p>
  <table style="width: 100%; border-collapse: collapse; margin: 20px 0;">
    <thead>
      <tr>
        <th style="padding: 10px; text-align: left; background-color: #f8f8f8;">Product</th>
        <th style="padding: 10px; text-align: left; background-color: #f8f8f8;">Quantity</th>
        <th style="padding: 10px; text-align: left; background-color: #f8f8f8;">Price</th>
      </tr>
    </thead>
    <tbody>
      {rows}
      <tr>
        <td colspan="2" style="padding: 10px; text-align: right;"><strong>Total:</strong></td>
        <td style="padding: 10px;"><strong>{total}</strong></td>
      </tr>
    </tbody>
  </table>
  <p>To ensure uninterrupted service, please renew your subscription before the expiration date.</p>
  <div style="text-align: center; margin-top: 30px; color: #555;">
    <p style="font-size: 12px; color: #999;">If you have already renewed, you can ignore this email.</p>
  </div>
</div>"#,
        name = order.billing_name,
    )
}
