//! External service clients.

pub mod email;
pub mod paypal;

pub use email::{Mailer, MailerError};
pub use paypal::{PayPalClient, PayPalError};
