//! Checkout from the command line.
//!
//! ```bash
//! sfk checkout
//! sfk checkout --existing
//! ```
//!
//! The checkout URL is printed instead of followed.

use std::io::{self, Write};

use storefront_kit::Navigator;
use tracing::{info, warn};

use super::{CommandResult, session};

/// Prints redirects to stdout and logs alerts.
struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn redirect(&self, url: &str) {
        if let Err(e) = writeln!(io::stdout().lock(), "{url}") {
            warn!(error = %e, "Failed to write checkout URL");
        }
    }

    fn alert(&self, message: &str) {
        warn!(alert = message, "Checkout alert");
    }
}

/// Create (or with `existing`, reuse) a remote cart and print its checkout URL.
///
/// # Errors
///
/// Returns an error if the cart is empty or the remote cart cannot be
/// created.
pub async fn run(existing: bool) -> CommandResult {
    let storefront = session()?;
    let handle = if existing {
        storefront.checkout_existing(&StdoutNavigator).await?
    } else {
        storefront.checkout(&StdoutNavigator).await?
    };
    info!(cart_id = %handle.id, "Checkout ready");
    Ok(())
}
