//! Subcommand implementations.
//!
//! Results go to stdout (pretty JSON, HTML or a single line); everything
//! else goes through `tracing` to stderr.

pub mod cache;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod render;

use std::fmt::Display;
use std::io::{self, Write};

use serde::Serialize;
use storefront_kit::{Storefront, StorefrontKitConfig};

/// Result type shared by all subcommands.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open a session from the environment.
///
/// Incomplete configuration only warns here so offline cart and cache
/// commands keep working; `sfk config check` reports it as an error.
fn session() -> Result<Storefront, Box<dyn std::error::Error>> {
    let config = StorefrontKitConfig::from_env();
    if let Err(e) = config.validate() {
        tracing::warn!(error = %e, "Configuration incomplete");
    }
    Ok(Storefront::from_config(&config)?)
}

fn write_json(value: &impl Serialize) -> CommandResult {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

fn write_line(text: impl Display) -> CommandResult {
    writeln!(io::stdout().lock(), "{text}")?;
    Ok(())
}
