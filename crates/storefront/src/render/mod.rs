//! Declarative rendering engine.
//!
//! A page declares bindings with `data-shopify` attributes and `<template>`
//! elements. The [`DeclarativeLoader`] resolves each binding's data through
//! the [`Storefront`](crate::Storefront) accessors and writes the rendered
//! markup through a [`Surface`]. [`HtmlPage`] is the surface for static
//! documents.

pub mod binding;
pub mod fields;
pub mod loader;
pub mod page;
pub mod template;

use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use thiserror::Error;

pub use binding::{Binding, BindingId, BindingParams, BindingState, SourceKind};
pub use loader::{DeclarativeLoader, Surface, Trigger};
pub use page::HtmlPage;
pub use template::{Node, Template};

/// Markup shown while a binding resolves.
pub const LOADING_MARKUP: &str = r#"<div class="shopify-loading">Loading...</div>"#;

/// Markup rendered by a `cart` binding when the cart has no lines.
pub const EMPTY_CART_MARKUP: &str = "<p>Your cart is empty</p>";

/// Errors raised by the rendering engine itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Template \"{0}\" not found")]
    TemplateNotFound(String),

    #[error("Unknown shopify type: {0}")]
    UnknownSource(String),

    #[error("{0}")]
    MissingParameter(&'static str),

    #[error("Unknown binding: {0}")]
    UnknownBinding(usize),

    #[error("HTML rewrite failed: {0}")]
    Rewrite(String),
}

impl From<lol_html::errors::RewritingError> for RenderError {
    fn from(err: lol_html::errors::RewritingError) -> Self {
        Self::Rewrite(err.to_string())
    }
}

/// Markup shown in place of a binding that failed.
#[must_use]
pub fn error_markup(message: &str) -> String {
    format!(r#"<div class="shopify-error">Error: {message}</div>"#)
}

/// The "Load More" control pointing at `next_page`.
#[must_use]
pub fn pagination_markup(next_page: u32) -> String {
    format!(r#"<button data-pagination-page="{next_page}">Load More</button>"#)
}

/// Put the pagination control inside every `[data-pagination]` element of
/// `html`. Output without such an element is returned unchanged.
///
/// # Errors
///
/// Returns `RenderError::Rewrite` if the markup cannot be rewritten.
pub fn inject_pagination(html: &str, next_page: u32) -> Result<String, RenderError> {
    let control = pagination_markup(next_page);
    let rewritten = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("[data-pagination]", |el| {
                el.set_inner_content(&control, ContentType::Html);
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )?;
    Ok(rewritten)
}
