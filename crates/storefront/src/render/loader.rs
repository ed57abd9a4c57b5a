//! The declarative loader.
//!
//! Processing one binding runs in a fixed order: the template is looked up
//! first, then the loading markup is shown, then the source type is parsed
//! and its data fetched, and finally the template is rendered. Any failure
//! replaces the binding's content with the error markup; other bindings are
//! unaffected.

use std::collections::HashMap;

use serde_json::{Value, json};
use storefront_kit_core::{has_next_page, paginate};
use tracing::instrument;

use super::binding::{Binding, BindingId, BindingParams, BindingState, SourceKind};
use super::page::HtmlPage;
use super::template::Template;
use super::{EMPTY_CART_MARKUP, LOADING_MARKUP, RenderError, error_markup, inject_pagination};
use crate::config::leading_integer;
use crate::context::Storefront;
use crate::error::{Error, Result};

/// Where rendered markup goes. The host's DOM adapter.
pub trait Surface: Send {
    /// Replace the inner content of `binding`'s element.
    fn set_content(&mut self, binding: BindingId, html: &str);
}

/// A user interaction routed to the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// An add-to-cart control was activated.
    ///
    /// `variant_id` is the control's own `data-add-to-cart` value;
    /// `selected_variant` is the value of the enclosing product's variant
    /// selector, supplied by the host only for controls marked
    /// `data-variant-from-selector`. `quantity` is the raw `data-quantity`.
    AddToCart {
        variant_id: Option<String>,
        selected_variant: Option<String>,
        quantity: Option<String>,
    },
    /// A pagination control asked for `page` of `binding`.
    Paginate { binding: BindingId, page: u32 },
}

#[derive(Debug)]
struct Slot {
    binding: Binding,
    state: BindingState,
}

/// Owns the template registry and the bindings of one page.
#[derive(Debug)]
pub struct DeclarativeLoader<'s> {
    storefront: &'s Storefront,
    templates: HashMap<String, Template>,
    slots: Vec<Slot>,
}

impl<'s> DeclarativeLoader<'s> {
    #[must_use]
    pub fn new(storefront: &'s Storefront) -> Self {
        Self {
            storefront,
            templates: HashMap::new(),
            slots: Vec::new(),
        }
    }

    /// A loader holding every template and binding declared by `page`.
    #[must_use]
    pub fn from_page(storefront: &'s Storefront, page: &HtmlPage) -> Self {
        let mut loader = Self::new(storefront);
        for (id, source) in page.templates() {
            loader.register_template(id.clone(), source);
        }
        for binding in page.bindings() {
            loader.add_binding(binding.clone());
        }
        tracing::debug!(
            templates = loader.templates.len(),
            bindings = loader.slots.len(),
            "Loader initialized from page"
        );
        loader
    }

    /// Parse and register a template under `id`, replacing any previous one.
    pub fn register_template(&mut self, id: impl Into<String>, source: &str) {
        self.templates.insert(id.into(), Template::parse(source));
    }

    pub fn add_binding(&mut self, binding: Binding) {
        self.slots.push(Slot {
            binding,
            state: BindingState::Idle,
        });
    }

    #[must_use]
    pub fn bindings(&self) -> Vec<&Binding> {
        self.slots.iter().map(|slot| &slot.binding).collect()
    }

    #[must_use]
    pub fn state(&self, id: BindingId) -> Option<&BindingState> {
        self.slot(id).map(|slot| &slot.state)
    }

    fn slot(&self, id: BindingId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.binding.id == id)
    }

    fn set_state(&mut self, id: BindingId, state: BindingState) {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.binding.id == id) {
            slot.state = state;
        }
    }

    // =========================================================================
    // Processing
    // =========================================================================

    /// Process every binding in declaration order.
    ///
    /// A failing binding shows the error markup and does not stop the rest.
    /// Returns the number of bindings that failed.
    pub async fn process_all(&mut self, surface: &mut dyn Surface) -> usize {
        let ids: Vec<BindingId> = self.slots.iter().map(|slot| slot.binding.id).collect();
        let mut failures = 0;
        for id in ids {
            if self.process(id, surface).await.is_err() {
                failures += 1;
            }
        }
        tracing::info!(bindings = self.slots.len(), failures, "Processed bindings");
        failures
    }

    /// Process one binding and write its content to `surface`.
    ///
    /// # Errors
    ///
    /// Returns the error that was rendered into the binding, or
    /// `RenderError::UnknownBinding` if no binding has this id (nothing is
    /// written then).
    #[instrument(skip(self, surface))]
    pub async fn process(&mut self, id: BindingId, surface: &mut dyn Surface) -> Result<()> {
        let binding = self
            .slot(id)
            .map(|slot| slot.binding.clone())
            .ok_or(RenderError::UnknownBinding(id.0))?;

        match self.render_binding(&binding, surface).await {
            Ok(html) => {
                surface.set_content(id, &html);
                self.set_state(id, BindingState::Rendered);
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(binding = %id, source = %binding.source, error = %message, "Binding failed");
                surface.set_content(id, &error_markup(&message));
                self.set_state(id, BindingState::Error(message));
                Err(e)
            }
        }
    }

    async fn render_binding(&mut self, binding: &Binding, surface: &mut dyn Surface) -> Result<String> {
        let template = binding
            .template
            .as_deref()
            .and_then(|name| self.templates.get(name))
            .cloned()
            .ok_or_else(|| {
                RenderError::TemplateNotFound(binding.template.clone().unwrap_or_default())
            })?;

        surface.set_content(binding.id, LOADING_MARKUP);
        self.set_state(binding.id, BindingState::Loading);

        let kind = binding.kind()?;
        self.resolve(kind, &binding.params, &template).await
    }

    async fn resolve(&self, kind: SourceKind, params: &BindingParams, template: &Template) -> Result<String> {
        let storefront = self.storefront;
        match kind {
            SourceKind::Products => {
                let name = params
                    .collection
                    .as_deref()
                    .ok_or(RenderError::MissingParameter("data-collection is required for products"))?;
                let all = storefront.products_by_collection(name).await?;
                render_page(template, &all, params)
            }
            SourceKind::Product => {
                let product = match (&params.handle, &params.id) {
                    (Some(handle), _) => storefront.product_by_handle(handle).await?,
                    (None, Some(id)) => storefront.product_by_id(id).await?,
                    (None, None) => {
                        return Err(RenderError::MissingParameter(
                            "data-handle or data-id is required for product",
                        )
                        .into());
                    }
                };
                Ok(template.render(&product))
            }
            SourceKind::Collections => Ok(template.render_list(&storefront.collections().await?)),
            SourceKind::Search => {
                let query = params
                    .query
                    .as_deref()
                    .ok_or(RenderError::MissingParameter("data-query is required for search"))?;
                let all = storefront.search_products(query).await?;
                render_page(template, &all, params)
            }
            SourceKind::Cart => {
                let lines = storefront.cart().list();
                if lines.is_empty() {
                    return Ok(EMPTY_CART_MARKUP.to_string());
                }
                let items: Vec<Value> = lines
                    .iter()
                    .map(|line| json!({ "variantId": line.variant_id.as_str(), "quantity": line.quantity }))
                    .collect();
                Ok(template.render_list(&items))
            }
        }
    }

    // =========================================================================
    // Triggers
    // =========================================================================

    /// Handle a user interaction.
    ///
    /// # Errors
    ///
    /// - `Error::Validation("Please select a variant")` when an add-to-cart
    ///   trigger carries no variant
    /// - the storage error if the cart cannot be persisted
    /// - for pagination, whatever [`process`](Self::process) returns
    #[instrument(skip(self, surface))]
    pub async fn dispatch(&mut self, trigger: Trigger, surface: &mut dyn Surface) -> Result<()> {
        match trigger {
            Trigger::AddToCart {
                variant_id,
                selected_variant,
                quantity,
            } => {
                let variant = variant_id
                    .filter(|v| !v.is_empty())
                    .or_else(|| selected_variant.filter(|v| !v.is_empty()))
                    .ok_or_else(|| Error::validation("Please select a variant"))?;
                let quantity = quantity
                    .as_deref()
                    .and_then(leading_integer)
                    .and_then(|n| u32::try_from(n).ok())
                    .filter(|n| *n > 0)
                    .unwrap_or(1);

                self.storefront.cart().add(variant, quantity)?;
                self.refresh_cart_bindings(surface).await;
                Ok(())
            }
            Trigger::Paginate { binding, page } => {
                let slot = self
                    .slots
                    .iter_mut()
                    .find(|slot| slot.binding.id == binding)
                    .ok_or(RenderError::UnknownBinding(binding.0))?;
                slot.binding.params.page = page.max(1);
                self.process(binding, surface).await
            }
        }
    }

    /// Re-render every `cart` binding.
    async fn refresh_cart_bindings(&mut self, surface: &mut dyn Surface) {
        let ids: Vec<BindingId> = self
            .slots
            .iter()
            .filter(|slot| slot.binding.source == SourceKind::Cart.as_str())
            .map(|slot| slot.binding.id)
            .collect();
        for id in ids {
            // Failures are already rendered into the binding.
            let _ = self.process(id, surface).await;
        }
    }
}

/// Render the binding's page window and the pagination control.
fn render_page(template: &Template, all: &[Value], params: &BindingParams) -> Result<String> {
    let page = usize::try_from(params.page).unwrap_or(1);
    let html = template.render_list(paginate(all, page, params.limit));
    if has_next_page(all.len(), page, params.limit) {
        Ok(inject_pagination(&html, params.page.saturating_add(1))?)
    } else {
        Ok(html)
    }
}
