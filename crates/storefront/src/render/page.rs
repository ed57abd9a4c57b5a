//! A [`Surface`] over a static HTML document.
//!
//! Bindings are numbered by the document order of their `data-shopify`
//! elements. `<template id>` bodies are set aside before scanning so markup
//! inside a template never declares a binding, and are put back verbatim on
//! serialization. When bindings nest, the outer binding's content replaces
//! the inner one.

use std::collections::HashMap;
use std::sync::LazyLock;

use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str};
use regex::{Captures, Regex};

use super::RenderError;
use super::binding::{Binding, BindingId};
use super::loader::Surface;

/// Regex for `<template id="...">` elements and their bodies. The id may be
/// quoted or bare.
static TEMPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)(<template\b[^>]*\bid\s*=\s*(?:["']([^"']+)["']|([^\s"'>]+))[^>]*>)(.*?)(</template>)"#,
    )
    .expect("Invalid regex")
});

fn marker(index: usize) -> String {
    format!("<!--sfk-template-{index}-->")
}

/// A parsed page and the content written to its bindings so far.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    /// The document with template bodies replaced by markers.
    masked: String,
    /// `(id, body)` per template, in document order.
    templates: Vec<(String, String)>,
    bindings: Vec<Binding>,
    contents: HashMap<BindingId, String>,
}

impl HtmlPage {
    /// Scan `source` for templates and bindings.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Rewrite` if the document cannot be tokenized.
    pub fn parse(source: &str) -> Result<Self, RenderError> {
        let mut templates = Vec::new();
        let masked = TEMPLATE_RE
            .replace_all(source, |caps: &Captures<'_>| {
                let open = caps.get(1).map_or("", |m| m.as_str());
                let id = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
                let body = caps.get(4).map_or("", |m| m.as_str());
                let close = caps.get(5).map_or("", |m| m.as_str());
                let index = templates.len();
                templates.push((id.to_string(), body.to_string()));
                format!("{open}{}{close}", marker(index))
            })
            .into_owned();

        let mut found: Vec<HashMap<String, String>> = Vec::new();
        rewrite_str(
            &masked,
            RewriteStrSettings {
                element_content_handlers: vec![element!("[data-shopify]", |el| {
                    let attributes = el
                        .attributes()
                        .iter()
                        .filter(|attr| attr.name().starts_with("data-"))
                        .map(|attr| (attr.name(), attr.value()))
                        .collect();
                    found.push(attributes);
                    Ok(())
                })],
                ..RewriteStrSettings::new()
            },
        )?;

        let bindings: Vec<Binding> = found
            .iter()
            .enumerate()
            .map(|(index, attributes)| Binding::from_attributes(BindingId(index), attributes))
            .collect();

        tracing::debug!(
            templates = templates.len(),
            bindings = bindings.len(),
            "Parsed page"
        );

        Ok(Self {
            masked,
            templates,
            bindings,
            contents: HashMap::new(),
        })
    }

    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Template ids and bodies in document order.
    #[must_use]
    pub fn templates(&self) -> &[(String, String)] {
        &self.templates
    }

    /// The content last written to `binding`, if any.
    #[must_use]
    pub fn content(&self, binding: BindingId) -> Option<&str> {
        self.contents.get(&binding).map(String::as_str)
    }

    /// Serialize the document with each binding's current content.
    ///
    /// Bindings never written keep their original content.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Rewrite` if the document cannot be rewritten.
    pub fn to_html(&self) -> Result<String, RenderError> {
        let contents = &self.contents;
        let mut index = 0;
        let mut html = rewrite_str(
            &self.masked,
            RewriteStrSettings {
                element_content_handlers: vec![element!("[data-shopify]", move |el| {
                    if let Some(content) = contents.get(&BindingId(index)) {
                        el.set_inner_content(content, ContentType::Html);
                    }
                    index += 1;
                    Ok(())
                })],
                ..RewriteStrSettings::new()
            },
        )?;

        for (index, (_, body)) in self.templates.iter().enumerate() {
            html = html.replacen(&marker(index), body, 1);
        }
        Ok(html)
    }
}

impl Surface for HtmlPage {
    fn set_content(&mut self, binding: BindingId, html: &str) {
        self.contents.insert(binding, html.to_string());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::render::SourceKind;

    const PAGE: &str = r#"<html><body>
<template id="card"><div class="card" data-shopify="ignored">{{title}}</div></template>
<section data-shopify="products" data-collection="Shirts" data-template="card" data-limit="4">static</section>
<aside data-shopify="cart" data-template='line'></aside>
</body></html>"#;

    #[test]
    fn test_parse_collects_templates_and_bindings() {
        let page = HtmlPage::parse(PAGE).unwrap();

        assert_eq!(page.templates().len(), 1);
        assert_eq!(page.templates()[0].0, "card");
        assert_eq!(
            page.templates()[0].1,
            r#"<div class="card" data-shopify="ignored">{{title}}</div>"#
        );

        let bindings = page.bindings();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].id, BindingId(0));
        assert_eq!(bindings[0].kind().unwrap(), SourceKind::Products);
        assert_eq!(bindings[0].params.collection.as_deref(), Some("Shirts"));
        assert_eq!(bindings[0].params.limit, 4);
        assert_eq!(bindings[1].kind().unwrap(), SourceKind::Cart);
        assert_eq!(bindings[1].template.as_deref(), Some("line"));
    }

    #[test]
    fn test_unquoted_template_id() {
        let source = r#"<template id=card><p data-shopify="cart">{{title}}</p></template><div data-shopify="collections" data-template="card"></div>"#;
        let page = HtmlPage::parse(source).unwrap();

        assert_eq!(page.templates().len(), 1);
        assert_eq!(page.templates()[0].0, "card");
        assert_eq!(page.templates()[0].1, r#"<p data-shopify="cart">{{title}}</p>"#);
        assert_eq!(page.bindings().len(), 1);
        assert_eq!(page.bindings()[0].kind().unwrap(), SourceKind::Collections);
        assert_eq!(page.to_html().unwrap(), source);
    }

    #[test]
    fn test_to_html_without_content_is_unchanged() {
        let page = HtmlPage::parse(PAGE).unwrap();
        assert_eq!(page.to_html().unwrap(), PAGE);
    }

    #[test]
    fn test_to_html_writes_binding_content() {
        let mut page = HtmlPage::parse(PAGE).unwrap();
        page.set_content(BindingId(1), "<p>Your cart is empty</p>");

        let html = page.to_html().unwrap();
        assert!(html.contains(r#"data-template='line'><p>Your cart is empty</p></aside>"#));
        assert!(html.contains(">static</section>"));
        assert!(html.contains(r#"<template id="card"><div class="card" data-shopify="ignored">{{title}}</div></template>"#));
        assert_eq!(page.content(BindingId(1)), Some("<p>Your cart is empty</p>"));
    }

    #[test]
    fn test_latest_content_wins() {
        let mut page = HtmlPage::parse(r#"<div data-shopify="collections" data-template="t"></div>"#).unwrap();
        page.set_content(BindingId(0), "Loading");
        page.set_content(BindingId(0), "<ul></ul>");
        assert_eq!(
            page.to_html().unwrap(),
            r#"<div data-shopify="collections" data-template="t"><ul></ul></div>"#
        );
    }
}
