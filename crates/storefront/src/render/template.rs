//! The template mini-language.
//!
//! ```text
//! {{title}}                      scalar, dotted paths allowed (seo.title)
//! {{price}} {{image}} {{variantId}}  special-cased, see `fields`
//! {{#each images}}<img src="{{this}}">{{/each}}
//! {{#each variants}}<option value="{{id}}">{{title}} {{price}}</option>{{/each}}
//! ```
//!
//! Parsing never fails. A tag that is not well-formed stays in the output as
//! literal text, as does an unclosed `{{#each}}` or a stray `{{/each}}`.
//! Loops may nest.

use std::borrow::Cow;

use serde_json::Value;
use storefront_kit_core::display_amount;

use super::fields::{self, truthy};

/// A node of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Text copied to the output unchanged.
    Literal(String),
    /// `{{path}}`
    Scalar(String),
    /// `{{this}}`, the current loop item itself.
    This,
    /// `{{#each field}}body{{/each}}`
    Loop { field: String, body: Vec<Self> },
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

// =============================================================================
// Parsing
// =============================================================================

enum Tag<'a> {
    Scalar(&'a str),
    This,
    Open(&'a str),
    Close,
}

fn is_path(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|segment| {
            !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

fn classify(inner: &str) -> Option<Tag<'_>> {
    let inner = inner.trim();
    if inner == "this" {
        return Some(Tag::This);
    }
    if inner == "/each" {
        return Some(Tag::Close);
    }
    if let Some(field) = inner.strip_prefix("#each") {
        let field = field.trim();
        // `{{#eachfoo}}` is not a loop
        let separated = inner.len() > "#each".len() + field.len();
        return (separated && is_path(field)).then_some(Tag::Open(field));
    }
    is_path(inner).then_some(Tag::Scalar(inner))
}

/// A loop being collected, with the tag text to restore if it never closes.
struct Frame {
    field: String,
    open_tag: String,
    nodes: Vec<Node>,
}

struct Builder {
    root: Vec<Node>,
    stack: Vec<Frame>,
}

impl Builder {
    fn current(&mut self) -> &mut Vec<Node> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.nodes,
            None => &mut self.root,
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let nodes = self.current();
        if let Some(Node::Literal(last)) = nodes.last_mut() {
            last.push_str(text);
        } else {
            nodes.push(Node::Literal(text.to_string()));
        }
    }

    fn push_node(&mut self, node: Node) {
        match node {
            Node::Literal(text) => self.push_text(&text),
            other => self.current().push(other),
        }
    }

    fn finish(mut self) -> Vec<Node> {
        // Unclosed loops become literal text followed by their contents.
        while let Some(frame) = self.stack.pop() {
            self.push_text(&frame.open_tag);
            for node in frame.nodes {
                self.push_node(node);
            }
        }
        self.root
    }
}

impl Template {
    /// Parse template source.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let mut builder = Builder {
            root: Vec::new(),
            stack: Vec::new(),
        };

        let mut rest = source;
        while let Some((before, after)) = rest.split_once("{{") {
            builder.push_text(before);

            let tag = after
                .split_once("}}")
                .and_then(|(inner, tail)| classify(inner).map(|tag| (tag, inner, tail)));
            let Some((tag, inner, tail)) = tag else {
                builder.push_text("{{");
                rest = after;
                continue;
            };

            match tag {
                Tag::Scalar(path) => builder.push_node(Node::Scalar(path.to_string())),
                Tag::This => builder.push_node(Node::This),
                Tag::Open(field) => builder.stack.push(Frame {
                    field: field.to_string(),
                    open_tag: format!("{{{{{inner}}}}}"),
                    nodes: Vec::new(),
                }),
                Tag::Close => match builder.stack.pop() {
                    Some(frame) => builder.push_node(Node::Loop {
                        field: frame.field,
                        body: frame.nodes,
                    }),
                    None => builder.push_text("{{/each}}"),
                },
            }
            rest = tail;
        }
        builder.push_text(rest);

        Self {
            nodes: builder.finish(),
        }
    }

    /// The parsed nodes.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Render against a single entity.
    #[must_use]
    pub fn render(&self, entity: &Value) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, Scope::Entity(entity), &mut out);
        out
    }

    /// Render once per entity and concatenate.
    #[must_use]
    pub fn render_list(&self, entities: &[Value]) -> String {
        entities.iter().map(|entity| self.render(entity)).collect()
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// What placeholders resolve against.
#[derive(Debug, Clone, Copy)]
enum Scope<'a> {
    /// A top-level entity: special-cased field lookup.
    Entity(&'a Value),
    /// A loop item: plain lookup, `price` read from the item's own price.
    Item(&'a Value),
}

fn render_nodes(nodes: &[Node], scope: Scope<'_>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Literal(text) => out.push_str(text),
            Node::Scalar(path) => out.push_str(&scalar(scope, path)),
            Node::This => {
                if let Scope::Item(item) = scope {
                    out.push_str(&fields::text(Some(item)));
                }
            }
            Node::Loop { field, body } => render_loop(scope, field, body, out),
        }
    }
}

fn scalar<'a>(scope: Scope<'a>, path: &str) -> Cow<'a, str> {
    match scope {
        Scope::Entity(entity) => match fields::lookup(entity, path) {
            Some(Cow::Borrowed(value)) => fields::text(Some(value)),
            Some(Cow::Owned(value)) => Cow::Owned(fields::text(Some(&value)).into_owned()),
            None => Cow::Borrowed(""),
        },
        // Primitive items only answer `{{this}}`.
        Scope::Item(item) if !item.is_object() => Cow::Borrowed(""),
        Scope::Item(item) => match item.get("price").filter(|p| path == "price" && truthy(p)) {
            Some(price) => Cow::Owned(display_amount(price.get("amount"))),
            None => fields::text(fields::plain_lookup(item, path)),
        },
    }
}

/// Normalize a loop field's value into the items to iterate.
fn loop_items<'a>(field: &str, value: Option<&'a Value>) -> Option<Cow<'a, [Value]>> {
    let value = value?;
    let name = field.rsplit('.').next().unwrap_or(field);
    if let Some(edges) = value.get("edges").and_then(Value::as_array) {
        match name {
            "images" => {
                let urls = edges
                    .iter()
                    .map(|edge| {
                        edge.get("node")
                            .and_then(|node| node.get("url"))
                            .cloned()
                            .unwrap_or(Value::Null)
                    })
                    .collect();
                return Some(Cow::Owned(urls));
            }
            "variants" => {
                let nodes = edges
                    .iter()
                    .map(|edge| edge.get("node").cloned().unwrap_or(Value::Null))
                    .collect();
                return Some(Cow::Owned(nodes));
            }
            _ => {}
        }
    }
    value.as_array().map(|items| Cow::Borrowed(items.as_slice()))
}

fn render_loop(scope: Scope<'_>, field: &str, body: &[Node], out: &mut String) {
    let value = match scope {
        Scope::Entity(value) | Scope::Item(value) => fields::plain_lookup(value, field),
    };
    let Some(items) = loop_items(field, value) else {
        tracing::warn!(field, value = ?value, "Loop field is not an array");
        return;
    };
    for item in items.iter() {
        render_nodes(body, Scope::Item(item), out);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn render(source: &str, entity: &Value) -> String {
        Template::parse(source).render(entity)
    }

    #[test]
    fn test_parse_produces_nodes() {
        let template = Template::parse("<b>{{title}}</b>{{#each images}}{{this}}{{/each}}");
        assert_eq!(
            template.nodes(),
            &[
                Node::Literal("<b>".to_string()),
                Node::Scalar("title".to_string()),
                Node::Literal("</b>".to_string()),
                Node::Loop {
                    field: "images".to_string(),
                    body: vec![Node::This],
                },
            ]
        );
    }

    #[test]
    fn test_missing_value_renders_empty() {
        let item = json!({ "title": "Shirt" });
        assert_eq!(render("{{title}} {{subtitle}}", &item), "Shirt ");
    }

    #[test]
    fn test_missing_price_renders_empty() {
        let item = json!({ "title": "Shirt", "price": null });
        assert_eq!(render("{{title}} {{price}}", &item), "Shirt ");
    }

    #[test]
    fn test_present_but_zero_price() {
        let item = json!({ "priceRange": { "minVariantPrice": { "amount": "0.0" } } });
        assert_eq!(render("{{price}}", &item), "0.00");
    }

    #[test]
    fn test_image_edges_loop_yields_urls() {
        let item = json!({ "images": { "edges": [{ "node": { "url": "a.png" } }] } });
        assert_eq!(
            render("{{#each images}}<img src={{this}}>{{/each}}", &item),
            "<img src=a.png>"
        );
    }

    #[test]
    fn test_variant_edges_loop_yields_nodes() {
        let item = json!({ "variants": { "edges": [
            { "node": { "id": "v1", "title": "S", "price": { "amount": "5" } } },
            { "node": { "id": "v2", "title": "M", "price": { "amount": "6.5" } } }
        ]}});
        assert_eq!(
            render(
                r#"{{#each variants}}<option value="{{id}}">{{title}} {{price}}</option>{{/each}}"#,
                &item
            ),
            r#"<option value="v1">S 5.00</option><option value="v2">M 6.50</option>"#
        );
    }

    #[test]
    fn test_plain_array_loop() {
        let item = json!({ "tags": ["new", "sale"] });
        assert_eq!(render("{{#each tags}}[{{this}}]{{/each}}", &item), "[new][sale]");
    }

    #[test]
    fn test_non_array_loop_renders_empty() {
        let item = json!({ "title": "Shirt", "options": { "size": "M" } });
        assert_eq!(render("a{{#each options}}x{{/each}}b", &item), "ab");
        assert_eq!(render("a{{#each missing}}x{{/each}}b", &item), "ab");
    }

    #[test]
    fn test_nested_loops() {
        let item = json!({ "groups": [
            { "name": "A", "values": [1, 2] },
            { "name": "B", "values": [3] }
        ]});
        assert_eq!(
            render("{{#each groups}}{{name}}:{{#each values}}{{this}}{{/each}};{{/each}}", &item),
            "A:12;B:3;"
        );
    }

    #[test]
    fn test_malformed_tags_stay_literal() {
        let item = json!({ "title": "Shirt" });
        assert_eq!(render("{{ title }}", &item), "Shirt");
        assert_eq!(render("{{not valid}}", &item), "{{not valid}}");
        assert_eq!(render("{{title", &item), "{{title");
        assert_eq!(render("{{/each}}{{title}}", &item), "{{/each}}Shirt");
        assert_eq!(render("{{#each tags}}{{title}}", &item), "{{#each tags}}Shirt");
        assert_eq!(render("{{#eachtags}}", &item), "{{#eachtags}}");
    }

    #[test]
    fn test_this_outside_loop_is_empty() {
        assert_eq!(render("[{{this}}]", &json!({ "this": "x" })), "[]");
    }

    #[test]
    fn test_entity_special_fields() {
        let product = json!({
            "title": "Tee",
            "priceRange": { "minVariantPrice": { "amount": "19.9" } },
            "variants": { "edges": [{ "node": { "id": "gid://V/1" } }] }
        });
        assert_eq!(
            render("{{title}}|{{price}}|{{variantId}}|{{image}}", &product),
            "Tee|19.90|gid://V/1|https://placehold.co/600x400?text=No+Image"
        );
    }

    #[test]
    fn test_render_list_concatenates() {
        let template = Template::parse("<li>{{title}}</li>");
        assert_eq!(
            template.render_list(&[json!({ "title": "A" }), json!({ "title": "B" })]),
            "<li>A</li><li>B</li>"
        );
    }
}
