//! canonical body rendering
//!
//! At every nesting level attributes are written first, sorted
//! lexicographically by name, followed by the blocks of that level in their
//! declaration order, each recursively rendered by the same rule. Block
//! identifiers and labels are written verbatim. The output of a resolution
//! is compared against files on disk, so byte-stable formatting is part of
//! the contract.
use crate::value;
use hcl_edit::structure::{BlockLabel, Body};

const INDENT: &str = "  ";

/// Renders a template body as canonical configuration text
pub fn render(body: &Body) -> String {
    let mut out = String::new();
    write_body(&mut out, body, 0);
    out
}

fn write_body(out: &mut String, body: &Body, depth: usize) {
    let indent = INDENT.repeat(depth);

    let mut attributes: Vec<_> = body.attributes().collect();
    attributes.sort_by(|a, b| a.key.value().as_str().cmp(b.key.value().as_str()));

    for attribute in attributes {
        out.push_str(&format!(
            "{indent}{} = {}\n",
            attribute.key.value(),
            expression_text(&attribute.value)
        ));
    }

    for block in body.blocks() {
        out.push_str(&format!("{indent}{}", block.ident.value()));
        for label in &block.labels {
            out.push(' ');
            out.push_str(&label_text(label));
        }
        out.push_str(" {\n");

        write_body(out, &block.body, depth + 1);

        out.push_str(&format!("{indent}}}\n"));
    }
}

/// Source text of an expression without its surrounding trivia
///
/// Evaluated attributes carry freshly parsed canonical literals; preserved
/// attributes carry the expression exactly as the author wrote it.
fn expression_text(expression: &hcl_edit::expr::Expression) -> String {
    expression.to_string().trim().to_string()
}

fn label_text(label: &BlockLabel) -> String {
    match label {
        BlockLabel::Ident(ident) => ident.value().to_string(),
        BlockLabel::String(string) => value::quote(string.value()),
    }
}
