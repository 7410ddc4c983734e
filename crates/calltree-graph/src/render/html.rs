//! Self-contained HTML renderer.

use std::io::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::error::GraphError;
use crate::node::{CallNode, Forest};
use crate::render::{Renderer, write_failed};

const TEMPLATE: &str = include_str!("page.html");

/// Renders the forest as a static HTML page of collapsible nested lists.
///
/// Interior nodes are `<details open>` elements so every subtree can be
/// folded. Leaves carry their terminal reason in a `data-terminal`
/// attribute alongside the same glyph the text renderer prints.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    /// Creates a renderer titled after the forest's roots.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn page_title(forest: &Forest) -> String {
    let roots: Vec<&str> = forest
        .trees()
        .iter()
        .map(|tree| tree.symbol().as_str())
        .collect();
    format!("Callers of {}", roots.join(", "))
}

impl Renderer for HtmlRenderer {
    fn render(&self, forest: &Forest, out: &mut dyn Write) -> Result<(), GraphError> {
        let mut body = String::new();
        for tree in forest.trees() {
            push_node(&mut body, tree, 1);
        }

        let title = page_title(forest);
        let (head, tail) = TEMPLATE.split_once("{{BODY}}").unwrap_or((TEMPLATE, ""));
        let head_html = head.replace("{{TITLE}}", &encode_text(&title));
        for part in [head_html.as_str(), body.as_str(), tail] {
            out.write_all(part.as_bytes()).map_err(write_failed)?;
        }
        Ok(())
    }
}

fn push_node(html: &mut String, node: &CallNode, level: usize) {
    let indent = "  ".repeat(level);
    let label = label(node);

    if node.is_leaf() {
        let terminal_name = node.terminal().map_or("exhausted", |terminal| terminal.as_str());
        html.push_str(&format!(
            "{indent}<li class=\"leaf\" data-terminal=\"{}\">{label}",
            encode_double_quoted_attribute(terminal_name)
        ));
        if let Some(terminal) = node.terminal()
            && let Some(glyph) = terminal.glyph()
        {
            html.push_str(&format!(
                "<span class=\"marker\" title=\"{}\">{}</span>",
                encode_double_quoted_attribute(terminal.description()),
                encode_text(glyph)
            ));
        }
        html.push_str("</li>\n");
        return;
    }

    html.push_str(&format!(
        "{indent}<li><details open><summary>{label}</summary>\n{indent}<ul>\n"
    ));
    for child in node.children() {
        push_node(html, child, level + 1);
    }
    html.push_str(&format!("{indent}</ul>\n{indent}</details></li>\n"));
}

fn label(node: &CallNode) -> String {
    let symbol = encode_text(node.symbol().as_str());
    match node.reference() {
        Some(reference) => format!(
            "<span class=\"symbol\">{symbol}</span><span class=\"reference\">{}</span>",
            encode_text(&reference.to_string())
        ),
        None => format!("<span class=\"symbol\">{symbol}</span>"),
    }
}
