//! Plain-text tree renderer.

use std::io::Write;

use crate::error::GraphError;
use crate::node::{CallNode, Forest};
use crate::render::{Renderer, write_failed};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const GAP: &str = "    ";

/// Renders caller trees with box-drawing connectors.
///
/// ```text
/// do_write
/// ├── sys_write  fs/read_write.c:652
/// │   └── ksys_write ↺
/// └── DEBUG_LOG ⊘
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    /// Creates a text renderer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Renderer for TextRenderer {
    fn render(&self, forest: &Forest, out: &mut dyn Write) -> Result<(), GraphError> {
        for (idx, tree) in forest.trees().iter().enumerate() {
            if idx > 0 {
                writeln!(out).map_err(write_failed)?;
            }
            write_label(out, tree)?;
            let mut prefix = String::new();
            write_children(out, tree, &mut prefix)?;
        }
        Ok(())
    }
}

fn write_children(
    out: &mut dyn Write,
    node: &CallNode,
    prefix: &mut String,
) -> Result<(), GraphError> {
    let count = node.children().len();
    for (idx, child) in node.children().iter().enumerate() {
        let last = idx + 1 == count;
        let connector = if last { LAST_BRANCH } else { BRANCH };
        write!(out, "{prefix}{connector}").map_err(write_failed)?;
        write_label(out, child)?;

        let restore = prefix.len();
        prefix.push_str(if last { GAP } else { PIPE });
        write_children(out, child, prefix)?;
        prefix.truncate(restore);
    }
    Ok(())
}

fn write_label(out: &mut dyn Write, node: &CallNode) -> Result<(), GraphError> {
    write!(out, "{}", node.symbol()).map_err(write_failed)?;
    if let Some(reference) = node.reference() {
        write!(out, "  {reference}").map_err(write_failed)?;
    }
    if let Some(glyph) = node.terminal().and_then(|terminal| terminal.glyph()) {
        write!(out, " {glyph}").map_err(write_failed)?;
    }
    writeln!(out).map_err(write_failed)
}
