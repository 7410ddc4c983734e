//! JSON renderer.

use std::io::{self, Write};

use crate::error::GraphError;
use crate::node::Forest;
use crate::render::{Renderer, write_failed};

/// Renders the forest as a JSON array of trees.
///
/// Each node carries `symbol`, an optional `reference` (`path`, `line`), an
/// optional `terminal` marker and its `callers`.
#[derive(Debug, Clone, Copy)]
pub struct JsonRenderer {
    pretty: bool,
}

impl Default for JsonRenderer {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonRenderer {
    /// Creates a pretty-printing renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects pretty-printed or compact output.
    #[must_use]
    pub const fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Renderer for JsonRenderer {
    fn render(&self, forest: &Forest, out: &mut dyn Write) -> Result<(), GraphError> {
        let written = if self.pretty {
            serde_json::to_writer_pretty(&mut *out, forest)
        } else {
            serde_json::to_writer(&mut *out, forest)
        };
        written.map_err(|err| write_failed(io::Error::from(err)))?;
        writeln!(out).map_err(write_failed)
    }
}
