//! Forest renderers.
//!
//! Every renderer writes the whole forest and nothing else to an
//! [`io::Write`] destination. [`TextRenderer`] draws box-drawing trees,
//! [`HtmlRenderer`] emits a self-contained page of collapsible lists and
//! [`JsonRenderer`] serialises the node structure.

mod html;
mod json;
mod text;

use std::fs::File;
use std::io::{self, BufWriter, Write};

use camino::Utf8Path;

use crate::error::GraphError;
use crate::node::Forest;

pub use html::HtmlRenderer;
pub use json::JsonRenderer;
pub use text::TextRenderer;

/// Serialises a forest to an output stream.
pub trait Renderer {
    /// Writes `forest` to `out`.
    ///
    /// # Errors
    /// Returns [`GraphError::Io`] when writing fails.
    fn render(&self, forest: &Forest, out: &mut dyn Write) -> Result<(), GraphError>;

    /// Writes `forest` to a newly created file at `path`.
    ///
    /// # Errors
    /// Returns [`GraphError::Io`] when the file cannot be created or written.
    fn render_to_path(&self, forest: &Forest, path: &Utf8Path) -> Result<(), GraphError> {
        let file = File::create(path)
            .map_err(|err| GraphError::io(format!("failed to create '{path}'"), err))?;
        let mut out = BufWriter::new(file);
        self.render(forest, &mut out)?;
        out.flush()
            .map_err(|err| GraphError::io(format!("failed to write '{path}'"), err))
    }

    /// Renders `forest` into a string.
    ///
    /// # Errors
    /// Returns [`GraphError::Io`] when rendering fails or produces invalid
    /// UTF-8.
    fn render_to_string(&self, forest: &Forest) -> Result<String, GraphError> {
        let mut buffer = Vec::new();
        self.render(forest, &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| {
            GraphError::io(
                "rendered output is not UTF-8",
                io::Error::new(io::ErrorKind::InvalidData, err),
            )
        })
    }
}

pub(crate) fn write_failed(err: io::Error) -> GraphError {
    GraphError::io("failed to write caller tree", err)
}
