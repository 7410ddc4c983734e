//! Writes a rendered forest to stdout or a file.

use std::io::Write;

use calltree_graph::{Forest, GraphError, HtmlRenderer, JsonRenderer, Renderer, TextRenderer};
use camino::Utf8Path;

use crate::cli::OutputFormat;

/// Returns the renderer for `format`.
pub(crate) fn renderer_for(format: OutputFormat) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer::new()),
        OutputFormat::Html => Box::new(HtmlRenderer::new()),
        OutputFormat::Json => Box::new(JsonRenderer::new()),
    }
}

/// Renders `forest` to `path` when given, otherwise to `stdout`.
pub(crate) fn emit<W: Write>(
    forest: &Forest,
    format: OutputFormat,
    path: Option<&Utf8Path>,
    stdout: &mut W,
) -> Result<(), GraphError> {
    let renderer = renderer_for(format);
    match path {
        Some(path) => renderer.render_to_path(forest, path),
        None => {
            renderer.render(forest, stdout)?;
            stdout
                .flush()
                .map_err(|error| GraphError::io("failed to flush output", error))
        }
    }
}
