//! Caller tree construction over static cross-reference indexes.
//!
//! Given one or more root symbols, this crate finds every caller of each
//! root, every caller of those callers and so on, producing a bounded,
//! cycle-safe tree per root. Lookups go through a [`TagSource`]:
//!
//! - [`GlobalSource`] reads GNU Global `GTAGS`/`GRTAGS`/`GPATH` databases
//!   written in `SQLite` mode
//! - [`CscopeSource`] scans a compressed `cscope.out` in place
//! - [`MemoryTagSource`] serves edges recorded in memory
//!
//! # Core Types
//!
//! - [`CallNode`] - A symbol in a caller tree, with its callers as children
//! - [`CallEdge`] - A single call relationship reported by a source
//! - [`Forest`] - One tree per requested root
//! - [`TreeBuilder`] - Expands roots into a forest
//! - [`BlacklistFilter`] - Suppresses callers by name or pattern
//!
//! # Rendering
//!
//! Implementations of [`Renderer`] write a forest as box-drawing text
//! ([`TextRenderer`]), a collapsible HTML page ([`HtmlRenderer`]) or JSON
//! ([`JsonRenderer`]).
//!
//! # Example
//!
//! ```
//! use calltree_graph::{
//!     BuildOptions, DepthLimit, MemoryTagSource, Reference, Renderer, Symbol, TextRenderer,
//!     TreeBuilder,
//! };
//!
//! let source = MemoryTagSource::new()
//!     .with_call("sys_write", "vfs_write", Reference::new("fs/read_write.c", 652))
//!     .with_call("kernel_write", "vfs_write", Reference::new("fs/read_write.c", 540));
//! let options = BuildOptions::default()
//!     .with_max_depth(DepthLimit::Edges(3))
//!     .with_show_position(true);
//! let mut builder = TreeBuilder::new(source).with_options(options);
//!
//! let forest = builder.build_forest(&[Symbol::new("vfs_write")])?;
//! let text = TextRenderer::new().render_to_string(&forest)?;
//! assert!(text.starts_with("vfs_write\n├── sys_write  fs/read_write.c:652\n"));
//! # Ok::<(), calltree_graph::GraphError>(())
//! ```

mod blacklist;
mod builder;
mod cscope;
mod digraph;
mod edge;
mod error;
mod global;
mod memory;
mod node;
mod render;
mod source;

pub use blacklist::{BlacklistFilter, PatternSyntax};
pub use builder::{BlacklistMode, BuildOptions, DEPTH_CEILING, DepthLimit, TreeBuilder};
pub use cscope::{
    CSCOPE_OUT, CscopeHeader, CscopeSource, MIN_FORMAT_VERSION, TRUNCATED_NAME_LEN,
};
pub use edge::CallEdge;
pub use error::{ErrorKind, GraphError};
pub use global::{GPATH, GRTAGS, GTAGS, GlobalSource};
pub use memory::MemoryTagSource;
pub use node::{CallNode, Forest, Reference, Symbol, Terminal};
pub use render::{HtmlRenderer, JsonRenderer, Renderer, TextRenderer};
pub use source::{BackendKind, TagSource};

#[cfg(test)]
mod tests;
