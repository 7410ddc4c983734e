//! Caller tree node representation.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

/// Name of a function or macro in the indexed codebase.
///
/// Symbols compare by exact, case-sensitive string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a symbol from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the symbol name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Location of a single call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Reference {
    /// Path of the file containing the call, as recorded by the index.
    path: Utf8PathBuf,
    /// One-based line number of the call.
    line: u32,
}

impl Reference {
    /// Creates a new reference.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>, line: u32) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }

    /// Returns the file path of the call site.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the one-based line number of the call site.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.line)
    }
}

/// Reason expansion stopped at a leaf node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Terminal {
    /// The index records no (visible) callers for the symbol.
    Exhausted,
    /// The node sits at the configured maximum depth.
    DepthLimit,
    /// The symbol already appears among the node's ancestors.
    CycleDetected,
    /// The symbol matched the blacklist and is shown without expansion.
    Blacklisted,
    /// The symbol was already expanded elsewhere in the forest.
    Repeated,
}

impl Terminal {
    /// Returns the stable kebab-case name of the marker.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exhausted => "exhausted",
            Self::DepthLimit => "depth-limit",
            Self::CycleDetected => "cycle-detected",
            Self::Blacklisted => "blacklisted",
            Self::Repeated => "repeated",
        }
    }

    /// Returns the glyph used by human-readable renderers, if any.
    ///
    /// Exhausted leaves carry no glyph: having no callers is the ordinary way
    /// for a tree to end.
    #[must_use]
    pub const fn glyph(self) -> Option<&'static str> {
        match self {
            Self::Exhausted => None,
            Self::DepthLimit => Some("…"),
            Self::CycleDetected => Some("↺"),
            Self::Blacklisted => Some("⊘"),
            Self::Repeated => Some("↑"),
        }
    }

    /// Returns a short human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Exhausted => "no callers",
            Self::DepthLimit => "depth limit reached",
            Self::CycleDetected => "cycle detected",
            Self::Blacklisted => "blacklisted",
            Self::Repeated => "expanded elsewhere",
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in a caller tree.
///
/// Children are the callers of this node's symbol. Leaves carry a
/// [`Terminal`] marker explaining why expansion stopped; nodes with children
/// carry none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallNode {
    /// Symbol represented by this node.
    symbol: Symbol,
    /// Where this node's symbol calls its parent; absent for roots.
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<Reference>,
    /// Why expansion stopped here, for leaves.
    #[serde(skip_serializing_if = "Option::is_none")]
    terminal: Option<Terminal>,
    /// Callers of this node's symbol, in first-seen order.
    #[serde(rename = "callers")]
    children: Vec<CallNode>,
}

impl CallNode {
    /// Creates an interior node awaiting children.
    #[must_use]
    pub const fn new(symbol: Symbol, reference: Option<Reference>) -> Self {
        Self {
            symbol,
            reference,
            terminal: None,
            children: Vec::new(),
        }
    }

    /// Creates a leaf node with the given terminal marker.
    #[must_use]
    pub const fn leaf(symbol: Symbol, reference: Option<Reference>, terminal: Terminal) -> Self {
        Self {
            symbol,
            reference,
            terminal: Some(terminal),
            children: Vec::new(),
        }
    }

    /// Appends a child node.
    pub fn push_child(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Marks the node as a leaf if it ended up without children.
    pub(crate) fn seal(&mut self) {
        if self.children.is_empty() && self.terminal.is_none() {
            self.terminal = Some(Terminal::Exhausted);
        }
    }

    /// Returns the node's symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Returns the call-site reference, when recorded.
    #[must_use]
    pub const fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    /// Returns the terminal marker for leaves.
    #[must_use]
    pub const fn terminal(&self) -> Option<Terminal> {
        self.terminal
    }

    /// Returns the callers of this node's symbol.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Returns whether the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Finds the first direct child with the given symbol name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children
            .iter()
            .find(|child| child.symbol.as_str() == name)
    }

    /// Returns the number of nodes in this subtree, including this node.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Returns the depth of the deepest node below this one, in edges.
    #[must_use]
    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|child| child.height() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Ordered collection of caller trees, one per requested root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Forest {
    trees: Vec<CallNode>,
}

impl Forest {
    /// Creates a forest from its trees.
    #[must_use]
    pub const fn new(trees: Vec<CallNode>) -> Self {
        Self { trees }
    }

    /// Returns the trees in root request order.
    #[must_use]
    pub fn trees(&self) -> &[CallNode] {
        &self.trees
    }

    /// Returns the tree rooted at the given symbol name.
    #[must_use]
    pub fn tree(&self, name: &str) -> Option<&CallNode> {
        self.trees.iter().find(|tree| tree.symbol().as_str() == name)
    }

    /// Returns the number of trees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Returns whether the forest holds no trees.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
