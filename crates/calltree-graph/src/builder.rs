//! Caller tree construction.
//!
//! [`TreeBuilder`] expands each requested root into a tree of callers by
//! repeatedly querying a [`TagSource`]. Expansion is iterative: the frame
//! being filled is held apart from a stack of its ancestors, and that stack
//! doubles as the ancestor path used for cycle detection.
//!
//! At every candidate node the checks run in this order:
//!
//! 1. the symbol is already an ancestor: `cycle-detected` leaf;
//! 2. repeat collapsing is on and the symbol was expanded elsewhere:
//!    `repeated` leaf;
//! 3. the node sits at the maximum depth: `depth-limit` leaf;
//! 4. the source reports no visible callers: `exhausted` leaf.
//!
//! Blacklisted callers are dropped, or shown as `blacklisted` leaves in
//! [`BlacklistMode::Mark`]. Roots are always expanded.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::{debug, debug_span, trace};

use crate::blacklist::BlacklistFilter;
use crate::edge::CallEdge;
use crate::error::GraphError;
use crate::node::{CallNode, Forest, Reference, Symbol, Terminal};
use crate::source::TagSource;

const BUILDER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::builder");

/// Hard ceiling on tree depth, in edges from the root.
pub const DEPTH_CEILING: u32 = 900;

/// Maximum tree depth requested for a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DepthLimit {
    /// Expand until callers run out, bounded by [`DEPTH_CEILING`].
    #[default]
    Unlimited,
    /// Expand at most this many edges from the root.
    Edges(u32),
}

impl DepthLimit {
    /// Validates an explicit depth.
    ///
    /// # Errors
    /// Returns [`GraphError::DepthOutOfRange`] when `edges` exceeds
    /// [`DEPTH_CEILING`].
    pub fn edges(edges: u32) -> Result<Self, GraphError> {
        if edges > DEPTH_CEILING {
            return Err(GraphError::DepthOutOfRange {
                requested: i64::from(edges),
                ceiling: DEPTH_CEILING,
            });
        }
        Ok(Self::Edges(edges))
    }

    /// Interprets a command-line depth where `-1` means unlimited.
    ///
    /// # Errors
    /// Returns [`GraphError::DepthOutOfRange`] for values below `-1` or above
    /// [`DEPTH_CEILING`].
    pub fn from_request(requested: i64) -> Result<Self, GraphError> {
        if requested == -1 {
            return Ok(Self::Unlimited);
        }
        let out_of_range = || GraphError::DepthOutOfRange {
            requested,
            ceiling: DEPTH_CEILING,
        };
        let edges = u32::try_from(requested).map_err(|_| out_of_range())?;
        Self::edges(edges).map_err(|_| out_of_range())
    }

    /// Returns the effective depth bound.
    #[must_use]
    pub const fn resolve(self) -> u32 {
        match self {
            Self::Unlimited => DEPTH_CEILING,
            Self::Edges(edges) => edges,
        }
    }
}

/// Treatment of blacklisted callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlacklistMode {
    /// Blacklisted callers and their subtrees are left out.
    #[default]
    Omit,
    /// Blacklisted callers appear as unexpanded `blacklisted` leaves.
    Mark,
}

/// Options controlling a forest build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Maximum depth of every tree.
    pub max_depth: DepthLimit,
    /// Attach call-site references to child nodes.
    pub show_position: bool,
    /// How blacklisted callers are shown.
    pub blacklist_mode: BlacklistMode,
    /// Stop at symbols already expanded elsewhere in the forest.
    pub collapse_repeats: bool,
}

impl BuildOptions {
    /// Sets the maximum depth.
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: DepthLimit) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enables or disables call-site references.
    #[must_use]
    pub const fn with_show_position(mut self, show_position: bool) -> Self {
        self.show_position = show_position;
        self
    }

    /// Sets the blacklist mode.
    #[must_use]
    pub const fn with_blacklist_mode(mut self, blacklist_mode: BlacklistMode) -> Self {
        self.blacklist_mode = blacklist_mode;
        self
    }

    /// Enables or disables repeat collapsing.
    #[must_use]
    pub const fn with_collapse_repeats(mut self, collapse_repeats: bool) -> Self {
        self.collapse_repeats = collapse_repeats;
        self
    }
}

/// A node whose callers are still being attached.
#[derive(Debug)]
struct Frame {
    node: CallNode,
    callers: Rc<[CallEdge]>,
    next: usize,
    depth: u32,
}

impl Frame {
    fn next_edge(&mut self) -> Option<CallEdge> {
        let edge = self.callers.get(self.next)?.clone();
        self.next += 1;
        Some(edge)
    }
}

/// Outcome of visiting a candidate node.
#[derive(Debug)]
enum Visit {
    Leaf(CallNode),
    Expand(Frame),
}

/// State shared by every tree of one forest build.
#[derive(Debug, Default)]
struct Expansion {
    /// Deduplicated callers per queried symbol.
    memo: HashMap<Symbol, Rc<[CallEdge]>>,
    /// Symbols that produced an interior node.
    expanded: HashSet<Symbol>,
}

/// Builds caller trees from a tag source.
#[derive(Debug)]
pub struct TreeBuilder<S> {
    source: S,
    blacklist: BlacklistFilter,
    options: BuildOptions,
}

impl<S: TagSource> TreeBuilder<S> {
    /// Creates a builder with an empty blacklist and default options.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            blacklist: BlacklistFilter::empty(),
            options: BuildOptions::default(),
        }
    }

    /// Sets the blacklist.
    #[must_use]
    pub fn with_blacklist(mut self, blacklist: BlacklistFilter) -> Self {
        self.blacklist = blacklist;
        self
    }

    /// Sets the build options.
    #[must_use]
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the tag source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Consumes the builder and returns the tag source.
    #[must_use]
    pub fn into_source(self) -> S {
        self.source
    }

    /// Builds one tree per root, in request order.
    ///
    /// Each symbol is queried at most once per call.
    ///
    /// # Errors
    /// Returns [`GraphError::Query`] naming the symbol whose lookup failed;
    /// the whole forest is discarded.
    pub fn build_forest(&mut self, roots: &[Symbol]) -> Result<Forest, GraphError> {
        let mut expansion = Expansion::default();
        let trees = roots
            .iter()
            .map(|root| self.expand_root(root, &mut expansion))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            target: BUILDER_TARGET,
            trees = trees.len(),
            queried = expansion.memo.len(),
            "built caller forest"
        );
        Ok(Forest::new(trees))
    }

    /// Builds a single tree.
    ///
    /// # Errors
    /// Returns [`GraphError::Query`] when a lookup fails.
    pub fn build_tree(&mut self, root: &Symbol) -> Result<CallNode, GraphError> {
        self.expand_root(root, &mut Expansion::default())
    }

    fn expand_root(
        &mut self,
        root: &Symbol,
        expansion: &mut Expansion,
    ) -> Result<CallNode, GraphError> {
        let span = debug_span!(target: BUILDER_TARGET, "caller_tree", root = %root);
        let _entered = span.enter();

        let root_path = AncestorPath::default();
        let mut frame = match self.visit(root.clone(), None, 0, root_path, expansion)? {
            Visit::Leaf(node) => return Ok(node),
            Visit::Expand(frame) => frame,
        };
        let mut ancestors: Vec<Frame> = Vec::new();

        loop {
            let Some(edge) = frame.next_edge() else {
                let mut node = frame.node;
                node.seal();
                match ancestors.pop() {
                    Some(parent) => {
                        frame = parent;
                        frame.node.push_child(node);
                        continue;
                    }
                    None => return Ok(node),
                }
            };

            let depth = frame.depth + 1;
            let (caller, call_site) = edge.into_caller();
            let reference = self.options.show_position.then_some(call_site);

            if self.blacklist.is_blacklisted(&caller) {
                trace!(target: BUILDER_TARGET, caller = %caller, "blacklisted caller");
                if self.options.blacklist_mode == BlacklistMode::Mark {
                    frame
                        .node
                        .push_child(CallNode::leaf(caller, reference, Terminal::Blacklisted));
                }
                continue;
            }

            let path = AncestorPath {
                current: Some(&frame),
                ancestors: &ancestors,
            };
            match self.visit(caller, reference, depth, path, expansion)? {
                Visit::Leaf(node) => frame.node.push_child(node),
                Visit::Expand(child) => ancestors.push(std::mem::replace(&mut frame, child)),
            }
        }
    }

    /// Decides whether `symbol` becomes a leaf or a frame to expand.
    fn visit(
        &mut self,
        symbol: Symbol,
        reference: Option<Reference>,
        depth: u32,
        path: AncestorPath<'_>,
        expansion: &mut Expansion,
    ) -> Result<Visit, GraphError> {
        if path.contains(&symbol) {
            debug!(target: BUILDER_TARGET, symbol = %symbol, depth, "cycle detected");
            return Ok(Visit::Leaf(CallNode::leaf(
                symbol,
                reference,
                Terminal::CycleDetected,
            )));
        }
        if self.options.collapse_repeats && expansion.expanded.contains(&symbol) {
            return Ok(Visit::Leaf(CallNode::leaf(
                symbol,
                reference,
                Terminal::Repeated,
            )));
        }
        if depth >= self.options.max_depth.resolve() {
            trace!(target: BUILDER_TARGET, symbol = %symbol, depth, "depth limit reached");
            return Ok(Visit::Leaf(CallNode::leaf(
                symbol,
                reference,
                Terminal::DepthLimit,
            )));
        }

        let callers = self.callers_of(&symbol, expansion)?;
        let mark_blacklisted = self.options.blacklist_mode == BlacklistMode::Mark;
        let visible = callers
            .iter()
            .any(|edge| mark_blacklisted || !self.blacklist.is_blacklisted(edge.caller()));
        if !visible {
            return Ok(Visit::Leaf(CallNode::leaf(
                symbol,
                reference,
                Terminal::Exhausted,
            )));
        }

        expansion.expanded.insert(symbol.clone());
        Ok(Visit::Expand(Frame {
            node: CallNode::new(symbol, reference),
            callers,
            next: 0,
            depth,
        }))
    }

    /// Returns the deduplicated callers of `symbol`, querying at most once.
    fn callers_of(
        &mut self,
        symbol: &Symbol,
        expansion: &mut Expansion,
    ) -> Result<Rc<[CallEdge]>, GraphError> {
        if let Some(callers) = expansion.memo.get(symbol) {
            return Ok(Rc::clone(callers));
        }

        let edges = self
            .source
            .find_callers(symbol)
            .map_err(|err| GraphError::query(symbol.clone(), err))?;
        let total = edges.len();
        let mut seen = HashSet::new();
        let callers: Rc<[CallEdge]> = edges
            .into_iter()
            .filter(|edge| seen.insert((edge.caller().clone(), edge.reference().clone())))
            .collect();
        trace!(
            target: BUILDER_TARGET,
            symbol = %symbol,
            backend = %self.source.kind(),
            total,
            unique = callers.len(),
            "queried callers"
        );
        expansion.memo.insert(symbol.clone(), Rc::clone(&callers));
        Ok(callers)
    }
}

/// Symbols on the path from the root to the node being filled.
#[derive(Debug, Clone, Copy, Default)]
struct AncestorPath<'a> {
    current: Option<&'a Frame>,
    ancestors: &'a [Frame],
}

impl AncestorPath<'_> {
    fn contains(&self, symbol: &Symbol) -> bool {
        self.current
            .into_iter()
            .chain(self.ancestors)
            .any(|frame| frame.node.symbol() == symbol)
    }
}
