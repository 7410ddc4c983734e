//! In-memory tag source.

use std::collections::HashMap;

use crate::edge::CallEdge;
use crate::error::GraphError;
use crate::node::{Reference, Symbol};
use crate::source::{BackendKind, TagSource};

/// Tag source backed by an in-memory edge table.
///
/// Edges are indexed by callee so lookups return callers in insertion order.
/// Useful for exercising the tree builder and renderers without an index on
/// disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryTagSource {
    /// Indices into `edges`, keyed by callee.
    callers_index: HashMap<Symbol, Vec<usize>>,
    /// All edges in insertion order.
    edges: Vec<CallEdge>,
    /// Number of `find_callers` calls served.
    queries: usize,
}

impl MemoryTagSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `caller` calls `callee` at `reference`.
    pub fn add_call(
        &mut self,
        caller: impl Into<Symbol>,
        callee: impl Into<Symbol>,
        reference: Reference,
    ) {
        self.add_edge(CallEdge::new(caller.into(), callee.into(), reference));
    }

    /// Records an edge.
    pub fn add_edge(&mut self, edge: CallEdge) {
        let edge_index = self.edges.len();
        self.callers_index
            .entry(edge.callee().clone())
            .or_default()
            .push(edge_index);
        self.edges.push(edge);
    }

    /// Builder-style variant of [`Self::add_call`].
    #[must_use]
    pub fn with_call(
        mut self,
        caller: impl Into<Symbol>,
        callee: impl Into<Symbol>,
        reference: Reference,
    ) -> Self {
        self.add_call(caller, callee, reference);
        self
    }

    /// Returns how many lookups have been served.
    #[must_use]
    pub const fn query_count(&self) -> usize {
        self.queries
    }
}

impl FromIterator<CallEdge> for MemoryTagSource {
    fn from_iter<I: IntoIterator<Item = CallEdge>>(iter: I) -> Self {
        let mut source = Self::new();
        for edge in iter {
            source.add_edge(edge);
        }
        source
    }
}

impl TagSource for MemoryTagSource {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn find_callers(&mut self, symbol: &Symbol) -> Result<Vec<CallEdge>, GraphError> {
        self.queries += 1;
        let edges = self
            .callers_index
            .get(symbol)
            .into_iter()
            .flatten()
            .filter_map(|&idx| self.edges.get(idx))
            .cloned()
            .collect();
        Ok(edges)
    }
}
