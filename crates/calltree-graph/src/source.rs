//! Tag source abstractions for caller lookups.
//!
//! A [`TagSource`] answers a single question: which functions or macros call
//! a given symbol, and where. The tree builder composes those answers into
//! caller trees. Implementations exist for GNU Global's `SQLite` databases
//! ([`GlobalSource`](crate::GlobalSource)), compressed cscope cross-references
//! ([`CscopeSource`](crate::CscopeSource)) and in-memory tables
//! ([`MemoryTagSource`](crate::MemoryTagSource)).

use std::fmt;

use crate::edge::CallEdge;
use crate::error::GraphError;
use crate::node::Symbol;

/// Kind of tag index backing a [`TagSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// GNU Global `GTAGS`/`GRTAGS`/`GPATH` databases in `SQLite` mode.
    Global,
    /// Compressed cscope cross-reference file.
    Cscope,
    /// In-memory edge table.
    Memory,
}

impl BackendKind {
    /// Returns the stable lowercase backend name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Cscope => "cscope",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for caller lookup backends.
///
/// Lookups take `&mut self` so implementations may cache per-file tables or
/// reuse parse state between queries.
pub trait TagSource {
    /// Returns the backend kind, used in log records and error messages.
    fn kind(&self) -> BackendKind;

    /// Returns every recorded call to `symbol`.
    ///
    /// Each edge names the enclosing caller and the call site. Edges are
    /// returned in index order and may contain duplicates; the tree builder
    /// removes repeated `(caller, reference)` pairs. Unknown symbols produce
    /// an empty list rather than an error.
    ///
    /// # Errors
    /// Returns an error when the index cannot be read or is corrupt.
    fn find_callers(&mut self, symbol: &Symbol) -> Result<Vec<CallEdge>, GraphError>;
}

impl<T: TagSource + ?Sized> TagSource for Box<T> {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn find_callers(&mut self, symbol: &Symbol) -> Result<Vec<CallEdge>, GraphError> {
        (**self).find_callers(symbol)
    }
}

impl<T: TagSource + ?Sized> TagSource for &mut T {
    fn kind(&self) -> BackendKind {
        (**self).kind()
    }

    fn find_callers(&mut self, symbol: &Symbol) -> Result<Vec<CallEdge>, GraphError> {
        (**self).find_callers(symbol)
    }
}
