//! Call edge representation.

use crate::node::{Reference, Symbol};

/// A single call relationship reported by a tag source.
///
/// Edges are directed from caller to callee and always carry the call site,
/// even when the caller tree omits positions from its output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallEdge {
    /// Symbol containing the call site.
    caller: Symbol,
    /// Symbol being called.
    callee: Symbol,
    /// Location of the call site.
    reference: Reference,
}

impl CallEdge {
    /// Creates a new call edge.
    #[must_use]
    pub const fn new(caller: Symbol, callee: Symbol, reference: Reference) -> Self {
        Self {
            caller,
            callee,
            reference,
        }
    }

    /// Returns the calling symbol.
    #[must_use]
    pub const fn caller(&self) -> &Symbol {
        &self.caller
    }

    /// Returns the called symbol.
    #[must_use]
    pub const fn callee(&self) -> &Symbol {
        &self.callee
    }

    /// Returns the call site.
    #[must_use]
    pub const fn reference(&self) -> &Reference {
        &self.reference
    }

    /// Returns the one-based call site line.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.reference.line()
    }

    /// Splits the edge into its caller and reference.
    #[must_use]
    pub fn into_caller(self) -> (Symbol, Reference) {
        (self.caller, self.reference)
    }
}
