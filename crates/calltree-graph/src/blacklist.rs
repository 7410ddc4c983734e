//! Symbol suppression patterns.

use std::collections::HashSet;

use regex::{Regex, RegexSet};

use crate::error::GraphError;
use crate::node::Symbol;

/// How blacklist patterns are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatternSyntax {
    /// Patterns are exact symbol names.
    #[default]
    Exact,
    /// Patterns are regular expressions matched against the whole name.
    Regex,
}

/// Immutable set of compiled blacklist patterns.
#[derive(Debug, Clone, Default)]
pub struct BlacklistFilter {
    names: HashSet<String>,
    patterns: Option<RegexSet>,
}

impl BlacklistFilter {
    /// Compiles `patterns` using the given syntax.
    ///
    /// Empty patterns are ignored. Regular expressions are anchored at both
    /// ends, so `DEBUG_.*` matches `DEBUG_LOG` but not `MY_DEBUG_LOG`.
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidPattern`] naming the first pattern that
    /// fails to compile.
    pub fn new<I, S>(patterns: I, syntax: PatternSyntax) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = patterns
            .into_iter()
            .map(|pattern| pattern.as_ref().trim().to_owned())
            .filter(|pattern| !pattern.is_empty());

        match syntax {
            PatternSyntax::Exact => Ok(Self {
                names: entries.collect(),
                patterns: None,
            }),
            PatternSyntax::Regex => {
                let mut anchored = Vec::new();
                for pattern in entries {
                    let wrapped = format!("^(?:{pattern})$");
                    Regex::new(&wrapped)
                        .map_err(|source| GraphError::InvalidPattern { pattern, source })?;
                    anchored.push(wrapped);
                }
                let patterns = if anchored.is_empty() {
                    None
                } else {
                    let set = RegexSet::new(&anchored).map_err(|source| {
                        GraphError::InvalidPattern {
                            pattern: anchored.join("|"),
                            source,
                        }
                    })?;
                    Some(set)
                };
                Ok(Self {
                    names: HashSet::new(),
                    patterns,
                })
            }
        }
    }

    /// Creates a filter that suppresses nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns whether `symbol` is suppressed.
    #[must_use]
    pub fn is_blacklisted(&self, symbol: &Symbol) -> bool {
        let name = symbol.as_str();
        self.names.contains(name)
            || self
                .patterns
                .as_ref()
                .is_some_and(|patterns| patterns.is_match(name))
    }

    /// Returns whether the filter holds no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.patterns.is_none()
    }
}
