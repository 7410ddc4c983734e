//! Error types for caller tree operations.

use std::fmt;
use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::node::Symbol;

/// Errors returned by tag sources, the tree builder and renderers.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The tag index is missing, unreadable or stored in the wrong format.
    #[error("{backend} index at '{path}' is unavailable: {reason}")]
    BackendUnavailable {
        /// Backend that failed to open.
        backend: &'static str,
        /// Path of the index file or directory.
        path: Utf8PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// The index exists but uses a format this tool does not read.
    #[error("unsupported index format at '{path}': {reason}")]
    UnsupportedFormat {
        /// Path of the offending index file.
        path: Utf8PathBuf,
        /// Human-readable cause.
        reason: String,
    },

    /// Index content is corrupt.
    #[error("corrupt index '{path}': {message}")]
    Parse {
        /// Path of the corrupt index file.
        path: Utf8PathBuf,
        /// Description of the inconsistency.
        message: String,
    },

    /// A blacklist pattern failed to compile as a regular expression.
    #[error("invalid blacklist pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern as supplied by the user.
        pattern: String,
        /// Regex compilation failure.
        #[source]
        source: regex::Error,
    },

    /// The requested maximum depth is outside the supported range.
    #[error("maximum depth {requested} is out of range (allowed: 0..={ceiling}, or unlimited)")]
    DepthOutOfRange {
        /// Depth requested by the caller.
        requested: i64,
        /// Hard ceiling on tree depth.
        ceiling: u32,
    },

    /// Querying the callers of a symbol failed; the whole build is aborted.
    #[error("failed to query callers of '{symbol}': {source}")]
    Query {
        /// Symbol whose lookup failed.
        symbol: Symbol,
        /// Backend failure.
        #[source]
        source: Box<GraphError>,
    },

    /// An IO error occurred while reading an index or writing output.
    #[error("IO error: {message}")]
    Io {
        /// Description of the IO error.
        message: String,
        /// Underlying error wrapped in Arc for Clone support.
        #[source]
        source: Arc<std::io::Error>,
    },
}

/// Classification of [`GraphError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Index missing, wrong storage mode or unreadable.
    BackendUnavailable,
    /// Index format not supported (for example uncompressed cscope).
    UnsupportedFormat,
    /// Corrupt index content discovered while querying.
    Parse,
    /// Invalid configuration such as a bad pattern or depth.
    Config,
    /// Failure writing rendered output.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BackendUnavailable => "backend unavailable",
            Self::UnsupportedFormat => "unsupported format",
            Self::Parse => "parse error",
            Self::Config => "configuration error",
            Self::Io => "io error",
        };
        f.write_str(label)
    }
}

impl GraphError {
    /// Creates a new `BackendUnavailable` error.
    #[must_use]
    pub fn backend_unavailable(
        backend: &'static str,
        path: impl Into<Utf8PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::BackendUnavailable {
            backend,
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `UnsupportedFormat` error.
    #[must_use]
    pub fn unsupported_format(path: impl Into<Utf8PathBuf>, reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new `Parse` error.
    #[must_use]
    pub fn parse(path: impl Into<Utf8PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Query` error wrapping a backend failure.
    #[must_use]
    pub fn query(symbol: Symbol, source: Self) -> Self {
        Self::Query {
            symbol,
            source: Box::new(source),
        }
    }

    /// Creates a new `Io` error.
    #[must_use]
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Returns the classification of this error.
    ///
    /// Query failures report the kind of the wrapped backend error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BackendUnavailable { .. } => ErrorKind::BackendUnavailable,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::InvalidPattern { .. } | Self::DepthOutOfRange { .. } => ErrorKind::Config,
            Self::Query { source, .. } => source.kind(),
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}
