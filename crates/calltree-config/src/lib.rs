//! Layered configuration for the `calltree` binary.
//!
//! [`Config`] is assembled by `ortho_config` from, in increasing precedence,
//! built-in defaults, a TOML file named by `--config-path` or
//! `CALLTREE_CONFIG_PATH`, `CALLTREE_*` environment variables and command
//! line flags. Blacklist entries are appended across layers rather than
//! replaced.

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod backend;
mod defaults;
mod logging;

pub use backend::{Backend, BackendParseError};
pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_TAG_PATH, default_backend, default_log_filter,
    default_log_filter_string, default_log_format, default_tag_path,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved tool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "CALLTREE")]
pub struct Config {
    /// Index format to read.
    #[ortho_config(default = default_backend())]
    #[serde(default = "default_backend")]
    pub backend: Backend,
    /// Tag directory, `cscope.out` file or directory containing it.
    #[ortho_config(default = default_tag_path())]
    #[serde(default = "default_tag_path")]
    pub tag_path: Utf8PathBuf,
    /// Requested maximum depth; `-1` or absent means unlimited.
    pub max_depth: Option<i64>,
    /// Caller names (or patterns) suppressed from every tree.
    #[ortho_config(merge_strategy = "append")]
    #[serde(default)]
    pub blacklist: Vec<String>,
    /// `tracing-subscriber` filter directive.
    #[ortho_config(default = default_log_filter_string())]
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format for log events.
    #[ortho_config(default = default_log_format())]
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Config {
    /// Returns the configured backend.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        self.backend
    }

    /// Returns the configured index location.
    #[must_use]
    pub fn tag_path(&self) -> &Utf8Path {
        &self.tag_path
    }

    /// Returns the configured depth request, if any.
    #[must_use]
    pub const fn max_depth(&self) -> Option<i64> {
        self.max_depth
    }

    /// Returns the configured blacklist entries.
    #[must_use]
    pub fn blacklist(&self) -> &[String] {
        &self.blacklist
    }

    /// Returns the log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            tag_path: default_tag_path(),
            max_depth: None,
            blacklist: Vec::new(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}
