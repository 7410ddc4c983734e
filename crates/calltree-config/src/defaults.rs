use camino::Utf8PathBuf;

use crate::{Backend, LogFormat};

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Default location of the tag index.
pub const DEFAULT_TAG_PATH: &str = ".";

/// Default log filter expression used by the binary.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default index backend.
#[must_use]
pub const fn default_backend() -> Backend {
    Backend::Cscope
}

/// Default tag index location: the working directory.
#[must_use]
pub fn default_tag_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_TAG_PATH)
}
