use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Cross-reference index formats the tool can read.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Backend {
    /// GNU Global `GTAGS`/`GRTAGS`/`GPATH` stored as `SQLite` tables.
    Global,
    /// A compressed `cscope.out` cross-reference.
    #[default]
    Cscope,
}

/// Errors encountered while parsing a [`Backend`] from text.
pub type BackendParseError = strum::ParseError;
