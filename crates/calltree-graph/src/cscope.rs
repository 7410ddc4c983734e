//! Cscope cross-reference tag source.
//!
//! Reads the default (compressed) `cscope.out` format in place through a
//! memory map. The file starts with a one-line header:
//!
//! ```text
//! cscope <version> <dir> [-c] [-q <terms>] [-T] <trailer offset>
//! ```
//!
//! followed by one section per source file. Each section opens with a
//! `\t@<path>` line; records are blank-line separated and start with the
//! source line number. Symbols sit on their own lines, prefixed with a tab
//! and a one-byte mark when the symbol plays a role the index tracks:
//!
//! | mark | meaning              |
//! |------|----------------------|
//! | `$`  | function definition  |
//! | `` ` `` | function call     |
//! | `}`  | end of function      |
//! | `#`  | macro definition     |
//! | `)`  | end of macro         |
//! | `~`  | include              |
//!
//! An empty `\t@` line ends the symbol data; the trailer that follows lists
//! the indexed source files.
//!
//! Compression rewrites symbol names into digraph codes (see
//! [`crate::digraph`]), so call names are expanded before they are compared
//! with a query and caller names are expanded before they are reported. Source text between
//! symbols also carries keyword codes; none collide with newline or tab and
//! the parser skips that text. An index built with `-T` stores names cut to
//! [`TRUNCATED_NAME_LEN`] characters, and queries are cut to match.

use std::fs::File;

use camino::{Utf8Path, Utf8PathBuf};
use memmap2::Mmap;
use tracing::debug;

use crate::digraph;
use crate::edge::CallEdge;
use crate::error::GraphError;
use crate::node::{Reference, Symbol};
use crate::source::{BackendKind, TagSource};

const CSCOPE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::cscope");

/// Default cross-reference file name.
pub const CSCOPE_OUT: &str = "cscope.out";

/// Oldest cross-reference format version understood by the parser.
pub const MIN_FORMAT_VERSION: u32 = 10;

/// Characters kept of each symbol name in an index built with `-T`.
pub const TRUNCATED_NAME_LEN: usize = 8;

const MARK_FILE: u8 = b'@';
const MARK_FUNCTION: u8 = b'$';
const MARK_CALL: u8 = b'`';
const MARK_FUNCTION_END: u8 = b'}';
const MARK_DEFINE: u8 = b'#';
const MARK_DEFINE_END: u8 = b')';

/// Parsed cross-reference header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CscopeHeader {
    /// Format version.
    pub version: u32,
    /// Directory the index was built in.
    pub directory: String,
    /// Whether the symbol names were truncated to eight characters (`-T`).
    pub truncated: bool,
    /// Whether an inverted index accompanies the file (`-q`).
    pub inverted: bool,
    /// Byte offset of the trailer.
    pub trailer_offset: u64,
    /// Byte offset of the first body line.
    pub body_offset: usize,
}

/// Tag source scanning a compressed cscope cross-reference file.
#[derive(Debug)]
pub struct CscopeSource {
    path: Utf8PathBuf,
    map: Mmap,
    header: CscopeHeader,
}

impl CscopeSource {
    /// Opens a cross-reference file, or `cscope.out` inside a directory.
    ///
    /// # Errors
    /// Returns [`GraphError::BackendUnavailable`] when the file cannot be
    /// opened, [`GraphError::UnsupportedFormat`] for a missing header, an old
    /// version or an uncompressed (`-c`) file, and [`GraphError::Parse`] when
    /// the header's trailer offset lies beyond the end of the file.
    pub fn open(path: impl AsRef<Utf8Path>) -> Result<Self, GraphError> {
        let given = path.as_ref();
        let path = if given.is_dir() {
            given.join(CSCOPE_OUT)
        } else {
            given.to_path_buf()
        };

        let file = File::open(&path).map_err(|err| {
            GraphError::backend_unavailable("cscope", path.clone(), err.to_string())
        })?;
        let len = file
            .metadata()
            .map_err(|err| {
                GraphError::backend_unavailable("cscope", path.clone(), err.to_string())
            })?
            .len();
        if len == 0 {
            return Err(GraphError::unsupported_format(path, "empty file"));
        }

        // SAFETY: the map is read-only and the index is not rewritten while
        // a query runs; cscope replaces the file rather than editing it.
        let map = unsafe { Mmap::map(&file) }.map_err(|err| {
            GraphError::backend_unavailable("cscope", path.clone(), err.to_string())
        })?;

        let header = parse_header(&map, &path)?;
        debug!(
            target: CSCOPE_TARGET,
            path = %path,
            version = header.version,
            directory = %header.directory,
            truncated = header.truncated,
            inverted = header.inverted,
            trailer = header.trailer_offset,
            "opened cross-reference"
        );
        Ok(Self { path, map, header })
    }

    /// Returns the cross-reference file path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the parsed header.
    #[must_use]
    pub const fn header(&self) -> &CscopeHeader {
        &self.header
    }
}

impl TagSource for CscopeSource {
    fn kind(&self) -> BackendKind {
        BackendKind::Cscope
    }

    fn find_callers(&mut self, symbol: &Symbol) -> Result<Vec<CallEdge>, GraphError> {
        let body = self.map.get(self.header.body_offset..).unwrap_or_default();
        let pattern = stored_prefix(symbol, self.header.truncated);
        let edges = scan_calls(body, symbol, pattern.as_bytes())
            .map_err(|message| GraphError::parse(self.path.clone(), message))?;
        debug!(target: CSCOPE_TARGET, symbol = %symbol, count = edges.len(), "found callers");
        Ok(edges)
    }
}

/// Parses the header line at the start of `bytes`.
pub(crate) fn parse_header(bytes: &[u8], path: &Utf8Path) -> Result<CscopeHeader, GraphError> {
    let unsupported = |reason: &str| GraphError::unsupported_format(path, reason);

    let Some(rest) = bytes.strip_prefix(b"cscope ") else {
        return Err(unsupported("missing cscope header"));
    };
    let line_len = rest
        .iter()
        .position(|&byte| byte == b'\n')
        .ok_or_else(|| unsupported("unterminated header"))?;
    let line = rest
        .get(..line_len)
        .and_then(|line| std::str::from_utf8(line).ok())
        .ok_or_else(|| unsupported("header is not valid UTF-8"))?;

    let mut tokens = line.split_whitespace();
    let version = tokens
        .next()
        .and_then(|token| token.parse::<u32>().ok())
        .ok_or_else(|| unsupported("missing format version"))?;
    if version < MIN_FORMAT_VERSION {
        return Err(unsupported(&format!(
            "format version {version} is older than {MIN_FORMAT_VERSION}"
        )));
    }
    let directory = tokens
        .next()
        .ok_or_else(|| unsupported("missing build directory"))?
        .to_owned();

    let mut truncated = false;
    let mut inverted = false;
    let mut trailer = None;
    while let Some(token) = tokens.next() {
        match token {
            "-c" => {
                return Err(unsupported(
                    "uncompressed cross-reference (built with -c) is not supported",
                ));
            }
            "-q" => {
                inverted = true;
                tokens.next();
            }
            "-T" => truncated = true,
            other => trailer = Some(other),
        }
    }

    let trailer_offset = trailer
        .and_then(|token| token.parse::<u64>().ok())
        .ok_or_else(|| GraphError::parse(path, "header has no trailer offset"))?;
    let file_len = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    if trailer_offset > file_len {
        return Err(GraphError::parse(
            path,
            format!("trailer offset {trailer_offset} is beyond end of file ({file_len} bytes)"),
        ));
    }

    Ok(CscopeHeader {
        version,
        directory,
        truncated,
        inverted,
        trailer_offset,
        body_offset: "cscope ".len() + line_len + 1,
    })
}

/// Returns the part of `symbol` an index stores: all of it, or only the
/// leading characters under `-T`.
fn stored_prefix(symbol: &Symbol, truncated: bool) -> &str {
    let name = symbol.as_str();
    if !truncated {
        return name;
    }
    name.char_indices()
        .nth(TRUNCATED_NAME_LEN)
        .and_then(|(end, _)| name.get(..end))
        .unwrap_or(name)
}

/// Running position while scanning the symbol data.
#[derive(Debug, Default)]
struct ScanState<'a> {
    file: Option<&'a [u8]>,
    line: u32,
    function: Option<&'a [u8]>,
    define: Option<&'a [u8]>,
    record_start: bool,
}

impl<'a> ScanState<'a> {
    fn enter_file(&mut self, name: &'a [u8]) {
        self.file = Some(name);
        self.line = 0;
        self.function = None;
        self.define = None;
    }

    /// Macro bodies take precedence over the function they sit in.
    fn caller(&self) -> Option<&'a [u8]> {
        self.define.or(self.function)
    }
}

/// Scans the symbol data for calls whose expanded name is `pattern`,
/// reporting them as calls to `symbol`.
fn scan_calls(body: &[u8], symbol: &Symbol, pattern: &[u8]) -> Result<Vec<CallEdge>, String> {
    let mut state = ScanState {
        record_start: true,
        ..ScanState::default()
    };
    let mut edges = Vec::new();

    for line in body.split(|&byte| byte == b'\n') {
        if line.is_empty() {
            state.record_start = true;
            continue;
        }
        let at_record_start = std::mem::replace(&mut state.record_start, false);

        let Some(marked) = line.strip_prefix(b"\t") else {
            if at_record_start && let Some(number) = leading_number(line) {
                state.line = number;
            }
            continue;
        };
        let Some((&mark, name)) = marked.split_first() else {
            continue;
        };

        match mark {
            MARK_FILE if name.is_empty() => return Ok(edges),
            MARK_FILE => state.enter_file(name),
            MARK_FUNCTION => state.function = Some(name),
            MARK_FUNCTION_END => state.function = None,
            MARK_DEFINE => state.define = Some(name),
            MARK_DEFINE_END => state.define = None,
            MARK_CALL if name.is_empty() => {
                return Err(format!("call mark without a symbol near line {}", state.line));
            }
            MARK_CALL if digraph::matches(name, pattern) => {
                record_call(&state, symbol, &mut edges);
            }
            _ => {}
        }
    }

    Err(String::from("symbol data has no end marker"))
}

fn record_call(state: &ScanState<'_>, symbol: &Symbol, edges: &mut Vec<CallEdge>) {
    let file = state.file.map(String::from_utf8_lossy).unwrap_or_default();
    let Some(caller) = state.caller() else {
        debug!(
            target: CSCOPE_TARGET,
            symbol = %symbol,
            file = %file,
            line = state.line,
            "call outside any function or macro"
        );
        return;
    };
    let caller = Symbol::new(String::from_utf8_lossy(&digraph::expand(caller)));
    let reference = Reference::new(file.into_owned(), state.line);
    edges.push(CallEdge::new(caller, symbol.clone(), reference));
}

/// Parses the decimal line number that opens a record.
fn leading_number(line: &[u8]) -> Option<u32> {
    let digits = line.iter().take_while(|byte| byte.is_ascii_digit()).count();
    let text = line.get(..digits).filter(|text| !text.is_empty())?;
    std::str::from_utf8(text).ok()?.parse().ok()
}
