//! GNU Global tag source backed by `SQLite` databases.
//!
//! `gtags --sqlite3` writes `GTAGS` (definitions), `GRTAGS` (references) and
//! `GPATH` (file ids) as `SQLite` files holding a single `db(key, dat, extra)`
//! table. Reference rows carry a delta-encoded line list; the caller of each
//! referenced line is the nearest preceding definition in the same file.

use std::collections::HashMap;
use std::fs;
use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use tracing::{debug, warn};

use crate::edge::CallEdge;
use crate::error::GraphError;
use crate::node::{Reference, Symbol};
use crate::source::{BackendKind, TagSource};

const GLOBAL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::global");

/// Definition database file name.
pub const GTAGS: &str = "GTAGS";
/// Reference database file name.
pub const GRTAGS: &str = "GRTAGS";
/// Path database file name.
pub const GPATH: &str = "GPATH";

const MACRO_IMAGE_PATTERN: &str = r"^#\s*@d\s+@n";

/// Compressed image of a `#define` line as stored by `gtags`.
#[expect(
    clippy::expect_used,
    reason = "literal pattern, compiled by the macro image unit tests"
)]
static MACRO_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MACRO_IMAGE_PATTERN).expect("macro image pattern is valid"));

/// One of the three tag databases.
#[derive(Debug)]
struct TagDb {
    path: Utf8PathBuf,
    conn: Connection,
}

impl TagDb {
    fn open(dir: &Utf8Path, name: &str) -> Result<Self, GraphError> {
        let path = dir.join(name);
        if !path.is_file() {
            return Err(GraphError::backend_unavailable(
                "global",
                path,
                "file not found",
            ));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&path, flags).map_err(|err| {
            GraphError::backend_unavailable("global", path.clone(), err.to_string())
        })?;

        // A B-tree GTAGS file opens fine; the first statement is what fails.
        let tables: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = 'db'",
                [],
                |row| row.get(0),
            )
            .map_err(|err| {
                GraphError::backend_unavailable(
                    "global",
                    path.clone(),
                    format!("not an SQLite tag database ({err})"),
                )
            })?;
        if tables == 0 {
            return Err(GraphError::backend_unavailable(
                "global",
                path,
                "missing 'db' table",
            ));
        }

        Ok(Self { path, conn })
    }

    fn corrupt(&self, err: &rusqlite::Error) -> GraphError {
        GraphError::parse(self.path.clone(), err.to_string())
    }
}

/// A definition recorded in `GTAGS` for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Definition {
    line: u32,
    symbol: Symbol,
    is_macro: bool,
}

/// Tag source reading GNU Global `SQLite` databases.
#[derive(Debug)]
pub struct GlobalSource {
    root: Utf8PathBuf,
    gtags: TagDb,
    grtags: TagDb,
    gpath: TagDb,
    /// Definitions per file id, sorted by line.
    definitions: HashMap<String, Vec<Definition>>,
    /// Recorded path per file id.
    paths: HashMap<String, Utf8PathBuf>,
    /// Source lines per file id; `None` when the file could not be read.
    sources: HashMap<String, Option<Vec<String>>>,
}

impl GlobalSource {
    /// Opens the tag databases in `dir`.
    ///
    /// # Errors
    /// Returns [`GraphError::BackendUnavailable`] when any of `GTAGS`,
    /// `GRTAGS` or `GPATH` is missing, is not an `SQLite` database or lacks
    /// the `db` table.
    pub fn open(dir: impl AsRef<Utf8Path>) -> Result<Self, GraphError> {
        let root = dir.as_ref().to_path_buf();
        let gtags = TagDb::open(&root, GTAGS)?;
        let grtags = TagDb::open(&root, GRTAGS)?;
        let gpath = TagDb::open(&root, GPATH)?;
        debug!(target: GLOBAL_TARGET, root = %root, "opened tag databases");
        Ok(Self {
            root,
            gtags,
            grtags,
            gpath,
            definitions: HashMap::new(),
            paths: HashMap::new(),
            sources: HashMap::new(),
        })
    }

    /// Loads reference rows for `symbol` as `(file id, line list)` pairs.
    fn references(&self, symbol: &Symbol) -> Result<Vec<(String, String)>, GraphError> {
        let db = &self.grtags;
        let mut stmt = db
            .conn
            .prepare_cached("SELECT dat, extra FROM db WHERE key = ?1 ORDER BY rowid")
            .map_err(|err| db.corrupt(&err))?;
        let rows = stmt
            .query_map([symbol.as_str()], |row| {
                Ok((column_text(row, 0)?, column_text(row, 1)?))
            })
            .map_err(|err| db.corrupt(&err))?;

        let mut references = Vec::new();
        for row in rows {
            let (dat, extra) = row.map_err(|err| db.corrupt(&err))?;
            let Some(dat) = dat else { continue };
            let mut fields = dat.splitn(3, ' ');
            let (Some(dat_fid), Some(_name), Some(lines)) =
                (fields.next(), fields.next(), fields.next())
            else {
                debug!(
                    target: GLOBAL_TARGET,
                    symbol = %symbol,
                    dat,
                    "skipping short reference row"
                );
                continue;
            };
            let fid = extra.unwrap_or_else(|| dat_fid.to_owned());
            references.push((fid, lines.to_owned()));
        }
        Ok(references)
    }

    /// Loads and caches the definitions recorded for `fid`.
    fn load_definitions(&mut self, fid: &str) -> Result<(), GraphError> {
        if self.definitions.contains_key(fid) {
            return Ok(());
        }

        let db = &self.gtags;
        let mut stmt = db
            .conn
            .prepare_cached("SELECT key, dat FROM db WHERE extra = ?1 ORDER BY rowid")
            .map_err(|err| db.corrupt(&err))?;
        let rows = stmt
            .query_map([fid], |row| Ok((column_text(row, 0)?, column_text(row, 1)?)))
            .map_err(|err| db.corrupt(&err))?;

        let mut definitions = Vec::new();
        for row in rows {
            let (key, dat) = row.map_err(|err| db.corrupt(&err))?;
            if let (Some(key), Some(dat)) = (key, dat)
                && let Some(definition) = parse_definition(&key, &dat)
            {
                definitions.push(definition);
            }
        }
        definitions.sort_by_key(|definition| definition.line);
        debug!(
            target: GLOBAL_TARGET,
            fid,
            count = definitions.len(),
            "loaded file definitions"
        );
        self.definitions.insert(fid.to_owned(), definitions);
        Ok(())
    }

    /// Resolves and caches the recorded path for `fid`.
    fn resolve_path(&mut self, fid: &str) -> Result<Utf8PathBuf, GraphError> {
        if let Some(path) = self.paths.get(fid) {
            return Ok(path.clone());
        }

        let db = &self.gpath;
        let path: Option<Option<String>> = db
            .conn
            .query_row(
                "SELECT dat FROM db WHERE key = ?1 ORDER BY rowid LIMIT 1",
                [fid],
                |row| column_text(row, 0),
            )
            .optional()
            .map_err(|err| db.corrupt(&err))?;
        let Some(Some(path)) = path else {
            return Err(GraphError::parse(
                db.path.clone(),
                format!("file id '{fid}' has no recorded path"),
            ));
        };

        let path = Utf8PathBuf::from(path);
        self.paths.insert(fid.to_owned(), path.clone());
        Ok(path)
    }

    /// Finds the symbols enclosing `line` of file `fid`.
    fn enclosing(&mut self, fid: &str, path: &Utf8Path, line: u32) -> Vec<Symbol> {
        let Some(definitions) = self.definitions.get(fid) else {
            return Vec::new();
        };
        let sources = &mut self.sources;
        let root = &self.root;
        let mut spans = |start: u32| macro_spans(sources, root, fid, path, start, line);
        find_enclosing(definitions, line, &mut spans)
    }
}

impl TagSource for GlobalSource {
    fn kind(&self) -> BackendKind {
        BackendKind::Global
    }

    fn find_callers(&mut self, symbol: &Symbol) -> Result<Vec<CallEdge>, GraphError> {
        let references = self.references(symbol)?;
        let mut edges = Vec::new();
        for (fid, encoded) in references {
            let lines = decode_lines(&encoded).map_err(|message| {
                GraphError::parse(
                    self.grtags.path.clone(),
                    format!("bad line list for '{symbol}': {message}"),
                )
            })?;
            self.load_definitions(&fid)?;
            let path = self.resolve_path(&fid)?;
            for line in lines {
                let callers = self.enclosing(&fid, &path, line);
                if callers.is_empty() {
                    debug!(
                        target: GLOBAL_TARGET,
                        symbol = %symbol,
                        path = %path,
                        line,
                        "reference outside any definition"
                    );
                }
                edges.extend(callers.into_iter().map(|caller| {
                    CallEdge::new(caller, symbol.clone(), Reference::new(path.clone(), line))
                }));
            }
        }
        debug!(target: GLOBAL_TARGET, symbol = %symbol, count = edges.len(), "found callers");
        Ok(edges)
    }
}

/// Reads a column as text, accepting integer storage for id columns.
fn column_text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        ValueRef::Integer(value) => Some(value.to_string()),
        ValueRef::Real(_) | ValueRef::Null => None,
    })
}

/// Parses a `GTAGS` row: `dat = "<fid> <name> <line> <image>"`.
fn parse_definition(key: &str, dat: &str) -> Option<Definition> {
    let mut fields = dat.splitn(4, ' ');
    let _fid = fields.next()?;
    let _name = fields.next()?;
    let line = fields.next()?.parse::<u32>().ok()?;
    let image = fields.next().unwrap_or_default();
    Some(Definition {
        line,
        symbol: Symbol::new(key),
        is_macro: is_macro_image(image),
    })
}

fn is_macro_image(image: &str) -> bool {
    MACRO_IMAGE.is_match(image)
}

/// Decodes a delta-encoded line list such as `"3,2-2,10"`.
///
/// Each entry `n` advances the running line by `n` and records it; an entry
/// `n-r` advances by `n` and records that line plus the `r` lines after it.
pub(crate) fn decode_lines(encoded: &str) -> Result<Vec<u32>, String> {
    let mut lines = Vec::new();
    let mut current: u32 = 0;
    for entry in encoded.split(',') {
        let (delta, run) = match entry.split_once('-') {
            Some((delta, run)) => (delta, parse_count(run, entry)?),
            None => (entry, 0),
        };
        current = current
            .checked_add(parse_count(delta, entry)?)
            .ok_or_else(|| format!("line overflow at '{entry}'"))?;
        for offset in 0..=run {
            lines.push(
                current
                    .checked_add(offset)
                    .ok_or_else(|| format!("line overflow at '{entry}'"))?,
            );
        }
        current = current
            .checked_add(run)
            .ok_or_else(|| format!("line overflow at '{entry}'"))?;
    }
    Ok(lines)
}

fn parse_count(text: &str, entry: &str) -> Result<u32, String> {
    text.parse::<u32>()
        .map_err(|_| format!("invalid entry '{entry}'"))
}

/// Picks the caller of `line` from definitions sorted by line.
///
/// `spans` reports whether a macro defined at the given start line extends
/// to `line` through backslash continuations.
fn find_enclosing(
    definitions: &[Definition],
    line: u32,
    spans: &mut dyn FnMut(u32) -> bool,
) -> Vec<Symbol> {
    let preceding = definitions.partition_point(|definition| definition.line <= line);
    let Some(candidates) = definitions.get(..preceding) else {
        return Vec::new();
    };
    let Some(nearest) = candidates.last() else {
        return Vec::new();
    };

    let nearest_line = nearest.line;
    let macros: Vec<Symbol> = candidates
        .iter()
        .filter(|definition| definition.line == nearest_line && definition.is_macro)
        .map(|definition| definition.symbol.clone())
        .collect();
    if !macros.is_empty() && spans(nearest_line) {
        return macros;
    }

    let Some(function_line) = candidates
        .iter()
        .rev()
        .find(|definition| !definition.is_macro)
        .map(|definition| definition.line)
    else {
        return Vec::new();
    };
    candidates
        .iter()
        .filter(|definition| definition.line == function_line && !definition.is_macro)
        .map(|definition| definition.symbol.clone())
        .collect()
}

/// Reports whether the macro starting at `start` covers `line`.
fn macro_spans(
    sources: &mut HashMap<String, Option<Vec<String>>>,
    root: &Utf8Path,
    fid: &str,
    path: &Utf8Path,
    start: u32,
    line: u32,
) -> bool {
    if start == line {
        return true;
    }
    let text = sources.entry(fid.to_owned()).or_insert_with(|| {
        let full = root.join(path);
        match fs::read_to_string(&full) {
            Ok(contents) => Some(contents.lines().map(str::to_owned).collect()),
            Err(err) => {
                warn!(
                    target: GLOBAL_TARGET,
                    path = %full,
                    error = %err,
                    "cannot read source file for macro extent"
                );
                None
            }
        }
    });
    let Some(text) = text.as_ref() else {
        return false;
    };
    continued_to(text, start, line)
}

/// Follows backslash continuations from one-based `start` looking for `line`.
fn continued_to(text: &[String], start: u32, line: u32) -> bool {
    let mut current = start;
    while current < line {
        let Some(source_line) = usize::try_from(current)
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|idx| text.get(idx))
        else {
            return false;
        };
        if !source_line.trim_end().ends_with('\\') {
            return false;
        }
        current += 1;
    }
    current == line
}
