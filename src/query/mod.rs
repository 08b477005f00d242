// src/query/mod.rs

//! Query engine
//!
//! Answers typed, tag-scoped, pattern-matched lookups against the catalogue.
//! Every statement is built from fixed fragments chosen by [`QueryKind`] and
//! [`MatchMode`]; the pattern and tag are always bound parameters.

mod render;
pub mod report;

pub use render::render;

use crate::binary::SecurityFlags;
use crate::db::models::{FlagsEntry, Tag};
use crate::error::{Error, Result};
use regex::Regex;
use rusqlite::{Connection, Row, params};
use tracing::debug;

/// What a query searches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Files,
    Symbols,
    Provides,
    Requires,
    Packages,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Files => "files",
            QueryKind::Symbols => "symbols",
            QueryKind::Provides => "provides",
            QueryKind::Requires => "requires",
            QueryKind::Packages => "packages",
        }
    }

    /// FROM/JOIN clause, the column matched against, the tag column and the
    /// kind-specific select list (after the common package columns)
    fn sql_parts(&self) -> (&'static str, &'static str, &'static str, &'static str, &'static str) {
        match self {
            QueryKind::Files => (
                "files f
                 JOIN packages p ON p.id = f.package_id
                 JOIN tags t ON t.id = f.tag_id
                 JOIN user_names u ON u.id = f.user_id
                 JOIN group_names g ON g.id = f.group_id",
                "f.path",
                "f.tag_id",
                "f.path, NULL, f.id, u.name, g.name, f.is_suid, f.is_sgid, f.perms",
                "f.path",
            ),
            QueryKind::Symbols => (
                "symbols s
                 JOIN packages p ON p.id = s.package_id
                 JOIN tags t ON t.id = s.tag_id
                 JOIN files f ON f.id = s.file_id
                 JOIN symbol_names n ON n.id = s.name_id",
                "n.name",
                "s.tag_id",
                "n.name, f.path, f.id, NULL, NULL, NULL, NULL, NULL",
                "n.name, f.path",
            ),
            QueryKind::Provides => (
                "provides d
                 JOIN packages p ON p.id = d.package_id
                 JOIN tags t ON t.id = d.tag_id
                 JOIN provides_names n ON n.id = d.name_id",
                "n.name",
                "d.tag_id",
                "n.name, NULL, NULL, NULL, NULL, NULL, NULL, NULL",
                "n.name",
            ),
            QueryKind::Requires => (
                "requires d
                 JOIN packages p ON p.id = d.package_id
                 JOIN tags t ON t.id = d.tag_id
                 JOIN requires_names n ON n.id = d.name_id",
                "n.name",
                "d.tag_id",
                "n.name, NULL, NULL, NULL, NULL, NULL, NULL, NULL",
                "n.name",
            ),
            QueryKind::Packages => (
                "packages p
                 JOIN tags t ON t.id = p.tag_id",
                "p.name",
                "p.tag_id",
                "p.name, NULL, NULL, NULL, NULL, NULL, NULL, NULL",
                "p.name",
            ),
        }
    }
}

impl std::fmt::Display for QueryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the pattern is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Substring,
    Regex,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Substring => "substring",
            MatchMode::Regex => "regexp",
        }
    }
}

/// A catalogue lookup
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub kind: QueryKind,
    pub pattern: String,
    pub mode: MatchMode,
    pub ignore_case: bool,
    /// Restrict to one tag; `None` searches the whole catalogue
    pub tag: Option<String>,
    pub count_only: bool,
    /// Decorate file matches with owner, group and permissions
    pub ownership: bool,
    /// Decorate file matches with build date and hardening flags
    pub extra_info: bool,
    /// Terse output: one line per package, no banners
    pub quiet: bool,
}

impl QueryRequest {
    pub fn new(kind: QueryKind, pattern: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
            mode: MatchMode::Substring,
            ignore_case: false,
            tag: None,
            count_only: false,
            ownership: false,
            extra_info: false,
            quiet: false,
        }
    }

    /// WHERE condition on `column`, with the pattern bound as ?1
    fn condition(&self, column: &str) -> String {
        match (self.mode, self.ignore_case) {
            (MatchMode::Substring, false) => format!("instr({}, ?1) > 0", column),
            (MatchMode::Substring, true) => format!("instr(lower({}), lower(?1)) > 0", column),
            (MatchMode::Regex, _) => format!("{} REGEXP ?1", column),
        }
    }

    /// The pattern as bound into the statement
    fn bound_pattern(&self) -> Result<String> {
        if self.mode == MatchMode::Substring {
            return Ok(self.pattern.clone());
        }
        let pattern = if self.ignore_case {
            format!("(?i){}", self.pattern)
        } else {
            self.pattern.clone()
        };
        Regex::new(&pattern).map_err(|e| Error::InvalidPattern {
            pattern: self.pattern.clone(),
            reason: e.to_string(),
        })?;
        Ok(pattern)
    }

    fn sql(&self) -> String {
        let (from, column, tag_column, select, order) = self.kind.sql_parts();
        format!(
            "SELECT DISTINCT t.name, p.name, p.version, p.release, p.build_time, p.source_name, p.is_update, {select}, p.id
             FROM {from}
             WHERE {cond} AND (?2 IS NULL OR {tag_column} = ?2)
             ORDER BY t.name, p.name, p.version, p.release, p.id, {order}",
            cond = self.condition(column),
        )
    }
}

/// Package columns shared by every match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRef {
    /// Catalogue identity; two builds with the same name never share it
    pub id: i64,
    pub tag: String,
    pub name: String,
    pub version: String,
    pub release: String,
    pub build_time: i64,
    pub source_name: String,
    pub is_update: bool,
}

impl PackageRef {
    pub fn nvr(&self) -> String {
        format!("{}-{}-{}", self.name, self.version, self.release)
    }
}

/// Owner and mode of a matched file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOwnership {
    pub user: String,
    pub group: String,
    pub is_suid: bool,
    pub is_sgid: bool,
    pub perms: u32,
}

/// One matched row
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub package: PackageRef,
    /// The matched field: path, symbol, capability or package name
    pub value: String,
    /// File a symbol was found in
    pub file_path: Option<String>,
    pub file_id: Option<i64>,
    pub ownership: Option<FileOwnership>,
    /// Hardening flags of the matched file, when requested and recorded
    pub flags: Option<SecurityFlags>,
}

impl Match {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let user: Option<String> = row.get(10)?;
        let ownership = match user {
            Some(user) => Some(FileOwnership {
                user,
                group: row.get(11)?,
                is_suid: row.get(12)?,
                is_sgid: row.get(13)?,
                perms: row.get(14)?,
            }),
            None => None,
        };

        Ok(Self {
            package: PackageRef {
                id: row.get(15)?,
                tag: row.get(0)?,
                name: row.get(1)?,
                version: row.get(2)?,
                release: row.get(3)?,
                build_time: row.get(4)?,
                source_name: row.get(5)?,
                is_update: row.get(6)?,
            },
            value: row.get(7)?,
            file_path: row.get(8)?,
            file_id: row.get(9)?,
            ownership,
            flags: None,
        })
    }
}

/// What a query produced
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Count(usize),
    Matches(Vec<Match>),
}

impl QueryOutcome {
    pub fn len(&self) -> usize {
        match self {
            QueryOutcome::Count(n) => *n,
            QueryOutcome::Matches(matches) => matches.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run a query against the catalogue
///
/// An unknown tag filter is an error, never an empty result.
pub fn execute(conn: &Connection, request: &QueryRequest) -> Result<QueryOutcome> {
    let tag_id = match &request.tag {
        Some(name) => Tag::require(conn, name)?.id,
        None => None,
    };
    let pattern = request.bound_pattern()?;
    let sql = request.sql();
    debug!(
        "Running {} {} query for '{}'",
        request.mode.as_str(),
        request.kind,
        request.pattern
    );

    if request.count_only {
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM ({})", sql),
            params![pattern, tag_id],
            |row| row.get(0),
        )?;
        return Ok(QueryOutcome::Count(count as usize));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut matches = stmt
        .query_map(params![pattern, tag_id], Match::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    if request.extra_info && request.kind == QueryKind::Files {
        for m in &mut matches {
            if let Some(file_id) = m.file_id {
                m.flags = FlagsEntry::find_by_file(conn, file_id)?.map(|entry| entry.flags);
            }
        }
    }

    Ok(QueryOutcome::Matches(matches))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conditions() {
        let mut request = QueryRequest::new(QueryKind::Provides, "lib");
        assert_eq!(request.condition("n.name"), "instr(n.name, ?1) > 0");

        request.ignore_case = true;
        assert_eq!(
            request.condition("n.name"),
            "instr(lower(n.name), lower(?1)) > 0"
        );

        request.mode = MatchMode::Regex;
        assert_eq!(request.condition("n.name"), "n.name REGEXP ?1");
        assert_eq!(request.bound_pattern().unwrap(), "(?i)lib");
    }

    #[test]
    fn test_invalid_regex_is_user_error() {
        let mut request = QueryRequest::new(QueryKind::Files, "(unclosed");
        request.mode = MatchMode::Regex;
        let err = request.bound_pattern().unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_unknown_tag_is_error() {
        let conn = crate::db::open_in_memory().unwrap();
        let mut request = QueryRequest::new(QueryKind::Packages, "acme");
        request.tag = Some("nope".to_string());
        assert!(matches!(
            execute(&conn, &request),
            Err(Error::UnknownTag(_))
        ));
    }

    #[test]
    fn test_empty_catalogue() {
        let conn = crate::db::open_in_memory().unwrap();
        for kind in [
            QueryKind::Files,
            QueryKind::Symbols,
            QueryKind::Provides,
            QueryKind::Requires,
            QueryKind::Packages,
        ] {
            let mut request = QueryRequest::new(kind, "x");
            assert!(execute(&conn, &request).unwrap().is_empty());
            request.count_only = true;
            assert_eq!(execute(&conn, &request).unwrap(), QueryOutcome::Count(0));
        }
    }
}
