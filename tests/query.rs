// tests/query.rs

//! Query engine tests: match modes, tag scoping, counts, rendering and reports.

mod common;

use common::{FixtureArtifact, create_tag, setup_catalog};
use rpmcat::catalog::{ImportOutcome, Importer, NameCaches};
use rpmcat::db::models::{FileEntry, FlagsEntry, SymbolEntry};
use rpmcat::query::report::{self, SetIdKind};
use rpmcat::query::{self, Match};
use rpmcat::{Error, MatchMode, QueryKind, QueryOutcome, QueryRequest};
use rusqlite::Connection;
use tempfile::TempDir;

/// Two tags: T holds acme and libfoo, U holds an update of libfoo
fn seeded_catalog() -> (TempDir, Connection) {
    let (temp, _db_path, mut conn) = setup_catalog();
    let t = create_tag(&conn, "T");
    let u = create_tag(&conn, "U");
    let mut importer = Importer::new();

    let acme = FixtureArtifact::new("acme", "1.0", "1")
        .with_file("/usr/bin/acme", "root", "root", 0o100755)
        .with_file("/usr/sbin/acme-su", "root", "acme", 0o104750)
        .with_requires(&["libfoo.so.1()(64bit)", "libc.so.6(GLIBC_2.34)(64bit)"]);
    let libfoo = FixtureArtifact::new("libfoo", "2.1", "3")
        .with_file("/usr/lib64/libfoo.so.1", "root", "root", 0o100644)
        .with_provides(&["libfoo.so.1()(64bit)", "libfoo = 2.1-3"]);
    let libfoo_update = FixtureArtifact::new("libfoo", "2.1", "4")
        .with_file("/usr/lib64/libfoo.so.1", "root", "root", 0o100644)
        .with_provides(&["libfoo.so.1()(64bit)", "libfoo = 2.1-4"]);

    importer.import_artifact(&mut conn, &t, &acme, false).unwrap();
    importer.import_artifact(&mut conn, &t, &libfoo, false).unwrap();
    importer.import_artifact(&mut conn, &u, &libfoo_update, true).unwrap();
    (temp, conn)
}

fn matches(conn: &Connection, request: &QueryRequest) -> Vec<Match> {
    match query::execute(conn, request).unwrap() {
        QueryOutcome::Matches(matches) => matches,
        QueryOutcome::Count(_) => panic!("expected matches"),
    }
}

fn values(matches: &[Match]) -> Vec<(String, String)> {
    matches
        .iter()
        .map(|m| (m.package.nvr(), m.value.clone()))
        .collect()
}

#[test]
fn test_substring_and_regex_agree() {
    let (_temp, conn) = seeded_catalog();

    let mut substring = QueryRequest::new(QueryKind::Provides, "libfoo.so");
    substring.tag = Some("T".to_string());
    let mut regex = QueryRequest::new(QueryKind::Provides, "^libfoo\\.so");
    regex.mode = MatchMode::Regex;
    regex.tag = Some("T".to_string());

    let by_substring = values(&matches(&conn, &substring));
    assert_eq!(
        by_substring,
        vec![("libfoo-2.1-3".to_string(), "libfoo.so.1()(64bit)".to_string())]
    );
    assert_eq!(by_substring, values(&matches(&conn, &regex)));
}

#[test]
fn test_without_tag_searches_everything() {
    let (_temp, conn) = seeded_catalog();
    let request = QueryRequest::new(QueryKind::Provides, "libfoo.so.1");
    let found = matches(&conn, &request);
    let tags: Vec<_> = found.iter().map(|m| m.package.tag.as_str()).collect();
    assert_eq!(tags, vec!["T", "U"]);
    assert!(!found[0].package.is_update);
    assert!(found[1].package.is_update);
}

#[test]
fn test_case_handling() {
    let (_temp, conn) = seeded_catalog();

    let mut request = QueryRequest::new(QueryKind::Packages, "ACME");
    assert!(matches(&conn, &request).is_empty());

    request.ignore_case = true;
    assert_eq!(matches(&conn, &request).len(), 1);

    request.mode = MatchMode::Regex;
    request.pattern = "^AC".to_string();
    assert_eq!(matches(&conn, &request).len(), 1);
}

#[test]
fn test_unknown_tag_is_an_error() {
    let (_temp, conn) = seeded_catalog();
    let mut request = QueryRequest::new(QueryKind::Files, "bin");
    request.tag = Some("nope".to_string());

    let err = query::execute(&conn, &request).unwrap_err();
    assert!(matches!(err, Error::UnknownTag(ref name) if name == "nope"));
    assert!(err.is_user_error());
}

#[test]
fn test_invalid_regex_is_an_error() {
    let (_temp, conn) = seeded_catalog();
    let mut request = QueryRequest::new(QueryKind::Files, "[bin");
    request.mode = MatchMode::Regex;
    assert!(matches!(
        query::execute(&conn, &request),
        Err(Error::InvalidPattern { .. })
    ));
}

#[test]
fn test_count_mode() {
    let (_temp, conn) = seeded_catalog();

    let mut request = QueryRequest::new(QueryKind::Files, "/usr/");
    request.count_only = true;
    assert_eq!(query::execute(&conn, &request).unwrap(), QueryOutcome::Count(4));

    request.tag = Some("U".to_string());
    assert_eq!(query::execute(&conn, &request).unwrap(), QueryOutcome::Count(1));

    request.quiet = true;
    let outcome = query::execute(&conn, &request).unwrap();
    assert_eq!(query::render(&request, &outcome), vec!["1"]);
}

#[test]
fn test_requires_ordering_and_noise() {
    let (_temp, conn) = seeded_catalog();
    let request = QueryRequest::new(QueryKind::Requires, "lib");
    let found = values(&matches(&conn, &request));
    assert_eq!(
        found,
        vec![("acme-1.0-1".to_string(), "libfoo.so.1()(64bit)".to_string())]
    );
}

#[test]
fn test_file_ownership_rendering() {
    let (_temp, conn) = seeded_catalog();
    let mut request = QueryRequest::new(QueryKind::Files, "acme-su");
    request.ownership = true;
    request.tag = Some("T".to_string());

    let outcome = query::execute(&conn, &request).unwrap();
    let lines = query::render(&request, &outcome);
    assert_eq!(
        lines,
        vec![
            "Searching database records for substring match for files (acme-su)".to_string(),
            String::new(),
            String::new(),
            "Results in Tag: T".to_string(),
            "=".repeat(40),
            String::new(),
            "acme-1.0-1 (acme): /usr/sbin/acme-su (4750,*root,acme)".to_string(),
        ]
    );
}

#[test]
fn test_update_prefix_and_no_match_message() {
    let (_temp, conn) = seeded_catalog();

    let mut request = QueryRequest::new(QueryKind::Provides, "libfoo =");
    request.tag = Some("U".to_string());
    request.quiet = true;
    let outcome = query::execute(&conn, &request).unwrap();
    let lines = query::render(&request, &outcome);
    assert_eq!(lines.last().unwrap(), "[update] libfoo-2.1-4 (libfoo): libfoo = 2.1-4");

    let request = QueryRequest::new(QueryKind::Symbols, "nothing_like_this");
    let outcome = query::execute(&conn, &request).unwrap();
    assert_eq!(
        query::render(&request, &outcome).last().unwrap(),
        "No matches in database for substring (nothing_like_this)"
    );
}

#[test]
fn test_reports() {
    let (_temp, conn) = seeded_catalog();

    assert_eq!(
        report::list_updates(&conn, "U").unwrap(),
        vec!["libfoo-2.1-4.x86_64.rpm"]
    );
    assert!(report::list_updates(&conn, "T").unwrap().is_empty());

    let suid = report::list_setid(&conn, "T", SetIdKind::Suid).unwrap();
    assert_eq!(suid.len(), 1);
    assert_eq!(suid[0].path, "/usr/sbin/acme-su");
    assert!(report::list_setid(&conn, "T", SetIdKind::Sgid).unwrap().is_empty());

    let tags: Vec<_> = report::list_tags(&conn)
        .unwrap()
        .into_iter()
        .map(|(tag, count)| (tag.name, count))
        .collect();
    assert_eq!(tags, vec![("T".to_string(), 2), ("U".to_string(), 1)]);
}

#[test]
fn test_builds_sharing_a_name_render_separately() {
    let (_temp, _db_path, mut conn) = setup_catalog();
    let tag = create_tag(&conn, "T");
    let mut importer = Importer::new();

    let first = FixtureArtifact::new("acme", "1.0", "1")
        .with_file("/usr/bin/a", "root", "root", 0o100755)
        .with_file("/usr/bin/b", "root", "root", 0o100755);
    let second = FixtureArtifact::new("acme", "1.0", "2")
        .with_file("/usr/bin/a", "root", "root", 0o100755)
        .with_file("/usr/bin/b", "root", "root", 0o100755);
    importer.import_artifact(&mut conn, &tag, &first, false).unwrap();
    importer.import_artifact(&mut conn, &tag, &second, true).unwrap();

    let mut request = QueryRequest::new(QueryKind::Files, "/usr/bin/");
    let found = values(&matches(&conn, &request));
    assert_eq!(
        found,
        vec![
            ("acme-1.0-1".to_string(), "/usr/bin/a".to_string()),
            ("acme-1.0-1".to_string(), "/usr/bin/b".to_string()),
            ("acme-1.0-2".to_string(), "/usr/bin/a".to_string()),
            ("acme-1.0-2".to_string(), "/usr/bin/b".to_string()),
        ]
    );

    request.quiet = true;
    let outcome = query::execute(&conn, &request).unwrap();
    let lines: Vec<_> = query::render(&request, &outcome)
        .into_iter()
        .filter(|line| line.contains("): "))
        .collect();
    assert_eq!(
        lines,
        vec![
            "acme-1.0-1 (acme): /usr/bin/a".to_string(),
            "[update] acme-1.0-2 (acme): /usr/bin/a".to_string(),
        ]
    );
}

#[test]
fn test_symbol_matches_name_their_file() {
    let (_temp, _db_path, mut conn) = setup_catalog();
    let tag = create_tag(&conn, "T");
    let mut importer = Importer::new();

    let artifact =
        FixtureArtifact::new("acme", "1.0", "1").with_file("/usr/bin/acme", "root", "root", 0o100755);
    let ImportOutcome::Imported(stats) =
        importer.import_artifact(&mut conn, &tag, &artifact, false).unwrap()
    else {
        panic!("expected import");
    };

    let tag_id = tag.id.unwrap();
    let file_id = FileEntry::find_id(&conn, tag_id, stats.package_id, "/usr/bin/acme")
        .unwrap()
        .unwrap();
    let mut caches = NameCaches::new();
    for symbol in ["acme_init", "acme_shutdown", "other_entry"] {
        let name_id = caches.symbols.resolve(&conn, symbol).unwrap();
        SymbolEntry::new(tag_id, stats.package_id, file_id, name_id)
            .insert(&conn)
            .unwrap();
    }

    let mut request = QueryRequest::new(QueryKind::Symbols, "acme_");
    request.tag = Some("T".to_string());
    let outcome = query::execute(&conn, &request).unwrap();
    let lines = query::render(&request, &outcome);
    assert_eq!(
        &lines[lines.len() - 2..],
        &[
            "acme-1.0-1 (acme): acme_init in /usr/bin/acme".to_string(),
            "acme-1.0-1 (acme): acme_shutdown in /usr/bin/acme".to_string(),
        ]
    );
}

#[test]
fn test_extra_info_attaches_recorded_flags() {
    let (_temp, _db_path, mut conn) = setup_catalog();
    let tag = create_tag(&conn, "T");
    let mut importer = Importer::new();

    let artifact = FixtureArtifact::new("acme", "1.0", "1")
        .with_elf("/usr/bin/acme")
        .with_file("/usr/share/acme/data", "root", "root", 0o100644);
    let ImportOutcome::Imported(stats) =
        importer.import_artifact(&mut conn, &tag, &artifact, false).unwrap()
    else {
        panic!("expected import");
    };
    let file_id = FileEntry::find_id(&conn, tag.id.unwrap(), stats.package_id, "/usr/bin/acme")
        .unwrap()
        .unwrap();
    let recorded = FlagsEntry::find_by_file(&conn, file_id).unwrap().unwrap();

    let mut request = QueryRequest::new(QueryKind::Files, "acme");
    request.extra_info = true;
    let found = matches(&conn, &request);
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].value, "/usr/bin/acme");
    assert_eq!(found[0].flags, Some(recorded.flags));
    assert_eq!(found[1].flags, None);

    let outcome = query::execute(&conn, &request).unwrap();
    let lines = query::render(&request, &outcome);
    assert_eq!(lines.iter().filter(|l| l.starts_with("  Flags:")).count(), 1);
    assert_eq!(lines.iter().filter(|l| l.starts_with("  Date :")).count(), 1);

    // Without the switch no flags are looked up
    request.extra_info = false;
    assert!(matches(&conn, &request).iter().all(|m| m.flags.is_none()));
}
