// src/query/render.rs

//! Text rendering of query results

use super::{Match, QueryKind, QueryOutcome, QueryRequest};
use chrono::{Local, TimeZone};

const RULE_WIDTH: usize = 40;
const DATE_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Render a query outcome as output lines
pub fn render(request: &QueryRequest, outcome: &QueryOutcome) -> Vec<String> {
    let mut lines = Vec::new();
    let scope = describe_scope(request);

    if !request.quiet {
        lines.push(format!(
            "Searching database records for {} match for {} ({})",
            request.mode.as_str(),
            request.kind,
            request.pattern
        ));
    }

    if outcome.is_empty() {
        lines.push(format!("No matches in database for {}", scope));
        return lines;
    }

    let matches = match outcome {
        QueryOutcome::Count(n) => {
            if request.quiet {
                lines.push(n.to_string());
            } else {
                lines.push(format!("{} match(es) in database for {}", n, scope));
            }
            return lines;
        }
        QueryOutcome::Matches(matches) => matches,
    };

    let mut current_tag: Option<&str> = None;
    let mut current_package: Option<i64> = None;

    for m in matches {
        let package = &m.package;
        if current_tag != Some(package.tag.as_str()) {
            if request.kind != QueryKind::Packages {
                lines.push(String::new());
                lines.push(String::new());
                lines.push(format!("Results in Tag: {}", package.tag));
                lines.push("=".repeat(RULE_WIDTH));
                lines.push(String::new());
            }
            current_tag = Some(package.tag.as_str());
            current_package = None;
        }

        if request.quiet && current_package == Some(package.id) {
            continue;
        }
        lines.push(match_line(request, m, &package.nvr()));
        current_package = Some(package.id);

        if request.extra_info && !request.quiet {
            lines.extend(extra_info_lines(m));
        }
    }

    lines
}

/// `tag (T) and substring (lib)` or `substring (lib)`
fn describe_scope(request: &QueryRequest) -> String {
    match &request.tag {
        Some(tag) => format!(
            "tag ({}) and {} ({})",
            tag,
            request.mode.as_str(),
            request.pattern
        ),
        None => format!("{} ({})", request.mode.as_str(), request.pattern),
    }
}

fn match_line(request: &QueryRequest, m: &Match, nvr: &str) -> String {
    let package = &m.package;
    match request.kind {
        QueryKind::Packages => {
            let update = if package.is_update { " [update]" } else { "" };
            format!("{}/{}{}", package.tag, nvr, update)
        }
        QueryKind::Symbols => format!(
            "{} ({}): {} in {}",
            nvr,
            package.source_name,
            m.value,
            m.file_path.as_deref().unwrap_or_default()
        ),
        QueryKind::Files if request.ownership && m.ownership.is_some() => {
            let mut line = format!("{} ({}): {}", nvr, package.source_name, m.value);
            if let Some(owner) = &m.ownership {
                line.push_str(&format!(
                    " ({:04o},{}{},{}{})",
                    owner.perms,
                    if owner.is_suid { "*" } else { "" },
                    owner.user,
                    if owner.is_sgid { "*" } else { "" },
                    owner.group
                ));
            }
            line
        }
        _ => {
            let update = if package.is_update { "[update] " } else { "" };
            format!("{}{} ({}): {}", update, nvr, package.source_name, m.value)
        }
    }
}

/// Build date and hardening summary, only for files with a flags row
fn extra_info_lines(m: &Match) -> Vec<String> {
    let Some(flags) = m.flags else {
        return Vec::new();
    };

    let date = Local
        .timestamp_opt(m.package.build_time, 0)
        .single()
        .map(|dt| dt.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| m.package.build_time.to_string());

    vec![
        format!("  {:<10}{}", "Date :", date),
        format!(
            "  {:<10}{:<10}{:<12}{:<10}{:<12}{:<10}{}",
            "Flags:",
            "RELRO  :",
            flags.relro.label(),
            "SSP:",
            flags.ssp.label(),
            "PIE:",
            flags.pie.label()
        ),
        format!(
            "  {:<10}{:<10}{:<12}{:<10}{}",
            "",
            "FORTIFY:",
            flags.fortify.label(),
            "NX :",
            flags.nx.label()
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::flags::{Fortify, Nx, Pie, Relro, SecurityFlags, StackProtector};
    use crate::query::{FileOwnership, MatchMode, PackageRef};

    fn package(id: i64, tag: &str, name: &str, is_update: bool) -> PackageRef {
        PackageRef {
            id,
            tag: tag.to_string(),
            name: name.to_string(),
            version: "1.0".to_string(),
            release: "1".to_string(),
            build_time: 0,
            source_name: name.to_string(),
            is_update,
        }
    }

    fn file_match(id: i64, tag: &str, name: &str, path: &str) -> Match {
        Match {
            package: package(id, tag, name, false),
            value: path.to_string(),
            file_path: None,
            file_id: Some(1),
            ownership: Some(FileOwnership {
                user: "root".to_string(),
                group: "root".to_string(),
                is_suid: true,
                is_sgid: false,
                perms: 0o4755,
            }),
            flags: None,
        }
    }

    #[test]
    fn test_packages_lines_have_no_banner() {
        let mut request = QueryRequest::new(QueryKind::Packages, "acme");
        request.quiet = true;
        let outcome = QueryOutcome::Matches(vec![
            Match {
                package: package(1, "T", "acme", false),
                value: "acme".to_string(),
                file_path: None,
                file_id: None,
                ownership: None,
                flags: None,
            },
            Match {
                package: package(2, "T", "acme-libs", true),
                value: "acme-libs".to_string(),
                file_path: None,
                file_id: None,
                ownership: None,
                flags: None,
            },
        ]);
        assert_eq!(
            render(&request, &outcome),
            vec!["T/acme-1.0-1", "T/acme-libs-1.0-1 [update]"]
        );
    }

    #[test]
    fn test_tag_banner_and_ownership() {
        let mut request = QueryRequest::new(QueryKind::Files, "bin");
        request.ownership = true;
        let outcome = QueryOutcome::Matches(vec![file_match(1, "T", "acme", "/usr/bin/acme")]);
        let lines = render(&request, &outcome);
        assert_eq!(
            lines,
            vec![
                "Searching database records for substring match for files (bin)".to_string(),
                String::new(),
                String::new(),
                "Results in Tag: T".to_string(),
                "=".repeat(40),
                String::new(),
                "acme-1.0-1 (acme): /usr/bin/acme (4755,*root,root)".to_string(),
            ]
        );
    }

    #[test]
    fn test_quiet_collapses_package_rows() {
        let mut request = QueryRequest::new(QueryKind::Files, "bin");
        request.quiet = true;
        let outcome = QueryOutcome::Matches(vec![
            file_match(1, "T", "acme", "/usr/bin/a"),
            file_match(1, "T", "acme", "/usr/bin/b"),
            file_match(2, "T", "zeta", "/usr/bin/z"),
        ]);
        let lines: Vec<_> = render(&request, &outcome)
            .into_iter()
            .filter(|l| l.contains("): "))
            .collect();
        assert_eq!(
            lines,
            vec!["acme-1.0-1 (acme): /usr/bin/a", "zeta-1.0-1 (zeta): /usr/bin/z"]
        );
    }

    #[test]
    fn test_quiet_keeps_builds_sharing_a_name_apart() {
        let mut request = QueryRequest::new(QueryKind::Files, "bin");
        request.quiet = true;
        let mut update = file_match(2, "T", "acme", "/usr/bin/a");
        update.package.release = "2".to_string();
        update.package.is_update = true;
        let outcome = QueryOutcome::Matches(vec![
            file_match(1, "T", "acme", "/usr/bin/a"),
            file_match(1, "T", "acme", "/usr/bin/b"),
            update,
        ]);
        let lines: Vec<_> = render(&request, &outcome)
            .into_iter()
            .filter(|l| l.contains("): "))
            .collect();
        assert_eq!(
            lines,
            vec![
                "acme-1.0-1 (acme): /usr/bin/a",
                "[update] acme-1.0-2 (acme): /usr/bin/a"
            ]
        );
    }

    #[test]
    fn test_counts_and_no_matches() {
        let mut request = QueryRequest::new(QueryKind::Provides, "^lib");
        request.mode = MatchMode::Regex;
        request.tag = Some("T".to_string());
        request.count_only = true;
        assert_eq!(
            render(&request, &QueryOutcome::Count(3)).last().unwrap(),
            "3 match(es) in database for tag (T) and regexp (^lib)"
        );
        assert_eq!(
            render(&request, &QueryOutcome::Count(0)).last().unwrap(),
            "No matches in database for tag (T) and regexp (^lib)"
        );

        request.quiet = true;
        assert_eq!(render(&request, &QueryOutcome::Count(3)), vec!["3"]);
    }

    #[test]
    fn test_extra_info_lines() {
        let mut m = file_match(1, "T", "acme", "/usr/bin/acme");
        assert!(extra_info_lines(&m).is_empty());

        m.flags = Some(SecurityFlags {
            relro: Relro::Full,
            ssp: StackProtector::Present,
            pie: Pie::SharedObject,
            nx: Nx::Enabled,
            fortify: Fortify::Absent,
        });
        let lines = extra_info_lines(&m);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("  Date :    "));
        assert_eq!(
            lines[1],
            "  Flags:    RELRO  :  full        SSP:      found       PIE:      DSO"
        );
        assert_eq!(
            lines[2],
            "            FORTIFY:  not found   NX :      enabled"
        );
    }
}
