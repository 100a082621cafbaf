//! JaCoCo HTML and CSV report parsing.
//!
//! Source reports mark each instrumented line as
//! `<span class="pc bpc" id="L10" title="1 of 2 branches missed.">text</span>`.
//! Class reports carry a method table linking each method to its first line.

use std::sync::OnceLock;

use regex::Regex;

use super::reader::read_report;
use super::unescape_entities;
use crate::domain::errors::ReportError;
use crate::domain::models::{
    BranchCounts, BuildContext, ClassCoverage, CoverageStatus, FileDetails, LineCoverage,
    MethodCoverage,
};

static LINE_SPAN: OnceLock<Regex> = OnceLock::new();
static METHOD_LINK: OnceLock<Regex> = OnceLock::new();

fn line_span() -> &'static Regex {
    LINE_SPAN.get_or_init(|| {
        Regex::new(
            r#"<span class="(?P<class>[^"]*)" id="L(?P<line>\d+)"(?: title="(?P<title>[^"]*)")?>(?P<text>.*?)</span>"#,
        )
        .unwrap()
    })
}

fn method_link() -> &'static Regex {
    METHOD_LINK.get_or_init(|| {
        Regex::new(r##"<a href="[^"#]*#L(?P<line>\d+)" class="el_method">(?P<name>[^<]*)</a>"##)
            .unwrap()
    })
}

fn is_complete_html(content: &str) -> bool {
    content.trim_end().ends_with("</html>")
}

/// Parse branch counts from a line title.
///
/// `"2 of 5"` reads as 2 of 5 branches covered. JaCoCo's own phrasing
/// `"1 of 2 branches missed."` counts missed branches and is converted.
/// `"All 2 branches missed."` gives 0 of 2 and `"All 2 branches covered."`
/// gives 2 of 2; an `All` title without a total carries no counts.
pub fn parse_branch_counts(title: &str) -> Option<BranchCounts> {
    let tokens: Vec<&str> = title.split_whitespace().collect();
    if tokens.first().is_some_and(|t| t.eq_ignore_ascii_case("all")) {
        let total: u32 = tokens.get(1)?.parse().ok()?;
        let verdict = tokens.get(3)?;
        return if verdict.starts_with("missed") {
            Some(BranchCounts::new(0, total))
        } else if verdict.starts_with("covered") {
            Some(BranchCounts::new(total, total))
        } else {
            None
        };
    }
    if tokens.len() < 3 || tokens[1] != "of" {
        return None;
    }
    let first: u32 = tokens[0].parse().ok()?;
    let total: u32 = tokens[2].parse().ok()?;
    if first > total {
        return None;
    }
    let missed_phrasing = tokens[3..].iter().any(|t| t.starts_with("missed"));
    let covered = if missed_phrasing { total - first } else { first };
    Some(BranchCounts::new(covered, total))
}

/// Parse every instrumented line of a source report, ordered by line number.
///
/// A partially covered line keeps counts only from an `X of Y` title.
pub fn parse_source_lines(html: &str) -> Vec<LineCoverage> {
    let mut lines: Vec<LineCoverage> = line_span()
        .captures_iter(html)
        .filter_map(|caps| {
            let status = CoverageStatus::from_marker(&caps["class"])?;
            let line_number = caps["line"].parse().ok()?;
            let partial = status == CoverageStatus::PartiallyCovered;
            let branches = caps
                .name("title")
                .map(|t| t.as_str())
                .filter(|t| !(partial && t.trim_start().starts_with("All")))
                .and_then(parse_branch_counts);
            Some(LineCoverage {
                line_number,
                text: unescape_entities(&caps["text"]),
                status,
                branches,
            })
        })
        .collect();
    lines.sort_by_key(|l| l.line_number);
    lines
}

/// Parse `(method name, first line)` pairs from a class report.
pub fn parse_method_table(html: &str) -> Vec<(String, u32)> {
    let mut methods: Vec<(String, u32)> = method_link()
        .captures_iter(html)
        .filter_map(|caps| {
            let line = caps["line"].parse().ok()?;
            Some((unescape_entities(&caps["name"]), line))
        })
        .collect();
    methods.sort_by_key(|(_, line)| *line);
    methods
}

/// Aggregate line status over each method's span.
///
/// A method spans from its first line up to the line before the next
/// method starts; the last method runs to the end of the file.
pub fn method_coverage(lines: &[LineCoverage], table: &[(String, u32)]) -> Vec<MethodCoverage> {
    table
        .iter()
        .enumerate()
        .map(|(i, (name, start))| {
            let next_start = table.get(i + 1).map(|(_, next)| *next);
            let in_span: Vec<&LineCoverage> = lines
                .iter()
                .filter(|l| l.line_number >= *start && next_start.is_none_or(|n| l.line_number < n))
                .collect();
            let missed = in_span.iter().filter(|l| !l.status.is_fully_covered()).count();
            MethodCoverage {
                name: name.clone(),
                start_line: *start,
                end_line: in_span.last().map(|l| l.line_number),
                total_lines: u32::try_from(in_span.len()).unwrap_or(u32::MAX),
                missed_lines: u32::try_from(missed).unwrap_or(u32::MAX),
            }
        })
        .collect()
}

/// Count line statuses for a class snapshot.
pub fn class_coverage(class_name: &str, coverage: f64, lines: &[LineCoverage]) -> ClassCoverage {
    let count = |status: CoverageStatus| {
        u32::try_from(lines.iter().filter(|l| l.status == status).count()).unwrap_or(u32::MAX)
    };
    ClassCoverage {
        class_name: class_name.to_string(),
        coverage,
        fully_covered_lines: count(CoverageStatus::FullyCovered),
        partially_covered_lines: count(CoverageStatus::PartiallyCovered),
        not_covered_lines: count(CoverageStatus::NotCovered),
    }
}

/// Locate a previously recorded line in a regenerated report.
///
/// Exact line number and text first; otherwise the line with identical
/// text among `statuses` nearest to the old line number (ties go to the
/// lower line).
pub fn find_line<'a>(
    lines: &'a [LineCoverage],
    line_number: u32,
    text: &str,
    statuses: &[CoverageStatus],
) -> Option<&'a LineCoverage> {
    if let Some(exact) = lines
        .iter()
        .find(|l| l.line_number == line_number && l.text == text)
    {
        return Some(exact);
    }
    lines
        .iter()
        .filter(|l| l.text == text && statuses.contains(&l.status))
        .min_by_key(|l| (l.line_number.abs_diff(line_number), l.line_number))
}

/// Parse the CSV aggregate and return the line coverage ratio of one class.
pub fn parse_csv_coverage(csv: &str, package: &str, class: &str) -> Option<f64> {
    let mut rows = csv.lines().filter(|l| !l.trim().is_empty());
    let header: Vec<&str> = rows.next()?.split(',').map(str::trim).collect();
    let column = |name: &str| header.iter().position(|h| *h == name);
    let (pkg_col, class_col) = (column("PACKAGE")?, column("CLASS")?);
    let (missed_col, covered_col) = (column("LINE_MISSED")?, column("LINE_COVERED")?);

    rows.map(|row| row.split(',').map(str::trim).collect::<Vec<_>>())
        .find(|cells| {
            cells.get(pkg_col) == Some(&package) && cells.get(class_col) == Some(&class)
        })
        .and_then(|cells| {
            let missed: f64 = cells.get(missed_col)?.parse().ok()?;
            let covered: f64 = cells.get(covered_col)?.parse().ok()?;
            let total = missed + covered;
            (total > 0.0).then(|| covered / total)
        })
}

/// Coverage data of one source file, read from the JaCoCo report.
#[derive(Debug, Clone, Default)]
pub struct JacocoReport {
    pub lines: Vec<LineCoverage>,
    pub methods: Vec<MethodCoverage>,
}

impl JacocoReport {
    /// Read the source and class reports of `file`.
    ///
    /// The class report is optional; without it `methods` is empty.
    pub fn load(context: &BuildContext, file: &FileDetails) -> Result<Self, ReportError> {
        let source_path = context.reports.source_report(&context.workspace, file);
        let html = read_report(&source_path, &context.report_read, is_complete_html)?;
        let lines = parse_source_lines(&html);
        if lines.is_empty() && !html.contains("id=\"L") {
            return Err(ReportError::Malformed {
                path: source_path,
                reason: "no line markers found".to_string(),
            });
        }

        let class_path = context.reports.class_report(&context.workspace, file);
        let methods = match read_report(&class_path, &context.report_read, is_complete_html) {
            Ok(class_html) => method_coverage(&lines, &parse_method_table(&class_html)),
            Err(err) => {
                tracing::debug!(path = %class_path.display(), error = %err, "no method table");
                Vec::new()
            }
        };

        Ok(Self { lines, methods })
    }

    pub fn uncovered_lines(&self) -> impl Iterator<Item = &LineCoverage> {
        self.lines.iter().filter(|l| !l.status.is_fully_covered())
    }

    pub fn has_uncovered_lines(&self) -> bool {
        self.uncovered_lines().next().is_some()
    }

    pub fn method(&self, name: &str) -> Option<&MethodCoverage> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Current line coverage ratio of `file` from the CSV aggregate.
pub fn read_class_coverage(context: &BuildContext, file: &FileDetails) -> Option<f64> {
    let path = context.reports.csv_report(&context.workspace);
    let csv = read_report(&path, &context.report_read, |c| c.contains('\n')).ok()?;
    parse_csv_coverage(&csv, &file.package_name, &file.file_name)
}
