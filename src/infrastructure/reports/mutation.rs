//! PIT mutation report parsing.
//!
//! Each mutant is one line of the XML report:
//! `<mutation detected='false' status='SURVIVED' ...><mutatedClass>...</mutatedClass>...</mutation>`

use std::sync::OnceLock;

use regex::Regex;

use super::reader::read_report;
use super::unescape_entities;
use crate::domain::errors::ReportError;
use crate::domain::models::{BuildContext, FileDetails, MutationRecord, MutationStatus};

static STATUS_ATTR: OnceLock<Regex> = OnceLock::new();

fn status_attr() -> &'static Regex {
    STATUS_ATTR.get_or_init(|| Regex::new(r#"status=['"](?P<status>[A-Z_]+)['"]"#).unwrap())
}

fn element<'a>(record: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = record.find(&open)? + open.len();
    let end = record[start..].find(&close)? + start;
    Some(&record[start..end])
}

/// Parse one `<mutation>` record; `None` for anything else.
pub fn parse_mutation_line(line: &str) -> Option<MutationRecord> {
    let line = line.trim();
    if !line.starts_with("<mutation ") {
        return None;
    }
    let status = MutationStatus::from_str(&status_attr().captures(line)?["status"])?;
    Some(MutationRecord {
        mutated_class: unescape_entities(element(line, "mutatedClass")?),
        mutated_method: unescape_entities(element(line, "mutatedMethod")?),
        method_description: unescape_entities(element(line, "methodDescription").unwrap_or("")),
        line_number: element(line, "lineNumber")?.trim().parse().ok()?,
        mutator: element(line, "mutator")?.to_string(),
        index: element(line, "index")
            .and_then(|i| i.trim().parse().ok())
            .unwrap_or(0),
        description: unescape_entities(element(line, "description").unwrap_or("")),
        status,
    })
}

/// Parse every mutant of the report.
pub fn parse_mutations(report: &str) -> Vec<MutationRecord> {
    report.lines().filter_map(parse_mutation_line).collect()
}

/// Read the mutation report and keep the mutants of `file`'s class.
///
/// Inner classes (`Foo$Bar`) belong to their outer class.
pub fn load_mutations(
    context: &BuildContext,
    file: &FileDetails,
) -> Result<Vec<MutationRecord>, ReportError> {
    let path = context.reports.mutation_report(&context.workspace);
    let report = read_report(&path, &context.report_read, |c| {
        c.trim_end().ends_with("</mutations>")
    })?;
    let class = file.qualified_name();
    let inner_prefix = format!("{class}$");
    Ok(parse_mutations(&report)
        .into_iter()
        .filter(|m| m.mutated_class == class || m.mutated_class.starts_with(&inner_prefix))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURVIVED: &str = "<mutation detected='false' status='SURVIVED' numberOfTestsRun='2'><sourceFile>Foo.java</sourceFile><mutatedClass>org.example.Foo</mutatedClass><mutatedMethod>bar</mutatedMethod><methodDescription>(I)I</methodDescription><lineNumber>12</lineNumber><mutator>org.pitest.mutationtest.engine.gregor.mutators.MathMutator</mutator><indexes><index>3</index></indexes><blocks><block>1</block></blocks><killingTest/><description>Replaced integer addition with subtraction</description></mutation>";

    #[test]
    fn test_parse_mutation_line() {
        let record = parse_mutation_line(SURVIVED).unwrap();
        assert_eq!(record.mutated_class, "org.example.Foo");
        assert_eq!(record.mutated_method, "bar");
        assert_eq!(record.method_description, "(I)I");
        assert_eq!(record.line_number, 12);
        assert_eq!(record.index, 3);
        assert_eq!(record.status, MutationStatus::Survived);
        assert_eq!(record.mutator_name(), "MathMutator");
    }

    #[test]
    fn test_non_mutation_lines_are_skipped() {
        let report = format!(
            "<?xml version=\"1.0\"?>\n<mutations>\n{SURVIVED}\n{}\n</mutations>\n",
            SURVIVED.replace("SURVIVED", "KILLED")
        );
        let records = parse_mutations(&report);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].status, MutationStatus::Killed);
    }

    #[test]
    fn test_unknown_status_is_dropped() {
        assert!(parse_mutation_line(&SURVIVED.replace("SURVIVED", "PENDING")).is_none());
    }
}
