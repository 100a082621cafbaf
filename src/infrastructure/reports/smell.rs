//! Static-analysis findings report (JSON array of findings).

use std::path::Path;

use super::reader::read_report;
use crate::domain::errors::ReportError;
use crate::domain::models::{BuildContext, FileDetails, SmellRecord};

/// Parse the findings report.
pub fn parse_smells(json: &str, path: &Path) -> Result<Vec<SmellRecord>, ReportError> {
    serde_json::from_str(json).map_err(|e| ReportError::Malformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn belongs_to(record: &SmellRecord, file: &FileDetails) -> bool {
    let record_path = Path::new(&record.file);
    record_path == file.file_path || record_path.ends_with(&file.file_path)
}

/// Read the findings report and keep the findings for `file`.
pub fn load_smells(
    context: &BuildContext,
    file: &FileDetails,
) -> Result<Vec<SmellRecord>, ReportError> {
    let path = context.reports.smell_report(&context.workspace);
    let json = read_report(&path, &context.report_read, |c| c.trim_end().ends_with(']'))?;
    Ok(parse_smells(&json, &path)?
        .into_iter()
        .filter(|s| belongs_to(s, file))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::SmellSeverity;

    #[test]
    fn test_parse_and_filter() {
        let json = r#"[
            {"file": "src/main/java/org/example/Foo.java", "line": 7, "rule": "java:S1118", "message": "Add a private constructor", "severity": "major"},
            {"file": "src/main/java/org/example/Bar.java", "line": 3, "rule": "java:S106", "message": "Replace System.out"}
        ]"#;
        let smells = parse_smells(json, Path::new("smells.json")).unwrap();
        assert_eq!(smells.len(), 2);
        assert_eq!(smells[0].severity, SmellSeverity::Major);
        assert_eq!(smells[1].severity, SmellSeverity::Minor);

        let foo = FileDetails::source(
            "org.example",
            "Foo",
            "src/main/java/org/example/Foo.java",
            0.3,
        );
        assert!(belongs_to(&smells[0], &foo));
        assert!(!belongs_to(&smells[1], &foo));
    }

    #[test]
    fn test_malformed_json() {
        let err = parse_smells("{not json", Path::new("smells.json")).unwrap_err();
        assert!(matches!(err, ReportError::Malformed { .. }));
    }
}
