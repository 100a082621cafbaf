//! Common test utilities for integration tests
//!
//! Provides a throwaway workspace with writers for the reports a build
//! leaves behind (JaCoCo HTML and CSV, PIT mutations, findings JSON).

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use gamekins::domain::models::{BuildContext, FileDetails, ReportLayout, ReportReadConfig};
use tempfile::TempDir;

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Retry policy that gives up within a few milliseconds.
pub fn fast_read_policy() -> ReportReadConfig {
    ReportReadConfig {
        initial_backoff_ms: 1,
        max_backoff_ms: 2,
        max_elapsed_ms: 10,
    }
}

/// One instrumented line of a source report.
pub struct ReportLine<'a> {
    pub number: u32,
    pub marker: &'a str,
    pub title: Option<&'a str>,
    pub text: &'a str,
}

impl<'a> ReportLine<'a> {
    pub fn new(number: u32, marker: &'a str, text: &'a str) -> Self {
        Self {
            number,
            marker,
            title: None,
            text,
        }
    }

    pub fn with_title(mut self, title: &'a str) -> Self {
        self.title = Some(title);
        self
    }
}

/// Workspace of a build, with report writers laid out like the defaults.
pub struct Workspace {
    dir: TempDir,
    layout: ReportLayout,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: temp_dir(),
            layout: ReportLayout::default(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Build context for `branch` that reads this workspace's reports.
    pub fn context(&self, branch: &str) -> BuildContext {
        BuildContext::new(self.path(), branch, "demo").with_report_read(fast_read_policy())
    }

    fn write(&self, path: PathBuf, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create report dir");
        }
        fs::write(path, content).expect("Failed to write report");
    }

    /// Write the line-level source report of `file`.
    pub fn write_source_report(&self, file: &FileDetails, lines: &[ReportLine<'_>]) {
        let mut html = String::from("<html><body><pre class=\"source lang-java linenums\">\n");
        for line in lines {
            let title = line
                .title
                .map(|t| format!(" title=\"{t}\""))
                .unwrap_or_default();
            html.push_str(&format!(
                "<span class=\"{}\" id=\"L{}\"{title}>{}</span>\n",
                line.marker, line.number, line.text
            ));
        }
        html.push_str("</pre></body></html>\n");
        self.write(self.layout.source_report(self.path(), file), &html);
    }

    /// Write the class report of `file` with `(method, first line)` rows.
    pub fn write_class_report(&self, file: &FileDetails, methods: &[(&str, u32)]) {
        let source = file
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut html = String::from("<html><body><table class=\"coverage\"><tbody>\n");
        for (name, line) in methods {
            html.push_str(&format!(
                "<tr><td><a href=\"{source}.html#L{line}\" class=\"el_method\">{name}</a></td></tr>\n"
            ));
        }
        html.push_str("</tbody></table></body></html>\n");
        self.write(self.layout.class_report(self.path(), file), &html);
    }

    /// Write the CSV aggregate with `(package, class, missed, covered)` rows.
    pub fn write_csv(&self, rows: &[(&str, &str, u32, u32)]) {
        let mut csv = String::from("GROUP,PACKAGE,CLASS,LINE_MISSED,LINE_COVERED\n");
        for (package, class, missed, covered) in rows {
            csv.push_str(&format!("demo,{package},{class},{missed},{covered}\n"));
        }
        self.write(self.layout.csv_report(self.path()), &csv);
    }

    /// Write a mutation report with `(class, method, line, status)` mutants.
    pub fn write_mutations(&self, mutants: &[(&str, &str, u32, &str)]) {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<mutations>\n");
        for (index, (class, method, line, status)) in mutants.iter().enumerate() {
            xml.push_str(&format!(
                "<mutation detected='false' status='{status}' numberOfTestsRun='1'>\
                 <sourceFile>Foo.java</sourceFile><mutatedClass>{class}</mutatedClass>\
                 <mutatedMethod>{method}</mutatedMethod><methodDescription>()V</methodDescription>\
                 <lineNumber>{line}</lineNumber>\
                 <mutator>org.pitest.mutationtest.engine.gregor.mutators.MathMutator</mutator>\
                 <indexes><index>{index}</index></indexes><killingTest/>\
                 <description>Replaced integer addition with subtraction</description></mutation>\n"
            ));
        }
        xml.push_str("</mutations>\n");
        self.write(self.layout.mutation_report(self.path()), &xml);
    }

    /// Write a findings report with `(file, line, rule, severity)` entries.
    pub fn write_smells(&self, smells: &[(&str, u32, &str, &str)]) {
        let entries: Vec<serde_json::Value> = smells
            .iter()
            .map(|(file, line, rule, severity)| {
                serde_json::json!({
                    "file": file,
                    "line": line,
                    "rule": rule,
                    "message": format!("Fix {rule}"),
                    "severity": severity,
                })
            })
            .collect();
        let json = serde_json::to_string_pretty(&entries).expect("Failed to encode findings");
        self.write(self.layout.smell_report(self.path()), &json);
    }
}

/// Source file `org.example.<name>` changed by `user`.
pub fn source_file(name: &str, coverage: f64, user: &str) -> FileDetails {
    FileDetails::source(
        "org.example",
        name,
        format!("src/main/java/org/example/{name}.java"),
        coverage,
    )
    .changed_by(user)
}
