//! Build report parsing
//!
//! Turns JaCoCo, PIT and static-analysis reports into typed entities.
//! Readers tolerate reports being rewritten while they read; a report that
//! stays unreadable surfaces as a [`ReportError`](crate::domain::errors::ReportError)
//! which callers treat as "no data".

pub mod jacoco;
pub mod mutation;
pub mod reader;
pub mod smell;

pub use jacoco::{read_class_coverage, JacocoReport};
pub use mutation::load_mutations;
pub use reader::read_report;
pub use smell::load_smells;

/// Decode the HTML entities JaCoCo and PIT emit.
pub(crate) fn unescape_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
