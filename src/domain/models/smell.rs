//! Static-analysis findings.

use serde::{Deserialize, Serialize};

/// Severity as reported by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmellSeverity {
    Info,
    Minor,
    Major,
    Critical,
    Blocker,
}

impl Default for SmellSeverity {
    fn default() -> Self {
        Self::Minor
    }
}

/// One finding for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmellRecord {
    /// Workspace-relative path of the affected file
    pub file: String,
    pub line: u32,
    /// Analyzer rule identifier, e.g. `java:S1118`
    pub rule: String,
    pub message: String,
    #[serde(default)]
    pub severity: SmellSeverity,
}

impl SmellRecord {
    /// Same finding, tolerating a shifted line number.
    pub fn same_finding(&self, other: &Self) -> bool {
        self.rule == other.rule && self.message == other.message
    }
}
