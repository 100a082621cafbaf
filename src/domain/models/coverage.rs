//! Typed coverage entities produced by the report parser.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static EXCEPTION_LINE: OnceLock<Regex> = OnceLock::new();

/// Coverage marker of a single report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    /// `nc`
    NotCovered,
    /// `pc`
    PartiallyCovered,
    /// `fc`
    FullyCovered,
}

impl CoverageStatus {
    /// Report marker as written in the coverage-class attribute.
    pub fn as_marker(&self) -> &'static str {
        match self {
            Self::NotCovered => "nc",
            Self::PartiallyCovered => "pc",
            Self::FullyCovered => "fc",
        }
    }

    /// Parse the first token of a coverage-class attribute (`"pc bpc"` -> `pc`).
    pub fn from_marker(class_attr: &str) -> Option<Self> {
        match class_attr.split_whitespace().next()? {
            "nc" => Some(Self::NotCovered),
            "pc" => Some(Self::PartiallyCovered),
            "fc" => Some(Self::FullyCovered),
            _ => None,
        }
    }

    pub fn is_fully_covered(&self) -> bool {
        matches!(self, Self::FullyCovered)
    }
}

impl fmt::Display for CoverageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_marker())
    }
}

/// Covered and total branch count of a branching line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCounts {
    pub covered: u32,
    pub total: u32,
}

impl BranchCounts {
    pub const fn new(covered: u32, total: u32) -> Self {
        Self { covered, total }
    }

    pub fn missed(&self) -> u32 {
        self.total.saturating_sub(self.covered)
    }
}

/// One instrumented source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCoverage {
    /// 1-based line number
    pub line_number: u32,
    /// Source text of the line, unescaped
    pub text: String,
    pub status: CoverageStatus,
    /// Branch counts parsed from the report title, if the line branches
    pub branches: Option<BranchCounts>,
}

impl LineCoverage {
    /// Branch counts, falling back to `(0,1)`/`(1,1)` for non-branching lines.
    pub fn effective_branches(&self) -> BranchCounts {
        self.branches.unwrap_or(match self.status {
            CoverageStatus::FullyCovered => BranchCounts::new(1, 1),
            _ => BranchCounts::new(0, 1),
        })
    }

    /// Whether the line throws or catches an exception.
    pub fn is_exception_related(&self) -> bool {
        EXCEPTION_LINE
            .get_or_init(|| Regex::new(r"\bthrow\s|\bcatch\s*\(").unwrap())
            .is_match(&self.text)
    }
}

/// Line-span summary of one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCoverage {
    /// Method signature as shown in the report, e.g. `parse(String)`
    pub name: String,
    pub start_line: u32,
    /// Last line of the span (inclusive), `None` for an empty span
    pub end_line: Option<u32>,
    pub total_lines: u32,
    pub missed_lines: u32,
}

impl MethodCoverage {
    pub fn status(&self) -> CoverageStatus {
        if self.missed_lines == 0 {
            CoverageStatus::FullyCovered
        } else if self.missed_lines < self.total_lines {
            CoverageStatus::PartiallyCovered
        } else {
            CoverageStatus::NotCovered
        }
    }
}

/// Class-level coverage snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCoverage {
    pub class_name: String,
    /// Ratio computed by the host from the CSV aggregate
    pub coverage: f64,
    pub fully_covered_lines: u32,
    pub partially_covered_lines: u32,
    pub not_covered_lines: u32,
}

impl ClassCoverage {
    pub fn has_uncovered_lines(&self) -> bool {
        self.partially_covered_lines + self.not_covered_lines > 0
    }

    pub fn status(&self) -> CoverageStatus {
        if !self.has_uncovered_lines() {
            CoverageStatus::FullyCovered
        } else if self.fully_covered_lines + self.partially_covered_lines > 0 {
            CoverageStatus::PartiallyCovered
        } else {
            CoverageStatus::NotCovered
        }
    }
}

/// Union of everything the coverage parser produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "entity")]
pub enum CoverageEntity {
    Line(LineCoverage),
    Branch(LineCoverage),
    Method(MethodCoverage),
    Class(ClassCoverage),
}

impl CoverageEntity {
    /// Stable identity: line number, method signature or class name.
    pub fn identity(&self) -> String {
        match self {
            Self::Line(line) | Self::Branch(line) => line.line_number.to_string(),
            Self::Method(method) => method.name.clone(),
            Self::Class(class) => class.class_name.clone(),
        }
    }

    pub fn status(&self) -> CoverageStatus {
        match self {
            Self::Line(line) | Self::Branch(line) => line.status,
            Self::Method(method) => method.status(),
            Self::Class(class) => class.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, status: CoverageStatus) -> LineCoverage {
        LineCoverage {
            line_number: 1,
            text: text.to_string(),
            status,
            branches: None,
        }
    }

    #[test]
    fn test_marker_round_trip_with_branch_suffix() {
        assert_eq!(
            CoverageStatus::from_marker("pc bpc"),
            Some(CoverageStatus::PartiallyCovered)
        );
        assert_eq!(CoverageStatus::from_marker("fc"), Some(CoverageStatus::FullyCovered));
        assert_eq!(CoverageStatus::from_marker("xx"), None);
        assert_eq!(CoverageStatus::from_marker(""), None);
    }

    #[test]
    fn test_effective_branches_for_plain_lines() {
        assert_eq!(
            line("x++;", CoverageStatus::NotCovered).effective_branches(),
            BranchCounts::new(0, 1)
        );
        assert_eq!(
            line("x++;", CoverageStatus::FullyCovered).effective_branches(),
            BranchCounts::new(1, 1)
        );
    }

    #[test]
    fn test_exception_related_lines() {
        assert!(line("throw new IllegalStateException();", CoverageStatus::NotCovered)
            .is_exception_related());
        assert!(
            line("} catch (IOException e) {", CoverageStatus::NotCovered).is_exception_related()
        );
        assert!(!line("int throwaway = 1;", CoverageStatus::NotCovered).is_exception_related());
    }

    #[test]
    fn test_method_status() {
        let mut method = MethodCoverage {
            name: "run()".to_string(),
            start_line: 3,
            end_line: Some(8),
            total_lines: 4,
            missed_lines: 4,
        };
        assert_eq!(method.status(), CoverageStatus::NotCovered);
        method.missed_lines = 1;
        assert_eq!(method.status(), CoverageStatus::PartiallyCovered);
        method.missed_lines = 0;
        assert_eq!(method.status(), CoverageStatus::FullyCovered);
    }
}
