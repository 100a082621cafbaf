//! Challenge domain model.
//!
//! A challenge is a single verifiable goal tied to a coverage, mutation or
//! smell fact of one file. It snapshots that fact at creation so a later
//! build can decide whether the goal was reached.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coverage::{ClassCoverage, LineCoverage, MethodCoverage};
use super::file_details::FileDetails;
use super::mutation::MutationRecord;
use super::smell::SmellRecord;

/// Every kind of challenge the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    ClassCoverage,
    LineCoverage,
    BranchCoverage,
    MethodCoverage,
    ExceptionCoverage,
    Mutation,
    Smell,
    Test,
    Build,
    Dummy,
}

impl ChallengeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClassCoverage => "class_coverage",
            Self::LineCoverage => "line_coverage",
            Self::BranchCoverage => "branch_coverage",
            Self::MethodCoverage => "method_coverage",
            Self::ExceptionCoverage => "exception_coverage",
            Self::Mutation => "mutation",
            Self::Smell => "smell",
            Self::Test => "test",
            Self::Build => "build",
            Self::Dummy => "dummy",
        }
    }

    /// Element name used by [`Challenge::serialize`].
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ClassCoverage => "ClassCoverageChallenge",
            Self::LineCoverage => "LineCoverageChallenge",
            Self::BranchCoverage => "BranchCoverageChallenge",
            Self::MethodCoverage => "MethodCoverageChallenge",
            Self::ExceptionCoverage => "ExceptionCoverageChallenge",
            Self::Mutation => "MutationChallenge",
            Self::Smell => "SmellChallenge",
            Self::Test => "TestChallenge",
            Self::Build => "BuildChallenge",
            Self::Dummy => "DummyChallenge",
        }
    }

    /// Kinds produced by the host directly rather than drawn from the registry.
    pub fn is_host_issued(&self) -> bool {
        matches!(self, Self::Build | Self::Dummy)
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict on a held challenge for one build.
///
/// Rejection and discarding are not states here: they are moves between
/// the repository's sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeState {
    /// Target condition still meaningful
    Solvable,
    /// Target condition can no longer be reached
    Unsolvable,
    /// Target condition satisfied
    Solved,
}

/// Fields shared by every challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeMeta {
    /// Identity within the repository; not part of the textual identity
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Set once, by the lifecycle check that solves the challenge
    pub solved_at: Option<DateTime<Utc>>,
    /// Branch the challenge was generated against
    pub branch: String,
    /// Coverage ratio of the target file at creation
    pub coverage_at_creation: f64,
    /// Coverage ratio of the target file when solved
    pub solved_coverage: Option<f64>,
    pub score: u32,
}

impl ChallengeMeta {
    pub fn new(branch: impl Into<String>, coverage_at_creation: f64, score: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            solved_at: None,
            branch: branch.into(),
            coverage_at_creation,
            solved_coverage: None,
            score,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.solved_at.is_some()
    }

    /// Record the solve. Returns `false` if the challenge was already stamped.
    pub fn stamp_solved(&mut self, at: DateTime<Utc>, coverage: f64) -> bool {
        if self.solved_at.is_some() {
            return false;
        }
        self.solved_at = Some(at);
        self.solved_coverage = Some(coverage);
        true
    }
}

/// Cover more lines of a whole class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassCoverageChallenge {
    pub meta: ChallengeMeta,
    pub file: FileDetails,
    pub snapshot: ClassCoverage,
}

/// Cover one line. Shared by the line, branch and exception kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChallenge {
    pub meta: ChallengeMeta,
    pub file: FileDetails,
    pub line: LineCoverage,
}

/// Cover the missed lines of one method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCoverageChallenge {
    pub meta: ChallengeMeta,
    pub file: FileDetails,
    pub method: MethodCoverage,
}

/// Kill one surviving mutant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationChallenge {
    pub meta: ChallengeMeta,
    pub file: FileDetails,
    pub mutant: MutationRecord,
}

/// Remove one static-analysis finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmellChallenge {
    pub meta: ChallengeMeta,
    pub file: FileDetails,
    pub smell: SmellRecord,
}

/// Add a new test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestChallenge {
    pub meta: ChallengeMeta,
    pub user: String,
    /// Total tests in the project at creation
    pub test_count: u32,
    /// Head commit at creation
    pub head_commit: Option<String>,
}

/// Fix a failing build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildChallenge {
    pub meta: ChallengeMeta,
    pub user: String,
}

/// Sentinel issued when no real challenge could be generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DummyChallenge {
    pub meta: ChallengeMeta,
    pub reason: String,
}

/// A challenge of any kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Challenge {
    ClassCoverage(ClassCoverageChallenge),
    LineCoverage(LineChallenge),
    BranchCoverage(LineChallenge),
    MethodCoverage(MethodCoverageChallenge),
    ExceptionCoverage(LineChallenge),
    Mutation(MutationChallenge),
    Smell(SmellChallenge),
    Test(TestChallenge),
    Build(BuildChallenge),
    Dummy(DummyChallenge),
}

impl Challenge {
    /// Sentinel for "no challenge available", carrying the diagnostic reason.
    pub fn dummy(branch: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut meta = ChallengeMeta::new(branch, 0.0, 0);
        meta.solved_at = Some(meta.created_at);
        Self::Dummy(DummyChallenge {
            meta,
            reason: reason.into(),
        })
    }

    pub fn kind(&self) -> ChallengeKind {
        match self {
            Self::ClassCoverage(_) => ChallengeKind::ClassCoverage,
            Self::LineCoverage(_) => ChallengeKind::LineCoverage,
            Self::BranchCoverage(_) => ChallengeKind::BranchCoverage,
            Self::MethodCoverage(_) => ChallengeKind::MethodCoverage,
            Self::ExceptionCoverage(_) => ChallengeKind::ExceptionCoverage,
            Self::Mutation(_) => ChallengeKind::Mutation,
            Self::Smell(_) => ChallengeKind::Smell,
            Self::Test(_) => ChallengeKind::Test,
            Self::Build(_) => ChallengeKind::Build,
            Self::Dummy(_) => ChallengeKind::Dummy,
        }
    }

    pub fn meta(&self) -> &ChallengeMeta {
        match self {
            Self::ClassCoverage(c) => &c.meta,
            Self::LineCoverage(c) | Self::BranchCoverage(c) | Self::ExceptionCoverage(c) => &c.meta,
            Self::MethodCoverage(c) => &c.meta,
            Self::Mutation(c) => &c.meta,
            Self::Smell(c) => &c.meta,
            Self::Test(c) => &c.meta,
            Self::Build(c) => &c.meta,
            Self::Dummy(c) => &c.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut ChallengeMeta {
        match self {
            Self::ClassCoverage(c) => &mut c.meta,
            Self::LineCoverage(c) | Self::BranchCoverage(c) | Self::ExceptionCoverage(c) => {
                &mut c.meta
            }
            Self::MethodCoverage(c) => &mut c.meta,
            Self::Mutation(c) => &mut c.meta,
            Self::Smell(c) => &mut c.meta,
            Self::Test(c) => &mut c.meta,
            Self::Build(c) => &mut c.meta,
            Self::Dummy(c) => &mut c.meta,
        }
    }

    /// Target file, for the kinds that have one.
    pub fn file(&self) -> Option<&FileDetails> {
        match self {
            Self::ClassCoverage(c) => Some(&c.file),
            Self::LineCoverage(c) | Self::BranchCoverage(c) | Self::ExceptionCoverage(c) => {
                Some(&c.file)
            }
            Self::MethodCoverage(c) => Some(&c.file),
            Self::Mutation(c) => Some(&c.file),
            Self::Smell(c) => Some(&c.file),
            Self::Test(_) | Self::Build(_) | Self::Dummy(_) => None,
        }
    }

    pub fn score(&self) -> u32 {
        self.meta().score
    }

    pub fn id(&self) -> Uuid {
        self.meta().id
    }

    pub fn branch(&self) -> &str {
        &self.meta().branch
    }

    pub fn is_dummy(&self) -> bool {
        matches!(self, Self::Dummy(_))
    }

    /// Textual identity used for deduplication.
    pub fn same_text(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }

    /// Render as a single XML element for audit logs.
    ///
    /// `reason` is emitted as an attribute when present (e.g. why the
    /// challenge was rejected); `indent` prefixes the line.
    pub fn serialize(&self, reason: Option<&str>, indent: &str) -> String {
        let meta = self.meta();
        let mut attrs = vec![
            ("created", meta.created_at.timestamp_millis().to_string()),
            (
                "solved",
                meta.solved_at.map_or(0, |t| t.timestamp_millis()).to_string(),
            ),
        ];

        match self {
            Self::ClassCoverage(c) => {
                attrs.push(("class", c.file.file_name.clone()));
                attrs.push(("coverage", format!("{:.4}", meta.coverage_at_creation)));
                attrs.push(("coverageAtSolved", solved_coverage(meta)));
            }
            Self::LineCoverage(c) | Self::BranchCoverage(c) | Self::ExceptionCoverage(c) => {
                attrs.push(("class", c.file.file_name.clone()));
                attrs.push(("line", c.line.line_number.to_string()));
                attrs.push(("coverageType", c.line.status.as_marker().to_string()));
                if let Some(branches) = c.line.branches {
                    attrs.push(("coveredBranches", branches.covered.to_string()));
                    attrs.push(("maxBranches", branches.total.to_string()));
                }
                attrs.push(("coverageAtSolved", solved_coverage(meta)));
            }
            Self::MethodCoverage(c) => {
                attrs.push(("class", c.file.file_name.clone()));
                attrs.push(("method", c.method.name.clone()));
                attrs.push(("lines", c.method.total_lines.to_string()));
                attrs.push(("missedLines", c.method.missed_lines.to_string()));
                attrs.push(("coverageAtSolved", solved_coverage(meta)));
            }
            Self::Mutation(c) => {
                attrs.push(("class", c.file.file_name.clone()));
                attrs.push(("method", c.mutant.mutated_method.clone()));
                attrs.push(("line", c.mutant.line_number.to_string()));
                attrs.push(("mutator", c.mutant.mutator_name().to_string()));
                attrs.push(("status", c.mutant.status.as_str().to_string()));
            }
            Self::Smell(c) => {
                attrs.push(("class", c.file.file_name.clone()));
                attrs.push(("line", c.smell.line.to_string()));
                attrs.push(("rule", c.smell.rule.clone()));
            }
            Self::Test(c) => {
                attrs.push(("tests", c.test_count.to_string()));
                if let Some(commit) = &c.head_commit {
                    attrs.push(("commit", commit.clone()));
                }
            }
            Self::Build(_) => {}
            Self::Dummy(c) => attrs.push(("message", c.reason.clone())),
        }

        if let Some(reason) = reason.filter(|r| !r.is_empty()) {
            attrs.push(("reason", reason.to_string()));
        }

        let rendered = attrs
            .iter()
            .map(|(name, value)| format!("{name}=\"{}\"", escape_attr(value)))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{indent}<{} {rendered}/>", self.kind().tag())
    }
}

fn solved_coverage(meta: &ChallengeMeta) -> String {
    format!("{:.4}", meta.solved_coverage.unwrap_or(0.0))
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClassCoverage(c) => write!(
                f,
                "Write a test to cover more lines in class {} in package {} (created for branch {})",
                c.file.file_name, c.file.package_name, c.meta.branch
            ),
            Self::LineCoverage(c) => write!(
                f,
                "Write a test to fully cover line {} in class {} in package {} (created for branch {})",
                c.line.line_number, c.file.file_name, c.file.package_name, c.meta.branch
            ),
            Self::BranchCoverage(c) => {
                let branches = c.line.effective_branches();
                write!(
                    f,
                    "Write a test to cover more branches (currently {} of {} covered) of line {} in class {} in package {} (created for branch {})",
                    branches.covered,
                    branches.total,
                    c.line.line_number,
                    c.file.file_name,
                    c.file.package_name,
                    c.meta.branch
                )
            }
            Self::ExceptionCoverage(c) => write!(
                f,
                "Write a test to cover the exception handling at line {} in class {} in package {} (created for branch {})",
                c.line.line_number, c.file.file_name, c.file.package_name, c.meta.branch
            ),
            Self::MethodCoverage(c) => write!(
                f,
                "Write a test to cover more lines of method {} in class {} in package {} (created for branch {})",
                c.method.name, c.file.file_name, c.file.package_name, c.meta.branch
            ),
            Self::Mutation(c) => write!(
                f,
                "Write a test to kill the mutant \"{}\" at line {} of method {} in class {} in package {} (created for branch {})",
                c.mutant.description,
                c.mutant.line_number,
                c.mutant.mutated_method,
                c.file.file_name,
                c.file.package_name,
                c.meta.branch
            ),
            Self::Smell(c) => write!(
                f,
                "Remove the code smell \"{}\" ({}) at line {} in class {} in package {} (created for branch {})",
                c.smell.message,
                c.smell.rule,
                c.smell.line,
                c.file.file_name,
                c.file.package_name,
                c.meta.branch
            ),
            Self::Test(c) => write!(f, "Write a new test in branch {}", c.meta.branch),
            Self::Build(_) => f.write_str("Let the build run successfully"),
            Self::Dummy(c) => write!(f, "No challenge available: {}", c.reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::coverage::CoverageStatus;

    fn line_challenge() -> Challenge {
        Challenge::LineCoverage(LineChallenge {
            meta: ChallengeMeta::new("main", 0.4, 2),
            file: FileDetails::source("org.example", "Foo", "src/Foo.java", 0.4),
            line: LineCoverage {
                line_number: 42,
                text: "if (a < b) {".to_string(),
                status: CoverageStatus::NotCovered,
                branches: None,
            },
        })
    }

    #[test]
    fn test_dummy_is_solved_with_zero_score() {
        let dummy = Challenge::dummy("main", "nothing changed by user");
        assert!(dummy.meta().is_solved());
        assert_eq!(dummy.score(), 0);
        assert_eq!(dummy.kind(), ChallengeKind::Dummy);
        assert!(dummy.to_string().contains("nothing changed by user"));
    }

    #[test]
    fn test_test_challenge_text_names_branch() {
        let challenge = Challenge::Test(TestChallenge {
            meta: ChallengeMeta::new("feature/login", 0.0, 1),
            user: "alice".to_string(),
            test_count: 4,
            head_commit: None,
        });
        assert_eq!(challenge.to_string(), "Write a new test in branch feature/login");
    }

    #[test]
    fn test_stamp_solved_only_once() {
        let mut meta = ChallengeMeta::new("main", 0.4, 2);
        let first = Utc::now();
        assert!(meta.stamp_solved(first, 0.6));
        assert!(!meta.stamp_solved(Utc::now(), 0.9));
        assert_eq!(meta.solved_at, Some(first));
        assert_eq!(meta.solved_coverage, Some(0.6));
    }

    #[test]
    fn test_serialize_escapes_and_reason() {
        let challenge = line_challenge();
        let xml = challenge.serialize(Some("too \"hard\""), "    ");
        assert!(xml.starts_with("    <LineCoverageChallenge created=\""));
        assert!(xml.contains("solved=\"0\""));
        assert!(xml.contains("line=\"42\""));
        assert!(xml.contains("coverageType=\"nc\""));
        assert!(xml.contains("reason=\"too &quot;hard&quot;\""));
        assert!(xml.ends_with("/>"));

        let no_reason = challenge.serialize(None, "");
        assert!(!no_reason.contains("reason="));
    }

    #[test]
    fn test_same_text_ignores_timestamps() {
        let a = line_challenge();
        let mut b = line_challenge();
        b.meta_mut().created_at = Utc::now() + chrono::Duration::seconds(5);
        assert!(a.same_text(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_challenge_serde_tagging() {
        let json = serde_json::to_value(line_challenge()).unwrap();
        assert_eq!(json["kind"], "line_coverage");
        let back: Challenge = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind(), ChallengeKind::LineCoverage);
    }
}
