//! Mutation testing records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of one mutant in the mutation report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MutationStatus {
    Killed,
    Survived,
    NoCoverage,
    TimedOut,
    MemoryError,
    RunError,
}

impl MutationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Killed => "KILLED",
            Self::Survived => "SURVIVED",
            Self::NoCoverage => "NO_COVERAGE",
            Self::TimedOut => "TIMED_OUT",
            Self::MemoryError => "MEMORY_ERROR",
            Self::RunError => "RUN_ERROR",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "KILLED" => Some(Self::Killed),
            "SURVIVED" => Some(Self::Survived),
            "NO_COVERAGE" => Some(Self::NoCoverage),
            "TIMED_OUT" => Some(Self::TimedOut),
            "MEMORY_ERROR" => Some(Self::MemoryError),
            "RUN_ERROR" => Some(Self::RunError),
            _ => None,
        }
    }

    /// Detected by the test suite. Timeouts and crashes count as detected.
    pub fn is_killed(&self) -> bool {
        !matches!(self, Self::Survived | Self::NoCoverage)
    }
}

impl fmt::Display for MutationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mutant as described by the mutation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationRecord {
    /// Fully qualified mutated class
    pub mutated_class: String,
    pub mutated_method: String,
    /// JVM method descriptor, e.g. `(I)Z`
    pub method_description: String,
    pub line_number: u32,
    /// Fully qualified mutator class
    pub mutator: String,
    pub index: u32,
    /// Human description of the mutation
    pub description: String,
    pub status: MutationStatus,
}

impl MutationRecord {
    /// Short mutator name without the package prefix.
    pub fn mutator_name(&self) -> &str {
        self.mutator.rsplit('.').next().unwrap_or(&self.mutator)
    }

    /// Whether `other` describes the same mutant, ignoring its status.
    pub fn same_mutant(&self, other: &Self) -> bool {
        self.mutated_class == other.mutated_class
            && self.mutated_method == other.mutated_method
            && self.method_description == other.method_description
            && self.line_number == other.line_number
            && self.mutator == other.mutator
            && self.index == other.index
    }
}
