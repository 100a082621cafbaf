//! Tracked artifacts eligible for challenge generation.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Whether an artifact is production code or a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FileKind {
    /// Source file with line, branch, method, mutation and smell data.
    Source,
    /// Test file with the tests it executed in the last build.
    Test {
        test_count: u32,
        test_names: Vec<String>,
    },
}

impl Default for FileKind {
    fn default() -> Self {
        Self::Source
    }
}

/// Identity and coverage summary of one tracked file.
///
/// Refreshed by the host once per build and never mutated during a
/// generation round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDetails {
    /// Dotted package name, e.g. `org.example.util`
    pub package_name: String,
    /// File name without extension, e.g. `StringUtils`
    pub file_name: String,
    /// Path of the source file relative to the workspace
    pub file_path: PathBuf,
    /// Line coverage ratio in `[0, 1]`
    pub coverage: f64,
    /// Whether the file still exists in the workspace
    pub exists: bool,
    /// Users who changed this file in recent history
    #[serde(default)]
    pub changed_by_users: BTreeSet<String>,
    #[serde(default)]
    pub kind: FileKind,
}

impl FileDetails {
    pub fn source(
        package_name: impl Into<String>,
        file_name: impl Into<String>,
        file_path: impl Into<PathBuf>,
        coverage: f64,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            file_name: file_name.into(),
            file_path: file_path.into(),
            coverage,
            exists: true,
            changed_by_users: BTreeSet::new(),
            kind: FileKind::Source,
        }
    }

    pub fn test(
        package_name: impl Into<String>,
        file_name: impl Into<String>,
        file_path: impl Into<PathBuf>,
        test_names: Vec<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            file_name: file_name.into(),
            file_path: file_path.into(),
            coverage: 0.0,
            exists: true,
            changed_by_users: BTreeSet::new(),
            kind: FileKind::Test {
                test_count: u32::try_from(test_names.len()).unwrap_or(u32::MAX),
                test_names,
            },
        }
    }

    pub fn changed_by(mut self, user: impl Into<String>) -> Self {
        self.changed_by_users.insert(user.into());
        self
    }

    pub fn with_exists(mut self, exists: bool) -> Self {
        self.exists = exists;
        self
    }

    pub fn is_source(&self) -> bool {
        matches!(self.kind, FileKind::Source)
    }

    pub fn is_fully_covered(&self) -> bool {
        self.coverage >= 1.0
    }

    pub fn was_changed_by(&self, user: &str) -> bool {
        self.changed_by_users.contains(user)
    }

    /// Fully qualified name, `package.File`.
    pub fn qualified_name(&self) -> String {
        if self.package_name.is_empty() {
            self.file_name.clone()
        } else {
            format!("{}.{}", self.package_name, self.file_name)
        }
    }

    /// Resolve the file against a workspace root.
    pub fn absolute_path(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.file_path)
    }
}

impl fmt::Display for FileDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}
