//! Per-build and per-attempt context handed to generators and lifecycle checks.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::{ReportLayout, ReportReadConfig};
use super::coverage::CoverageEntity;
use super::file_details::FileDetails;
use super::mutation::MutationRecord;
use crate::domain::ports::GenerationListener;

/// Build parameters supplied by the host for one build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildContext {
    /// Workspace root the report layout is resolved against
    pub workspace: PathBuf,
    pub branch: String,
    pub project_name: String,
    #[serde(default)]
    pub reports: ReportLayout,
    #[serde(default)]
    pub report_read: ReportReadConfig,
    /// Head commit hash of the build
    pub head_commit: Option<String>,
    /// Total tests executed by the build
    #[serde(default)]
    pub test_count: u32,
    /// Whether the build finished successfully
    #[serde(default = "default_true")]
    pub build_succeeded: bool,
}

fn default_true() -> bool {
    true
}

impl BuildContext {
    pub fn new(
        workspace: impl Into<PathBuf>,
        branch: impl Into<String>,
        project_name: impl Into<String>,
    ) -> Self {
        Self {
            workspace: workspace.into(),
            branch: branch.into(),
            project_name: project_name.into(),
            reports: ReportLayout::default(),
            report_read: ReportReadConfig::default(),
            head_commit: None,
            test_count: 0,
            build_succeeded: true,
        }
    }

    pub fn with_reports(mut self, reports: ReportLayout) -> Self {
        self.reports = reports;
        self
    }

    pub fn with_report_read(mut self, report_read: ReportReadConfig) -> Self {
        self.report_read = report_read;
        self
    }

    pub fn with_tests(mut self, test_count: u32, head_commit: impl Into<String>) -> Self {
        self.test_count = test_count;
        self.head_commit = Some(head_commit.into());
        self
    }

    pub fn with_build_result(mut self, succeeded: bool) -> Self {
        self.build_succeeded = succeeded;
        self
    }
}

/// Everything one generation attempt needs.
///
/// Built fresh for each candidate attempt. Only `entity` or `mutant` may be
/// filled in after construction, by the generator that needs it.
pub struct ChallengeGenerationData<'a> {
    pub context: &'a BuildContext,
    pub user: &'a str,
    pub file: FileDetails,
    /// Pre-picked line, method or class entity
    pub entity: Option<CoverageEntity>,
    /// Pre-picked mutant
    pub mutant: Option<MutationRecord>,
    pub listener: &'a dyn GenerationListener,
}

impl<'a> ChallengeGenerationData<'a> {
    pub fn new(
        context: &'a BuildContext,
        user: &'a str,
        file: FileDetails,
        listener: &'a dyn GenerationListener,
    ) -> Self {
        Self {
            context,
            user,
            file,
            entity: None,
            mutant: None,
            listener,
        }
    }

    pub fn with_entity(mut self, entity: CoverageEntity) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn with_mutant(mut self, mutant: MutationRecord) -> Self {
        self.mutant = Some(mutant);
        self
    }
}

impl fmt::Debug for ChallengeGenerationData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChallengeGenerationData")
            .field("branch", &self.context.branch)
            .field("project", &self.context.project_name)
            .field("user", &self.user)
            .field("file", &self.file.qualified_name())
            .field("entity", &self.entity)
            .field("mutant", &self.mutant)
            .finish_non_exhaustive()
    }
}
