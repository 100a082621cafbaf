use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::challenge::ChallengeKind;
use super::file_details::FileDetails;

/// Main configuration structure for the challenge engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Challenges a user holds at once (1-10)
    #[serde(default = "default_max_current_challenges")]
    pub max_current_challenges: usize,

    /// Challenges a user may park for later
    #[serde(default = "default_max_stored_challenges")]
    pub max_stored_challenges: usize,

    /// Attempt cap of the generation loop
    #[serde(default = "default_generation_attempts")]
    pub generation_attempts: u32,

    /// Attempts spent finding a challenge the user does not already hold
    #[serde(default = "default_uniqueness_attempts")]
    pub uniqueness_attempts: u32,

    /// Selection pressure of the rank selection, in (1, 2]
    #[serde(default = "default_rank_bias")]
    pub rank_bias: f64,

    /// Relative weight of every drawable challenge kind
    #[serde(default = "default_challenge_weights")]
    pub challenge_weights: BTreeMap<ChallengeKind, u32>,

    /// Minimum days between two build challenges for the same user
    #[serde(default = "default_build_challenge_cooldown_days")]
    pub build_challenge_cooldown_days: i64,

    /// Where the build writes its reports
    #[serde(default)]
    pub reports: ReportLayout,

    /// Retry policy for reading reports that may be mid-rewrite
    #[serde(default)]
    pub report_read: ReportReadConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

const fn default_max_current_challenges() -> usize {
    3
}

const fn default_max_stored_challenges() -> usize {
    2
}

const fn default_generation_attempts() -> u32 {
    5
}

const fn default_uniqueness_attempts() -> u32 {
    3
}

const fn default_rank_bias() -> f64 {
    1.5
}

const fn default_build_challenge_cooldown_days() -> i64 {
    7
}

fn default_challenge_weights() -> BTreeMap<ChallengeKind, u32> {
    BTreeMap::from([
        (ChallengeKind::ClassCoverage, 1),
        (ChallengeKind::MethodCoverage, 2),
        (ChallengeKind::LineCoverage, 2),
        (ChallengeKind::BranchCoverage, 2),
        (ChallengeKind::ExceptionCoverage, 1),
        (ChallengeKind::Mutation, 3),
        (ChallengeKind::Smell, 2),
        (ChallengeKind::Test, 1),
    ])
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_current_challenges: default_max_current_challenges(),
            max_stored_challenges: default_max_stored_challenges(),
            generation_attempts: default_generation_attempts(),
            uniqueness_attempts: default_uniqueness_attempts(),
            rank_bias: default_rank_bias(),
            challenge_weights: default_challenge_weights(),
            build_challenge_cooldown_days: default_build_challenge_cooldown_days(),
            reports: ReportLayout::default(),
            report_read: ReportReadConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Report locations relative to the workspace root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportLayout {
    /// Directory of the JaCoCo HTML report
    #[serde(default = "default_jacoco_dir")]
    pub jacoco_dir: PathBuf,

    /// JaCoCo CSV aggregate
    #[serde(default = "default_jacoco_csv")]
    pub jacoco_csv: PathBuf,

    /// PIT mutation report
    #[serde(default = "default_mutation_report")]
    pub mutation_report: PathBuf,

    /// Static-analysis findings (JSON)
    #[serde(default = "default_smell_report")]
    pub smell_report: PathBuf,
}

fn default_jacoco_dir() -> PathBuf {
    PathBuf::from("target/site/jacoco")
}

fn default_jacoco_csv() -> PathBuf {
    PathBuf::from("target/site/jacoco/jacoco.csv")
}

fn default_mutation_report() -> PathBuf {
    PathBuf::from("target/pit-reports/mutations.xml")
}

fn default_smell_report() -> PathBuf {
    PathBuf::from("target/gamekins/smells.json")
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            jacoco_dir: default_jacoco_dir(),
            jacoco_csv: default_jacoco_csv(),
            mutation_report: default_mutation_report(),
            smell_report: default_smell_report(),
        }
    }
}

impl ReportLayout {
    /// Line-level source report, `<jacoco_dir>/<package>/<File.ext>.html`.
    pub fn source_report(&self, workspace: &Path, file: &FileDetails) -> PathBuf {
        let source_name = file
            .file_path
            .file_name()
            .map_or_else(
                || format!("{}.java", file.file_name),
                |n| n.to_string_lossy().into_owned(),
            );
        self.package_dir(workspace, file)
            .join(format!("{source_name}.html"))
    }

    /// Class report with the method table, `<jacoco_dir>/<package>/<File>.html`.
    pub fn class_report(&self, workspace: &Path, file: &FileDetails) -> PathBuf {
        self.package_dir(workspace, file)
            .join(format!("{}.html", file.file_name))
    }

    pub fn csv_report(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.jacoco_csv)
    }

    pub fn mutation_report(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.mutation_report)
    }

    pub fn smell_report(&self, workspace: &Path) -> PathBuf {
        workspace.join(&self.smell_report)
    }

    fn package_dir(&self, workspace: &Path, file: &FileDetails) -> PathBuf {
        let package = if file.package_name.is_empty() {
            "default".to_string()
        } else {
            file.package_name.clone()
        };
        workspace.join(&self.jacoco_dir).join(package)
    }
}

/// Retry policy for report reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportReadConfig {
    /// First backoff interval in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound on a single backoff interval
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Total time spent retrying one read
    #[serde(default = "default_max_elapsed_ms")]
    pub max_elapsed_ms: u64,
}

const fn default_initial_backoff_ms() -> u64 {
    20
}

const fn default_max_backoff_ms() -> u64 {
    100
}

const fn default_max_elapsed_ms() -> u64 {
    250
}

impl Default for ReportReadConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            max_elapsed_ms: default_max_elapsed_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_exclude_host_kinds() {
        let config = EngineConfig::default();
        assert!(!config.challenge_weights.contains_key(&ChallengeKind::Build));
        assert!(!config.challenge_weights.contains_key(&ChallengeKind::Dummy));
        assert_eq!(config.challenge_weights.len(), 8);
    }

    #[test]
    fn test_report_paths_follow_jacoco_layout() {
        let layout = ReportLayout::default();
        let file = FileDetails::source(
            "org.example",
            "Foo",
            "src/main/java/org/example/Foo.java",
            0.5,
        );
        let ws = Path::new("/ws");
        assert_eq!(
            layout.source_report(ws, &file),
            PathBuf::from("/ws/target/site/jacoco/org.example/Foo.java.html")
        );
        assert_eq!(
            layout.class_report(ws, &file),
            PathBuf::from("/ws/target/site/jacoco/org.example/Foo.html")
        );
    }
}
