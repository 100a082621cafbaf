pub mod challenge;
pub mod config;
pub mod coverage;
pub mod file_details;
pub mod generation;
pub mod mutation;
pub mod smell;

pub use challenge::{
    BuildChallenge, Challenge, ChallengeKind, ChallengeMeta, ChallengeState,
    ClassCoverageChallenge, DummyChallenge, LineChallenge, MethodCoverageChallenge,
    MutationChallenge, SmellChallenge, TestChallenge,
};
pub use config::{EngineConfig, LoggingConfig, ReportLayout, ReportReadConfig};
pub use coverage::{
    BranchCounts, ClassCoverage, CoverageEntity, CoverageStatus, LineCoverage, MethodCoverage,
};
pub use file_details::{FileDetails, FileKind};
pub use generation::{BuildContext, ChallengeGenerationData};
pub use mutation::{MutationRecord, MutationStatus};
pub use smell::{SmellRecord, SmellSeverity};
