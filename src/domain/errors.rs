//! Domain errors for the challenge engine.

use std::path::PathBuf;

use thiserror::Error;

use super::models::challenge::ChallengeKind;

/// Errors raised while reading a build report.
///
/// Every variant is recoverable: callers treat a failed read as "no data"
/// and never as "fully solved".
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Report not found: {0}")]
    Missing(PathBuf),

    #[error("Report is truncated (still being written?): {0}")]
    Truncated(PathBuf),

    #[error("Malformed report {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    /// Whether the failure may disappear if the read is retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Missing(_) | Self::Truncated(_) | Self::Io { .. })
    }
}

/// Errors that end a single generation attempt.
///
/// The retry controller catches these at the attempt boundary; they are
/// logged and cost one unit of the attempt cap.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Report data error: {0}")]
    Data(#[source] ReportError),

    #[error("Transient I/O error: {0}")]
    TransientIo(String),

    #[error("{kind} challenges cannot be generated for {file}")]
    UnsupportedArtifact { kind: ChallengeKind, file: String },
}

impl From<ReportError> for GenerationError {
    /// Reads that failed mid-write stay transient; the rest is data.
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Truncated(_) | ReportError::Io { .. } => {
                Self::TransientIo(err.to_string())
            }
            other => Self::Data(other),
        }
    }
}

pub type GenerationResult<T> = Result<T, GenerationError>;

/// Errors raised by the challenge repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Challenge not held by {user} in {project}: {challenge}")]
    ChallengeNotFound {
        user: String,
        project: String,
        challenge: String,
    },

    #[error("Stored challenge limit of {0} reached")]
    StorageFull(usize),

    #[error("Repository lock poisoned")]
    Poisoned,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ReportError::Missing(PathBuf::from("a.html")).is_transient());
        assert!(ReportError::Truncated(PathBuf::from("a.html")).is_transient());
        assert!(!ReportError::Malformed {
            path: PathBuf::from("a.html"),
            reason: "bad".to_string(),
        }
        .is_transient());
    }

    #[test]
    fn test_generation_error_from_report_error() {
        let err: GenerationError = ReportError::Missing(PathBuf::from("x.csv")).into();
        assert!(matches!(err, GenerationError::Data(_)));
        assert!(err.to_string().contains("x.csv"));
    }

    #[test]
    fn test_truncated_report_is_transient_generation_error() {
        let err: GenerationError = ReportError::Truncated(PathBuf::from("mutations.xml")).into();
        let GenerationError::TransientIo(message) = err else {
            panic!("expected a transient error");
        };
        assert!(message.contains("mutations.xml"));

        let err: GenerationError = ReportError::Malformed {
            path: PathBuf::from("Foo.java.html"),
            reason: "no line markers found".to_string(),
        }
        .into();
        assert!(matches!(err, GenerationError::Data(_)));
    }
}
