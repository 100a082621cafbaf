//! Tolerant report reads.
//!
//! The build may rewrite a report while we read it. A file that exists at
//! the first check but disappears, or that is cut off, is retried with a
//! short exponential backoff before giving up.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use backoff::{Error as BackoffError, ExponentialBackoffBuilder};
use tracing::{debug, warn};

use crate::domain::errors::ReportError;
use crate::domain::models::ReportReadConfig;

/// Read a report, retrying transient failures.
///
/// `is_complete` decides whether the content is a whole document; a
/// partial one counts as transient. A file that is absent at the first
/// check fails immediately with [`ReportError::Missing`].
pub fn read_report<F>(
    path: &Path,
    policy: &ReportReadConfig,
    is_complete: F,
) -> Result<String, ReportError>
where
    F: Fn(&str) -> bool,
{
    if !path.exists() {
        return Err(ReportError::Missing(path.to_path_buf()));
    }

    let backoff = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(policy.initial_backoff_ms))
        .with_max_interval(Duration::from_millis(policy.max_backoff_ms))
        .with_max_elapsed_time(Some(Duration::from_millis(policy.max_elapsed_ms)))
        .build();

    let mut attempt = 0u32;
    let result = backoff::retry(backoff, || {
        attempt += 1;
        let err = match fs::read_to_string(path) {
            Ok(content) if is_complete(&content) => return Ok(content),
            Ok(_) => ReportError::Truncated(path.to_path_buf()),
            Err(e) if e.kind() == ErrorKind::NotFound => ReportError::Missing(path.to_path_buf()),
            Err(e) if e.kind() == ErrorKind::InvalidData => ReportError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
            Err(e) => ReportError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        };
        debug!(path = %path.display(), attempt, error = %err, "report read failed");
        if err.is_transient() {
            Err(BackoffError::transient(err))
        } else {
            Err(BackoffError::permanent(err))
        }
    });

    result.map_err(|e| {
        let err = match e {
            BackoffError::Permanent(err) | BackoffError::Transient { err, .. } => err,
        };
        warn!(path = %path.display(), attempts = attempt, error = %err, "giving up on report");
        err
    })
}
