use uuid::Uuid;

use crate::domain::errors::RepositoryResult;
use crate::domain::models::Challenge;

/// Result of [`ChallengeRepository::add_current_unique`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The user already holds a challenge with the same text
    Duplicate,
    /// The current set already holds `limit` challenges
    Full,
}

/// Repository port for per-user challenge state.
///
/// State is keyed by `(user, project)` and split into four sets: current,
/// completed, rejected (with reason) and stored. Every mutating method is a
/// single atomic operation on the owning sets; readers get snapshots.
pub trait ChallengeRepository: Send + Sync {
    /// Snapshot of the challenges the user currently holds
    fn current(&self, user: &str, project: &str) -> RepositoryResult<Vec<Challenge>>;

    /// Snapshot of solved challenges (never contains a Dummy)
    fn completed(&self, user: &str, project: &str) -> RepositoryResult<Vec<Challenge>>;

    /// Snapshot of rejected challenges with their reasons
    fn rejected(&self, user: &str, project: &str) -> RepositoryResult<Vec<(Challenge, String)>>;

    /// Snapshot of challenges parked for later
    fn stored(&self, user: &str, project: &str) -> RepositoryResult<Vec<Challenge>>;

    /// Append to the current set
    fn add_current(&self, user: &str, project: &str, challenge: Challenge) -> RepositoryResult<()>;

    /// Append to the current set unless it already holds `limit` challenges
    /// or one with the same text; the check and the append are one step.
    fn add_current_unique(
        &self,
        user: &str,
        project: &str,
        challenge: Challenge,
        limit: usize,
    ) -> RepositoryResult<AddOutcome>;

    /// Move a challenge from current to completed, replacing it with the
    /// given (stamped) version. Dummies are dropped instead of completed.
    fn complete(&self, user: &str, project: &str, challenge: Challenge) -> RepositoryResult<()>;

    /// Move a challenge from current to rejected
    fn reject(&self, user: &str, project: &str, id: Uuid, reason: &str) -> RepositoryResult<()>;

    /// Move a challenge from current to stored, if fewer than `limit` are stored
    fn store(&self, user: &str, project: &str, id: Uuid, limit: usize) -> RepositoryResult<()>;

    /// Move a challenge from stored back to current
    fn restore(&self, user: &str, project: &str, id: Uuid) -> RepositoryResult<()>;
}
