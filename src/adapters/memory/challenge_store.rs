//! In-memory [`ChallengeRepository`] keyed by `(user, project)`.
//!
//! Every mutating call takes the write lock once and moves the challenge
//! between sets inside that critical section, so concurrent builds never
//! observe a challenge in two sets or in none.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use crate::domain::errors::{RepositoryError, RepositoryResult};
use crate::domain::models::Challenge;
use crate::domain::ports::{AddOutcome, ChallengeRepository};

/// Challenge sets of one user in one project.
#[derive(Debug, Default, Clone)]
struct UserChallenges {
    current: Vec<Challenge>,
    completed: Vec<Challenge>,
    rejected: Vec<(Challenge, String)>,
    stored: Vec<Challenge>,
}

type Key = (String, String);

fn key(user: &str, project: &str) -> Key {
    (user.to_string(), project.to_string())
}

fn take_by_id(list: &mut Vec<Challenge>, id: Uuid) -> Option<Challenge> {
    let index = list.iter().position(|c| c.id() == id)?;
    Some(list.remove(index))
}

fn not_found(user: &str, project: &str, challenge: impl ToString) -> RepositoryError {
    RepositoryError::ChallengeNotFound {
        user: user.to_string(),
        project: project.to_string(),
        challenge: challenge.to_string(),
    }
}

#[derive(Debug, Default)]
pub struct InMemoryChallengeStore {
    users: RwLock<HashMap<Key, UserChallenges>>,
}

impl InMemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, HashMap<Key, UserChallenges>>> {
        self.users.read().map_err(|_| RepositoryError::Poisoned)
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, HashMap<Key, UserChallenges>>> {
        self.users.write().map_err(|_| RepositoryError::Poisoned)
    }

    fn snapshot<T, F>(&self, user: &str, project: &str, select: F) -> RepositoryResult<Vec<T>>
    where
        T: Clone,
        F: FnOnce(&UserChallenges) -> &Vec<T>,
    {
        let users = self.read()?;
        Ok(users
            .get(&key(user, project))
            .map(|sets| select(sets).clone())
            .unwrap_or_default())
    }
}

impl ChallengeRepository for InMemoryChallengeStore {
    fn current(&self, user: &str, project: &str) -> RepositoryResult<Vec<Challenge>> {
        self.snapshot(user, project, |s| &s.current)
    }

    fn completed(&self, user: &str, project: &str) -> RepositoryResult<Vec<Challenge>> {
        self.snapshot(user, project, |s| &s.completed)
    }

    fn rejected(&self, user: &str, project: &str) -> RepositoryResult<Vec<(Challenge, String)>> {
        self.snapshot(user, project, |s| &s.rejected)
    }

    fn stored(&self, user: &str, project: &str) -> RepositoryResult<Vec<Challenge>> {
        self.snapshot(user, project, |s| &s.stored)
    }

    fn add_current(&self, user: &str, project: &str, challenge: Challenge) -> RepositoryResult<()> {
        let mut users = self.write()?;
        users
            .entry(key(user, project))
            .or_default()
            .current
            .push(challenge);
        Ok(())
    }

    fn add_current_unique(
        &self,
        user: &str,
        project: &str,
        challenge: Challenge,
        limit: usize,
    ) -> RepositoryResult<AddOutcome> {
        let mut users = self.write()?;
        let current = &mut users.entry(key(user, project)).or_default().current;
        if current.len() >= limit {
            return Ok(AddOutcome::Full);
        }
        if current.iter().any(|c| c.same_text(&challenge)) {
            return Ok(AddOutcome::Duplicate);
        }
        current.push(challenge);
        Ok(AddOutcome::Added)
    }

    fn complete(&self, user: &str, project: &str, challenge: Challenge) -> RepositoryResult<()> {
        let mut users = self.write()?;
        let sets = users
            .get_mut(&key(user, project))
            .ok_or_else(|| not_found(user, project, &challenge))?;
        take_by_id(&mut sets.current, challenge.id())
            .ok_or_else(|| not_found(user, project, &challenge))?;
        if !challenge.is_dummy() {
            sets.completed.push(challenge);
        }
        Ok(())
    }

    fn reject(&self, user: &str, project: &str, id: Uuid, reason: &str) -> RepositoryResult<()> {
        let mut users = self.write()?;
        let sets = users
            .get_mut(&key(user, project))
            .ok_or_else(|| not_found(user, project, id))?;
        let challenge =
            take_by_id(&mut sets.current, id).ok_or_else(|| not_found(user, project, id))?;
        sets.rejected.push((challenge, reason.to_string()));
        Ok(())
    }

    fn store(&self, user: &str, project: &str, id: Uuid, limit: usize) -> RepositoryResult<()> {
        let mut users = self.write()?;
        let sets = users
            .get_mut(&key(user, project))
            .ok_or_else(|| not_found(user, project, id))?;
        if sets.stored.len() >= limit {
            return Err(RepositoryError::StorageFull(limit));
        }
        let challenge =
            take_by_id(&mut sets.current, id).ok_or_else(|| not_found(user, project, id))?;
        sets.stored.push(challenge);
        Ok(())
    }

    fn restore(&self, user: &str, project: &str, id: Uuid) -> RepositoryResult<()> {
        let mut users = self.write()?;
        let sets = users
            .get_mut(&key(user, project))
            .ok_or_else(|| not_found(user, project, id))?;
        let challenge =
            take_by_id(&mut sets.stored, id).ok_or_else(|| not_found(user, project, id))?;
        sets.current.push(challenge);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{BuildChallenge, ChallengeMeta};

    fn build_challenge() -> Challenge {
        Challenge::Build(BuildChallenge {
            meta: ChallengeMeta::new("main", 0.0, 1),
            user: "alice".to_string(),
        })
    }

    #[test]
    fn test_unknown_user_has_empty_sets() {
        let store = InMemoryChallengeStore::new();
        assert!(store.current("alice", "demo").unwrap().is_empty());
        assert!(store.rejected("alice", "demo").unwrap().is_empty());
    }

    #[test]
    fn test_complete_moves_challenge() {
        let store = InMemoryChallengeStore::new();
        let challenge = build_challenge();
        store.add_current("alice", "demo", challenge.clone()).unwrap();

        store.complete("alice", "demo", challenge.clone()).unwrap();
        assert!(store.current("alice", "demo").unwrap().is_empty());
        assert_eq!(store.completed("alice", "demo").unwrap(), vec![challenge.clone()]);

        let again = store.complete("alice", "demo", challenge);
        assert!(matches!(again, Err(RepositoryError::ChallengeNotFound { .. })));
    }

    #[test]
    fn test_completed_dummy_is_dropped() {
        let store = InMemoryChallengeStore::new();
        let dummy = Challenge::dummy("main", "generation failed");
        store.add_current("alice", "demo", dummy.clone()).unwrap();
        store.complete("alice", "demo", dummy).unwrap();
        assert!(store.current("alice", "demo").unwrap().is_empty());
        assert!(store.completed("alice", "demo").unwrap().is_empty());
    }

    #[test]
    fn test_reject_keeps_reason() {
        let store = InMemoryChallengeStore::new();
        let challenge = build_challenge();
        store.add_current("alice", "demo", challenge.clone()).unwrap();
        store
            .reject("alice", "demo", challenge.id(), "too hard")
            .unwrap();

        let rejected = store.rejected("alice", "demo").unwrap();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].1, "too hard");
        assert!(store.current("alice", "demo").unwrap().is_empty());
    }

    #[test]
    fn test_store_respects_limit_and_restore() {
        let store = InMemoryChallengeStore::new();
        let first = build_challenge();
        let second = build_challenge();
        store.add_current("alice", "demo", first.clone()).unwrap();
        store.add_current("alice", "demo", second.clone()).unwrap();

        store.store("alice", "demo", first.id(), 1).unwrap();
        assert!(matches!(
            store.store("alice", "demo", second.id(), 1),
            Err(RepositoryError::StorageFull(1))
        ));
        assert_eq!(store.current("alice", "demo").unwrap().len(), 1);

        store.restore("alice", "demo", first.id()).unwrap();
        assert!(store.stored("alice", "demo").unwrap().is_empty());
        assert_eq!(store.current("alice", "demo").unwrap().len(), 2);
    }

    #[test]
    fn test_add_current_unique_checks_text_and_limit() {
        let store = InMemoryChallengeStore::new();
        assert_eq!(
            store.add_current_unique("alice", "demo", build_challenge(), 2).unwrap(),
            AddOutcome::Added
        );
        assert_eq!(
            store.add_current_unique("alice", "demo", build_challenge(), 2).unwrap(),
            AddOutcome::Duplicate
        );

        let dummy = Challenge::dummy("main", "generation failed");
        assert_eq!(
            store.add_current_unique("alice", "demo", dummy.clone(), 2).unwrap(),
            AddOutcome::Added
        );
        assert_eq!(
            store.add_current_unique("alice", "demo", dummy, 2).unwrap(),
            AddOutcome::Full
        );
        assert_eq!(store.current("alice", "demo").unwrap().len(), 2);
    }

    #[test]
    fn test_projects_are_isolated() {
        let store = InMemoryChallengeStore::new();
        store.add_current("alice", "demo", build_challenge()).unwrap();
        assert!(store.current("alice", "other").unwrap().is_empty());
        assert!(store.current("bob", "demo").unwrap().is_empty());
    }
}
