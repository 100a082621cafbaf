//! Bounded generation of new challenges for a user.
//!
//! [`ChallengeFactory::generate_challenge`] runs the outer attempt loop:
//! pick a file by rank, draw a kind, run its generator. Every attempt that
//! yields nothing, fails, or repeats a stored or rejected challenge costs one
//! unit of the attempt cap and drops the file from the working pool. When
//! the cap or the pool runs out the result is a Dummy carrying the reason.
//!
//! [`ChallengeFactory::fill_quota`] tops a user up to the configured number
//! of current challenges, discarding challenges the user already holds.

use std::collections::BTreeMap;

use chrono::{Duration, Utc};
use rand::RngCore;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{GenerationError, GenerationResult, RepositoryResult};
use crate::domain::models::{
    BuildContext, Challenge, ChallengeGenerationData, ChallengeKind, EngineConfig, FileDetails,
};
use crate::domain::ports::{AddOutcome, ChallengeRepository, GenerationListener};
use crate::services::candidate_selector::{eligible_candidates, CandidateSelector};
use crate::services::challenge_registry::ChallengeRegistry;
use crate::services::generators::{self, Generator};

/// Reason of the Dummy issued when the user changed no eligible file.
pub const NOTHING_CHANGED_REASON: &str = "nothing changed by user";

/// Result of one run of the outer attempt loop.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Generated challenge, or a Dummy with the reason nothing was generated
    pub challenge: Challenge,
    /// Attempts spent, each one costing a unit of the cap
    pub attempts: u32,
}

impl GenerationOutcome {
    fn dummy(context: &BuildContext, reason: impl Into<String>, attempts: u32) -> Self {
        Self {
            challenge: Challenge::dummy(&context.branch, reason),
            attempts,
        }
    }
}

/// Generates challenges with the configured registry and retry limits.
pub struct ChallengeFactory {
    config: EngineConfig,
    registry: ChallengeRegistry,
    selector: CandidateSelector,
    generators: BTreeMap<ChallengeKind, Generator>,
}

impl std::fmt::Debug for ChallengeFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeFactory")
            .field("registry", &self.registry)
            .field("selector", &self.selector)
            .field("generators", &self.generators.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ChallengeFactory {
    /// Create a factory whose registry comes from `config.challenge_weights`.
    pub fn new(config: EngineConfig) -> GenerationResult<Self> {
        let registry = ChallengeRegistry::from_config(&config)?;
        Ok(Self::with_registry(config, registry))
    }

    /// Create a factory with an explicit registry.
    pub fn with_registry(config: EngineConfig, registry: ChallengeRegistry) -> Self {
        let generators = [
            ChallengeKind::ClassCoverage,
            ChallengeKind::LineCoverage,
            ChallengeKind::BranchCoverage,
            ChallengeKind::MethodCoverage,
            ChallengeKind::ExceptionCoverage,
            ChallengeKind::Mutation,
            ChallengeKind::Smell,
            ChallengeKind::Test,
        ]
        .into_iter()
        .filter_map(|kind| generators::generator_for(kind).map(|g| (kind, g)))
        .collect();

        Self {
            selector: CandidateSelector::with_bias(config.rank_bias),
            config,
            registry,
            generators,
        }
    }

    /// Replace the generator used for `kind`.
    pub fn with_generator(mut self, kind: ChallengeKind, generator: Generator) -> Self {
        self.generators.insert(kind, generator);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ChallengeRegistry {
        &self.registry
    }

    fn run_generator(
        &self,
        kind: ChallengeKind,
        data: &mut ChallengeGenerationData<'_>,
        rng: &mut dyn RngCore,
    ) -> GenerationResult<Option<Challenge>> {
        match self.generators.get(&kind) {
            Some(generator) => generator(data, rng),
            None => Err(GenerationError::Configuration(format!(
                "no generator registered for {kind} challenges"
            ))),
        }
    }

    /// Run the outer attempt loop once.
    ///
    /// Only repository failures propagate; everything else ends in a
    /// challenge or a Dummy.
    #[instrument(skip(self, repo, context, files, listener, rng), fields(branch = %context.branch))]
    #[allow(clippy::too_many_arguments)]
    pub fn generate_challenge<R: RngCore>(
        &self,
        repo: &dyn ChallengeRepository,
        user: &str,
        project: &str,
        context: &BuildContext,
        files: &[FileDetails],
        listener: &dyn GenerationListener,
        rng: &mut R,
    ) -> RepositoryResult<GenerationOutcome> {
        let mut pool = eligible_candidates(files, user);
        if pool.is_empty() {
            listener.log(&format!("[Gamekins] No files changed by {user}"));
            return Ok(GenerationOutcome::dummy(context, NOTHING_CHANGED_REASON, 0));
        }

        let stored = repo.stored(user, project)?;
        let rejected = repo.rejected(user, project)?;
        let known = |challenge: &Challenge| {
            stored.iter().any(|c| c.same_text(challenge))
                || rejected.iter().any(|(c, _)| c.same_text(challenge))
        };

        let rng: &mut dyn RngCore = rng;
        let mut attempts = 0;
        while attempts < self.config.generation_attempts {
            let Some(index) = self.selector.select_index(pool.len(), rng) else {
                break;
            };
            attempts += 1;

            let kind = match self.registry.choose(rng) {
                Ok(kind) => kind,
                Err(err) => {
                    warn!(user, error = %err, "cannot draw a challenge kind");
                    listener.log(&format!("[Gamekins] {err}"));
                    return Ok(GenerationOutcome::dummy(context, err.to_string(), attempts));
                }
            };

            let file = pool[index].clone();
            debug!(user, attempt = attempts, kind = %kind, file = %file, "generation attempt");
            let mut data = ChallengeGenerationData::new(context, user, file, listener);

            match self.run_generator(kind, &mut data, rng) {
                Ok(Some(challenge)) if known(&challenge) => {
                    debug!(user, challenge = %challenge, "discarding stored or rejected challenge");
                }
                Ok(Some(challenge)) => {
                    info!(user, project, attempts, kind = %kind, challenge = %challenge, "generated challenge");
                    listener.log(&format!("[Gamekins] Generated new {kind} challenge for {user}"));
                    return Ok(GenerationOutcome {
                        challenge,
                        attempts,
                    });
                }
                Ok(None) => {
                    debug!(user, kind = %kind, file = %data.file, "nothing to generate");
                }
                Err(err) => {
                    warn!(user, kind = %kind, file = %data.file, error = %err, "generation attempt failed");
                    listener.log(&format!("[Gamekins] Generation failed for {}: {err}", data.file));
                }
            }
            pool.remove(index);
        }

        let reason = if attempts < self.config.generation_attempts {
            format!("no candidate file left after {attempts} attempts")
        } else {
            format!("generation failed after {attempts} attempts")
        };
        info!(user, project, attempts, reason = %reason, "issuing dummy challenge");
        listener.log(&format!("[Gamekins] No challenge generated for {user}: {reason}"));
        Ok(GenerationOutcome::dummy(context, reason, attempts))
    }

    /// Top the user up to `max_current_challenges`.
    ///
    /// Each slot gets `uniqueness_attempts` tries to produce a challenge the
    /// user does not already hold. A Dummy is added at most once and ends
    /// the round, as does a slot that found nothing unique. The duplicate
    /// and quota checks happen inside the repository's add.
    #[instrument(skip(self, repo, context, files, listener, rng), fields(branch = %context.branch))]
    #[allow(clippy::too_many_arguments)]
    pub fn fill_quota<R: RngCore>(
        &self,
        repo: &dyn ChallengeRepository,
        user: &str,
        project: &str,
        context: &BuildContext,
        files: &[FileDetails],
        listener: &dyn GenerationListener,
        rng: &mut R,
    ) -> RepositoryResult<Vec<Challenge>> {
        let limit = self.config.max_current_challenges;
        let mut added = Vec::new();

        loop {
            if repo.current(user, project)?.len() >= limit {
                break;
            }

            let mut accepted = None;
            for attempt in 1..=self.config.uniqueness_attempts {
                let challenge = self
                    .generate_challenge(repo, user, project, context, files, listener, rng)?
                    .challenge;
                match repo.add_current_unique(user, project, challenge.clone(), limit)? {
                    AddOutcome::Added => {
                        accepted = Some(challenge);
                        break;
                    }
                    AddOutcome::Duplicate => {
                        debug!(user, attempt, challenge = %challenge, "discarding duplicate of current challenge");
                    }
                    AddOutcome::Full => {
                        debug!(user, project, "quota already filled");
                        return Ok(added);
                    }
                }
            }

            let Some(challenge) = accepted else {
                debug!(user, "no unique challenge found, ending round");
                break;
            };

            let is_dummy = challenge.is_dummy();
            added.push(challenge);
            if is_dummy {
                break;
            }
        }

        Ok(added)
    }

    /// Offer a build challenge after a failed build.
    ///
    /// Skipped when the build succeeded, when the user already holds one,
    /// or when one was issued within the cooldown window.
    pub fn offer_build_challenge(
        &self,
        repo: &dyn ChallengeRepository,
        user: &str,
        project: &str,
        context: &BuildContext,
    ) -> RepositoryResult<Option<Challenge>> {
        if context.build_succeeded {
            return Ok(None);
        }

        let current = repo.current(user, project)?;
        if current.iter().any(|c| c.kind() == ChallengeKind::Build) {
            return Ok(None);
        }

        let window_start = Utc::now() - Duration::days(self.config.build_challenge_cooldown_days);
        let recent = |c: &Challenge| {
            c.kind() == ChallengeKind::Build && c.meta().created_at > window_start
        };
        let issued_recently = repo.completed(user, project)?.iter().any(recent)
            || repo.rejected(user, project)?.iter().any(|(c, _)| recent(c));
        if issued_recently {
            debug!(user, project, "build challenge still in cooldown");
            return Ok(None);
        }

        let challenge = generators::build_challenge(context, user);
        if repo.add_current_unique(user, project, challenge.clone(), usize::MAX)?
            != AddOutcome::Added
        {
            return Ok(None);
        }
        info!(user, project, "issued build challenge");
        Ok(Some(challenge))
    }
}
