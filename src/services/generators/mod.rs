//! Challenge generators, one per drawable kind.
//!
//! Every generator has the same shape: it takes the per-attempt
//! [`ChallengeGenerationData`] and a random source and returns
//! `Ok(Some(challenge))`, `Ok(None)` when the file has nothing to offer for
//! that kind, or an error the retry loop logs and counts as a failed attempt.

pub mod coverage;
pub mod mutation;
pub mod smell;
pub mod test;

use rand::RngCore;

use crate::domain::errors::GenerationResult;
use crate::domain::models::{
    BuildChallenge, BuildContext, Challenge, ChallengeGenerationData, ChallengeKind, ChallengeMeta,
};

/// Signature shared by all generators.
pub type Generator =
    fn(&mut ChallengeGenerationData<'_>, &mut dyn RngCore) -> GenerationResult<Option<Challenge>>;

/// Coverage ratio at or above which coverage challenges score one point more.
pub const HIGH_COVERAGE_THRESHOLD: f64 = 0.8;

/// Generator for `kind`; `None` for kinds the host issues itself.
pub fn generator_for(kind: ChallengeKind) -> Option<Generator> {
    match kind {
        ChallengeKind::ClassCoverage => Some(coverage::generate_class),
        ChallengeKind::LineCoverage => Some(coverage::generate_line),
        ChallengeKind::BranchCoverage => Some(coverage::generate_branch),
        ChallengeKind::ExceptionCoverage => Some(coverage::generate_exception),
        ChallengeKind::MethodCoverage => Some(coverage::generate_method),
        ChallengeKind::Mutation => Some(mutation::generate),
        ChallengeKind::Smell => Some(smell::generate),
        ChallengeKind::Test => Some(test::generate),
        ChallengeKind::Build | ChallengeKind::Dummy => None,
    }
}

/// Base score, one point more on an already well covered file.
pub fn coverage_score(base: u32, coverage: f64) -> u32 {
    if coverage >= HIGH_COVERAGE_THRESHOLD {
        base + 1
    } else {
        base
    }
}

/// Challenge to fix a failing build.
pub fn build_challenge(context: &BuildContext, user: &str) -> Challenge {
    Challenge::Build(BuildChallenge {
        meta: ChallengeMeta::new(&context.branch, 0.0, 1),
        user: user.to_string(),
    })
}
