//! Mutation challenge generator.

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::domain::errors::{GenerationError, GenerationResult, ReportError};
use crate::domain::models::{
    Challenge, ChallengeGenerationData, ChallengeKind, ChallengeMeta, MutationChallenge,
    MutationRecord, MutationStatus,
};
use crate::infrastructure::reports::load_mutations;

/// Score of a mutant: one that no test reaches is easier to kill.
pub fn mutation_score(status: MutationStatus) -> u32 {
    match status {
        MutationStatus::NoCoverage => 3,
        _ => 4,
    }
}

/// Kill one surviving or uncovered mutant of the file's class.
///
/// `None` when the mutation tool produced no report or every mutant of the
/// class is already killed.
pub fn generate(
    data: &mut ChallengeGenerationData<'_>,
    rng: &mut dyn RngCore,
) -> GenerationResult<Option<Challenge>> {
    if !data.file.is_source() {
        return Err(GenerationError::UnsupportedArtifact {
            kind: ChallengeKind::Mutation,
            file: data.file.qualified_name(),
        });
    }

    let mutant = match data.mutant.clone().filter(|m| !m.status.is_killed()) {
        Some(mutant) => mutant,
        None => {
            let mutants = match load_mutations(data.context, &data.file) {
                Ok(mutants) => mutants,
                Err(ReportError::Missing(path)) => {
                    data.listener.log(&format!(
                        "[Gamekins] Mutation report {} not found",
                        path.display()
                    ));
                    return Ok(None);
                }
                Err(err) => return Err(err.into()),
            };
            let alive: Vec<&MutationRecord> =
                mutants.iter().filter(|m| !m.status.is_killed()).collect();
            let Some(mutant) = alive.choose(rng) else {
                data.listener.log(&format!(
                    "[Gamekins] Every mutant of {} is killed",
                    data.file
                ));
                return Ok(None);
            };
            (*mutant).clone()
        }
    };

    data.mutant = Some(mutant.clone());
    Ok(Some(Challenge::Mutation(MutationChallenge {
        meta: ChallengeMeta::new(
            &data.context.branch,
            data.file.coverage,
            mutation_score(mutant.status),
        ),
        file: data.file.clone(),
        mutant,
    })))
}
