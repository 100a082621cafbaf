//! Code smell challenge generator.

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::domain::errors::{GenerationResult, ReportError};
use crate::domain::models::{
    Challenge, ChallengeGenerationData, ChallengeMeta, SmellChallenge, SmellSeverity,
};
use crate::infrastructure::reports::load_smells;

pub fn smell_score(severity: SmellSeverity) -> u32 {
    match severity {
        SmellSeverity::Blocker | SmellSeverity::Critical => 4,
        SmellSeverity::Major => 3,
        SmellSeverity::Minor => 2,
        SmellSeverity::Info => 1,
    }
}

/// Remove one static-analysis finding of the file.
pub fn generate(
    data: &mut ChallengeGenerationData<'_>,
    rng: &mut dyn RngCore,
) -> GenerationResult<Option<Challenge>> {
    let smells = match load_smells(data.context, &data.file) {
        Ok(smells) => smells,
        Err(ReportError::Missing(path)) => {
            data.listener.log(&format!(
                "[Gamekins] Smell report {} not found",
                path.display()
            ));
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    let Some(smell) = smells.choose(rng).cloned() else {
        data.listener
            .log(&format!("[Gamekins] No code smells in {}", data.file));
        return Ok(None);
    };

    Ok(Some(Challenge::Smell(SmellChallenge {
        meta: ChallengeMeta::new(
            &data.context.branch,
            data.file.coverage,
            smell_score(smell.severity),
        ),
        file: data.file.clone(),
        smell,
    })))
}
