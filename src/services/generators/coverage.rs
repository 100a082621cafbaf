//! Class, line, branch, exception and method coverage generators.

use rand::seq::SliceRandom;
use rand::RngCore;

use super::coverage_score;
use crate::domain::errors::{GenerationError, GenerationResult};
use crate::domain::models::{
    Challenge, ChallengeGenerationData, ChallengeKind, ChallengeMeta, ClassCoverageChallenge,
    CoverageEntity, CoverageStatus, LineChallenge, LineCoverage, MethodCoverageChallenge,
};
use crate::infrastructure::reports::jacoco::{class_coverage, JacocoReport};

const EXCEPTION_SCORE: u32 = 3;

fn require_source(data: &ChallengeGenerationData<'_>, kind: ChallengeKind) -> GenerationResult<()> {
    if data.file.is_source() {
        Ok(())
    } else {
        Err(GenerationError::UnsupportedArtifact {
            kind,
            file: data.file.qualified_name(),
        })
    }
}

fn meta(data: &ChallengeGenerationData<'_>, score: u32) -> ChallengeMeta {
    ChallengeMeta::new(&data.context.branch, data.file.coverage, score)
}

/// Pick a not fully covered line accepted by `accept`, preferring a
/// pre-picked line entity.
fn pick_line<F>(
    data: &ChallengeGenerationData<'_>,
    rng: &mut dyn RngCore,
    kind: ChallengeKind,
    accept: F,
) -> GenerationResult<Option<LineCoverage>>
where
    F: Fn(&LineCoverage) -> bool,
{
    require_source(data, kind)?;

    if let Some(CoverageEntity::Line(line) | CoverageEntity::Branch(line)) = &data.entity {
        if !line.status.is_fully_covered() && accept(line) {
            return Ok(Some(line.clone()));
        }
    }

    let report = JacocoReport::load(data.context, &data.file)?;
    let candidates: Vec<&LineCoverage> = report.uncovered_lines().filter(|l| accept(l)).collect();
    match candidates.choose(rng) {
        Some(line) => Ok(Some((*line).clone())),
        None => {
            data.listener.log(&format!(
                "[Gamekins] No line suitable for a {kind} challenge in {}",
                data.file
            ));
            Ok(None)
        }
    }
}

/// Cover more lines of the whole class.
pub fn generate_class(
    data: &mut ChallengeGenerationData<'_>,
    _rng: &mut dyn RngCore,
) -> GenerationResult<Option<Challenge>> {
    require_source(data, ChallengeKind::ClassCoverage)?;

    let snapshot = match &data.entity {
        Some(CoverageEntity::Class(class)) if class.has_uncovered_lines() => class.clone(),
        _ => {
            let report = JacocoReport::load(data.context, &data.file)?;
            if !report.has_uncovered_lines() {
                data.listener.log(&format!(
                    "[Gamekins] {} has no uncovered lines",
                    data.file
                ));
                return Ok(None);
            }
            class_coverage(&data.file.file_name, data.file.coverage, &report.lines)
        }
    };

    data.entity = Some(CoverageEntity::Class(snapshot.clone()));
    Ok(Some(Challenge::ClassCoverage(ClassCoverageChallenge {
        meta: meta(data, coverage_score(1, data.file.coverage)),
        file: data.file.clone(),
        snapshot,
    })))
}

/// Fully cover one not or partially covered line.
pub fn generate_line(
    data: &mut ChallengeGenerationData<'_>,
    rng: &mut dyn RngCore,
) -> GenerationResult<Option<Challenge>> {
    let Some(line) = pick_line(data, rng, ChallengeKind::LineCoverage, |_| true)? else {
        return Ok(None);
    };

    data.entity = Some(CoverageEntity::Line(line.clone()));
    Ok(Some(Challenge::LineCoverage(LineChallenge {
        meta: meta(data, coverage_score(2, data.file.coverage)),
        file: data.file.clone(),
        line,
    })))
}

/// Cover more branches of one partially covered line.
pub fn generate_branch(
    data: &mut ChallengeGenerationData<'_>,
    rng: &mut dyn RngCore,
) -> GenerationResult<Option<Challenge>> {
    let Some(line) = pick_line(data, rng, ChallengeKind::BranchCoverage, |l| {
        l.status == CoverageStatus::PartiallyCovered
    })?
    else {
        return Ok(None);
    };

    data.entity = Some(CoverageEntity::Branch(line.clone()));
    Ok(Some(Challenge::BranchCoverage(LineChallenge {
        meta: meta(data, coverage_score(2, data.file.coverage)),
        file: data.file.clone(),
        line,
    })))
}

/// Cover one uncovered line that throws or catches.
pub fn generate_exception(
    data: &mut ChallengeGenerationData<'_>,
    rng: &mut dyn RngCore,
) -> GenerationResult<Option<Challenge>> {
    let Some(line) = pick_line(
        data,
        rng,
        ChallengeKind::ExceptionCoverage,
        LineCoverage::is_exception_related,
    )?
    else {
        return Ok(None);
    };

    data.entity = Some(CoverageEntity::Line(line.clone()));
    Ok(Some(Challenge::ExceptionCoverage(LineChallenge {
        meta: meta(data, EXCEPTION_SCORE),
        file: data.file.clone(),
        line,
    })))
}

/// Cover the missed lines of one method.
pub fn generate_method(
    data: &mut ChallengeGenerationData<'_>,
    rng: &mut dyn RngCore,
) -> GenerationResult<Option<Challenge>> {
    require_source(data, ChallengeKind::MethodCoverage)?;

    let method = match &data.entity {
        Some(CoverageEntity::Method(method)) if method.missed_lines > 0 => method.clone(),
        _ => {
            let report = JacocoReport::load(data.context, &data.file)?;
            let missed: Vec<_> = report.methods.iter().filter(|m| m.missed_lines > 0).collect();
            let Some(method) = missed.choose(rng) else {
                data.listener.log(&format!(
                    "[Gamekins] No method with missed lines in {}",
                    data.file
                ));
                return Ok(None);
            };
            (*method).clone()
        }
    };

    data.entity = Some(CoverageEntity::Method(method.clone()));
    Ok(Some(Challenge::MethodCoverage(MethodCoverageChallenge {
        meta: meta(data, coverage_score(2, data.file.coverage)),
        file: data.file.clone(),
        method,
    })))
}
