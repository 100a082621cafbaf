//! Challenge lifecycle evaluation.
//!
//! Nothing here runs eagerly. At each build the host asks, per held
//! challenge, whether it is solved or still solvable, and the answer comes
//! from re-reading the reports that build produced. A challenge created on
//! another branch is left alone: always solvable, never solved.

use chrono::Utc;
use tracing::{debug, info};

use crate::domain::errors::{ReportError, RepositoryError, RepositoryResult};
use crate::domain::models::{
    BuildContext, Challenge, ChallengeState, CoverageStatus, LineChallenge, LineCoverage,
};
use crate::domain::ports::ChallengeRepository;
use crate::infrastructure::reports::jacoco::{class_coverage, find_line, JacocoReport};
use crate::infrastructure::reports::{load_mutations, load_smells, read_class_coverage};

/// Reason recorded when a held challenge can no longer be reached.
pub const UNSOLVABLE_REASON: &str = "no longer solvable";

fn is_foreign_branch(challenge: &Challenge, context: &BuildContext) -> bool {
    challenge.branch() != context.branch
}

/// Load the coverage report of a file challenge; `None` when unreadable.
fn coverage_report(challenge: &Challenge, context: &BuildContext) -> Option<JacocoReport> {
    let file = challenge.file()?;
    match JacocoReport::load(context, file) {
        Ok(report) => Some(report),
        Err(err) => {
            debug!(file = %file, error = %err, "cannot evaluate challenge against coverage report");
            None
        }
    }
}

/// Whether a mutation or smell report read leaves the challenge reachable.
///
/// A report that was never written ends the challenge. A truncated or
/// unreadable one only means it cannot be evaluated yet.
fn report_allows<T>(result: Result<T, ReportError>, still_open: impl FnOnce(T) -> bool) -> bool {
    match result {
        Ok(records) => still_open(records),
        Err(ReportError::Missing(_)) => false,
        Err(err) => {
            debug!(error = %err, "cannot evaluate challenge against report yet");
            true
        }
    }
}

/// Whether the challenge's target can still be reached.
///
/// Without a coverage report, coverage challenges stay solvable. Without a
/// mutation or smell report, mutation and smell challenges do not.
pub fn is_solvable(challenge: &Challenge, context: &BuildContext) -> bool {
    if is_foreign_branch(challenge, context) {
        return true;
    }

    match challenge {
        Challenge::LineCoverage(c)
        | Challenge::BranchCoverage(c)
        | Challenge::ExceptionCoverage(c) => {
            coverage_report(challenge, context).is_none_or(|report| {
                report
                    .lines
                    .iter()
                    .any(|l| l.text == c.line.text && !l.status.is_fully_covered())
            })
        }
        Challenge::MethodCoverage(c) => {
            coverage_report(challenge, context).is_none_or(|report| {
                if report.methods.is_empty() {
                    return true;
                }
                report.method(&c.method.name).is_some_and(|m| m.missed_lines > 0)
            })
        }
        Challenge::ClassCoverage(_) => {
            coverage_report(challenge, context).is_none_or(|report| report.has_uncovered_lines())
        }
        Challenge::Mutation(c) => report_allows(load_mutations(context, &c.file), |mutants| {
            mutants
                .iter()
                .find(|m| m.same_mutant(&c.mutant))
                .is_some_and(|m| !m.status.is_killed())
        }),
        Challenge::Smell(c) => report_allows(load_smells(context, &c.file), |smells| {
            smells.iter().any(|s| s.same_finding(&c.smell))
        }),
        Challenge::Test(_) | Challenge::Build(_) | Challenge::Dummy(_) => true,
    }
}

/// Locate the challenge's line in the current report.
///
/// A shifted line is searched among lines that still lack coverage; a
/// nearest match that is not covered at all never counts as a solve.
fn matched_line<'a>(c: &LineChallenge, report: &'a JacocoReport) -> Option<&'a LineCoverage> {
    find_line(
        &report.lines,
        c.line.line_number,
        &c.line.text,
        &[CoverageStatus::NotCovered, CoverageStatus::PartiallyCovered],
    )
}

fn line_improved(c: &LineChallenge, report: &JacocoReport) -> bool {
    matched_line(c, report).is_some_and(|line| match line.status {
        CoverageStatus::FullyCovered => true,
        CoverageStatus::PartiallyCovered => {
            line.effective_branches().missed() < c.line.effective_branches().missed()
        }
        CoverageStatus::NotCovered => false,
    })
}

fn branch_improved(c: &LineChallenge, report: &JacocoReport) -> bool {
    matched_line(c, report).is_some_and(|line| match line.status {
        CoverageStatus::FullyCovered => true,
        CoverageStatus::PartiallyCovered => line
            .branches
            .is_some_and(|now| now.covered > c.line.effective_branches().covered),
        CoverageStatus::NotCovered => false,
    })
}

/// Evaluate the solve condition without side effects.
fn reached(challenge: &Challenge, context: &BuildContext) -> bool {
    match challenge {
        Challenge::LineCoverage(c) => {
            coverage_report(challenge, context).is_some_and(|r| line_improved(c, &r))
        }
        Challenge::BranchCoverage(c) => {
            coverage_report(challenge, context).is_some_and(|r| branch_improved(c, &r))
        }
        Challenge::ExceptionCoverage(c) => coverage_report(challenge, context)
            .is_some_and(|r| matched_line(c, &r).is_some_and(|l| l.status.is_fully_covered())),
        Challenge::MethodCoverage(c) => coverage_report(challenge, context)
            .is_some_and(|r| r.method(&c.method.name).is_some_and(|m| m.missed_lines == 0)),
        Challenge::ClassCoverage(c) => coverage_report(challenge, context).is_some_and(|r| {
            let now = class_coverage(&c.snapshot.class_name, c.file.coverage, &r.lines);
            now.fully_covered_lines > c.snapshot.fully_covered_lines
                && now.not_covered_lines <= c.snapshot.not_covered_lines
        }),
        Challenge::Mutation(c) => load_mutations(context, &c.file).is_ok_and(|mutants| {
            mutants
                .iter()
                .any(|m| m.same_mutant(&c.mutant) && m.status.is_killed())
        }),
        Challenge::Smell(c) => load_smells(context, &c.file)
            .is_ok_and(|smells| !smells.iter().any(|s| s.same_finding(&c.smell))),
        Challenge::Test(c) => {
            context.test_count > c.test_count
                && context.head_commit.is_some()
                && context.head_commit != c.head_commit
        }
        Challenge::Build(_) => context.build_succeeded,
        Challenge::Dummy(_) => true,
    }
}

/// Whether the challenge's target has been reached since creation.
///
/// The first successful call stamps the solve time and the class coverage
/// at solve time; later calls return `true` without stamping again.
pub fn is_solved(challenge: &mut Challenge, context: &BuildContext) -> bool {
    if challenge.meta().is_solved() {
        return true;
    }
    if is_foreign_branch(challenge, context) || !reached(challenge, context) {
        return false;
    }

    let coverage = challenge.file().map_or(challenge.meta().coverage_at_creation, |file| {
        read_class_coverage(context, file).unwrap_or(file.coverage)
    });
    challenge.meta_mut().stamp_solved(Utc::now(), coverage);
    true
}

/// Current lifecycle state of a held challenge.
pub fn evaluate(challenge: &mut Challenge, context: &BuildContext) -> ChallengeState {
    if is_solved(challenge, context) {
        ChallengeState::Solved
    } else if is_solvable(challenge, context) {
        ChallengeState::Solvable
    } else {
        ChallengeState::Unsolvable
    }
}

/// Challenges moved out of a user's current set by [`check_user`].
#[derive(Debug, Default, Clone)]
pub struct UserCheckOutcome {
    /// Newly solved, stamped challenges (dummies excluded)
    pub solved: Vec<Challenge>,
    /// Challenges rejected because they became unsolvable
    pub rejected: Vec<Challenge>,
}

/// Evaluate every current challenge of `user` against this build.
///
/// Solved challenges move to completed, unsolvable ones to rejected with
/// [`UNSOLVABLE_REASON`]. The outcome lists them for scoring. A challenge
/// another build already moved is skipped.
pub fn check_user(
    repo: &dyn ChallengeRepository,
    user: &str,
    project: &str,
    context: &BuildContext,
) -> RepositoryResult<UserCheckOutcome> {
    let mut outcome = UserCheckOutcome::default();

    for mut challenge in repo.current(user, project)? {
        match evaluate(&mut challenge, context) {
            ChallengeState::Solved => {
                if !moved(repo.complete(user, project, challenge.clone()), &challenge)? {
                    continue;
                }
                if !challenge.is_dummy() {
                    info!(user, project, challenge = %challenge, score = challenge.score(), "challenge solved");
                    outcome.solved.push(challenge);
                }
            }
            ChallengeState::Unsolvable => {
                let result = repo.reject(user, project, challenge.id(), UNSOLVABLE_REASON);
                if !moved(result, &challenge)? {
                    continue;
                }
                info!(user, project, challenge = %challenge, "challenge no longer solvable");
                outcome.rejected.push(challenge);
            }
            ChallengeState::Solvable => {
                debug!(user, project, challenge = %challenge, "challenge still solvable");
            }
        }
    }

    Ok(outcome)
}

/// `Ok(false)` when the challenge had already left the current set.
fn moved(result: RepositoryResult<()>, challenge: &Challenge) -> RepositoryResult<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(RepositoryError::ChallengeNotFound { .. }) => {
            debug!(challenge = %challenge, "challenge already moved by another build");
            Ok(false)
        }
        Err(err) => Err(err),
    }
}
