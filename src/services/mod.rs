pub mod candidate_selector;
pub mod challenge_factory;
pub mod challenge_registry;
pub mod generators;
pub mod lifecycle;

pub use candidate_selector::{eligible_candidates, CandidateSelector};
pub use challenge_factory::{ChallengeFactory, GenerationOutcome};
pub use challenge_registry::ChallengeRegistry;
pub use lifecycle::{check_user, evaluate, is_solvable, is_solved, UserCheckOutcome};
