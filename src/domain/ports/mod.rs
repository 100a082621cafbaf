//! Port trait definitions (Hexagonal Architecture)
//!
//! - ChallengeRepository: per-user challenge state owned by the host
//! - GenerationListener: diagnostic sink for a generation round
pub mod challenge_repository;
pub mod listener;

pub use challenge_repository::{AddOutcome, ChallengeRepository};
pub use listener::{GenerationListener, NullListener, TracingListener};
