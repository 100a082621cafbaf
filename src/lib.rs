//! Gamekins - Challenge Generation & Lifecycle Engine
//!
//! Turns the coverage, mutation and static-analysis reports of a build into
//! concrete challenges for the contributors who changed the code, and
//! re-evaluates those challenges at every later build.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Challenge model, coverage entities, errors and ports
//! - **Service Layer** (`services`): Candidate selection, kind registry, generators,
//!   lifecycle evaluation and the bounded generation loop
//! - **Infrastructure Layer** (`infrastructure`): Report parsing, configuration, logging
//! - **Adapters** (`adapters`): In-memory implementation of the challenge repository
//!
//! # Example
//!
//! ```no_run
//! use gamekins::{
//!     BuildContext, ChallengeFactory, ConfigLoader, FileDetails, InMemoryChallengeStore,
//!     TracingListener,
//! };
//! use rand::SeedableRng;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let factory = ChallengeFactory::new(config)?;
//!     let store = InMemoryChallengeStore::new();
//!     let context = BuildContext::new("/workspace", "main", "demo");
//!     let files = vec![
//!         FileDetails::source("org.example", "Foo", "src/main/java/org/example/Foo.java", 0.4)
//!             .changed_by("alice"),
//!     ];
//!     let mut rng = rand::rngs::StdRng::from_entropy();
//!
//!     gamekins::check_user(&store, "alice", "demo", &context)?;
//!     factory.fill_quota(&store, "alice", "demo", &context, &files, &TracingListener, &mut rng)?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::InMemoryChallengeStore;
pub use domain::errors::{GenerationError, ReportError, RepositoryError};
pub use domain::models::{
    BuildContext, Challenge, ChallengeGenerationData, ChallengeKind, ChallengeState,
    CoverageEntity, CoverageStatus, EngineConfig, FileDetails, LoggingConfig, MutationRecord,
    SmellRecord,
};
pub use domain::ports::{
    AddOutcome, ChallengeRepository, GenerationListener, NullListener, TracingListener,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::{LogConfig, LoggerImpl};
pub use services::{
    check_user, eligible_candidates, evaluate, is_solvable, is_solved, CandidateSelector,
    ChallengeFactory, ChallengeRegistry, GenerationOutcome, UserCheckOutcome,
};
