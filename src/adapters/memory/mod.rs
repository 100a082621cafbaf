//! In-memory adapters.
//!
//! Lock-guarded implementations of the domain ports, suitable for hosts
//! that persist state themselves and for tests.

pub mod challenge_store;

pub use challenge_store::InMemoryChallengeStore;
