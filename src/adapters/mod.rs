//! Adapters implementing the domain ports.

pub mod memory;

pub use memory::InMemoryChallengeStore;
