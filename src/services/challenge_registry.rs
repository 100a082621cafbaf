//! Registry of drawable challenge kinds.
//!
//! The [`ChallengeRegistry`] maps each kind to a relative weight. Drawing a
//! kind flattens the registry into a multiset where every kind appears
//! `weight` times and picks uniformly from it, so adding or removing a kind
//! never needs kind-specific logic here.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::errors::{GenerationError, GenerationResult};
use crate::domain::models::{ChallengeKind, EngineConfig};

/// Weighted set of the kinds the generation loop may draw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChallengeRegistry {
    /// Weight keyed by kind; zero weights are kept but never drawn.
    weights: BTreeMap<ChallengeKind, u32>,
}

impl ChallengeRegistry {
    /// Build a registry from explicit weights.
    ///
    /// Host-issued kinds (build, dummy) are never drawn and are rejected.
    pub fn from_weights(
        weights: impl IntoIterator<Item = (ChallengeKind, u32)>,
    ) -> GenerationResult<Self> {
        let mut registry = Self::default();
        for (kind, weight) in weights {
            registry.register(kind, weight)?;
        }
        Ok(registry)
    }

    /// Build the registry described by the engine configuration.
    pub fn from_config(config: &EngineConfig) -> GenerationResult<Self> {
        Self::from_weights(config.challenge_weights.iter().map(|(k, w)| (*k, *w)))
    }

    /// Add a kind or replace its weight.
    pub fn register(&mut self, kind: ChallengeKind, weight: u32) -> GenerationResult<()> {
        if kind.is_host_issued() {
            return Err(GenerationError::Configuration(format!(
                "{kind} challenges are issued by the host and cannot be registered"
            )));
        }
        self.weights.insert(kind, weight);
        Ok(())
    }

    /// Remove a kind, returning its previous weight.
    pub fn unregister(&mut self, kind: ChallengeKind) -> Option<u32> {
        self.weights.remove(&kind)
    }

    /// Look up the weight of a kind.
    pub fn weight(&self, kind: ChallengeKind) -> u32 {
        self.weights.get(&kind).copied().unwrap_or(0)
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> u64 {
        self.weights.values().map(|w| u64::from(*w)).sum()
    }

    /// Kinds with a positive weight, in declaration order.
    pub fn kinds(&self) -> Vec<ChallengeKind> {
        self.weights
            .iter()
            .filter(|(_, w)| **w > 0)
            .map(|(k, _)| *k)
            .collect()
    }

    /// Multiset view: every kind repeated `weight` times.
    pub fn flatten(&self) -> Vec<ChallengeKind> {
        self.weights
            .iter()
            .flat_map(|(kind, weight)| std::iter::repeat_n(*kind, *weight as usize))
            .collect()
    }

    /// Draw one kind uniformly from the flattened multiset.
    ///
    /// # Errors
    /// Returns [`GenerationError::Configuration`] when the total weight is 0.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> GenerationResult<ChallengeKind> {
        self.flatten().choose(rng).copied().ok_or_else(|| {
            GenerationError::Configuration("no challenge kinds configured".to_string())
        })
    }
}
