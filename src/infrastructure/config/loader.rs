use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::EngineConfig;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_current_challenges: {0}. Must be between 1 and 10")]
    InvalidMaxCurrentChallenges(usize),

    #[error("Invalid rank_bias: {0}. Must be in (1, 2]")]
    InvalidRankBias(f64),

    #[error("Invalid generation_attempts: {0}. Cannot be 0")]
    InvalidGenerationAttempts(u32),

    #[error("Invalid uniqueness_attempts: {0}. Cannot be 0")]
    InvalidUniquenessAttempts(u32),

    #[error("Challenge weights must contain at least one positive weight")]
    EmptyChallengeWeights,

    #[error("Challenge kind '{0}' is issued by the host and cannot be drawn")]
    HostIssuedKindWeighted(String),

    #[error("Invalid build_challenge_cooldown_days: {0}. Cannot be negative")]
    InvalidCooldown(i64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .gamekins/config.yaml (project config)
    /// 3. .gamekins/local.yaml (local overrides, optional)
    /// 4. Environment variables (GAMEKINS_* prefix, `__` separates nested keys)
    pub fn load() -> Result<EngineConfig> {
        let config: EngineConfig = Figment::new()
            .merge(Serialized::defaults(EngineConfig::default()))
            .merge(Yaml::file(".gamekins/config.yaml"))
            .merge(Yaml::file(".gamekins/local.yaml"))
            .merge(Env::prefixed("GAMEKINS_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<EngineConfig> {
        let config: EngineConfig = Figment::new()
            .merge(Serialized::defaults(EngineConfig::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &EngineConfig) -> Result<(), ConfigError> {
        if config.max_current_challenges == 0 || config.max_current_challenges > 10 {
            return Err(ConfigError::InvalidMaxCurrentChallenges(
                config.max_current_challenges,
            ));
        }

        if !(config.rank_bias > 1.0 && config.rank_bias <= 2.0) {
            return Err(ConfigError::InvalidRankBias(config.rank_bias));
        }

        if config.generation_attempts == 0 {
            return Err(ConfigError::InvalidGenerationAttempts(
                config.generation_attempts,
            ));
        }

        if config.uniqueness_attempts == 0 {
            return Err(ConfigError::InvalidUniquenessAttempts(
                config.uniqueness_attempts,
            ));
        }

        if let Some(kind) = config
            .challenge_weights
            .iter()
            .find(|(kind, weight)| kind.is_host_issued() && **weight > 0)
            .map(|(kind, _)| kind)
        {
            return Err(ConfigError::HostIssuedKindWeighted(kind.as_str().to_string()));
        }

        if config.challenge_weights.values().all(|w| *w == 0) {
            return Err(ConfigError::EmptyChallengeWeights);
        }

        if config.build_challenge_cooldown_days < 0 {
            return Err(ConfigError::InvalidCooldown(
                config.build_challenge_cooldown_days,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if config.report_read.initial_backoff_ms >= config.report_read.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.report_read.initial_backoff_ms,
                config.report_read.max_backoff_ms,
            ));
        }

        Ok(())
    }
}
