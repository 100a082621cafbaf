//! Domain layer for the challenge engine
//!
//! This module contains the challenge model, coverage entities and ports.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{GenerationError, ReportError, RepositoryError};
