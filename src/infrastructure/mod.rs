//! Infrastructure layer module
//!
//! This module contains the adapters to the outside world:
//! - Report parsing (JaCoCo, PIT, static-analysis findings)
//! - Configuration management
//! - Logging infrastructure
//!
//! Infrastructure implementations are used by the services layer; the domain
//! layer does not depend on them.

pub mod config;
pub mod logging;
pub mod reports;
