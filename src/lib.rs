//! Configuration and secret resolution for the expense tracker API.
//!
//! Builds a process-wide [`resolver::ConfigSnapshot`] from a remote secret
//! backend with a TTL cache, degrades to environment variables when the
//! backend is unavailable, and exposes refresh and health operations.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod secrets;

pub use error::{Error, Result};
pub use resolver::{ConfigResolver, ConfigSnapshot, HealthResult, ResolverState};
