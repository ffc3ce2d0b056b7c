//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig)
//! - [`limits`]: Room limits (retention, message length, page sizes, buffers)
//! - [`validation`]: Startup checks that report every problem at once

mod limits;
mod types;
pub mod validation;

pub use limits::LimitsConfig;
pub use types::{Config, ConfigError, LogFormat, ServerConfig};
