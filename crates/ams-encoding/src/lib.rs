//! Copy-codec encoding on Media Services.
//!
//! This crate provides:
//! - Transform recipes (copy codec, copy codec with proxy, sprite and proxy)
//! - Environment-based run configuration
//! - Structured job logging
//! - An end-to-end runner: transform, input, job, wait, publish

pub mod config;
pub mod descriptor;
pub mod error;
pub mod logging;
pub mod runner;

pub use config::{EncodingRunConfig, JobSource};
pub use descriptor::{Recipe, RecipeParseError};
pub use error::{EncodingError, EncodingResult};
pub use logging::JobLogger;
pub use runner::{EncodingOutcome, EncodingRun};
