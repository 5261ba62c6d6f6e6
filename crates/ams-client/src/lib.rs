//! Media Services REST API client.
//!
//! This crate provides:
//! - Environment-based account and credential configuration
//! - Azure AD client-credentials auth with a token cache
//! - Typed operations for transforms, assets, jobs and streaming locators
//! - Block blob upload, listing and download for asset containers
//! - Request tracing spans and metrics

pub mod blob;
pub mod client;
pub mod config;
pub mod error;
pub mod metrics;
pub mod token_cache;

pub use blob::{BlobItem, BlobPage};
pub use client::AmsClient;
pub use config::{AmsConfig, Credentials};
pub use error::{AmsError, AmsResult};
pub use token_cache::TokenCache;
