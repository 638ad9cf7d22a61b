//! Shared library for the tenant calendar Lambda functions.
//!
//! This crate provides the Microsoft Graph client, credential acquisition,
//! and error classification used across the Lambda binaries.

pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod token;

pub use config::Config;
pub use error::{classify, ApiError, Error, ErrorKind, Result};
pub use graph::GraphClient;
pub use models::{BodyContentType, EventPayload, UserRecord};
pub use token::{Credential, SecretsTokenProvider, StaticTokenProvider, TokenProvider};
