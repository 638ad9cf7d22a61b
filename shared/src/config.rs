//! Configuration management for Lambda functions.

use std::env;

use crate::{Error, Result};

/// Application configuration loaded from environment variables.
///
/// Target identifiers are configuration, never baked into the client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Graph base URL override (regional clouds); None means the public cloud
    pub graph_base_url: Option<String>,
    /// ARN of the secret holding the Graph access token
    pub token_secret_arn: String,
    /// User whose calendar receives the event
    pub target_user_id: String,
    /// SharePoint site hosting the invite log list (optional)
    pub site_id: Option<String>,
    /// SharePoint list receiving invite log items (optional)
    pub list_id: Option<String>,
    /// AWS region
    pub aws_region: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            graph_base_url: env::var("GRAPH_BASE_URL").ok(),
            token_secret_arn: require("GRAPH_TOKEN_SECRET_ARN")?,
            target_user_id: require("TARGET_USER_ID")?,
            site_id: env::var("SHAREPOINT_SITE_ID").ok(),
            list_id: env::var("SHAREPOINT_LIST_ID").ok(),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        })
    }
}

fn require(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("{} not set", name)))
}
