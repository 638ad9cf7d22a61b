//! Bearer credential acquisition.
//!
//! The token-exchange protocol itself lives outside this crate; providers
//! here only retrieve an already-issued credential. Credentials are
//! short-lived, so callers re-fetch per invocation rather than caching
//! across operations.

use std::fmt;

use aws_sdk_secretsmanager::Client as SecretsClient;
use serde::Deserialize;

use crate::{Error, Result};

/// Opaque bearer token presented in the Authorization header.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens must not end up in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Source of bearer credentials for Graph calls.
#[allow(async_fn_in_trait)]
pub trait TokenProvider {
    /// Obtain a credential, failing with [`Error::Auth`] if the identity
    /// provider rejects the request or the exchange cannot be reached.
    async fn get_token(&self) -> Result<Credential>;
}

/// Secret payload written by the auth exchange.
#[derive(Debug, Deserialize)]
struct TokenSecret {
    access_token: String,
}

/// Parse a Secrets Manager secret string into a credential.
///
/// Accepts either a JSON object with an `access_token` field or a raw
/// token string.
fn credential_from_secret(secret: &str) -> Result<Credential> {
    if let Ok(parsed) = serde_json::from_str::<TokenSecret>(secret) {
        return Ok(Credential::new(parsed.access_token));
    }

    let token = secret.trim();
    if token.is_empty() {
        return Err(Error::Auth("token secret is empty".to_string()));
    }
    Ok(Credential::new(token))
}

/// Provider backed by AWS Secrets Manager.
///
/// An external auth collaborator performs the OAuth exchange and stores
/// the resulting access token under a known secret; this provider fetches
/// it fresh on every call.
pub struct SecretsTokenProvider {
    client: SecretsClient,
    secret_arn: String,
}

impl SecretsTokenProvider {
    pub fn new(client: SecretsClient, secret_arn: impl Into<String>) -> Self {
        Self {
            client,
            secret_arn: secret_arn.into(),
        }
    }
}

impl TokenProvider for SecretsTokenProvider {
    async fn get_token(&self) -> Result<Credential> {
        let response = self
            .client
            .get_secret_value()
            .secret_id(&self.secret_arn)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("Failed to get token secret: {}", e)))?;

        let secret = response
            .secret_string()
            .ok_or_else(|| Error::Auth("Token secret has no string value".to_string()))?;

        credential_from_secret(secret)
    }
}

/// Fixed-token provider for tests and local runs.
pub struct StaticTokenProvider(Credential);

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Credential::new(token))
    }
}

impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Result<Credential> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_from_json_secret() {
        let cred = credential_from_secret(r#"{"access_token":"abc123","expires_in":3599}"#)
            .unwrap();
        assert_eq!(cred.as_str(), "abc123");
    }

    #[test]
    fn test_credential_from_raw_secret() {
        let cred = credential_from_secret("  eyJhbGciOi.raw.token  ").unwrap();
        assert_eq!(cred.as_str(), "eyJhbGciOi.raw.token");
    }

    #[test]
    fn test_empty_secret_is_auth_error() {
        assert!(matches!(
            credential_from_secret("   "),
            Err(Error::Auth(_))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let cred = Credential::new("super-secret");
        let rendered = format!("{:?}", cred);
        assert!(!rendered.contains("super-secret"));
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticTokenProvider::new("test-token");
        let cred = provider.get_token().await.unwrap();
        assert_eq!(cred.as_str(), "test-token");
    }
}
