//! Microsoft Graph API client.
//!
//! Thin wrapper over one authenticated call per operation: list a
//! collection resource with field projection, or create a resource with a
//! JSON body. No retries and no caching; transient-failure policy belongs
//! to the caller.

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::models::{CollectionResponse, ErrorEnvelope, EventPayload, ListItemPayload, UserRecord};
use crate::token::Credential;
use crate::{Error, Result};

const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";

/// Client for the Graph REST API.
///
/// Holds no credential; the caller threads one through each call so that
/// nothing persists between logical operations.
#[derive(Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for GraphClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphClient {
    pub fn new() -> Self {
        Self::with_base_url(GRAPH_API_BASE)
    }

    /// Point the client at a different base URL (regional cloud or test
    /// server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// List all users in the tenant, projected to id and display name.
    pub async fn list_users(&self, token: &Credential) -> Result<Vec<UserRecord>> {
        self.list_resources(token, "/users", &["id", "displayName"])
            .await
    }

    /// Fetch a collection resource, following `@odata.nextLink` pagination.
    ///
    /// `select` projects the response to the named fields; pass an empty
    /// slice to fetch full objects. A non-2xx response that still carries a
    /// well-formed `error` envelope surfaces as [`Error::Api`]; a body that
    /// is not the expected JSON surfaces as [`Error::MalformedResponse`].
    pub async fn list_resources<T: DeserializeOwned>(
        &self,
        token: &Credential,
        path: &str,
        select: &[&str],
    ) -> Result<Vec<T>> {
        let mut url = format!("{}{}", self.base_url, path);
        if !select.is_empty() {
            url.push_str(&format!(
                "?$select={}",
                urlencoding::encode(&select.join(","))
            ));
        }

        let mut items = Vec::new();
        let mut next = Some(url);

        while let Some(url) = next {
            debug!(%url, "fetching collection page");

            let response = self
                .client
                .get(&url)
                .bearer_auth(token.as_str())
                .send()
                .await?;

            let status = response.status().as_u16();
            let text = response.text().await?;

            let json: serde_json::Value = serde_json::from_str(&text).map_err(|_| {
                Error::MalformedResponse {
                    status,
                    body: text.clone(),
                }
            })?;

            if json.get("error").is_some() {
                let envelope: ErrorEnvelope =
                    serde_json::from_value(json).map_err(|_| Error::MalformedResponse {
                        status,
                        body: text.clone(),
                    })?;
                return Err(Error::Api {
                    status,
                    error: envelope.error,
                });
            }

            let page: CollectionResponse<T> =
                serde_json::from_value(json).map_err(|_| Error::MalformedResponse {
                    status,
                    body: text,
                })?;

            items.extend(page.value);
            next = page.next_link;
        }

        Ok(items)
    }

    /// Create a calendar event on the given user's calendar.
    pub async fn create_event(
        &self,
        token: &Credential,
        user_id: &str,
        event: &EventPayload,
    ) -> Result<()> {
        let path = format!("/users/{}/events", urlencoding::encode(user_id));
        self.create_resource(token, &path, event, StatusCode::CREATED)
            .await
    }

    /// Create an item in a SharePoint list.
    pub async fn create_list_item(
        &self,
        token: &Credential,
        site_id: &str,
        list_id: &str,
        fields: serde_json::Value,
    ) -> Result<()> {
        let path = format!(
            "/sites/{}/lists/{}/items",
            urlencoding::encode(site_id),
            urlencoding::encode(list_id)
        );
        let payload = ListItemPayload { fields };
        self.create_resource(token, &path, &payload, StatusCode::CREATED)
            .await
    }

    /// POST a JSON payload, requiring exactly `expected` as the success
    /// status.
    ///
    /// Endpoints in this API family disagree on their success code, so any
    /// other status is a failure even when it is 2xx. The response is fully
    /// buffered before inspection, and the body is trimmed before parsing
    /// because the API is known to prepend incidental whitespace to error
    /// bodies.
    pub async fn create_resource<P: Serialize>(
        &self,
        token: &Credential,
        path: &str,
        payload: &P,
        expected: StatusCode,
    ) -> Result<()> {
        let body = serde_json::to_vec(payload)?;
        let url = format!("{}{}", self.base_url, path);

        debug!(%url, content_length = body.len(), "creating resource");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token.as_str())
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, body.len())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status == expected {
            return Ok(());
        }

        let text = response.text().await?;
        let envelope: ErrorEnvelope =
            serde_json::from_str(text.trim()).map_err(|_| Error::MalformedResponse {
                status: status.as_u16(),
                body: text.clone(),
            })?;

        Err(Error::Api {
            status: status.as_u16(),
            error: envelope.error,
        })
    }
}
