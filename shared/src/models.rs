//! Data models for Graph API requests and responses.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::{Error, Result};

/// Wire format Graph uses for local date-times.
const GRAPH_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One page of a Graph collection response.
#[derive(Debug, Deserialize)]
pub struct CollectionResponse<T> {
    pub value: Vec<T>,
    #[serde(rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Error envelope wrapping an [`ApiError`].
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ApiError,
}

/// A user in the tenant directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
}

/// A local date-time paired with a named time zone, as Graph expects for
/// event boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    pub date_time: String,
    pub time_zone: String,
}

impl DateTimeTimeZone {
    fn new(when: NaiveDateTime, time_zone: &str) -> Self {
        Self {
            date_time: when.format(GRAPH_DATETIME_FORMAT).to_string(),
            time_zone: time_zone.to_string(),
        }
    }
}

/// Body content type for an event description.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyContentType {
    Text,
    Html,
}

/// Free-form body of an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    pub content_type: BodyContentType,
    pub content: String,
}

/// Display-name wrapper for an event location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub display_name: String,
}

/// A calendar event to be created on a user's calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub subject: String,
    pub location: Location,
    pub start: DateTimeTimeZone,
    pub end: DateTimeTimeZone,
    pub body: ItemBody,
}

impl EventPayload {
    /// Build an event payload, checking that the event ends after it starts.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        subject: impl Into<String>,
        location: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        time_zone: &str,
        content: impl Into<String>,
        content_type: BodyContentType,
    ) -> Result<Self> {
        if start >= end {
            return Err(Error::Validation(format!(
                "event start {} must be before end {}",
                start, end
            )));
        }

        Ok(Self {
            subject: subject.into(),
            location: Location {
                display_name: location.into(),
            },
            start: DateTimeTimeZone::new(start, time_zone),
            end: DateTimeTimeZone::new(end, time_zone),
            body: ItemBody {
                content_type,
                content: content.into(),
            },
        })
    }
}

/// Payload for creating a SharePoint list item.
#[derive(Debug, Clone, Serialize)]
pub struct ListItemPayload {
    pub fields: serde_json::Value,
}
