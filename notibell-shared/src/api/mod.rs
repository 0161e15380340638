use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{NotificationId, NotificationKind};

pub mod endpoints;
#[cfg(feature = "rest-client")]
pub mod rest;

pub const NOTIFICATIONS_PREFIX: &str = "/api/intranet/notifications";

// Notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: NotificationId,
    #[serde(default)]
    pub notification_type: Option<NotificationKind>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_read: bool,
    /// Zone-less local timestamp, e.g. `2025-03-14T09:26:53`. `None` when
    /// absent, null or unreadable; the row is still shown.
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub read_at: Option<NaiveDateTime>,
}

impl NotificationDto {
    /// Navigation target, if one is set and non-blank.
    pub fn link(&self) -> Option<&str> {
        self.link_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

// Unread count
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnreadCountDto {
    pub count: u64,
}

// Command acknowledgement. The service answers 200 with `success: false`
// when the operation failed on its side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResultDto {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Accepts the service's zone-less date-times and RFC 3339 values carrying an
/// offset (kept as the wall time of that offset). Anything else is `None`.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(raw) = value.as_ref().and_then(serde_json::Value::as_str) else {
        return Ok(None);
    };
    let raw = raw.trim();
    Ok(raw
        .parse::<NaiveDateTime>()
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local())))
}
