use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned notification identifier.
///
/// The service emits numeric ids, but the client treats them as opaque and
/// only ever echoes them back in request paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId", into = "String")]
pub struct NotificationId(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

impl From<RawId> for NotificationId {
    fn from(value: RawId) -> Self {
        match value {
            RawId::Int(n) => NotificationId(n.to_string()),
            RawId::Text(s) => NotificationId(s),
        }
    }
}

impl From<NotificationId> for String {
    fn from(value: NotificationId) -> Self {
        value.0
    }
}

impl NotificationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for NotificationId {
    fn from(value: &str) -> Self {
        NotificationId(value.to_string())
    }
}

impl From<i64> for NotificationId {
    fn from(value: i64) -> Self {
        NotificationId(value.to_string())
    }
}

/// Category tag attached by the server when it generates a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    ApprovalRequest,
    ApprovalApproved,
    ApprovalRejected,
    DocumentComment,
    ScheduleReminder,
    LeaveApproved,
    LeaveRejected,
    Announcement,
    Mention,
    #[serde(other)]
    Other,
}

impl NotificationKind {
    /// Stable lowercase token, used as a markup attribute value.
    pub fn as_token(&self) -> &'static str {
        match self {
            NotificationKind::ApprovalRequest => "approval-request",
            NotificationKind::ApprovalApproved => "approval-approved",
            NotificationKind::ApprovalRejected => "approval-rejected",
            NotificationKind::DocumentComment => "document-comment",
            NotificationKind::ScheduleReminder => "schedule-reminder",
            NotificationKind::LeaveApproved => "leave-approved",
            NotificationKind::LeaveRejected => "leave-rejected",
            NotificationKind::Announcement => "announcement",
            NotificationKind::Mention => "mention",
            NotificationKind::Other => "other",
        }
    }
}
