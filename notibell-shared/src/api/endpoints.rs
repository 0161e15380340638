use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use super::NOTIFICATIONS_PREFIX;
use crate::domain::NotificationId;

fn base_join(base: &str, path: &str) -> String {
    let b = base.trim_end_matches('/');
    let p = path.trim_start_matches('/');
    format!("{}/{}", b, p)
}

fn enc(s: &str) -> String {
    utf8_percent_encode(s, NON_ALPHANUMERIC).to_string()
}

pub fn list(base: &str) -> String {
    base_join(base, NOTIFICATIONS_PREFIX)
}
pub fn unread_count(base: &str) -> String {
    base_join(base, &format!("{}/unread-count", NOTIFICATIONS_PREFIX))
}
pub fn mark_read(base: &str, id: &NotificationId) -> String {
    base_join(
        base,
        &format!("{}/{}/read", NOTIFICATIONS_PREFIX, enc(id.as_str())),
    )
}
pub fn mark_all_read(base: &str) -> String {
    base_join(base, &format!("{}/read-all", NOTIFICATIONS_PREFIX))
}
pub fn delete(base: &str, id: &NotificationId) -> String {
    base_join(
        base,
        &format!("{}/{}", NOTIFICATIONS_PREFIX, enc(id.as_str())),
    )
}
