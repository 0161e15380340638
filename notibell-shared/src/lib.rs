pub mod api;
pub mod domain;

pub use domain::{NotificationId, NotificationKind};
