use async_trait::async_trait;
use notibell_shared::NotificationId;
use notibell_shared::api::{self, NotificationDto, rest::RestError};
use tracing::debug;

/// Uniform failure signal of the notification service wrapper.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The request could not be completed or its reply was unusable.
    #[error("network error: {0}")]
    Network(String),
    /// The service answered a command with an explicit failure.
    #[error("rejected by server (status {status:?}): {message}")]
    Rejected {
        status: Option<u16>,
        message: String,
    },
}

impl ClientError {
    fn from_query(e: RestError) -> Self {
        ClientError::Network(e.to_string())
    }

    fn from_command(e: RestError) -> Self {
        match e {
            RestError::Status { status, body } => ClientError::Rejected {
                status: Some(status),
                message: body,
            },
            RestError::Rejected { message } => ClientError::Rejected {
                status: None,
                message,
            },
            other => ClientError::Network(other.to_string()),
        }
    }
}

/// Operations offered by the notification service. No UI work happens here.
#[async_trait]
pub trait NotificationClient: Send + Sync {
    async fn fetch_unread_count(&self) -> Result<u64, ClientError>;
    /// Server order is preserved; an empty list is a valid result.
    async fn fetch_list(&self) -> Result<Vec<NotificationDto>, ClientError>;
    async fn mark_read(&self, id: &NotificationId) -> Result<(), ClientError>;
    async fn mark_all_read(&self) -> Result<(), ClientError>;
    async fn remove(&self, id: &NotificationId) -> Result<(), ClientError>;
}

/// [`NotificationClient`] backed by the HTTP service.
#[derive(Debug, Clone)]
pub struct HttpNotificationClient {
    base: String,
    session: Option<String>,
}

impl HttpNotificationClient {
    pub fn new(base: impl Into<String>, session: Option<String>) -> Self {
        Self {
            base: base.into(),
            session,
        }
    }

    fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }
}

#[async_trait]
impl NotificationClient for HttpNotificationClient {
    async fn fetch_unread_count(&self) -> Result<u64, ClientError> {
        let resp = api::rest::unread_count(&self.base, self.session())
            .await
            .map_err(ClientError::from_query)?;
        debug!(count = resp.count, "unread count fetched");
        Ok(resp.count)
    }

    async fn fetch_list(&self) -> Result<Vec<NotificationDto>, ClientError> {
        let items = api::rest::list_notifications(&self.base, self.session())
            .await
            .map_err(ClientError::from_query)?;
        debug!(items = items.len(), "notification list fetched");
        Ok(items)
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<(), ClientError> {
        api::rest::mark_read(&self.base, id, self.session())
            .await
            .map_err(ClientError::from_command)
    }

    async fn mark_all_read(&self) -> Result<(), ClientError> {
        api::rest::mark_all_read(&self.base, self.session())
            .await
            .map_err(ClientError::from_command)
    }

    async fn remove(&self, id: &NotificationId) -> Result<(), ClientError> {
        api::rest::delete_notification(&self.base, id, self.session())
            .await
            .map_err(ClientError::from_command)
    }
}
