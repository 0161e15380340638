//! Minimal REST client helpers for the notification service.

use super::endpoints as ep;
use super::*;
use once_cell::sync::Lazy;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("http: {0}")]
    Http(String),
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("serde: {0}")]
    Serde(String),
    #[error("rejected: {message}")]
    Rejected { message: String },
}

static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .tcp_keepalive(Some(Duration::from_secs(180)))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(180))
        // Bound request duration
        .timeout(Duration::from_secs(60))
        .build()
        .expect("failed to build HTTP client")
});

fn mk_client() -> Result<reqwest::Client, RestError> {
    Ok(HTTP_CLIENT.clone())
}

/// Attaches the host session cookie, when one is configured.
fn with_session(req: reqwest::RequestBuilder, session: Option<&str>) -> reqwest::RequestBuilder {
    match session {
        Some(cookie) if !cookie.is_empty() => req.header(reqwest::header::COOKIE, cookie),
        _ => req,
    }
}

async fn handle_json<T: for<'de> serde::Deserialize<'de>>(
    res: reqwest::Response,
) -> Result<T, RestError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(RestError::Status {
            status: status.as_u16(),
            body,
        });
    }
    res.json::<T>()
        .await
        .map_err(|e| RestError::Serde(e.to_string()))
}

/// Commands carry no payload on success. A 2xx reply may still report
/// `{"success": false}`; anything else in the body is ignored.
async fn handle_command(res: reqwest::Response) -> Result<(), RestError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(RestError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let body = res
        .text()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    match serde_json::from_str::<CommandResultDto>(&body) {
        Ok(CommandResultDto {
            success: false,
            message,
        }) => Err(RestError::Rejected {
            message: message.unwrap_or_default(),
        }),
        _ => Ok(()),
    }
}

pub async fn unread_count(base: &str, session: Option<&str>) -> Result<UnreadCountDto, RestError> {
    let client = mk_client()?;
    let url = ep::unread_count(base);
    let res = with_session(client.get(url), session)
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    handle_json(res).await
}

pub async fn list_notifications(
    base: &str,
    session: Option<&str>,
) -> Result<Vec<NotificationDto>, RestError> {
    let client = mk_client()?;
    let url = ep::list(base);
    let res = with_session(client.get(url), session)
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    // The service answers `null` instead of `[]` on some paths.
    let items: Option<Vec<NotificationDto>> = handle_json(res).await?;
    Ok(items.unwrap_or_default())
}

pub async fn mark_read(
    base: &str,
    id: &NotificationId,
    session: Option<&str>,
) -> Result<(), RestError> {
    let client = mk_client()?;
    let url = ep::mark_read(base, id);
    let res = with_session(client.post(url), session)
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    handle_command(res).await
}

pub async fn mark_all_read(base: &str, session: Option<&str>) -> Result<(), RestError> {
    let client = mk_client()?;
    let url = ep::mark_all_read(base);
    let res = with_session(client.post(url), session)
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    handle_command(res).await
}

pub async fn delete_notification(
    base: &str,
    id: &NotificationId,
    session: Option<&str>,
) -> Result<(), RestError> {
    let client = mk_client()?;
    let url = ep::delete(base, id);
    let res = with_session(client.delete(url), session)
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    handle_command(res).await
}
