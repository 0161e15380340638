//! Keeps the badge, the dropdown and the rendered list in step with the
//! notification service.
//!
//! Badge and list are sourced from the server independently on every refresh;
//! nothing fetched outlives the render it was fetched for. Overlapping
//! refreshes of the same region are not deduplicated: by default whichever
//! response completes last is what stays on the page.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{Local, NaiveDateTime};
use notibell_shared::NotificationId;
use notibell_shared::api::NotificationDto;
use tokio::sync::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::client::{ClientError, NotificationClient};
use crate::format::{escape_for_display, format_time_ago};
use crate::page::{ElementIds, Interaction, ListItem, OpenTarget, Page, RowAction};

pub const EMPTY_LIST_MARKUP: &str = r#"<div class="empty-notification">알림이 없습니다</div>"#;
pub const EMPTY_LIST_LABEL: &str = "알림이 없습니다";
pub const CONFIRM_DELETE_MSG: &str = "이 알림을 삭제하시겠습니까?";
pub const DELETE_REJECTED_MSG: &str = "알림 삭제에 실패했습니다.";
pub const DELETE_FAILED_MSG: &str = "알림 삭제 중 오류가 발생했습니다.";

const BADGE_DISPLAY_CAP: u64 = 99;

/// Badge text for `count`, or `None` when the badge should be hidden.
pub fn badge_text(count: u64) -> Option<String> {
    match count {
        0 => None,
        c if c > BADGE_DISPLAY_CAP => Some(format!("{}+", BADGE_DISPLAY_CAP)),
        c => Some(c.to_string()),
    }
}

/// One row per notification in server order, or the placeholder row when
/// there are none.
pub fn render_rows(items: &[NotificationDto], now: NaiveDateTime) -> Vec<ListItem> {
    if items.is_empty() {
        return vec![ListItem {
            markup: EMPTY_LIST_MARKUP.to_string(),
            label: EMPTY_LIST_LABEL.to_string(),
            open: None,
            delete: None,
        }];
    }
    items.iter().map(|n| render_row(n, now)).collect()
}

fn render_row(n: &NotificationDto, now: NaiveDateTime) -> ListItem {
    let id = escape_for_display(Some(n.id.as_str()));
    let title = escape_for_display(n.title.as_deref());
    let content = escape_for_display(n.content.as_deref());
    let time = n
        .created_at
        .map(|at| format_time_ago(at, now))
        .unwrap_or_default();
    let unread = if n.is_read { "" } else { " unread" };
    let kind = n
        .notification_type
        .map(|k| format!(r#" data-kind="{}""#, k.as_token()))
        .unwrap_or_default();
    let link = n
        .link()
        .map(|l| format!(r#" data-link="{}""#, escape_for_display(Some(l))))
        .unwrap_or_default();

    let markup = format!(
        r#"<div class="notification-item{unread}"{kind}><div class="notification-body" data-action="open" data-id="{id}"{link}><div class="notification-title">{title}</div><div class="notification-content">{content}</div><div class="notification-time">{time}</div></div><button class="notification-delete-btn" data-action="delete" data-id="{id}" title="삭제">✕</button></div>"#
    );
    let marker = if n.is_read { "  " } else { "● " };
    let label = format!(
        "{marker}#{} {} | {} | {}",
        n.id,
        n.title.as_deref().unwrap_or_default(),
        n.content.as_deref().unwrap_or_default(),
        time
    );

    ListItem {
        markup,
        label,
        open: Some(OpenTarget {
            id: n.id.clone(),
            link_url: n.link().map(str::to_string),
        }),
        delete: Some(n.id.clone()),
    }
}

/// Monotonic refresh tickets for one display region.
#[derive(Debug, Default)]
struct Tickets {
    issued: AtomicU64,
    rendered: AtomicU64,
}

impl Tickets {
    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Records `ticket` as rendered. With `discard_stale`, a ticket older
    /// than one already rendered is refused.
    fn accept(&self, ticket: u64, discard_stale: bool) -> bool {
        let prev = self.rendered.fetch_max(ticket, Ordering::SeqCst);
        !discard_stale || prev < ticket
    }
}

/// Owns the visible state of the widget and drives it from service results.
pub struct ViewController {
    client: Arc<dyn NotificationClient>,
    page: Arc<dyn Page>,
    interaction: Arc<dyn Interaction>,
    ids: ElementIds,
    open: AtomicBool,
    discard_stale: bool,
    list_tickets: Tickets,
    badge_tickets: Tickets,
    outside_listener: Mutex<Option<JoinHandle<()>>>,
}

impl ViewController {
    /// Starts closed, whatever the page currently shows.
    pub fn new(
        client: Arc<dyn NotificationClient>,
        page: Arc<dyn Page>,
        interaction: Arc<dyn Interaction>,
        ids: ElementIds,
    ) -> Self {
        page.set_visible(&ids.dropdown, false);
        Self {
            client,
            page,
            interaction,
            ids,
            open: AtomicBool::new(false),
            discard_stale: false,
            list_tickets: Tickets::default(),
            badge_tickets: Tickets::default(),
            outside_listener: Mutex::new(None),
        }
    }

    /// Drop responses older than the last one rendered for the same region.
    pub fn with_stale_guard(mut self, discard_stale: bool) -> Self {
        self.discard_stale = discard_stale;
        self
    }

    pub fn ids(&self) -> &ElementIds {
        &self.ids
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Flips the dropdown. Opening loads the list; closing touches nothing
    /// on the server. Returns the new state.
    pub async fn toggle_dropdown(&self) -> bool {
        let now_open = !self.open.fetch_xor(true, Ordering::SeqCst);
        self.page.set_visible(&self.ids.dropdown, now_open);
        debug!(open = now_open, "dropdown toggled");
        if now_open {
            self.refresh_list().await;
        }
        now_open
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        self.page.set_visible(&self.ids.dropdown, false);
    }

    /// Closes an open dropdown when `target` lies outside the wrapper.
    pub fn close_on_outside_interaction(&self, target: &str) {
        if !self.is_open() {
            return;
        }
        if let Some(false) = self.page.contains(&self.ids.wrapper, target) {
            debug!(element = target, "pointer outside widget; closing dropdown");
            self.close();
        }
    }

    /// Subscribes to every pointer interaction on the page for the rest of
    /// its lifetime. Only the first call installs a listener.
    pub async fn install_outside_listener(self: &Arc<Self>) -> bool {
        let mut guard = self.outside_listener.lock().await;
        if guard.is_some() {
            return false;
        }
        let mut rx = self.page.subscribe_pointer();
        let view = Arc::clone(self);
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => view.close_on_outside_interaction(&ev.target),
                    Err(RecvError::Lagged(n)) => {
                        warn!(missed = %n, "pointer listener lagged; events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("pointer listener exiting");
        });
        *guard = Some(handle);
        true
    }

    pub async fn shutdown(&self) {
        let mut guard = self.outside_listener.lock().await;
        if let Some(h) = guard.take() {
            h.abort();
        }
    }

    /// Replaces the list container from a fresh fetch. A failed fetch keeps
    /// whatever was shown before.
    pub async fn refresh_list(&self) {
        let ticket = self.list_tickets.issue();
        match self.client.fetch_list().await {
            Ok(items) => {
                if !self.list_tickets.accept(ticket, self.discard_stale) {
                    debug!(ticket, "stale list response discarded");
                    return;
                }
                let rows = render_rows(&items, Local::now().naive_local());
                self.page.replace_list(&self.ids.list, rows);
            }
            Err(e) => {
                warn!(error = %e, "notification list refresh failed");
            }
        }
    }

    /// Shows the unread count from a fresh fetch, hidden at zero and capped
    /// in display only. Returns whether the fetched count was rendered.
    pub async fn refresh_badge(&self) -> bool {
        let ticket = self.badge_tickets.issue();
        match self.client.fetch_unread_count().await {
            Ok(count) => {
                if !self.badge_tickets.accept(ticket, self.discard_stale) {
                    debug!(ticket, "stale unread count discarded");
                    return false;
                }
                match badge_text(count) {
                    Some(text) => {
                        self.page.set_text(&self.ids.badge, &text);
                        self.page.set_visible(&self.ids.badge, true);
                    }
                    None => self.page.set_visible(&self.ids.badge, false),
                }
                true
            }
            Err(e) => {
                warn!(error = %e, "unread count refresh failed");
                false
            }
        }
    }

    async fn refresh_all(&self) {
        tokio::join!(self.refresh_list(), self.refresh_badge());
    }

    /// Marks the notification read and follows its link. The read-mark is
    /// never awaited before navigating.
    pub async fn handle_open(&self, id: &NotificationId, link_url: Option<&str>) {
        let client = Arc::clone(&self.client);
        let read_id = id.clone();
        let mark_read = tokio::spawn(async move {
            if let Err(e) = client.mark_read(&read_id).await {
                warn!(error = %e, id = %read_id, "mark read failed");
            }
        });

        match link_url.map(str::trim).filter(|l| !l.is_empty()) {
            Some(url) => {
                info!(id = %id, url, "opening notification link");
                self.interaction.navigate(url).await;
            }
            None => {
                self.close();
                if let Err(e) = mark_read.await {
                    warn!(error = %e, "mark read task failed");
                }
                self.refresh_all().await;
            }
        }
    }

    pub async fn handle_mark_all_read(&self) {
        if let Err(e) = self.client.mark_all_read().await {
            warn!(error = %e, "mark all read failed");
        }
        self.refresh_all().await;
    }

    /// Deletes after explicit confirmation. Failures are shown to the user
    /// and leave the current rendering untouched.
    pub async fn handle_delete(&self, id: &NotificationId) {
        if !self.interaction.confirm(CONFIRM_DELETE_MSG).await {
            debug!(id = %id, "delete cancelled");
            return;
        }
        match self.client.remove(id).await {
            Ok(()) => {
                info!(id = %id, "notification deleted");
                self.refresh_all().await;
            }
            Err(e @ ClientError::Rejected { .. }) => {
                warn!(error = %e, id = %id, "delete rejected");
                self.interaction.alert(DELETE_REJECTED_MSG).await;
            }
            Err(e @ ClientError::Network(_)) => {
                error!(error = %e, id = %id, "delete failed");
                self.interaction.alert(DELETE_FAILED_MSG).await;
            }
        }
    }

    /// Runs the action bound to a row control.
    pub async fn dispatch(&self, action: RowAction) {
        match action {
            RowAction::Open(t) => self.handle_open(&t.id, t.link_url.as_deref()).await,
            RowAction::Delete(id) => self.handle_delete(&id).await,
        }
    }
}
