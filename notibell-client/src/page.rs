//! The host page contract: addressable display regions, pointer events and
//! the blocking user prompts the widget relies on.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use notibell_shared::NotificationId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;

const POINTER_CHANNEL_CAPACITY: usize = 64;

/// Stable identifiers of the elements the widget drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub badge: String,
    /// Region bounding "inside the widget" for outside-click detection.
    pub wrapper: String,
    pub dropdown: String,
    pub list: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            badge: "notificationBadge".into(),
            wrapper: "notificationWrapper".into(),
            dropdown: "notificationDropdown".into(),
            list: "notificationList".into(),
        }
    }
}

/// A pointer interaction captured at document level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerEvent {
    pub target: String,
}

/// Where clicking a row's body leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTarget {
    pub id: NotificationId,
    pub link_url: Option<String>,
}

/// An action bound to a control inside a rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Open(OpenTarget),
    Delete(NotificationId),
}

/// One rendered row of the list container.
///
/// The open region and the delete control are bound separately, so a delete
/// never doubles as an open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub markup: String,
    /// Plain-text rendition for text-only hosts.
    pub label: String,
    pub open: Option<OpenTarget>,
    pub delete: Option<NotificationId>,
}

impl ListItem {
    pub fn is_placeholder(&self) -> bool {
        self.open.is_none() && self.delete.is_none()
    }
}

/// Element-level mutations. Calls addressing a missing element are ignored.
pub trait Page: Send + Sync {
    fn set_visible(&self, id: &str, visible: bool);
    fn is_visible(&self, id: &str) -> bool;
    fn set_text(&self, id: &str, text: &str);
    fn replace_list(&self, id: &str, items: Vec<ListItem>);
    /// Whether `target` is `ancestor` or nested in it; `None` when
    /// `ancestor` does not exist.
    fn contains(&self, ancestor: &str, target: &str) -> Option<bool>;
    fn subscribe_pointer(&self) -> broadcast::Receiver<PointerEvent>;
}

/// User-facing side effects outside the widget's own regions.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// Blocking yes/no prompt.
    async fn confirm(&self, message: &str) -> bool;
    async fn alert(&self, message: &str);
    async fn navigate(&self, url: &str);
}

#[derive(Debug, Clone, Default)]
struct Element {
    parent: Option<String>,
    visible: bool,
    text: String,
    items: Vec<ListItem>,
}

/// In-memory element tree implementing [`Page`].
pub struct MemoryPage {
    elements: Mutex<HashMap<String, Element>>,
    pointer_tx: broadcast::Sender<PointerEvent>,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPage {
    pub const BODY: &'static str = "pageBody";

    pub fn new() -> Self {
        let (pointer_tx, _) = broadcast::channel(POINTER_CHANNEL_CAPACITY);
        Self {
            elements: Mutex::new(HashMap::new()),
            pointer_tx,
        }
    }

    /// Page with the widget markup in place: a body holding the wrapper,
    /// which holds the badge and the dropdown, which holds the list. Badge
    /// and dropdown start hidden.
    pub fn with_widget_layout(ids: &ElementIds) -> Self {
        let page = Self::new();
        page.insert(Self::BODY, None, true);
        page.insert(&ids.wrapper, Some(Self::BODY), true);
        page.insert(&ids.badge, Some(&ids.wrapper), false);
        page.insert(&ids.dropdown, Some(&ids.wrapper), false);
        page.insert(&ids.list, Some(&ids.dropdown), true);
        page
    }

    pub fn insert(&self, id: &str, parent: Option<&str>, visible: bool) {
        self.lock().insert(
            id.to_string(),
            Element {
                parent: parent.map(str::to_string),
                visible,
                ..Element::default()
            },
        );
    }

    /// Delivers a pointer interaction to every document-level subscriber.
    pub fn click(&self, target: &str) {
        // No subscribers is fine: nothing listens yet.
        let _ = self.pointer_tx.send(PointerEvent {
            target: target.to_string(),
        });
    }

    pub fn text(&self, id: &str) -> Option<String> {
        self.lock().get(id).map(|e| e.text.clone())
    }

    pub fn items(&self, id: &str) -> Vec<ListItem> {
        self.lock()
            .get(id)
            .map(|e| e.items.clone())
            .unwrap_or_default()
    }

    /// Action bound to the open region of the row for `id`.
    pub fn open_action(&self, list: &str, id: &NotificationId) -> Option<RowAction> {
        self.items(list)
            .into_iter()
            .filter_map(|item| item.open)
            .find(|t| &t.id == id)
            .map(RowAction::Open)
    }

    /// Action bound to the delete control of the row for `id`.
    pub fn delete_action(&self, list: &str, id: &NotificationId) -> Option<RowAction> {
        self.items(list)
            .into_iter()
            .filter_map(|item| item.delete)
            .find(|d| d == id)
            .map(RowAction::Delete)
    }

    pub fn snapshot(&self, ids: &ElementIds) -> PageSnapshot {
        let elements = self.lock();
        let badge = elements
            .get(&ids.badge)
            .filter(|e| e.visible)
            .map(|e| e.text.clone());
        let dropdown_open = elements.get(&ids.dropdown).is_some_and(|e| e.visible);
        let rows = elements
            .get(&ids.list)
            .map(|e| e.items.iter().map(|i| i.label.clone()).collect())
            .unwrap_or_default();
        PageSnapshot {
            badge,
            dropdown_open,
            rows,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Element>> {
        self.elements
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Page for MemoryPage {
    fn set_visible(&self, id: &str, visible: bool) {
        match self.lock().get_mut(id) {
            Some(e) => e.visible = visible,
            None => warn!(element = id, "set_visible: no such element"),
        }
    }

    fn is_visible(&self, id: &str) -> bool {
        self.lock().get(id).is_some_and(|e| e.visible)
    }

    fn set_text(&self, id: &str, text: &str) {
        match self.lock().get_mut(id) {
            Some(e) => e.text = text.to_string(),
            None => warn!(element = id, "set_text: no such element"),
        }
    }

    fn replace_list(&self, id: &str, items: Vec<ListItem>) {
        match self.lock().get_mut(id) {
            Some(e) => e.items = items,
            None => warn!(element = id, "replace_list: no such element"),
        }
    }

    fn contains(&self, ancestor: &str, target: &str) -> Option<bool> {
        let elements = self.lock();
        if !elements.contains_key(ancestor) {
            return None;
        }
        let mut cursor = Some(target);
        while let Some(id) = cursor {
            if id == ancestor {
                return Some(true);
            }
            cursor = elements.get(id).and_then(|e| e.parent.as_deref());
        }
        Some(false)
    }

    fn subscribe_pointer(&self) -> broadcast::Receiver<PointerEvent> {
        self.pointer_tx.subscribe()
    }
}

/// Point-in-time view of the widget regions of a [`MemoryPage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    /// Badge text, `None` while hidden.
    pub badge: Option<String>,
    pub dropdown_open: bool,
    pub rows: Vec<String>,
}

impl fmt::Display for PageSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.badge {
            Some(text) => write!(f, "[알림 {}]", text)?,
            None => write!(f, "[알림]")?,
        }
        if !self.dropdown_open {
            return writeln!(f);
        }
        writeln!(f, " ▾")?;
        for row in &self.rows {
            writeln!(f, "  {}", row)?;
        }
        Ok(())
    }
}
