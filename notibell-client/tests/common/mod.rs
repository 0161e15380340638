#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use notibell_client::page::{ElementIds, Interaction, MemoryPage};
use notibell_client::{ClientError, NotificationClient, ViewController};
use notibell_shared::NotificationId;
use notibell_shared::api::NotificationDto;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Count,
    List,
    MarkRead(NotificationId),
    MarkAllRead,
    Remove(NotificationId),
}

/// Counting stand-in for the notification service.
pub struct FakeClient {
    calls: Mutex<Vec<Call>>,
    count: Mutex<Result<u64, ClientError>>,
    list: Mutex<Result<Vec<NotificationDto>, ClientError>>,
    remove: Mutex<Result<(), ClientError>>,
    mark_all: Mutex<Result<(), ClientError>>,
    /// Per-call (delay, count) overrides, consumed in order.
    count_script: Mutex<VecDeque<(Duration, u64)>>,
    /// Per-call (delay, items) overrides, consumed in order.
    list_script: Mutex<VecDeque<(Duration, Vec<NotificationDto>)>>,
    mark_read_delay: Mutex<Duration>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            count: Mutex::new(Ok(0)),
            list: Mutex::new(Ok(Vec::new())),
            remove: Mutex::new(Ok(())),
            mark_all: Mutex::new(Ok(())),
            count_script: Mutex::new(VecDeque::new()),
            list_script: Mutex::new(VecDeque::new()),
            mark_read_delay: Mutex::new(Duration::ZERO),
        }
    }

    pub fn set_count(&self, value: Result<u64, ClientError>) {
        *self.count.lock().unwrap() = value;
    }

    pub fn set_list(&self, value: Result<Vec<NotificationDto>, ClientError>) {
        *self.list.lock().unwrap() = value;
    }

    pub fn set_remove(&self, value: Result<(), ClientError>) {
        *self.remove.lock().unwrap() = value;
    }

    pub fn set_mark_all(&self, value: Result<(), ClientError>) {
        *self.mark_all.lock().unwrap() = value;
    }

    pub fn script_count(&self, delay: Duration, count: u64) {
        self.count_script.lock().unwrap().push_back((delay, count));
    }

    pub fn script_list(&self, delay: Duration, items: Vec<NotificationDto>) {
        self.list_script.lock().unwrap().push_back((delay, items));
    }

    pub fn set_mark_read_delay(&self, delay: Duration) {
        *self.mark_read_delay.lock().unwrap() = delay;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl NotificationClient for FakeClient {
    async fn fetch_unread_count(&self) -> Result<u64, ClientError> {
        self.record(Call::Count);
        let scripted = self.count_script.lock().unwrap().pop_front();
        if let Some((delay, count)) = scripted {
            tokio::time::sleep(delay).await;
            return Ok(count);
        }
        self.count.lock().unwrap().clone()
    }

    async fn fetch_list(&self) -> Result<Vec<NotificationDto>, ClientError> {
        self.record(Call::List);
        let scripted = self.list_script.lock().unwrap().pop_front();
        if let Some((delay, items)) = scripted {
            tokio::time::sleep(delay).await;
            return Ok(items);
        }
        self.list.lock().unwrap().clone()
    }

    async fn mark_read(&self, id: &NotificationId) -> Result<(), ClientError> {
        self.record(Call::MarkRead(id.clone()));
        let delay = *self.mark_read_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<(), ClientError> {
        self.record(Call::MarkAllRead);
        self.mark_all.lock().unwrap().clone()
    }

    async fn remove(&self, id: &NotificationId) -> Result<(), ClientError> {
        self.record(Call::Remove(id.clone()));
        self.remove.lock().unwrap().clone()
    }
}

/// Prompt double: fixed confirmation answer, records everything shown.
pub struct ScriptedInteraction {
    answer: AtomicBool,
    pub confirms: AtomicUsize,
    alerts: Mutex<Vec<String>>,
    navigations: Mutex<Vec<String>>,
}

impl ScriptedInteraction {
    pub fn new(answer: bool) -> Self {
        Self {
            answer: AtomicBool::new(answer),
            confirms: AtomicUsize::new(0),
            alerts: Mutex::new(Vec::new()),
            navigations: Mutex::new(Vec::new()),
        }
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

#[async_trait]
impl Interaction for ScriptedInteraction {
    async fn confirm(&self, _message: &str) -> bool {
        self.confirms.fetch_add(1, Ordering::SeqCst);
        self.answer.load(Ordering::SeqCst)
    }

    async fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    async fn navigate(&self, url: &str) {
        self.navigations.lock().unwrap().push(url.to_string());
    }
}

pub struct Harness {
    pub client: Arc<FakeClient>,
    pub page: Arc<MemoryPage>,
    pub interaction: Arc<ScriptedInteraction>,
    pub view: Arc<ViewController>,
    pub ids: ElementIds,
}

impl Harness {
    pub fn new(confirm_answer: bool) -> Self {
        Self::build(confirm_answer, false)
    }

    pub fn with_stale_guard() -> Self {
        Self::build(true, true)
    }

    fn build(confirm_answer: bool, discard_stale: bool) -> Self {
        let ids = ElementIds::default();
        let client = Arc::new(FakeClient::new());
        let page = Arc::new(MemoryPage::with_widget_layout(&ids));
        let interaction = Arc::new(ScriptedInteraction::new(confirm_answer));
        let view = Arc::new(
            ViewController::new(
                client.clone(),
                page.clone(),
                interaction.clone(),
                ids.clone(),
            )
            .with_stale_guard(discard_stale),
        );
        Self {
            client,
            page,
            interaction,
            view,
            ids,
        }
    }

    pub fn badge(&self) -> Option<String> {
        self.page.snapshot(&self.ids).badge
    }

    pub fn rows(&self) -> Vec<notibell_client::page::ListItem> {
        self.page.items(&self.ids.list)
    }
}

pub fn minutes_ago(mins: i64) -> NaiveDateTime {
    Local::now().naive_local() - chrono::Duration::minutes(mins)
}

pub fn notification(id: i64, title: &str, is_read: bool, link: Option<&str>) -> NotificationDto {
    NotificationDto {
        id: NotificationId::from(id),
        notification_type: None,
        title: Some(title.to_string()),
        content: Some(format!("{title} content")),
        link_url: link.map(str::to_string),
        is_read,
        created_at: Some(minutes_ago(5)),
        read_at: None,
    }
}

/// Yields until `pred` holds; spawned tasks get a chance to run.
pub async fn wait_until(pred: impl Fn() -> bool) {
    for _ in 0..1000 {
        if pred() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
