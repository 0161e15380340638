use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::view::ViewController;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

static GLOBAL: OnceCell<PollScheduler> = OnceCell::new();

/// Repeating unread-count refresh. At most one timer runs per scheduler.
pub struct PollScheduler {
    interval: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PollScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            handle: Mutex::new(None),
        }
    }

    /// The page-lifetime scheduler shared by the whole process. The interval
    /// of the first call sticks.
    pub fn global(interval: Duration) -> &'static PollScheduler {
        GLOBAL.get_or_init(|| PollScheduler::new(interval))
    }

    /// Starts polling: one refresh right away, then one per interval.
    /// Returns `false`, starting nothing, when already started.
    pub async fn start(&self, view: Arc<ViewController>) -> bool {
        let mut guard = self.handle.lock().await;
        if guard.is_some() {
            debug!("poll scheduler already running; ignoring start");
            return false;
        }
        let period = self.interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                // Detached so a hung request never holds back the next tick.
                let view = Arc::clone(&view);
                tokio::spawn(async move {
                    view.refresh_badge().await;
                });
            }
        });
        *guard = Some(handle);
        info!(interval_secs = period.as_secs(), "unread count polling started");
        true
    }

    pub async fn is_started(&self) -> bool {
        self.handle.lock().await.is_some()
    }

    pub async fn shutdown(&self) {
        let mut guard = self.handle.lock().await;
        if let Some(h) = guard.take() {
            h.abort();
            info!("unread count polling stopped");
        }
    }
}
