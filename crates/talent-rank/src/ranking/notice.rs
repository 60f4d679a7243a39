use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Transient banner text shown after dashboard actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub message: String,
    pub issued_at: DateTime<Utc>,
}

/// Holds the current notice and the timer that will clear it.
///
/// Posting a notice cancels the previous timer; dropping the notifier cancels the live one.
#[derive(Debug)]
pub struct Notifier {
    current: Arc<Mutex<Option<Notice>>>,
    timer: Option<JoinHandle<()>>,
    ttl: Duration,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
            timer: None,
            ttl,
        }
    }

    pub fn show(&mut self, message: impl Into<String>) {
        self.cancel_timer();

        let notice = Notice {
            message: message.into(),
            issued_at: Utc::now(),
        };
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(notice);

        // Outside a runtime the notice stays until replaced or dismissed.
        if let Ok(handle) = Handle::try_current() {
            let slot = Arc::clone(&self.current);
            let ttl = self.ttl;
            self.timer = Some(handle.spawn(async move {
                tokio::time::sleep(ttl).await;
                *slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
            }));
        }
    }

    pub fn current(&self) -> Option<Notice> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn message(&self) -> Option<String> {
        self.current().map(|notice| notice.message)
    }

    pub fn dismiss(&mut self) {
        self.cancel_timer();
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
