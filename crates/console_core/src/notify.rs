//! Notification surface: transient error, info and warning regions plus the
//! single-line general log.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tracing::{debug, error, info, warn};

/// Delay between `dismiss_info` and the info region actually hiding.
pub const INFO_HIDE_DELAY: Duration = Duration::from_millis(600);

pub const ERROR_MESSAGE_ID: &str = "errorMessage";
pub const ERROR_MODAL_ID: &str = "centralModalDanger";
pub const INFO_MESSAGE_ID: &str = "infoModalMessage";
pub const INFO_MODAL_ID: &str = "infoModalGeneric";
pub const GENERAL_LOG_ID: &str = "generalLogText";

/// Sink for user-visible notifications. Calls never fail.
pub trait Notifier: Send + Sync {
    fn show_error(&self, text: &str);
    fn hide_error(&self);
    fn show_info(&self, text: &str);
    /// Hides the info region after [`INFO_HIDE_DELAY`].
    fn dismiss_info(&self);
    /// Reveals the error region without touching its text.
    fn show_warning(&self);
    fn hide_warning(&self);
    fn log_text(&self, text: &str);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notices {
    pub error_text: String,
    pub error_visible: bool,
    pub info_text: String,
    pub info_visible: bool,
    pub log_line: String,
}

#[derive(Default)]
struct BoardState {
    notices: Notices,
    // Bumped on every show_info so a pending hide can tell it went stale.
    info_generation: u64,
}

/// In-memory [`Notifier`] that front ends render from [`NotificationBoard::snapshot`].
#[derive(Clone, Default)]
pub struct NotificationBoard {
    // std lock: every `Notifier` call is synchronous and never awaits while holding it.
    state: Arc<Mutex<BoardState>>,
}

impl NotificationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Notices {
        self.lock().notices.clone()
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn hide_info_if_current(&self, generation: u64) {
        let mut state = self.lock();
        if state.info_generation == generation {
            state.notices.info_visible = false;
        }
    }
}

impl Notifier for NotificationBoard {
    fn show_error(&self, text: &str) {
        error!(region = ERROR_MODAL_ID, "{text}");
        let mut state = self.lock();
        state.notices.error_text = text.to_string();
        state.notices.error_visible = true;
    }

    fn hide_error(&self) {
        self.lock().notices.error_visible = false;
    }

    fn show_info(&self, text: &str) {
        info!(region = INFO_MODAL_ID, "{text}");
        let mut state = self.lock();
        state.info_generation += 1;
        state.notices.info_text = text.to_string();
        state.notices.info_visible = true;
    }

    fn dismiss_info(&self) {
        let generation = self.lock().info_generation;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let board = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(INFO_HIDE_DELAY).await;
                    board.hide_info_if_current(generation);
                });
            }
            Err(_) => {
                debug!("no runtime available, hiding info region immediately");
                self.hide_info_if_current(generation);
            }
        }
    }

    fn show_warning(&self) {
        let mut state = self.lock();
        warn!(region = ERROR_MODAL_ID, "{}", state.notices.error_text);
        state.notices.error_visible = true;
    }

    fn hide_warning(&self) {
        self.lock().notices.error_visible = false;
    }

    fn log_text(&self, text: &str) {
        info!(region = GENERAL_LOG_ID, "{text}");
        self.lock().notices.log_line = text.to_string();
    }
}

#[cfg(test)]
#[path = "tests/notify_tests.rs"]
mod tests;
