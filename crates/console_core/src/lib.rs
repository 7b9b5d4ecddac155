use std::sync::Arc;

use anyhow::Result;
use shared::domain::{DeviceSelection, ServerRunState};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub mod device_api;
pub mod error;
pub mod notify;
pub mod sanitize;
pub mod session;
pub mod view;
pub mod viewer;

pub use device_api::{DeviceServerApi, HttpDeviceServer};
pub use error::ControlError;
pub use notify::{NotificationBoard, Notices, Notifier};
pub use session::{ControlSession, LinkState, MessageRouter, SessionEvent};
pub use view::DashboardView;

use view::{ClientCommand, ClientNotice, ServerCommand, ServerNotice};

pub const STARTING_TEXT: &str = "Connecting, please wait...";
pub const START_FAILED_TEXT: &str = "Failed to start devices";
pub const STOP_FAILED_TEXT: &str = "Failed to stop devices";

#[derive(Default)]
struct DashboardState {
    run_state: ServerRunState,
    server_command: ServerCommand,
    server_notice: ServerNotice,
    client_enabled: bool,
    selection: DeviceSelection,
}

/// Device-server control, status polling and the client toggle. The
/// running/stopped decision always comes from the last poll.
pub struct Dashboard {
    api: Arc<dyn DeviceServerApi>,
    notifier: Arc<dyn Notifier>,
    session: Arc<ControlSession>,
    inner: Mutex<DashboardState>,
}

impl Dashboard {
    pub fn new(
        api: Arc<dyn DeviceServerApi>,
        notifier: Arc<dyn Notifier>,
        session: Arc<ControlSession>,
    ) -> Self {
        Self {
            api,
            notifier,
            session,
            inner: Mutex::new(DashboardState::default()),
        }
    }

    pub fn session(&self) -> &Arc<ControlSession> {
        &self.session
    }

    /// Page-ready hook: the client control stays disabled until a poll
    /// reports a running server.
    pub async fn on_ready(&self) -> ServerRunState {
        self.inner.lock().await.client_enabled = false;
        self.poll_status().await
    }

    pub async fn set_selection(&self, selection: DeviceSelection) {
        self.inner.lock().await.selection = selection;
    }

    pub async fn selection(&self) -> DeviceSelection {
        self.inner.lock().await.selection.clone()
    }

    pub async fn run_state(&self) -> ServerRunState {
        self.inner.lock().await.run_state
    }

    pub async fn toggle_server(&self) {
        if self.run_state().await.is_running() {
            self.stop_devices().await;
        } else {
            self.start_devices().await;
        }
    }

    pub async fn start_devices(&self) {
        self.notifier.show_info(STARTING_TEXT);
        let selection = self.selection().await;
        match self.api.start(&selection).await {
            Ok(()) => {
                info!(
                    camera = %selection.camera,
                    telescope = %selection.telescope,
                    "devices: start requested"
                );
                self.notifier.dismiss_info();
                self.poll_status().await;
            }
            Err(err) => {
                warn!("devices: start failed: {err:#}");
                self.notifier.dismiss_info();
                self.notifier.show_error(START_FAILED_TEXT);
            }
        }
    }

    pub async fn stop_devices(&self) {
        match self.api.stop().await {
            Ok(()) => {
                info!("devices: stop requested");
                self.poll_status().await;
            }
            Err(err) => {
                warn!("devices: stop failed: {err:#}");
                self.notifier.show_error(STOP_FAILED_TEXT);
            }
        }
    }

    /// Refreshes the run state. A failed poll yields `Unknown` instead of
    /// keeping the previous presentation.
    pub async fn poll_status(&self) -> ServerRunState {
        let run_state = match self.fetch_run_state().await {
            Ok(run_state) => run_state,
            Err(err) => {
                warn!("devices: status poll failed: {err:#}");
                ServerRunState::Unknown
            }
        };

        let mut guard = self.inner.lock().await;
        guard.run_state = run_state;
        match run_state {
            ServerRunState::Running => {
                guard.server_command = ServerCommand::Stop;
                guard.server_notice = ServerNotice::Started;
                guard.client_enabled = true;
            }
            ServerRunState::Stopped => {
                guard.server_command = ServerCommand::Start;
                guard.server_notice = ServerNotice::Idle;
            }
            ServerRunState::Unknown => {
                guard.server_command = ServerCommand::Start;
                guard.server_notice = ServerNotice::Unknown;
            }
        }
        debug!(?run_state, "devices: status refreshed");
        run_state
    }

    async fn fetch_run_state(&self) -> Result<ServerRunState> {
        let status = self.api.status().await?;
        if !status.run_state().is_running() {
            return Ok(ServerRunState::Stopped);
        }
        let drivers = self.api.active_drivers().await?;
        debug!(%drivers, "devices: active drivers");
        Ok(ServerRunState::Running)
    }

    /// Connects or disconnects the control channel. Ignored, returning
    /// `false`, while the client control is disabled.
    pub async fn toggle_client(&self) -> bool {
        if !self.inner.lock().await.client_enabled {
            debug!("control: client toggle ignored while disabled");
            return false;
        }
        self.session.connect_or_toggle().await;
        true
    }

    pub async fn view(&self) -> DashboardView {
        let connected = self.session.is_connected().await;
        let guard = self.inner.lock().await;
        DashboardView {
            server_command: guard.server_command,
            server_notice: guard.server_notice,
            client_command: if connected {
                ClientCommand::Disconnect
            } else {
                ClientCommand::Connect
            },
            client_enabled: guard.client_enabled,
            client_notice: if connected {
                ClientNotice::Linked
            } else {
                ClientNotice::Offline
            },
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
