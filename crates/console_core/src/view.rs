//! Presentation state rendered by front ends. Field identifiers match the
//! element ids of the existing dashboard markup.

pub const SERVER_COMMAND_ID: &str = "server_command";
pub const SERVER_NOTIFY_ID: &str = "server_notify";
pub const CLIENT_COMMAND_ID: &str = "client_command";
pub const CLIENT_NOTIFY_ID: &str = "client_notify";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerCommand {
    #[default]
    Start,
    Stop,
}

impl ServerCommand {
    pub fn label(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Stop => "Stop",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerNotice {
    #[default]
    Unknown,
    Idle,
    Started,
}

impl ServerNotice {
    pub fn text(self) -> &'static str {
        match self {
            Self::Unknown => "Server status unknown",
            Self::Idle => "Server is idle",
            Self::Started => "Devices started successfully!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientCommand {
    #[default]
    Connect,
    Disconnect,
}

impl ClientCommand {
    pub fn label(self) -> &'static str {
        match self {
            Self::Connect => "Connect",
            Self::Disconnect => "Disconnect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientNotice {
    #[default]
    Offline,
    Linked,
}

impl ClientNotice {
    pub fn text(self) -> &'static str {
        match self {
            Self::Offline => "No connection",
            Self::Linked => "Connected to server",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardView {
    pub server_command: ServerCommand,
    pub server_notice: ServerNotice,
    pub client_command: ClientCommand,
    pub client_enabled: bool,
    pub client_notice: ClientNotice,
}

impl DashboardView {
    /// Text content per element id, in page order.
    pub fn fields(&self) -> [(&'static str, &'static str); 4] {
        [
            (SERVER_COMMAND_ID, self.server_command.label()),
            (SERVER_NOTIFY_ID, self.server_notice.text()),
            (CLIENT_COMMAND_ID, self.client_command.label()),
            (CLIENT_NOTIFY_ID, self.client_notice.text()),
        ]
    }
}
