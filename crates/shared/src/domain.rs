use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerRunState {
    #[default]
    Unknown,
    Stopped,
    Running,
}

impl ServerRunState {
    pub fn is_running(self) -> bool {
        self == Self::Running
    }
}

/// Driver selection sent with a start request. Every field is a free-form
/// driver name taken from the corresponding form control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSelection {
    pub camera: String,
    pub telescope: String,
    pub focuser: String,
    pub filterwheel: String,
    pub solver: String,
    pub guider: String,
    pub plugins: String,
}

impl DeviceSelection {
    pub const KEYS: [&'static str; 7] = [
        "camera",
        "telescope",
        "focuser",
        "filterwheel",
        "solver",
        "guider",
        "plugins",
    ];

    /// Sets the field named `key`. Returns `false` for unknown keys.
    pub fn apply(&mut self, key: &str, value: impl Into<String>) -> bool {
        let slot = match key {
            "camera" => &mut self.camera,
            "telescope" => &mut self.telescope,
            "focuser" => &mut self.focuser,
            "filterwheel" => &mut self.filterwheel,
            "solver" => &mut self.solver,
            "guider" => &mut self.guider,
            "plugins" => &mut self.plugins,
            _ => return false,
        };
        *slot = value.into();
        true
    }
}
