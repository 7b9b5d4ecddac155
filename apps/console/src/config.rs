use std::{collections::HashMap, fs, path::Path};

use shared::domain::DeviceSelection;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "console.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub control_url: String,
    pub devices: DeviceSelection,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".into(),
            control_url: "ws://localhost:5000".into(),
            devices: DeviceSelection::default(),
        }
    }
}

pub fn load_settings(path: Option<&Path>) -> Settings {
    let mut settings = Settings::default();

    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    if let Ok(raw) = fs::read_to_string(path) {
        apply_file_config(&mut settings, &raw);
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file_config(settings: &mut Settings, raw: &str) {
    let file_cfg = match toml::from_str::<HashMap<String, String>>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            warn!("ignoring malformed config file: {err}");
            return;
        }
    };

    for (key, value) in file_cfg {
        match key.as_str() {
            "server_url" => settings.server_url = value,
            "control_url" => settings.control_url = value,
            _ => {
                if !settings.devices.apply(&key, value) {
                    warn!(key, "ignoring unknown config key");
                }
            }
        }
    }
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("DEVICE_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("CONTROL_URL") {
        settings.control_url = v;
    }
    if let Some(v) = var("APP__CONTROL_URL") {
        settings.control_url = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_config_sets_urls_and_devices() {
        let mut settings = Settings::default();
        apply_file_config(
            &mut settings,
            r#"
server_url = "http://observatory:8080"
camera = "indi_asi_ccd"
guider = "phd2"
"#,
        );

        assert_eq!(settings.server_url, "http://observatory:8080");
        assert_eq!(settings.control_url, "ws://localhost:5000");
        assert_eq!(settings.devices.camera, "indi_asi_ccd");
        assert_eq!(settings.devices.guider, "phd2");
        assert!(settings.devices.telescope.is_empty());
    }

    #[test]
    fn malformed_file_keeps_defaults() {
        let mut settings = Settings::default();
        apply_file_config(&mut settings, "server_url = [1, 2");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn prefixed_env_wins_over_plain_env() {
        let mut settings = Settings::default();
        let env = HashMap::from([
            ("CONTROL_URL", "ws://plain:5000"),
            ("APP__CONTROL_URL", "ws://prefixed:5000"),
            ("DEVICE_SERVER_URL", "http://plain:8080"),
        ]);
        apply_env(&mut settings, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.control_url, "ws://prefixed:5000");
        assert_eq!(settings.server_url, "http://plain:8080");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let settings = load_settings(Some(Path::new("/nonexistent/console.toml")));
        assert_eq!(settings.devices, DeviceSelection::default());
    }
}
