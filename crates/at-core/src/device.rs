//! Device-level settings carried in the configuration document

use crate::variable::truncate_label;

/// Network credentials, device name and the global run switch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSettings {
    pub ssid: String,
    pub password: String,
    pub device_name: String,
    /// Whether the rule engine should run
    pub run: bool,
}

impl DeviceSettings {
    pub fn new(ssid: &str, password: &str, device_name: &str, run: bool) -> Self {
        Self {
            ssid: truncate_label(ssid),
            password: truncate_label(password),
            device_name: truncate_label(device_name),
            run,
        }
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self::new("advancedtimer", "12345678", "AdvancedTimer", false)
    }
}
