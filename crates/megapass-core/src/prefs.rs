//! User preferences
//!
//! Simple scalar settings with defaults: color theme, credential digit
//! width, and the network name embedded in Wi-Fi join codes.

use serde::{Deserialize, Serialize};

use crate::formatter::DigitWidth;
use crate::DEFAULT_NETWORK_NAME;

/// Color theme, dark by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

/// The full preference set
///
/// Missing fields fall back to their defaults so a partially present store
/// still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Theme,

    #[serde(rename = "digit_preference", default)]
    pub digit_width: DigitWidth,

    #[serde(rename = "ssid", default = "default_network_name")]
    pub network_name: String,
}

fn default_network_name() -> String {
    DEFAULT_NETWORK_NAME.to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            digit_width: DigitWidth::default(),
            network_name: default_network_name(),
        }
    }
}
