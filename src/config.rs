use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the history engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of entries kept on the undo stack; the oldest entry is
    /// evicted first once the bound is exceeded
    pub max_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_size: 50 }
    }
}

/// Configuration for the input dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// On-screen distance an arrow key moves the active object, in pixels.
    /// The applied scene distance is divided by the current zoom.
    pub arrow_key_distance: f32,
    /// Largest per-axis centroid delta a two-finger pan will apply; anything
    /// above it is treated as touch noise and the whole update is dropped
    pub touch_pan_max_jump: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            arrow_key_distance: 5.0,
            touch_pan_max_jump: 200.0,
        }
    }
}

/// Configuration for the notification bus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Trailing-edge debounce window for the aggregate-change channel
    pub debounce: Duration,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1000),
        }
    }
}

/// Top-level configuration aggregating every component's section.
///
/// Overriding is field-wise: start from `EditorConfig::default()` and replace
/// whole sections or individual fields with struct update syntax.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub input: InputConfig,
    pub notifications: NotificationConfig,
}
