use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Initial window size and title.
pub struct WindowOptions {
    /// Window title.
    pub title: String,
    /// Initial inner width in logical pixels.
    pub width: u32,
    /// Initial inner height in logical pixels.
    pub height: u32,
    /// Hide the cursor and confine it to the window, as a fly camera
    /// expects.
    pub capture_cursor: bool,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: "Desk Scene".to_owned(),
            width: 800,
            height: 600,
            capture_cursor: true,
        }
    }
}
