// config.rs - Window creation parameters and hints
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SessionResult;

/// Graphics API attached to a new window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientApi {
    /// Create a wgpu device and surface for the hardware path
    #[default]
    Wgpu,
    /// Software backbuffer only; hardware operations are no-ops
    NoApi,
}

/// Creation hints applied when the window is opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowHints {
    pub maximized: bool,
    pub resizable: bool,
    /// Hide the OS title bar and borders
    pub custom_title_bar: bool,
    pub client_api: ClientApi,
    /// Also fire the key callback on release, not just press/repeat
    pub report_key_release: bool,
}

impl Default for WindowHints {
    fn default() -> Self {
        Self {
            maximized: false,
            resizable: true,
            custom_title_bar: false,
            client_api: ClientApi::Wgpu,
            report_key_release: true,
        }
    }
}

/// Everything needed to open one window session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Requested client width in physical pixels
    pub width: u32,
    /// Requested client height in physical pixels
    pub height: u32,
    pub title: String,
    pub hints: WindowHints,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "blitwin".to_string(),
            hints: WindowHints::default(),
        }
    }
}

impl WindowConfig {
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Self {
        Self {
            width,
            height,
            title: title.into(),
            hints: WindowHints::default(),
        }
    }

    pub fn with_hints(mut self, hints: WindowHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_client_api(mut self, api: ClientApi) -> Self {
        self.hints.client_api = api;
        self
    }

    pub fn from_json_str(json: &str) -> SessionResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> SessionResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
