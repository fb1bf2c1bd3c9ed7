pub mod backends;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod traits;

pub use crate::config::{ClientApi, WindowConfig, WindowHints};
pub use crate::core::{
    Action, Backbuffer, ClientSize, KeyCode, Modifiers, MouseButton, PaceOutcome, PresentPath,
    ResizeEvent, Runtime, WindowSession,
};
pub use crate::error::{SessionError, SessionResult};
