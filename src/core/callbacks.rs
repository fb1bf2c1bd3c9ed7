use std::path::PathBuf;

use super::extent::ClientSize;
use super::input::{Action, KeyCode, Modifiers, MouseButton};

/// Payload handed to the resize callback.
///
/// `backbuffer` reports the software buffer's size after any recreation
/// triggered by this resize, or `None` when no buffer is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    pub size: ClientSize,
    pub backbuffer: Option<ClientSize>,
}

pub type KeyCallback = Box<dyn FnMut(KeyCode, Action)>;
pub type CharCallback = Box<dyn FnMut(char)>;
pub type MouseButtonCallback = Box<dyn FnMut(MouseButton, Action, Modifiers)>;
pub type CursorPosCallback = Box<dyn FnMut(f64, f64)>;
pub type ScrollCallback = Box<dyn FnMut(f64, f64)>;
/// Receives the dropped paths; the slice is only borrowed for the call
pub type DropCallback = Box<dyn FnMut(&[PathBuf])>;
pub type ResizeCallback = Box<dyn FnMut(ResizeEvent)>;

/// One optional handler slot per event category.
///
/// Not multicast: setting a slot replaces whatever was there and hands the
/// previous handler back to the caller.
#[derive(Default)]
pub struct CallbackRegistry {
    pub(crate) key: Option<KeyCallback>,
    pub(crate) char: Option<CharCallback>,
    pub(crate) mouse_button: Option<MouseButtonCallback>,
    pub(crate) cursor_pos: Option<CursorPosCallback>,
    pub(crate) scroll: Option<ScrollCallback>,
    pub(crate) drop: Option<DropCallback>,
    pub(crate) resize: Option<ResizeCallback>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, callback: Option<KeyCallback>) -> Option<KeyCallback> {
        std::mem::replace(&mut self.key, callback)
    }

    pub fn set_char(&mut self, callback: Option<CharCallback>) -> Option<CharCallback> {
        std::mem::replace(&mut self.char, callback)
    }

    pub fn set_mouse_button(
        &mut self,
        callback: Option<MouseButtonCallback>,
    ) -> Option<MouseButtonCallback> {
        std::mem::replace(&mut self.mouse_button, callback)
    }

    pub fn set_cursor_pos(&mut self, callback: Option<CursorPosCallback>) -> Option<CursorPosCallback> {
        std::mem::replace(&mut self.cursor_pos, callback)
    }

    pub fn set_scroll(&mut self, callback: Option<ScrollCallback>) -> Option<ScrollCallback> {
        std::mem::replace(&mut self.scroll, callback)
    }

    pub fn set_drop(&mut self, callback: Option<DropCallback>) -> Option<DropCallback> {
        std::mem::replace(&mut self.drop, callback)
    }

    pub fn set_resize(&mut self, callback: Option<ResizeCallback>) -> Option<ResizeCallback> {
        std::mem::replace(&mut self.resize, callback)
    }

    /// Drop every registered handler
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("key", &self.key.is_some())
            .field("char", &self.char.is_some())
            .field("mouse_button", &self.mouse_button.is_some())
            .field("cursor_pos", &self.cursor_pos.is_some())
            .field("scroll", &self.scroll.is_some())
            .field("drop", &self.drop.is_some())
            .field("resize", &self.resize.is_some())
            .finish()
    }
}
