//! Turns platform events into input-state updates and callback calls.

use crate::traits::{GraphicsContext, NativeWindow};

use super::backbuffer::BackbufferSlot;
use super::callbacks::{CallbackRegistry, ResizeEvent};
use super::events::PlatformEvent;
use super::extent::ClientSize;
use super::input::{Action, InputState};

/// The parts of a session one event may touch
pub(crate) struct EventTarget<'a, W: NativeWindow> {
    pub window: &'a mut W,
    pub context: Option<&'a mut W::Context>,
    pub input: &'a mut InputState,
    pub callbacks: &'a mut CallbackRegistry,
    pub backbuffer: &'a mut BackbufferSlot<W::Surface>,
    pub close_requested: &'a mut bool,
    pub client_size: &'a mut ClientSize,
    pub report_key_release: bool,
    pub backbuffer_follows_resize: bool,
}

/// Apply one event synchronously: state first, then the callback
pub(crate) fn translate<W: NativeWindow>(event: PlatformEvent, target: &mut EventTarget<'_, W>) {
    match event {
        PlatformEvent::Close => *target.close_requested = true,
        PlatformEvent::Resized(size) => resize(size, target),
        PlatformEvent::Key {
            code,
            pressed,
            repeat,
        } => {
            target.input.set_key(code, pressed);

            let action = match (pressed, repeat) {
                (true, true) => Action::Repeat,
                (true, false) => Action::Press,
                (false, _) => Action::Release,
            };
            if action == Action::Release && !target.report_key_release {
                return;
            }
            if let Some(callback) = target.callbacks.key.as_mut() {
                callback(code, action);
            }
        }
        PlatformEvent::Char(c) => {
            if let Some(callback) = target.callbacks.char.as_mut() {
                callback(c);
            }
        }
        PlatformEvent::CursorMoved { x, y } => {
            target.input.set_cursor(x, y);
            if let Some(callback) = target.callbacks.cursor_pos.as_mut() {
                callback(x, y);
            }
        }
        PlatformEvent::MouseButton { button, pressed } => {
            target.input.set_mouse_button(button, pressed);
            let action = if pressed { Action::Press } else { Action::Release };
            // Modifiers come from the key table as it stands now
            let mods = target.input.modifiers();
            if let Some(callback) = target.callbacks.mouse_button.as_mut() {
                callback(button, action, mods);
            }
        }
        PlatformEvent::Scroll { dx, dy } => {
            if let Some(callback) = target.callbacks.scroll.as_mut() {
                callback(dx, dy);
            }
        }
        PlatformEvent::FilesDropped(paths) => {
            log::debug!("{} file(s) dropped", paths.len());
            if let Some(callback) = target.callbacks.drop.as_mut() {
                callback(&paths[..]);
            }
        }
    }
}

/// The backbuffer is rebuilt before the callback runs, so the callback
/// already sees a buffer matching the new client size.
fn resize<W: NativeWindow>(size: ClientSize, target: &mut EventTarget<'_, W>) {
    *target.client_size = size;

    // A zero-area client (minimized) keeps the current buffer
    if target.backbuffer_follows_resize && target.backbuffer.is_active() && !size.is_empty() {
        let window = &mut *target.window;
        if target.backbuffer.ensure(size, |s| window.create_surface(s)).is_none() {
            log::warn!("backbuffer lost on resize to {}x{}", size.width, size.height);
        }
    }

    if let Some(context) = target.context.as_deref_mut() {
        context.resize(size);
    }

    if let Some(callback) = target.callbacks.resize.as_mut() {
        callback(ResizeEvent {
            size,
            backbuffer: target.backbuffer.size(),
        });
    }
}
