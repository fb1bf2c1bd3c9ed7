use std::collections::VecDeque;
use std::path::PathBuf;

use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::PhysicalKey;

use super::extent::ClientSize;
use super::input::{KeyCode, MouseButton};

/// Backend-assigned identity of a native window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowKey(pub u64);

/// Platform-neutral raw window message
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    Close,
    Resized(ClientSize),
    Key { code: KeyCode, pressed: bool, repeat: bool },
    Char(char),
    CursorMoved { x: f64, y: f64 },
    MouseButton { button: MouseButton, pressed: bool },
    Scroll { dx: f64, dy: f64 },
    /// Ordered file list from one drag-and-drop gesture
    FilesDropped(Vec<PathBuf>),
}

/// Events gathered during one pump, in platform delivery order.
///
/// Consecutive file drops for the same window collapse into one
/// `FilesDropped` so a multi-file gesture reaches the host as one list.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<(WindowKey, PlatformEvent)>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: WindowKey, event: PlatformEvent) {
        if let PlatformEvent::FilesDropped(mut paths) = event {
            if let Some((last_key, PlatformEvent::FilesDropped(pending))) = self.events.back_mut() {
                if *last_key == key {
                    pending.append(&mut paths);
                    return;
                }
            }
            self.events.push_back((key, PlatformEvent::FilesDropped(paths)));
        } else {
            self.events.push_back((key, event));
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (WindowKey, PlatformEvent)> + '_ {
        self.events.drain(..)
    }
}

/// Translate a winit `WindowEvent` into zero or more platform events.
///
/// A key press carrying text yields the key event first, then one `Char`
/// per code point, matching the key-down-then-character order of native
/// message loops.
pub fn from_window_event(event: &WindowEvent, out: &mut Vec<PlatformEvent>) {
    match event {
        WindowEvent::CloseRequested => out.push(PlatformEvent::Close),
        WindowEvent::Resized(size) => {
            out.push(PlatformEvent::Resized(ClientSize::new(size.width, size.height)))
        }
        WindowEvent::KeyboardInput { event, .. } => {
            let pressed = event.state == ElementState::Pressed;
            if let PhysicalKey::Code(code) = event.physical_key {
                out.push(PlatformEvent::Key {
                    code,
                    pressed,
                    repeat: event.repeat,
                });
            }
            if pressed {
                if let Some(text) = &event.text {
                    out.extend(text.chars().map(PlatformEvent::Char));
                }
            }
        }
        WindowEvent::CursorMoved { position, .. } => out.push(PlatformEvent::CursorMoved {
            x: position.x,
            y: position.y,
        }),
        WindowEvent::MouseInput { state, button, .. } => {
            if let Some(button) = map_mouse_button(*button) {
                out.push(PlatformEvent::MouseButton {
                    button,
                    pressed: *state == ElementState::Pressed,
                });
            }
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x as f64, *y as f64),
                MouseScrollDelta::PixelDelta(pos) => (pos.x, pos.y),
            };
            out.push(PlatformEvent::Scroll { dx, dy });
        }
        WindowEvent::DroppedFile(path) => out.push(PlatformEvent::FilesDropped(vec![path.clone()])),
        _ => {}
    }
}

/// Map winit mouse buttons onto the three tracked buttons
fn map_mouse_button(button: winit::event::MouseButton) -> Option<MouseButton> {
    match button {
        winit::event::MouseButton::Left => Some(MouseButton::Left),
        winit::event::MouseButton::Middle => Some(MouseButton::Middle),
        winit::event::MouseButton::Right => Some(MouseButton::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: winit's KeyEvent has private platform fields, so keyboard
    // translation is covered through the headless backend instead.

    #[test]
    fn test_close_and_resize_translation() {
        let mut out = Vec::new();
        from_window_event(&WindowEvent::CloseRequested, &mut out);
        from_window_event(
            &WindowEvent::Resized(winit::dpi::PhysicalSize::new(800, 400)),
            &mut out,
        );
        assert_eq!(
            out,
            vec![
                PlatformEvent::Close,
                PlatformEvent::Resized(ClientSize::new(800, 400)),
            ]
        );
    }

    #[test]
    fn test_dropped_file_translation() {
        let mut out = Vec::new();
        from_window_event(&WindowEvent::DroppedFile(PathBuf::from("a.png")), &mut out);
        assert_eq!(out, vec![PlatformEvent::FilesDropped(vec![PathBuf::from("a.png")])]);
    }

    #[test]
    fn test_mouse_button_mapping() {
        assert_eq!(map_mouse_button(winit::event::MouseButton::Left), Some(MouseButton::Left));
        assert_eq!(map_mouse_button(winit::event::MouseButton::Middle), Some(MouseButton::Middle));
        assert_eq!(map_mouse_button(winit::event::MouseButton::Right), Some(MouseButton::Right));
        assert_eq!(map_mouse_button(winit::event::MouseButton::Back), None);
    }

    #[test]
    fn test_queue_coalesces_consecutive_drops() {
        let mut queue = EventQueue::new();
        let win = WindowKey(1);
        queue.push(win, PlatformEvent::FilesDropped(vec![PathBuf::from("a")]));
        queue.push(win, PlatformEvent::FilesDropped(vec![PathBuf::from("b")]));
        queue.push(win, PlatformEvent::Close);
        queue.push(win, PlatformEvent::FilesDropped(vec![PathBuf::from("c")]));

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0].1,
            PlatformEvent::FilesDropped(vec![PathBuf::from("a"), PathBuf::from("b")])
        );
        assert_eq!(events[1].1, PlatformEvent::Close);
        assert_eq!(events[2].1, PlatformEvent::FilesDropped(vec![PathBuf::from("c")]));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_keeps_drops_of_different_windows_apart() {
        let mut queue = EventQueue::new();
        queue.push(WindowKey(1), PlatformEvent::FilesDropped(vec![PathBuf::from("a")]));
        queue.push(WindowKey(2), PlatformEvent::FilesDropped(vec![PathBuf::from("b")]));
        assert_eq!(queue.len(), 2);
    }
}
