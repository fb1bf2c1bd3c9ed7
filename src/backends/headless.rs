//! In-process backend with no display.
//!
//! Windows are plain records. A [`HeadlessController`] shared with the
//! backend scripts platform events, fakes resizes and allocation failures,
//! and reads back presented frames and the handle ledger.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::WindowConfig;
use crate::core::events::{EventQueue, PlatformEvent, WindowKey};
use crate::core::extent::ClientSize;
use crate::core::icon::WindowIcon;
use crate::error::{SessionError, SessionResult};
use crate::traits::{Backend, GraphicsContext, NativeWindow, PresentSurface};

/// Height of the fake title bar between window and client origin
pub const TITLE_BAR_HEIGHT: i32 = 30;

/// Kind of platform handle tracked by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Window,
    Context,
    ContextSurface,
    BackbufferSurface,
}

/// Live handle counts plus the order handles were released in
#[derive(Debug, Clone, Default)]
pub struct HandleLedger {
    live: HashMap<HandleKind, usize>,
    releases: Vec<(WindowKey, HandleKind)>,
}

impl HandleLedger {
    pub fn live(&self, kind: HandleKind) -> usize {
        self.live.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_live(&self) -> usize {
        self.live.values().sum()
    }

    pub fn releases(&self) -> &[(WindowKey, HandleKind)] {
        &self.releases
    }

    /// Release order for one window
    pub fn releases_for(&self, key: WindowKey) -> Vec<HandleKind> {
        self.releases
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|&(_, kind)| kind)
            .collect()
    }

    fn acquire(&mut self, kind: HandleKind) {
        *self.live.entry(kind).or_insert(0) += 1;
    }

    fn release(&mut self, key: WindowKey, kind: HandleKind) {
        if let Some(count) = self.live.get_mut(&kind) {
            *count = count.saturating_sub(1);
        }
        self.releases.push((key, kind));
    }
}

/// Observable state of one headless window
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessWindowState {
    pub size: ClientSize,
    pub position: (i32, i32),
    pub title: String,
    pub decorated: bool,
    pub minimized: bool,
    pub maximized: bool,
    pub cursor_visible: bool,
    pub icon_size: Option<(u32, u32)>,
}

/// A frame handed to a backbuffer surface
#[derive(Debug, Clone, PartialEq)]
pub struct PresentedFrame {
    pub window: WindowKey,
    pub size: ClientSize,
    pub pixels: Vec<u32>,
}

#[derive(Debug, Default)]
struct Shared {
    next_key: u64,
    windows: HashMap<WindowKey, HeadlessWindowState>,
    pending: Vec<(WindowKey, PlatformEvent)>,
    ledger: HandleLedger,
    refresh_rate: Option<u32>,
    fail_surfaces: bool,
    fail_contexts: bool,
    extensions: Vec<String>,
    frames: Vec<PresentedFrame>,
    swaps: HashMap<WindowKey, Vec<u32>>,
}

/// Backend that never touches the OS
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    shared: Rc<RefCell<Shared>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for scripting this backend from test code
    pub fn controller(&self) -> HeadlessController {
        HeadlessController {
            shared: self.shared.clone(),
        }
    }
}

impl Backend for HeadlessBackend {
    type Window = HeadlessWindow;

    fn create_window(&mut self, config: &WindowConfig) -> SessionResult<HeadlessWindow> {
        if config.width == 0 || config.height == 0 {
            return Err(SessionError::WindowCreation(format!(
                "{}x{} has no client area",
                config.width, config.height
            )));
        }

        let mut shared = self.shared.borrow_mut();
        shared.next_key += 1;
        let key = WindowKey(shared.next_key);
        shared.windows.insert(
            key,
            HeadlessWindowState {
                size: ClientSize::new(config.width, config.height),
                position: (0, 0),
                title: config.title.clone(),
                decorated: !config.hints.custom_title_bar,
                minimized: false,
                maximized: config.hints.maximized,
                cursor_visible: true,
                icon_size: None,
            },
        );
        shared.ledger.acquire(HandleKind::Window);

        Ok(HeadlessWindow {
            key,
            shared: self.shared.clone(),
        })
    }

    fn pump_events(&mut self, queue: &mut EventQueue) {
        let pending = std::mem::take(&mut self.shared.borrow_mut().pending);
        for (key, event) in pending {
            queue.push(key, event);
        }
    }
}

/// Scripting handle shared with a [`HeadlessBackend`]
#[derive(Debug, Clone)]
pub struct HeadlessController {
    shared: Rc<RefCell<Shared>>,
}

impl HeadlessController {
    /// Queue a raw event for the next pump
    pub fn push_event(&self, key: WindowKey, event: PlatformEvent) {
        self.shared.borrow_mut().pending.push((key, event));
    }

    /// Change the client size and queue the matching resize event
    pub fn resize(&self, key: WindowKey, size: ClientSize) {
        let mut shared = self.shared.borrow_mut();
        if let Some(window) = shared.windows.get_mut(&key) {
            window.size = size;
        }
        shared.pending.push((key, PlatformEvent::Resized(size)));
    }

    pub fn request_close(&self, key: WindowKey) {
        self.push_event(key, PlatformEvent::Close);
    }

    pub fn set_refresh_rate(&self, hz: Option<u32>) {
        self.shared.borrow_mut().refresh_rate = hz;
    }

    /// Make every later backbuffer surface allocation fail
    pub fn fail_surface_allocations(&self, fail: bool) {
        self.shared.borrow_mut().fail_surfaces = fail;
    }

    pub fn fail_context_creation(&self, fail: bool) {
        self.shared.borrow_mut().fail_contexts = fail;
    }

    pub fn add_extension(&self, name: &str) {
        self.shared.borrow_mut().extensions.push(name.to_string());
    }

    pub fn window(&self, key: WindowKey) -> Option<HeadlessWindowState> {
        self.shared.borrow().windows.get(&key).cloned()
    }

    pub fn ledger(&self) -> HandleLedger {
        self.shared.borrow().ledger.clone()
    }

    pub fn frames(&self) -> Vec<PresentedFrame> {
        self.shared.borrow().frames.clone()
    }

    pub fn take_frames(&self) -> Vec<PresentedFrame> {
        std::mem::take(&mut self.shared.borrow_mut().frames)
    }

    /// Swap intervals passed to each `swap_buffers` on `key`
    pub fn swaps(&self, key: WindowKey) -> Vec<u32> {
        self.shared
            .borrow()
            .swaps
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }
}

/// Headless window record
#[derive(Debug)]
pub struct HeadlessWindow {
    key: WindowKey,
    shared: Rc<RefCell<Shared>>,
}

impl HeadlessWindow {
    fn with_state<R>(&self, f: impl FnOnce(&HeadlessWindowState) -> R) -> Option<R> {
        self.shared.borrow().windows.get(&self.key).map(f)
    }

    fn update(&self, f: impl FnOnce(&mut HeadlessWindowState)) {
        if let Some(state) = self.shared.borrow_mut().windows.get_mut(&self.key) {
            f(state);
        }
    }
}

impl NativeWindow for HeadlessWindow {
    type Surface = HeadlessSurface;
    type Context = HeadlessContext;

    fn key(&self) -> WindowKey {
        self.key
    }

    fn client_size(&self) -> ClientSize {
        self.with_state(|s| s.size).unwrap_or_default()
    }

    fn position(&self) -> (i32, i32) {
        self.with_state(|s| s.position).unwrap_or_default()
    }

    fn set_position(&mut self, x: i32, y: i32) {
        self.update(|s| s.position = (x, y));
    }

    fn client_origin(&self) -> (i32, i32) {
        self.with_state(|s| {
            let bar = if s.decorated { TITLE_BAR_HEIGHT } else { 0 };
            (s.position.0, s.position.1 + bar)
        })
        .unwrap_or_default()
    }

    fn refresh_rate_hz(&self) -> Option<u32> {
        self.shared.borrow().refresh_rate
    }

    fn set_title(&mut self, title: &str) {
        self.update(|s| s.title = title.to_string());
    }

    fn set_icon(&mut self, icon: WindowIcon) -> SessionResult<()> {
        self.update(|s| s.icon_size = Some((icon.width, icon.height)));
        Ok(())
    }

    fn set_decorations(&mut self, decorated: bool) {
        self.update(|s| s.decorated = decorated);
    }

    fn set_cursor_position(&mut self, x: f64, y: f64) -> bool {
        // The platform answers a warp with a regular move event
        self.shared
            .borrow_mut()
            .pending
            .push((self.key, PlatformEvent::CursorMoved { x, y }));
        true
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.update(|s| s.cursor_visible = visible);
    }

    fn set_minimized(&mut self, minimized: bool) {
        self.update(|s| s.minimized = minimized);
    }

    fn set_maximized(&mut self, maximized: bool) {
        self.update(|s| s.maximized = maximized);
    }

    fn create_context(&mut self, _config: &WindowConfig) -> SessionResult<HeadlessContext> {
        let mut shared = self.shared.borrow_mut();
        if shared.fail_contexts {
            return Err(SessionError::GraphicsContext("no adapter".to_string()));
        }
        shared.ledger.acquire(HandleKind::ContextSurface);
        shared.ledger.acquire(HandleKind::Context);

        Ok(HeadlessContext {
            key: self.key,
            shared: self.shared.clone(),
            device: true,
            surface: true,
            current: false,
        })
    }

    fn create_surface(&mut self, size: ClientSize) -> Option<HeadlessSurface> {
        let mut shared = self.shared.borrow_mut();
        if shared.fail_surfaces || size.is_empty() {
            return None;
        }
        shared.ledger.acquire(HandleKind::BackbufferSurface);

        Some(HeadlessSurface {
            key: self.key,
            shared: self.shared.clone(),
        })
    }

    fn destroy(self) {
        let mut shared = self.shared.borrow_mut();
        shared.windows.remove(&self.key);
        shared.ledger.release(self.key, HandleKind::Window);
    }
}

/// Backbuffer surface that records every frame it is given
#[derive(Debug)]
pub struct HeadlessSurface {
    key: WindowKey,
    shared: Rc<RefCell<Shared>>,
}

impl PresentSurface for HeadlessSurface {
    fn present(&mut self, pixels: &[u32], size: ClientSize) -> bool {
        if pixels.len() != size.pixel_count() {
            return false;
        }
        self.shared.borrow_mut().frames.push(PresentedFrame {
            window: self.key,
            size,
            pixels: pixels.to_vec(),
        });
        true
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        self.shared
            .borrow_mut()
            .ledger
            .release(self.key, HandleKind::BackbufferSurface);
    }
}

/// Stand-in hardware context
#[derive(Debug)]
pub struct HeadlessContext {
    key: WindowKey,
    shared: Rc<RefCell<Shared>>,
    device: bool,
    surface: bool,
    current: bool,
}

impl GraphicsContext for HeadlessContext {
    fn make_current(&mut self, size: ClientSize) -> bool {
        self.current = self.device && self.surface && !size.is_empty();
        self.current
    }

    fn is_current(&self) -> bool {
        self.current
    }

    fn swap_buffers(&mut self, interval: u32) -> bool {
        if !self.current {
            return false;
        }
        self.shared
            .borrow_mut()
            .swaps
            .entry(self.key)
            .or_default()
            .push(interval);
        true
    }

    fn extension_supported(&self, name: &str) -> bool {
        self.device && self.shared.borrow().extensions.iter().any(|e| e == name)
    }

    fn resize(&mut self, _size: ClientSize) {}

    fn detach(&mut self) {
        self.current = false;
        if std::mem::take(&mut self.device) {
            self.shared
                .borrow_mut()
                .ledger
                .release(self.key, HandleKind::Context);
        }
    }

    fn release_surface(&mut self) {
        if std::mem::take(&mut self.surface) {
            self.shared
                .borrow_mut()
                .ledger
                .release(self.key, HandleKind::ContextSurface);
        }
    }
}

impl Drop for HeadlessContext {
    fn drop(&mut self) {
        self.detach();
        self.release_surface();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_lifecycle_updates_ledger() {
        let mut backend = HeadlessBackend::new();
        let controller = backend.controller();

        let window = backend.create_window(&WindowConfig::new(320, 200, "t")).unwrap();
        assert_eq!(controller.ledger().live(HandleKind::Window), 1);
        assert_eq!(window.client_size(), ClientSize::new(320, 200));

        let key = window.key();
        window.destroy();
        let ledger = controller.ledger();
        assert_eq!(ledger.total_live(), 0);
        assert_eq!(ledger.releases_for(key), vec![HandleKind::Window]);
    }

    #[test]
    fn test_zero_sized_window_is_rejected() {
        let mut backend = HeadlessBackend::new();
        assert!(matches!(
            backend.create_window(&WindowConfig::new(0, 100, "t")),
            Err(SessionError::WindowCreation(_))
        ));
    }

    #[test]
    fn test_pump_moves_pending_events_in_order() {
        let mut backend = HeadlessBackend::new();
        let controller = backend.controller();
        let window = backend.create_window(&WindowConfig::default()).unwrap();

        controller.resize(window.key(), ClientSize::new(10, 10));
        controller.request_close(window.key());

        let mut queue = EventQueue::new();
        backend.pump_events(&mut queue);
        let events: Vec<_> = queue.drain().map(|(_, e)| e).collect();
        assert_eq!(
            events,
            vec![
                PlatformEvent::Resized(ClientSize::new(10, 10)),
                PlatformEvent::Close
            ]
        );
        assert_eq!(window.client_size(), ClientSize::new(10, 10));
    }

    #[test]
    fn test_context_teardown_is_idempotent() {
        let mut backend = HeadlessBackend::new();
        let controller = backend.controller();
        let mut window = backend.create_window(&WindowConfig::default()).unwrap();

        let mut context = window.create_context(&WindowConfig::default()).unwrap();
        assert!(context.make_current(window.client_size()));
        context.detach();
        context.detach();
        context.release_surface();
        drop(context);

        let ledger = controller.ledger();
        assert_eq!(ledger.live(HandleKind::Context), 0);
        assert_eq!(ledger.live(HandleKind::ContextSurface), 0);
        assert_eq!(
            ledger.releases_for(window.key()),
            vec![HandleKind::Context, HandleKind::ContextSurface]
        );
    }

    #[test]
    fn test_client_origin_accounts_for_title_bar() {
        let mut backend = HeadlessBackend::new();
        let mut window = backend.create_window(&WindowConfig::default()).unwrap();
        window.set_position(100, 50);
        assert_eq!(window.client_origin(), (100, 50 + TITLE_BAR_HEIGHT));

        window.set_decorations(false);
        assert_eq!(window.client_origin(), (100, 50));
    }
}
