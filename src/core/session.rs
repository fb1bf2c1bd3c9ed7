use std::any::Any;
use std::path::Path;
use std::sync::mpsc::Receiver;

use crate::config::WindowHints;
use crate::error::{SessionError, SessionResult};
use crate::traits::{Backend, GraphicsContext, NativeWindow, Timer};

use super::backbuffer::{Backbuffer, BackbufferSlot};
use super::callbacks::{
    CallbackRegistry, CharCallback, CursorPosCallback, DropCallback, KeyCallback,
    MouseButtonCallback, ResizeCallback, ScrollCallback,
};
use super::events::{PlatformEvent, WindowKey};
use super::extent::ClientSize;
use super::icon::WindowIcon;
use super::input::{InputSnapshot, InputState, KeyCode, MouseButton};
use super::presenter::{PresentPath, Presenter};
use super::runtime::Runtime;
use super::translator::{translate, EventTarget};

/// One native window plus everything the host drives through it.
///
/// Created by [`Runtime::create_session`]. After [`destroy`](Self::destroy)
/// (or drop) every query returns a zero/default value and every command is
/// a no-op.
pub struct WindowSession<W: NativeWindow> {
    window: Option<W>,
    context: Option<W::Context>,
    events: Receiver<PlatformEvent>,
    input: InputState,
    callbacks: CallbackRegistry,
    backbuffer: BackbufferSlot<W::Surface>,
    presenter: Presenter,
    close_requested: bool,
    client_size: ClientSize,
    hints: WindowHints,
    follow_resize: bool,
    user_data: Option<Box<dyn Any>>,
}

impl<W: NativeWindow> WindowSession<W> {
    pub(crate) fn new(
        window: W,
        context: Option<W::Context>,
        events: Receiver<PlatformEvent>,
        hints: WindowHints,
    ) -> Self {
        let client_size = window.client_size();
        Self {
            window: Some(window),
            context,
            events,
            input: InputState::new(),
            callbacks: CallbackRegistry::new(),
            backbuffer: BackbufferSlot::new(),
            presenter: Presenter::new(),
            close_requested: false,
            client_size,
            hints,
            follow_resize: true,
            user_data: None,
        }
    }

    // --- Events ---

    /// Pump the platform, then dispatch every event routed to this window
    pub fn poll_events<B, T>(&mut self, runtime: &mut Runtime<B, T>) -> usize
    where
        B: Backend<Window = W>,
        T: Timer,
    {
        runtime.poll_events();
        self.dispatch_pending()
    }

    /// Dispatch events already routed to this window; returns how many ran
    pub fn dispatch_pending(&mut self) -> usize {
        let Some(window) = self.window.as_mut() else {
            // Drain so nothing lingers for a dead window
            self.events.try_iter().for_each(drop);
            return 0;
        };

        let mut target = EventTarget {
            window,
            context: self.context.as_mut(),
            input: &mut self.input,
            callbacks: &mut self.callbacks,
            backbuffer: &mut self.backbuffer,
            close_requested: &mut self.close_requested,
            client_size: &mut self.client_size,
            report_key_release: self.hints.report_key_release,
            backbuffer_follows_resize: self.follow_resize,
        };

        let mut count = 0;
        for event in self.events.try_iter() {
            translate(event, &mut target);
            count += 1;
        }
        count
    }

    pub fn should_close(&self) -> bool {
        self.close_requested
    }

    pub fn set_should_close(&mut self, value: bool) {
        self.close_requested = value;
    }

    // --- Window ---

    pub fn key(&self) -> Option<WindowKey> {
        self.window.as_ref().map(NativeWindow::key)
    }

    pub fn window(&self) -> Option<&W> {
        self.window.as_ref()
    }

    pub fn is_destroyed(&self) -> bool {
        self.window.is_none()
    }

    /// Live client-area size in physical pixels
    pub fn framebuffer_size(&self) -> ClientSize {
        self.window
            .as_ref()
            .map_or(ClientSize::default(), NativeWindow::client_size)
    }

    pub fn width(&self) -> u32 {
        self.framebuffer_size().width
    }

    pub fn height(&self) -> u32 {
        self.framebuffer_size().height
    }

    /// Size as of the last processed resize event
    pub fn last_reported_size(&self) -> ClientSize {
        self.client_size
    }

    pub fn position(&self) -> (i32, i32) {
        self.window.as_ref().map_or((0, 0), NativeWindow::position)
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        if let Some(window) = self.window.as_mut() {
            window.set_position(x, y);
        }
    }

    /// Screen position of the client area's top-left corner
    pub fn client_origin(&self) -> (i32, i32) {
        self.window.as_ref().map_or((0, 0), NativeWindow::client_origin)
    }

    pub fn set_title(&mut self, title: &str) {
        if let Some(window) = self.window.as_mut() {
            window.set_title(title);
        }
    }

    /// Load an image file and use it as the window icon
    pub fn set_icon(&mut self, path: impl AsRef<Path>) -> SessionResult<()> {
        let window = self.window.as_mut().ok_or(SessionError::Destroyed)?;
        let icon = WindowIcon::load(path)?;
        window.set_icon(icon)
    }

    /// Hide (true) or restore (false) the OS title bar and borders
    pub fn set_custom_title_bar(&mut self, enabled: bool) {
        if let Some(window) = self.window.as_mut() {
            window.set_decorations(!enabled);
            self.hints.custom_title_bar = enabled;
        }
    }

    pub fn minimize(&mut self) {
        if let Some(window) = self.window.as_mut() {
            window.set_minimized(true);
        }
    }

    pub fn maximize(&mut self) {
        if let Some(window) = self.window.as_mut() {
            window.set_maximized(true);
        }
    }

    pub fn restore(&mut self) {
        if let Some(window) = self.window.as_mut() {
            window.set_minimized(false);
            window.set_maximized(false);
        }
    }

    pub fn refresh_rate(&self) -> Option<u32> {
        self.window.as_ref().and_then(NativeWindow::refresh_rate_hz)
    }

    // --- Input ---

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn snapshot(&self) -> InputSnapshot {
        self.input.snapshot()
    }

    pub fn key_down(&self, code: KeyCode) -> bool {
        self.input.is_key_down(code)
    }

    /// Button by polling index: 0 = left, 1 = middle, 2 = right
    pub fn mouse_button(&self, index: usize) -> bool {
        MouseButton::from_index(index).is_some_and(|button| self.input.is_mouse_down(button))
    }

    pub fn cursor_position(&self) -> (f64, f64) {
        self.input.cursor_position()
    }

    /// Cursor in screen coordinates, from the client origin and the last move
    pub fn global_cursor_position(&self) -> (f64, f64) {
        let (ox, oy) = self.client_origin();
        let (x, y) = self.input.cursor_position();
        (ox as f64 + x, oy as f64 + y)
    }

    /// Warp the cursor to client coordinates
    pub fn set_cursor_position(&mut self, x: f64, y: f64) -> bool {
        self.window
            .as_mut()
            .is_some_and(|window| window.set_cursor_position(x, y))
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        if let Some(window) = self.window.as_mut() {
            window.set_cursor_visible(visible);
        }
    }

    // --- Callbacks ---

    pub fn callbacks_mut(&mut self) -> &mut CallbackRegistry {
        &mut self.callbacks
    }

    pub fn set_key_callback(&mut self, callback: Option<KeyCallback>) -> Option<KeyCallback> {
        self.callbacks.set_key(callback)
    }

    pub fn set_char_callback(&mut self, callback: Option<CharCallback>) -> Option<CharCallback> {
        self.callbacks.set_char(callback)
    }

    pub fn set_mouse_button_callback(
        &mut self,
        callback: Option<MouseButtonCallback>,
    ) -> Option<MouseButtonCallback> {
        self.callbacks.set_mouse_button(callback)
    }

    pub fn set_cursor_pos_callback(
        &mut self,
        callback: Option<CursorPosCallback>,
    ) -> Option<CursorPosCallback> {
        self.callbacks.set_cursor_pos(callback)
    }

    pub fn set_scroll_callback(&mut self, callback: Option<ScrollCallback>) -> Option<ScrollCallback> {
        self.callbacks.set_scroll(callback)
    }

    pub fn set_drop_callback(&mut self, callback: Option<DropCallback>) -> Option<DropCallback> {
        self.callbacks.set_drop(callback)
    }

    pub fn set_resize_callback(&mut self, callback: Option<ResizeCallback>) -> Option<ResizeCallback> {
        self.callbacks.set_resize(callback)
    }

    // --- Backbuffer ---

    /// Create (or reuse) the software backbuffer.
    ///
    /// Non-positive dimensions take the current client size, or 1 when that
    /// is also empty. Returns `None` if allocation failed; the slot is then
    /// empty.
    pub fn create_backbuffer(&mut self, width: i32, height: i32) -> Option<&mut Backbuffer<W::Surface>> {
        let window = self.window.as_mut()?;
        let size = ClientSize::resolve(width, height, window.client_size());
        self.backbuffer.ensure(size, |s| window.create_surface(s))
    }

    /// Whether resizes recreate the backbuffer at the new client size (default on).
    ///
    /// Turned off, the buffer keeps its size and presents are stretched.
    pub fn set_backbuffer_follows_resize(&mut self, follow: bool) {
        self.follow_resize = follow;
    }

    pub fn backbuffer_follows_resize(&self) -> bool {
        self.follow_resize
    }

    pub fn backbuffer(&self) -> Option<&Backbuffer<W::Surface>> {
        self.backbuffer.get()
    }

    pub fn backbuffer_mut(&mut self) -> Option<&mut Backbuffer<W::Surface>> {
        self.backbuffer.get_mut()
    }

    pub fn destroy_backbuffer(&mut self) -> bool {
        self.backbuffer.destroy()
    }

    /// Blit (or stretch) the backbuffer onto the window
    pub fn present_backbuffer(&mut self) -> PresentPath {
        let client = self.framebuffer_size();
        self.presenter.present(&mut self.backbuffer, client)
    }

    // --- Hardware context ---

    pub fn graphics(&self) -> Option<&W::Context> {
        self.context.as_ref()
    }

    pub fn graphics_mut(&mut self) -> Option<&mut W::Context> {
        self.context.as_mut()
    }

    pub fn make_context_current(&mut self) -> bool {
        let size = self.framebuffer_size();
        self.context
            .as_mut()
            .is_some_and(|context| context.make_current(size))
    }

    /// Present the hardware frame using the runtime's swap interval
    pub fn swap_buffers<B: Backend, T: Timer>(&mut self, runtime: &Runtime<B, T>) -> bool {
        let interval = runtime.swap_interval();
        self.context
            .as_mut()
            .is_some_and(|context| context.swap_buffers(interval))
    }

    pub fn extension_supported(&self, name: &str) -> bool {
        self.context
            .as_ref()
            .is_some_and(|context| context.extension_supported(name))
    }

    // --- User data ---

    /// Attach host data; returns whatever was attached before
    pub fn set_user_data<T: Any>(&mut self, data: T) -> Option<Box<dyn Any>> {
        self.user_data.replace(Box::new(data))
    }

    pub fn user_data<T: Any>(&self) -> Option<&T> {
        self.user_data.as_ref().and_then(|data| data.downcast_ref())
    }

    pub fn user_data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.user_data.as_mut().and_then(|data| data.downcast_mut())
    }

    pub fn take_user_data(&mut self) -> Option<Box<dyn Any>> {
        self.user_data.take()
    }

    // --- Teardown ---

    /// Release everything in order: backbuffer, context, context surface,
    /// window. Returns false if already destroyed.
    pub fn destroy(&mut self) -> bool {
        let Some(window) = self.window.take() else {
            return false;
        };
        let key = window.key();

        self.backbuffer.destroy();
        if let Some(mut context) = self.context.take() {
            context.detach();
            context.release_surface();
        }
        window.destroy();

        self.callbacks.clear();
        self.user_data = None;
        self.client_size = ClientSize::default();
        self.input = InputState::new();

        log::debug!("session {:?} destroyed", key);
        true
    }
}

impl<W: NativeWindow> Drop for WindowSession<W> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<W: NativeWindow> std::fmt::Debug for WindowSession<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowSession")
            .field("key", &self.key())
            .field("client_size", &self.client_size)
            .field("close_requested", &self.close_requested)
            .field("backbuffer", &self.backbuffer.size())
            .field("has_context", &self.context.is_some())
            .finish()
    }
}
