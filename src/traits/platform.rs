use crate::config::WindowConfig;
use crate::core::events::{EventQueue, WindowKey};
use crate::core::extent::ClientSize;
use crate::core::icon::WindowIcon;
use crate::error::SessionResult;

use super::graphics::{GraphicsContext, PresentSurface};

/// Process-wide windowing backend: owns the message loop and creates windows
pub trait Backend {
    type Window: NativeWindow;

    /// Open a native window for `config`
    fn create_window(&mut self, config: &WindowConfig) -> SessionResult<Self::Window>;

    /// Drain all pending platform messages into `queue` without blocking
    fn pump_events(&mut self, queue: &mut EventQueue);
}

/// One native window handle and the resources hung off it
pub trait NativeWindow {
    /// Drawing surface backing a software backbuffer
    type Surface: PresentSurface;
    /// Hardware graphics context bound to this window
    type Context: GraphicsContext;

    fn key(&self) -> WindowKey;

    /// Current client-area size in physical pixels
    fn client_size(&self) -> ClientSize;

    /// Outer window position in screen coordinates
    fn position(&self) -> (i32, i32);

    fn set_position(&mut self, x: i32, y: i32);

    /// Screen coordinates of the client area's top-left corner
    fn client_origin(&self) -> (i32, i32);

    /// Refresh rate of the window's monitor, if the platform reports one
    fn refresh_rate_hz(&self) -> Option<u32>;

    fn set_title(&mut self, title: &str);

    fn set_icon(&mut self, icon: WindowIcon) -> SessionResult<()>;

    /// Toggle OS decorations (title bar and borders)
    fn set_decorations(&mut self, decorated: bool);

    /// Warp the cursor to client coordinates; false when unsupported
    fn set_cursor_position(&mut self, x: f64, y: f64) -> bool;

    fn set_cursor_visible(&mut self, visible: bool);

    fn set_minimized(&mut self, minimized: bool);

    fn set_maximized(&mut self, maximized: bool);

    /// Create the hardware context; called at most once per window
    fn create_context(&mut self, config: &WindowConfig) -> SessionResult<Self::Context>;

    /// Allocate a drawing surface for a backbuffer of `size`
    fn create_surface(&mut self, size: ClientSize) -> Option<Self::Surface>;

    /// Destroy the native handle
    fn destroy(self);
}
