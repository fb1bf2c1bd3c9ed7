//! Desktop backend on winit, with softbuffer backbuffers and a wgpu context.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::error::OsError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, OwnedDisplayHandle};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Icon, Window, WindowAttributes, WindowId};

use crate::config::WindowConfig;
use crate::core::events::{from_window_event, EventQueue, PlatformEvent, WindowKey};
use crate::core::extent::ClientSize;
use crate::core::icon::WindowIcon;
use crate::error::{SessionError, SessionResult};
use crate::traits::{Backend, NativeWindow};

use super::soft_surface::SoftSurface;
use super::wgpu_context::WgpuContext;

/// Pumps allowed for the event loop to become active and open a window
const CREATE_PUMP_LIMIT: usize = 16;

/// Native id to window key map, shared with every open window so a
/// destroyed window drops out of event routing
#[derive(Debug)]
struct WindowRoutes<Id> {
    map: Rc<RefCell<HashMap<Id, WindowKey>>>,
}

impl<Id> Clone for WindowRoutes<Id> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<Id> Default for WindowRoutes<Id> {
    fn default() -> Self {
        Self {
            map: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

impl<Id: Eq + Hash> WindowRoutes<Id> {
    fn insert(&self, id: Id, key: WindowKey) {
        self.map.borrow_mut().insert(id, key);
    }

    fn get(&self, id: &Id) -> Option<WindowKey> {
        self.map.borrow().get(id).copied()
    }

    fn remove(&self, id: &Id) -> Option<WindowKey> {
        self.map.borrow_mut().remove(id)
    }

    fn len(&self) -> usize {
        self.map.borrow().len()
    }
}

/// winit event loop; at most one per process
pub struct WinitBackend {
    event_loop: EventLoop<()>,
    display: OwnedDisplayHandle,
    windows: WindowRoutes<WindowId>,
    backlog: EventQueue,
    next_key: u64,
}

impl WinitBackend {
    pub fn new() -> SessionResult<Self> {
        let event_loop = EventLoop::new().map_err(|e| SessionError::BackendInit(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);
        let display = event_loop.owned_display_handle();

        Ok(Self {
            event_loop,
            display,
            windows: WindowRoutes::default(),
            backlog: EventQueue::new(),
            next_key: 0,
        })
    }

    /// Windows currently routed by this backend
    pub fn open_windows(&self) -> usize {
        self.windows.len()
    }

    fn pump(&mut self, handler: &mut Pump<'_>) -> SessionResult<()> {
        match self.event_loop.pump_app_events(Some(Duration::ZERO), handler) {
            PumpStatus::Continue => Ok(()),
            PumpStatus::Exit(code) => Err(SessionError::BackendInit(format!(
                "event loop exited with code {}",
                code
            ))),
        }
    }
}

impl Backend for WinitBackend {
    type Window = WinitWindow;

    fn create_window(&mut self, config: &WindowConfig) -> SessionResult<WinitWindow> {
        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(PhysicalSize::new(config.width.max(1), config.height.max(1)))
            .with_resizable(config.hints.resizable)
            .with_maximized(config.hints.maximized)
            .with_decorations(!config.hints.custom_title_bar);

        // Windows can only be created while the loop is active, so the
        // request rides along on a pump. Events for other windows seen
        // meanwhile go to the backlog.
        let mut backlog = std::mem::take(&mut self.backlog);
        let windows = self.windows.clone();
        let mut handler = Pump::new(&windows, &mut backlog, Some(attributes));
        let mut status = Ok(());
        for _ in 0..CREATE_PUMP_LIMIT {
            status = self.pump(&mut handler);
            if status.is_err() || handler.created.is_some() {
                break;
            }
        }
        let created = handler.created.take();
        drop(handler);
        self.backlog = backlog;
        status?;

        let window = created
            .ok_or_else(|| SessionError::WindowCreation("event loop never became active".into()))?
            .map_err(|e| SessionError::WindowCreation(e.to_string()))?;

        self.next_key += 1;
        let key = WindowKey(self.next_key);
        self.windows.insert(window.id(), key);
        log::debug!("window {:?} opened as {:?}", window.id(), key);

        Ok(WinitWindow {
            key,
            window: Arc::new(window),
            display: self.display.clone(),
            routes: self.windows.clone(),
        })
    }

    fn pump_events(&mut self, queue: &mut EventQueue) {
        for (key, event) in self.backlog.drain() {
            queue.push(key, event);
        }

        let windows = self.windows.clone();
        let mut handler = Pump::new(&windows, queue, None);
        if let Err(e) = self.pump(&mut handler) {
            log::warn!("{}", e);
        }
    }
}

/// Application handler for one non-blocking pump
struct Pump<'a> {
    windows: &'a WindowRoutes<WindowId>,
    queue: &'a mut EventQueue,
    scratch: Vec<PlatformEvent>,
    request: Option<WindowAttributes>,
    created: Option<Result<Window, OsError>>,
}

impl<'a> Pump<'a> {
    fn new(
        windows: &'a WindowRoutes<WindowId>,
        queue: &'a mut EventQueue,
        request: Option<WindowAttributes>,
    ) -> Self {
        Self {
            windows,
            queue,
            scratch: Vec::new(),
            request,
            created: None,
        }
    }

    fn create_requested(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(attributes) = self.request.take() {
            self.created = Some(event_loop.create_window(attributes));
        }
    }
}

impl ApplicationHandler for Pump<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.create_requested(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.create_requested(event_loop);
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(key) = self.windows.get(&window_id) else {
            log::trace!("dropping {:?} for unknown window {:?}", event, window_id);
            return;
        };
        from_window_event(&event, &mut self.scratch);
        for event in self.scratch.drain(..) {
            self.queue.push(key, event);
        }
    }
}

/// A winit window shared with its surfaces
pub struct WinitWindow {
    key: WindowKey,
    window: Arc<Window>,
    display: OwnedDisplayHandle,
    routes: WindowRoutes<WindowId>,
}

impl WinitWindow {
    pub fn inner(&self) -> &Arc<Window> {
        &self.window
    }
}

impl NativeWindow for WinitWindow {
    type Surface = SoftSurface;
    type Context = WgpuContext;

    fn key(&self) -> WindowKey {
        self.key
    }

    fn client_size(&self) -> ClientSize {
        let size = self.window.inner_size();
        ClientSize::new(size.width, size.height)
    }

    fn position(&self) -> (i32, i32) {
        self.window
            .outer_position()
            .map(|p| (p.x, p.y))
            .unwrap_or_default()
    }

    fn set_position(&mut self, x: i32, y: i32) {
        self.window.set_outer_position(PhysicalPosition::new(x, y));
    }

    fn client_origin(&self) -> (i32, i32) {
        self.window
            .inner_position()
            .map(|p| (p.x, p.y))
            .unwrap_or_default()
    }

    fn refresh_rate_hz(&self) -> Option<u32> {
        self.window
            .current_monitor()
            .and_then(|monitor| monitor.refresh_rate_millihertz())
            .map(|mhz| (mhz + 500) / 1000)
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn set_icon(&mut self, icon: WindowIcon) -> SessionResult<()> {
        let icon = Icon::from_rgba(icon.rgba, icon.width, icon.height)
            .map_err(|e| SessionError::BadIcon(e.to_string()))?;
        self.window.set_window_icon(Some(icon));
        Ok(())
    }

    fn set_decorations(&mut self, decorated: bool) {
        self.window.set_decorations(decorated);
    }

    fn set_cursor_position(&mut self, x: f64, y: f64) -> bool {
        match self.window.set_cursor_position(PhysicalPosition::new(x, y)) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("cursor warp unsupported: {}", e);
                false
            }
        }
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.window.set_cursor_visible(visible);
    }

    fn set_minimized(&mut self, minimized: bool) {
        self.window.set_minimized(minimized);
    }

    fn set_maximized(&mut self, maximized: bool) {
        self.window.set_maximized(maximized);
    }

    fn create_context(&mut self, _config: &WindowConfig) -> SessionResult<WgpuContext> {
        WgpuContext::new(self.window.clone(), self.client_size())
    }

    fn create_surface(&mut self, _size: ClientSize) -> Option<SoftSurface> {
        SoftSurface::new(&self.display, self.window.clone())
    }

    fn destroy(self) {
        self.routes.remove(&self.window.id());
        log::debug!("closing window {:?}", self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_window_leaves_shared_routes() {
        let backend_side: WindowRoutes<u64> = WindowRoutes::default();
        let window_side = backend_side.clone();

        backend_side.insert(7, WindowKey(1));
        backend_side.insert(9, WindowKey(2));
        assert_eq!(window_side.get(&7), Some(WindowKey(1)));

        assert_eq!(window_side.remove(&7), Some(WindowKey(1)));
        assert_eq!(backend_side.get(&7), None);
        assert_eq!(backend_side.get(&9), Some(WindowKey(2)));
        assert_eq!(backend_side.len(), 1);
    }

    #[test]
    fn test_remove_twice_is_harmless() {
        let routes: WindowRoutes<u64> = WindowRoutes::default();
        routes.insert(1, WindowKey(1));
        assert!(routes.remove(&1).is_some());
        assert!(routes.remove(&1).is_none());
        assert_eq!(routes.len(), 0);
    }
}
