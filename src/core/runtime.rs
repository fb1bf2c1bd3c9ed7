use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};
use std::time::Instant;

use crate::config::{ClientApi, WindowConfig};
use crate::error::SessionResult;
use crate::traits::{Backend, GraphicsContext, NativeWindow, SystemTimer, Timer};

use super::events::{EventQueue, PlatformEvent, WindowKey};
use super::pacer::{FramePacer, PaceOutcome};
use super::session::WindowSession;

/// Process-wide context: the platform backend, event routing and pacing.
///
/// Create one per process on the thread that drives rendering. Owning the
/// backend stands in for one-time window-class registration; the pacer and
/// swap interval are shared by every session it creates.
pub struct Runtime<B: Backend, T: Timer = SystemTimer> {
    backend: B,
    queue: EventQueue,
    routes: HashMap<WindowKey, Sender<PlatformEvent>>,
    pacer: FramePacer<T>,
    started: Instant,
}

impl<B: Backend> Runtime<B> {
    pub fn new(backend: B) -> Self {
        Self::with_timer(backend, SystemTimer)
    }
}

impl<B: Backend, T: Timer> Runtime<B, T> {
    pub fn with_timer(backend: B, timer: T) -> Self {
        let started = timer.now();
        Self {
            backend,
            queue: EventQueue::new(),
            routes: HashMap::new(),
            pacer: FramePacer::new(timer),
            started,
        }
    }

    /// Open a window, attach its graphics context and start routing its events
    pub fn create_session(&mut self, config: &WindowConfig) -> SessionResult<WindowSession<B::Window>> {
        let mut window = self.backend.create_window(config)?;

        let context = match config.hints.client_api {
            ClientApi::NoApi => None,
            ClientApi::Wgpu => match window.create_context(config) {
                Ok(mut context) => {
                    if !context.make_current(window.client_size()) {
                        log::warn!("graphics context for {:?} could not be made current", window.key());
                    }
                    Some(context)
                }
                Err(err) => {
                    window.destroy();
                    return Err(err);
                }
            },
        };

        let key = window.key();
        let (sender, receiver) = mpsc::channel();
        self.routes.insert(key, sender);

        log::debug!(
            "session {:?} created: {}x{} {:?}",
            key,
            config.width,
            config.height,
            config.hints.client_api
        );
        Ok(WindowSession::new(window, context, receiver, config.hints.clone()))
    }

    /// Drain the platform queue and route each event to its session.
    ///
    /// Events for windows without a live session are dropped.
    pub fn poll_events(&mut self) {
        self.backend.pump_events(&mut self.queue);

        let mut closed = Vec::new();
        for (key, event) in self.queue.drain() {
            match self.routes.get(&key) {
                Some(sender) => {
                    if sender.send(event).is_err() {
                        closed.push(key);
                    }
                }
                None => log::trace!("dropping {:?} for unknown window {:?}", event, key),
            }
        }

        for key in closed {
            log::trace!("session for {:?} is gone, removing route", key);
            self.routes.remove(&key);
        }
    }

    /// Windows whose events are still being routed to a session
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Set the swap interval shared by all sessions; returns the previous one
    pub fn set_swap_interval(&mut self, interval: i32) -> i32 {
        self.pacer.set_interval(interval)
    }

    pub fn swap_interval(&self) -> u32 {
        self.pacer.interval()
    }

    /// Wait out the rest of the frame budget for a display at `refresh_hz`
    pub fn wait_for_next_slot(&mut self, refresh_hz: Option<u32>) -> PaceOutcome {
        self.pacer.wait_for_next_slot(refresh_hz)
    }

    pub fn pacer(&self) -> &FramePacer<T> {
        &self.pacer
    }

    /// Seconds since the runtime was created
    pub fn time(&self) -> f64 {
        self.pacer
            .timer()
            .now()
            .duration_since(self.started)
            .as_secs_f64()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
