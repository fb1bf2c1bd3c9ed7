use std::num::NonZeroU32;
use std::sync::Arc;

use winit::event_loop::OwnedDisplayHandle;
use winit::window::Window;

use crate::core::extent::ClientSize;
use crate::traits::PresentSurface;

/// softbuffer surface a backbuffer is blitted onto
pub struct SoftSurface {
    surface: softbuffer::Surface<OwnedDisplayHandle, Arc<Window>>,
    _context: softbuffer::Context<OwnedDisplayHandle>,
    window: Arc<Window>,
    size: Option<ClientSize>,
}

impl SoftSurface {
    pub fn new(display: &OwnedDisplayHandle, window: Arc<Window>) -> Option<Self> {
        let context = softbuffer::Context::new(display.clone())
            .map_err(|e| log::warn!("softbuffer context failed: {}", e))
            .ok()?;
        let surface = softbuffer::Surface::new(&context, window.clone())
            .map_err(|e| log::warn!("softbuffer surface failed: {}", e))
            .ok()?;

        Some(Self {
            surface,
            _context: context,
            window,
            size: None,
        })
    }
}

impl PresentSurface for SoftSurface {
    fn present(&mut self, pixels: &[u32], size: ClientSize) -> bool {
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return false;
        };

        if self.size != Some(size) {
            if let Err(e) = self.surface.resize(width, height) {
                log::warn!("softbuffer resize to {}x{} failed: {}", size.width, size.height, e);
                return false;
            }
            self.size = Some(size);
        }

        let mut buffer = match self.surface.buffer_mut() {
            Ok(buffer) => buffer,
            Err(e) => {
                log::warn!("softbuffer buffer unavailable: {}", e);
                return false;
            }
        };
        if buffer.len() != pixels.len() {
            return false;
        }

        // softbuffer wants 0x00RRGGBB
        for (dst, &src) in buffer.iter_mut().zip(pixels) {
            *dst = src & 0x00FF_FFFF;
        }

        self.window.pre_present_notify();
        match buffer.present() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("softbuffer present failed: {}", e);
                false
            }
        }
    }
}
