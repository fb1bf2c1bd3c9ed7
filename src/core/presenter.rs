use crate::traits::PresentSurface;

use super::backbuffer::BackbufferSlot;
use super::extent::ClientSize;
use super::scaling::stretch_smooth;

/// Which copy a present call performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentPath {
    /// No backbuffer, or the client area has zero extent
    Skipped,
    /// Backbuffer matches the client area: 1:1 copy
    Direct,
    /// Sizes differ: smooth stretch to the client area
    Scaled,
}

impl PresentPath {
    /// Pick the copy for a backbuffer of `buffer` size shown in `client`
    pub fn plan(buffer: Option<ClientSize>, client: ClientSize) -> Self {
        match buffer {
            None => PresentPath::Skipped,
            Some(_) if client.is_empty() => PresentPath::Skipped,
            Some(size) if size == client => PresentPath::Direct,
            Some(_) => PresentPath::Scaled,
        }
    }
}

/// Copies the backbuffer onto the window's visible surface.
///
/// Holds a scratch buffer for the scaling path so steady-state presents
/// at a fixed mismatch do not allocate.
#[derive(Debug, Default)]
pub struct Presenter {
    scratch: Vec<u32>,
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Present the slot's buffer into a client area of `client` size.
    ///
    /// Never mutates the backbuffer pixels.
    pub fn present<S: PresentSurface>(
        &mut self,
        slot: &mut BackbufferSlot<S>,
        client: ClientSize,
    ) -> PresentPath {
        let path = PresentPath::plan(slot.size(), client);
        let Some(buffer) = slot.get_mut() else {
            return path;
        };
        let (pixels, size, surface) = buffer.parts_mut();

        match path {
            PresentPath::Skipped => {}
            PresentPath::Direct => {
                if !surface.present(pixels, size) {
                    log::warn!("direct present failed at {}x{}", size.width, size.height);
                }
            }
            PresentPath::Scaled => {
                self.scratch.clear();
                self.scratch.resize(client.pixel_count(), 0);
                stretch_smooth(pixels, size, &mut self.scratch, client);
                if !surface.present(&self.scratch, client) {
                    log::warn!(
                        "scaled present failed ({}x{} -> {}x{})",
                        size.width,
                        size.height,
                        client.width,
                        client.height
                    );
                }
            }
        }

        path
    }
}
