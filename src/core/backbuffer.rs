use super::extent::ClientSize;

/// CPU-writable 32bpp pixel buffer presented to a window by explicit copy.
///
/// Pixels are `0xAARRGGBB` words, row-major, top row first. On little-endian
/// hosts the byte view is BGRA. `S` is the backend's drawing-surface handle
/// and lives exactly as long as the pixels do.
pub struct Backbuffer<S> {
    pixels: Vec<u32>,
    size: ClientSize,
    surface: S,
}

impl<S> Backbuffer<S> {
    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn size(&self) -> ClientSize {
        self.size
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Raw pixel address, stable until the buffer is destroyed or recreated
    pub fn as_ptr(&self) -> *const u32 {
        self.pixels.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut u32 {
        self.pixels.as_mut_ptr()
    }

    /// Byte view of the pixels (BGRA on little-endian hosts)
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.pixels)
    }

    /// Mutable view of one row
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [u32]> {
        if y >= self.size.height {
            return None;
        }
        let width = self.size.width as usize;
        let start = y as usize * width;
        Some(&mut self.pixels[start..start + width])
    }

    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Split borrow used by the presenter: read pixels, write through the surface
    pub(crate) fn parts_mut(&mut self) -> (&[u32], ClientSize, &mut S) {
        (&self.pixels, self.size, &mut self.surface)
    }
}

impl<S> std::fmt::Debug for Backbuffer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backbuffer")
            .field("size", &self.size)
            .field("pixels", &self.pixels.as_ptr())
            .finish()
    }
}

/// Owner of the optional backbuffer.
///
/// The buffer is either fully absent or fully present with matching pixels,
/// dimensions, and drawing surface; no half-built state is ever stored.
pub struct BackbufferSlot<S> {
    current: Option<Backbuffer<S>>,
}

impl<S> Default for BackbufferSlot<S> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<S> BackbufferSlot<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn get(&self) -> Option<&Backbuffer<S>> {
        self.current.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut Backbuffer<S>> {
        self.current.as_mut()
    }

    /// Size of the active buffer, `None` when absent
    pub fn size(&self) -> Option<ClientSize> {
        self.current.as_ref().map(Backbuffer::size)
    }

    /// Make sure a buffer of exactly `size` exists.
    ///
    /// An existing buffer of that size is returned untouched (same pixels,
    /// same address). Otherwise the old buffer is released first, then pixels
    /// and drawing surface are allocated. If either allocation fails the slot
    /// is left empty and `None` is returned.
    pub fn ensure<F>(&mut self, size: ClientSize, make_surface: F) -> Option<&mut Backbuffer<S>>
    where
        F: FnOnce(ClientSize) -> Option<S>,
    {
        if size.is_empty() {
            return None;
        }

        if self.size() == Some(size) {
            return self.current.as_mut();
        }

        self.destroy();

        let pixels = allocate_pixels(size)?;
        let Some(surface) = make_surface(size) else {
            log::warn!("backbuffer surface allocation failed at {}x{}", size.width, size.height);
            return None;
        };

        log::debug!("backbuffer created at {}x{}", size.width, size.height);
        self.current = Some(Backbuffer {
            pixels,
            size,
            surface,
        });
        self.current.as_mut()
    }

    /// Release pixels and drawing surface; returns false when nothing was active
    pub fn destroy(&mut self) -> bool {
        match self.current.take() {
            Some(buffer) => {
                log::debug!("backbuffer destroyed ({}x{})", buffer.width(), buffer.height());
                drop(buffer);
                true
            }
            None => false,
        }
    }
}

fn allocate_pixels(size: ClientSize) -> Option<Vec<u32>> {
    let count = (size.width as usize).checked_mul(size.height as usize)?;
    let mut pixels = Vec::new();
    if pixels.try_reserve_exact(count).is_err() {
        log::warn!("backbuffer pixel allocation failed at {}x{}", size.width, size.height);
        return None;
    }
    pixels.resize(count, 0);
    Some(pixels)
}
