/// Drawable client-area dimensions in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClientSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ClientSize {
    /// Create new client size
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero (minimized or not yet mapped)
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Total size in bytes for a 32bpp BGRA buffer
    pub fn buffer_size(&self) -> usize {
        self.pixel_count() * 4
    }

    /// Resolve a caller request where non-positive dimensions mean "use the fallback".
    ///
    /// Each dimension is resolved independently and clamped to at least 1.
    pub fn resolve(width: i32, height: i32, fallback: ClientSize) -> Self {
        let pick = |requested: i32, current: u32| -> u32 {
            if requested > 0 {
                requested as u32
            } else {
                current.max(1)
            }
        };

        Self {
            width: pick(width, fallback.width),
            height: pick(height, fallback.height),
        }
    }
}

impl From<(u32, u32)> for ClientSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}
