use crate::core::extent::ClientSize;

/// Swap-chain based hardware context attached to one window.
///
/// Teardown is split so the owning session can enforce its order:
/// `detach` releases the device side, `release_surface` the drawing
/// surface. Both are idempotent.
pub trait GraphicsContext {
    /// Configure the surface for `size` and mark the context current
    fn make_current(&mut self, size: ClientSize) -> bool;

    fn is_current(&self) -> bool;

    /// Present the current frame, pacing it by `interval` refreshes (0 = unlimited)
    fn swap_buffers(&mut self, interval: u32) -> bool;

    /// Whether the named extension is available on this context
    fn extension_supported(&self, name: &str) -> bool;

    /// Follow a client-area resize
    fn resize(&mut self, size: ClientSize);

    /// Make not-current and destroy the device side of the context
    fn detach(&mut self);

    /// Release the drawing surface the context rendered into
    fn release_surface(&mut self);
}

/// Visible surface a software backbuffer is copied onto
pub trait PresentSurface {
    /// Show `pixels` (`0xAARRGGBB`, row-major) of `size`; false on failure
    fn present(&mut self, pixels: &[u32], size: ClientSize) -> bool;
}
