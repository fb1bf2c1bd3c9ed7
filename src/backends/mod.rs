pub mod desktop;
pub mod headless;
pub mod soft_surface;
pub mod wgpu_context;

pub use desktop::{WinitBackend, WinitWindow};
pub use headless::{
    HandleKind, HandleLedger, HeadlessBackend, HeadlessController, HeadlessWindowState,
    PresentedFrame,
};
pub use soft_surface::SoftSurface;
pub use wgpu_context::WgpuContext;
