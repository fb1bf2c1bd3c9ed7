pub mod graphics;
pub mod platform;
pub mod timer;

pub use graphics::*;
pub use platform::*;
pub use timer::*;
