pub mod backbuffer;
pub mod callbacks;
pub mod clock;
pub mod events;
pub mod extent;
pub mod icon;
pub mod input;
pub mod pacer;
pub mod presenter;
pub mod runtime;
pub mod scaling;
pub mod session;
mod translator;

pub use backbuffer::{Backbuffer, BackbufferSlot};
pub use callbacks::*;
pub use clock::{Clock, FpsCounter};
pub use events::{EventQueue, PlatformEvent, WindowKey};
pub use extent::ClientSize;
pub use icon::WindowIcon;
pub use input::{Action, InputSnapshot, InputState, KeyCode, Modifiers, MouseButton};
pub use pacer::{FramePacer, PaceOutcome};
pub use presenter::{PresentPath, Presenter};
pub use runtime::Runtime;
pub use session::WindowSession;
