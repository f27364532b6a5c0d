//! Page lifetime and the desktop host.
//!
//! - [`AvatarPage`]: reacts to load events, owns the stage and its loop
//! - [`HostPage`]: what the stage needs from the surrounding page
//! - [`App`]: winit runner wiring a window, the loader and the renderer

pub mod avatar_page;
pub mod input;
pub mod page;
pub mod pointer;
pub mod winit;

pub use avatar_page::AvatarPage;
pub use input::Input;
pub use page::{CanvasDescriptor, HostPage, WindowPage};
pub use self::winit::App;
