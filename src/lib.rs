//! Avatar Stage
//!
//! Loads one skinned glTF avatar, stages it under a fixed light rig with an
//! orbit camera, and plays its idle animation every frame.
//!
//! The crate is organised the way the page uses it:
//!
//! - [`assets`]: asynchronous model loading with progress reporting
//! - [`stage`]: one-time scene setup ([`stage::SceneBuilder`]) and the
//!   cancellable per-frame [`stage::RenderLoop`]
//! - [`app`]: the page-lifetime controller and the winit host
//! - [`animation`], [`scene`], [`resources`]: the data the stage is made of
//! - [`renderer`]: the wgpu forward renderer with spot light shadows

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod app;
pub mod assets;
pub mod config;
pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;
pub mod stage;
pub mod utils;

pub use animation::{ActionHandle, AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
pub use app::{AvatarPage, HostPage};
pub use assets::{LoadEvent, LoadProgress, ModelAsset, ModelLoader};
pub use config::{StageConfig, StageFeatures};
pub use errors::{Result, StageError};
pub use renderer::{FrameRenderer, Renderer};
pub use scene::{Camera, Light, Node, NodeHandle, Scene};
pub use stage::{LoopHandle, RenderLoop, SceneBuilder, StageContext};
pub use utils::orbit_control::OrbitControls;
