//! The avatar stage: one-time scene setup and the per-frame loop.
//!
//! - [`SceneBuilder`]: turns a loaded [`ModelAsset`](crate::assets::ModelAsset)
//!   into a lit, shadowed, animated [`StageContext`]
//! - [`RenderLoop`]: advances the context and renders it, until stopped
//!   through its [`LoopHandle`]

pub mod builder;
pub mod context;
pub mod render_loop;

pub use builder::SceneBuilder;
pub use context::{StageActions, StageContext};
pub use render_loop::{LoopHandle, LoopState, RenderLoop};
