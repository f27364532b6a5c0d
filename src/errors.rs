//! Error Types
//!
//! The crate-wide error type [`StageError`] covers every failure the stage can
//! run into:
//! - asset reading, glTF parsing and texture decoding
//! - animation clip lookup
//! - GPU and window initialization
//!
//! None of them are fatal to the host: load failures leave the loading
//! indicator on screen, a missing clip leaves its action unplayed.
//!
//! ```rust,ignore
//! use avatar_stage::errors::{Result, StageError};
//!
//! fn pick(clips: &[Arc<AnimationClip>]) -> Result<&Arc<AnimationClip>> {
//!     AnimationClip::find_by_name(clips, "waving")
//! }
//! ```

use thiserror::Error;

/// The main error type of the stage.
#[derive(Error, Debug)]
pub enum StageError {
    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// glTF parsing or loading error.
    #[error("glTF error: {0}")]
    Gltf(String),

    /// The glTF document parsed but refers to data that is missing or malformed.
    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    /// Image decoding error.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// Base64 decoding error in a `data:` URI.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The background loader went away without reporting a result.
    #[error("Loader disconnected before finishing")]
    LoaderDisconnected,

    // ========================================================================
    // Animation Errors
    // ========================================================================
    /// No clip with the requested name exists in the loaded asset.
    #[error("Animation clip not found: {name}")]
    ClipNotFound {
        /// Name that was looked up
        name: String,
    },

    // ========================================================================
    // GPU & Window Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Surface creation or configuration error.
    #[error("Surface error: {0}")]
    Surface(String),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<image::ImageError> for StageError {
    fn from(err: image::ImageError) -> Self {
        StageError::ImageDecode(err.to_string())
    }
}

impl From<gltf::Error> for StageError {
    fn from(err: gltf::Error) -> Self {
        StageError::Gltf(err.to_string())
    }
}

impl From<wgpu::CreateSurfaceError> for StageError {
    fn from(err: wgpu::CreateSurfaceError) -> Self {
        StageError::Surface(err.to_string())
    }
}

/// Alias for `Result<T, StageError>`.
pub type Result<T> = std::result::Result<T, StageError>;
