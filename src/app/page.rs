//! The host surface the stage lives in.
//!
//! [`HostPage`] is everything the stage needs from its surroundings: the
//! container's size, the display density, a loading indicator and a place to
//! put the canvas. [`WindowPage`] is the desktop implementation over a winit
//! window.

use std::sync::Arc;

use glam::UVec2;
use winit::window::Window;

/// Drawing surface requested by the stage, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasDescriptor {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

pub trait HostPage {
    /// Container size in logical pixels.
    fn container_size(&self) -> UVec2;

    /// Physical pixels per logical pixel.
    fn pixel_ratio(&self) -> f32;

    /// Replaces the loading indicator's text.
    fn set_loading_text(&mut self, text: &str);

    /// Hides the loading indicator.
    fn hide_loading(&mut self);

    /// Attaches the stage's canvas. Called exactly once per stage.
    fn append_canvas(&mut self, canvas: CanvasDescriptor);
}

/// [`HostPage`] over a desktop window.
///
/// The loading indicator is shown in the title bar and the canvas is the
/// window's own surface.
pub struct WindowPage {
    window: Arc<Window>,
    title: String,
    loading: Option<String>,
    canvas: Option<CanvasDescriptor>,
}

impl WindowPage {
    #[must_use]
    pub fn new(window: Arc<Window>, title: impl Into<String>) -> Self {
        Self {
            window,
            title: title.into(),
            loading: None,
            canvas: None,
        }
    }

    #[must_use]
    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    /// The canvas appended by the stage, once it exists.
    #[must_use]
    pub fn canvas(&self) -> Option<CanvasDescriptor> {
        self.canvas
    }

    #[must_use]
    pub fn loading_text(&self) -> Option<&str> {
        self.loading.as_deref()
    }
}

impl HostPage for WindowPage {
    fn container_size(&self) -> UVec2 {
        let size = self.window.inner_size().to_logical::<u32>(self.window.scale_factor());
        UVec2::new(size.width, size.height)
    }

    fn pixel_ratio(&self) -> f32 {
        self.window.scale_factor() as f32
    }

    fn set_loading_text(&mut self, text: &str) {
        if self.loading.as_deref() == Some(text) {
            return;
        }
        self.window.set_title(&format!("{} - {text}", self.title));
        self.loading = Some(text.to_string());
    }

    fn hide_loading(&mut self) {
        self.window.set_title(&self.title);
        self.loading = None;
    }

    fn append_canvas(&mut self, canvas: CanvasDescriptor) {
        if self.canvas.is_some() {
            log::warn!("Canvas already attached; ignoring a second one");
            return;
        }
        log::debug!("Canvas attached: {}x{} @ {}x", canvas.width, canvas.height, canvas.pixel_ratio);
        self.canvas = Some(canvas);
    }
}
