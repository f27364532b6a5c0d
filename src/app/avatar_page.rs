use glam::Vec2;

use crate::app::page::HostPage;
use crate::app::pointer;
use crate::assets::LoadEvent;
use crate::config::{StageConfig, StageFeatures};
use crate::errors::Result;
use crate::renderer::FrameRenderer;
use crate::stage::{LoopHandle, LoopState, RenderLoop, SceneBuilder, StageContext};

/// Page-lifetime controller.
///
/// Feeds load events to the host page, builds the stage once the model
/// arrives, and owns the stage and its render loop from then on.
pub struct AvatarPage<P: HostPage> {
    page: P,
    builder: SceneBuilder,
    stage: Option<StageContext>,
    render_loop: Option<RenderLoop>,
}

impl<P: HostPage> AvatarPage<P> {
    pub fn new(page: P, config: StageConfig) -> Self {
        Self {
            page,
            builder: SceneBuilder::new(config),
            stage: None,
            render_loop: None,
        }
    }

    #[must_use]
    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    #[must_use]
    pub fn config(&self) -> &StageConfig {
        self.builder.config()
    }

    #[must_use]
    pub fn stage(&self) -> Option<&StageContext> {
        self.stage.as_ref()
    }

    pub fn stage_mut(&mut self) -> Option<&mut StageContext> {
        self.stage.as_mut()
    }

    /// Cancellation handle of the render loop, once it has started.
    #[must_use]
    pub fn loop_handle(&self) -> Option<LoopHandle> {
        self.render_loop.as_ref().map(RenderLoop::handle)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.render_loop.as_ref().is_some_and(RenderLoop::is_running)
    }

    pub fn handle_load_event(&mut self, event: LoadEvent) {
        match event {
            LoadEvent::Progress(progress) => {
                self.page.set_loading_text(&progress.loading_text());
            }
            LoadEvent::Loaded(model) => {
                if self.stage.is_some() {
                    log::warn!("Stage already built; ignoring {}", model.source.display());
                    return;
                }
                let stage = self.builder.build(&model, &mut self.page);
                self.page.hide_loading();
                self.stage = Some(stage);
                self.render_loop = Some(RenderLoop::new());
                log::info!("Render loop started");
            }
            LoadEvent::Failed(err) => {
                log::error!("Failed to load {}: {err}", self.config().model_path.display());
            }
        }
    }

    /// Tracks the new container size for pointer handling.
    ///
    /// The camera keeps the aspect ratio it was created with.
    pub fn handle_resize(&mut self, container: Vec2) {
        if let Some(stage) = &mut self.stage {
            stage.input.handle_resize(container);
        }
    }

    /// Pointer press at `position` in container pixels.
    ///
    /// With the pointer readout enabled, returns and logs the position in
    /// normalized device coordinates.
    pub fn handle_pointer_down(&mut self, position: Vec2) -> Option<Vec2> {
        if !self.config().features.contains(StageFeatures::POINTER_READOUT) {
            return None;
        }
        let container = self.page.container_size().as_vec2();
        let ndc = pointer::to_ndc(position, container)?;
        log::info!("Pointer down at NDC ({:.3}, {:.3})", ndc.x, ndc.y);
        Some(ndc)
    }

    /// Runs one loop iteration. Before the stage exists, or after the loop
    /// was stopped, nothing happens and `Stopped` is returned.
    pub fn frame(&mut self, renderer: &mut dyn FrameRenderer) -> Result<LoopState> {
        match (&mut self.render_loop, &mut self.stage) {
            (Some(render_loop), Some(stage)) => render_loop.frame(stage, renderer),
            _ => Ok(LoopState::Stopped),
        }
    }

    /// Same as [`frame`](Self::frame) with a fixed time step.
    pub fn frame_with_delta(&mut self, renderer: &mut dyn FrameRenderer, dt: f32) -> Result<LoopState> {
        match (&mut self.render_loop, &mut self.stage) {
            (Some(render_loop), Some(stage)) => render_loop.frame_with_delta(stage, renderer, dt),
            _ => Ok(LoopState::Stopped),
        }
    }
}
