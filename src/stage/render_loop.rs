use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::Result;
use crate::renderer::FrameRenderer;
use crate::stage::context::StageContext;
use crate::utils::time::Clock;

/// Outcome of one [`RenderLoop::frame`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// A frame was produced; the host should schedule the next one.
    Running,
    /// The loop was stopped; no work was done.
    Stopped,
}

/// Cancellation handle of a [`RenderLoop`]. Clones share the same loop.
#[derive(Debug, Clone)]
pub struct LoopHandle {
    running: Arc<AtomicBool>,
}

impl LoopHandle {
    /// Stops the loop. Frames requested afterwards do nothing.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Per-frame driver: clock delta, mixer, controls and matrices, then one
/// render call.
///
/// There is no frame cap and no catch-up; every frame advances by the real
/// time elapsed since the previous one.
pub struct RenderLoop {
    clock: Clock,
    running: Arc<AtomicBool>,
    frames: u64,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    /// A running loop. Its clock starts on the first [`frame`](Self::frame),
    /// so the host may finish renderer setup after creating it.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Clock::new(),
            running: Arc::new(AtomicBool::new(true)),
            frames: 0,
        }
    }

    #[must_use]
    pub fn handle(&self) -> LoopHandle {
        LoopHandle {
            running: Arc::clone(&self.running),
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Frames rendered so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Runs one iteration with the real elapsed time.
    pub fn frame(&mut self, ctx: &mut StageContext, renderer: &mut dyn FrameRenderer) -> Result<LoopState> {
        if !self.is_running() {
            return Ok(LoopState::Stopped);
        }
        let dt = self.clock.get_delta();
        self.frame_with_delta(ctx, renderer, dt)
    }

    /// Runs one iteration advancing the stage by exactly `dt` seconds.
    pub fn frame_with_delta(
        &mut self,
        ctx: &mut StageContext,
        renderer: &mut dyn FrameRenderer,
        dt: f32,
    ) -> Result<LoopState> {
        if !self.is_running() {
            return Ok(LoopState::Stopped);
        }
        ctx.step(dt);
        renderer.render(&ctx.scene, ctx.camera)?;
        self.frames += 1;
        Ok(LoopState::Running)
    }
}
