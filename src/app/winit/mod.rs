//! Desktop host built on winit.
//!
//! [`App`] opens a window, starts the model load in the background and
//! forwards window events to an [`AvatarPage`]. Once the avatar is staged a
//! [`Renderer`] is attached to the window and frames are requested
//! continuously until the window closes.

use std::sync::Arc;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::app::avatar_page::AvatarPage;
use crate::app::page::WindowPage;
use crate::assets::{LoadTask, ModelLoader};
use crate::config::StageConfig;
use crate::errors::Result;
use crate::renderer::Renderer;
use crate::stage::LoopState;

pub struct App {
    title: String,
    config: StageConfig,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Avatar Stage".into(),
            config: StageConfig::default(),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: StageConfig) -> Self {
        self.config = config;
        self
    }

    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner {
            title: self.title,
            config: self.config,
            window: None,
            page: None,
            task: None,
            renderer: None,
        };
        event_loop.run_app(&mut runner)?;
        Ok(())
    }
}

struct AppRunner {
    title: String,
    config: StageConfig,
    window: Option<Arc<Window>>,
    page: Option<AvatarPage<WindowPage>>,
    task: Option<LoadTask>,
    renderer: Option<Renderer>,
}

impl AppRunner {
    fn logical(&self, position: PhysicalPosition<f64>) -> Vec2 {
        let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
        let logical = position.to_logical::<f64>(scale);
        Vec2::new(logical.x as f32, logical.y as f32)
    }

    /// Drains pending load events. Returns `true` once the stage was built.
    fn pump_loader(&mut self) -> bool {
        let (Some(task), Some(page)) = (&mut self.task, &mut self.page) else {
            return false;
        };

        let mut staged = false;
        while let Some(event) = task.poll() {
            page.handle_load_event(event);
            staged |= page.stage().is_some();
        }
        if task.is_finished() {
            self.task = None;
        }
        staged
    }

    fn attach_renderer(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(page)) = (&self.window, &self.page) else {
            return;
        };
        let Some(stage) = page.stage() else {
            return;
        };

        let mut renderer = Renderer::new(stage.render_settings.clone());
        log::info!("Initializing renderer backend...");
        if let Err(e) = pollster::block_on(renderer.init(Arc::clone(window))) {
            log::error!("Fatal renderer error: {e}");
            event_loop.exit();
            return;
        }
        self.renderer = Some(renderer);
    }
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 720.0))
            .with_transparent(true);

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let page = WindowPage::new(Arc::clone(&window), self.title.clone());
        self.page = Some(AvatarPage::new(page, self.config.clone()));
        self.window = Some(window);

        log::info!("Loading {}", self.config.model_path.display());
        self.task = Some(
            ModelLoader::new(&self.config.model_path)
                .with_chunk_size(self.config.read_chunk_size)
                .spawn(),
        );
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(handle) = self.page.as_ref().and_then(AvatarPage::loop_handle) {
                    handle.stop();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size.width, physical_size.height);
                }
                let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                let logical = physical_size.to_logical::<f64>(scale);
                if let Some(page) = &mut self.page {
                    page.handle_resize(Vec2::new(logical.width as f32, logical.height as f32));
                }
            }
            WindowEvent::RedrawRequested => {
                let (Some(page), Some(renderer)) = (&mut self.page, &mut self.renderer) else {
                    return;
                };
                match page.frame(renderer) {
                    Ok(LoopState::Running) => {}
                    Ok(LoopState::Stopped) => log::debug!("Render loop stopped"),
                    Err(e) => log::error!("Frame failed: {e}"),
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = self.logical(position);
                if let Some(stage) = self.page.as_mut().and_then(AvatarPage::stage_mut) {
                    stage.input.handle_cursor_move(position);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                if let Some(stage) = self.page.as_mut().and_then(AvatarPage::stage_mut) {
                    stage.input.handle_cursor_left();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(page) = &mut self.page else {
                    return;
                };
                if state == ElementState::Pressed && button == MouseButton::Left {
                    let position = page.stage().map(|stage| stage.input.cursor_position);
                    if let Some(position) = position {
                        page.handle_pointer_down(position);
                    }
                }
                if let Some(stage) = page.stage_mut() {
                    stage.input.handle_mouse_input(state, button);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(stage) = self.page.as_mut().and_then(AvatarPage::stage_mut) {
                    stage.input.handle_mouse_wheel(delta);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.pump_loader() && self.renderer.is_none() {
            self.attach_renderer(event_loop);
        }

        let running = self.page.as_ref().is_some_and(AvatarPage::is_running);
        if running && let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
