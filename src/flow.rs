//! Application event loop.
//!
//! Opens one window, builds the configured scene on it and redraws it
//! continuously until the window is closed.
//!
//! # Lifecycle
//!
//! 1. `resumed` creates the window, the wgpu context and the scene
//! 2. `RedrawRequested` draws the scene with the seconds elapsed since start
//! 3. `Resized` reconfigures the surface and the camera's aspect ratio
//! 4. `CloseRequested` leaves the loop
//!
//! A failure while setting up ends the loop and is returned from [`run`].

use std::sync::Arc;

use cgmath::Deg;
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    camera::FixedCamera,
    config::Config,
    context::{Context, SurfaceTarget},
    error::FrameError,
    scenes::{Scene, cube::ExampleCube, model::ModelScene},
};

struct AppState {
    ctx: Context,
    target: SurfaceTarget,
    scene: Box<dyn Scene<Context>>,
    camera: FixedCamera,
}

impl AppState {
    async fn new(window: Arc<Window>, config: &Config) -> anyhow::Result<Self> {
        let (ctx, target) = Context::new(window).await?;
        let scene: Box<dyn Scene<Context>> = match &config.model {
            Some(path) => {
                log::info!("Loading {:?}", path);
                Box::new(ModelScene::load(path, &ctx)?)
            }
            None => Box::new(ExampleCube::new(&ctx)?),
        };

        let (width, height) = target.size();
        let camera = match scene.bounding_box() {
            Some(bounds) => FixedCamera::framing(&bounds, Deg(config.fov), config.distance, width, height),
            None => FixedCamera::default(),
        };
        Ok(Self {
            ctx,
            target,
            scene,
            camera,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.target.resize(width, height);
        self.camera.resize(width, height);
    }
}

pub struct App {
    config: Config,
    state: Option<AppState>,
    started: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
            started: Instant::now(),
            error: None,
        }
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<AppState> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(event_loop.create_window(window_attributes)?);
        futures::executor::block_on(AppState::new(window, &self.config))
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(state) => {
                state.target.request_redraw();
                self.started = Instant::now();
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("Startup failed: {e:#}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let time = self.started.elapsed().as_secs_f32();
                if let Err(e) = state
                    .scene
                    .draw(time, &state.camera, &mut state.target, &state.ctx)
                {
                    report_dropped_frame(&e);
                }
                state.target.request_redraw();
            }
            _ => {}
        }
    }
}

/// Lost surfaces and skipped frames recover on their own, only other failures
/// are worth a warning.
fn report_dropped_frame(e: &anyhow::Error) -> log::Level {
    let level = match e.downcast_ref::<FrameError>() {
        Some(_) => log::Level::Debug,
        None => log::Level::Warn,
    };
    log::log!(level, "Dropped a frame: {e:#}");
    level
}

pub fn run(config: Config) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
