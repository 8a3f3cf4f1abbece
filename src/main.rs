use std::f32::consts::TAU;
use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use scroll_scene::cli::Cli;
use scroll_scene::core::{FrameHandle, HostAction, Viewport, WinitInput};
use scroll_scene::render::{GpuSurface, HeadlessSurface, RenderSurface};
use scroll_scene::{EngineConfig, SceneEngine};

const HEADLESS_FPS: f32 = 60.0;

struct App {
    config: EngineConfig,
    size: LogicalSize<u32>,
    window: Option<Arc<Window>>,
    engine: Option<SceneEngine<GpuSurface>>,
    frame_handle: Option<FrameHandle>,
    input: WinitInput,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: EngineConfig, width: u32, height: u32) -> Self {
        Self {
            config,
            size: LogicalSize::new(width, height),
            window: None,
            engine: None,
            frame_handle: None,
            input: WinitInput::default(),
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title("Scroll Scene")
                    .with_transparent(self.config.transparent)
                    .with_inner_size(self.size),
            )
            .context("failed to create window")?;
        let window = Arc::new(window);

        let scale = window.scale_factor();
        let logical = window.inner_size().to_logical::<f64>(scale);
        let viewport = Viewport::new(logical.width.round() as u32, logical.height.round() as u32)
            .context("window has zero size")?
            .with_pixel_ratio(scale as f32, self.config.max_pixel_ratio);

        let surface = pollster::block_on(GpuSurface::new(window.clone(), viewport, &self.config))
            .context("failed to initialise GPU surface")?;
        let engine = SceneEngine::new(surface, self.config.clone()).context("failed to build scene engine")?;

        self.input = WinitInput::new(scale);
        self.frame_handle = Some(engine.frame_handle());
        self.engine = Some(engine);
        self.window = Some(window);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let WindowEvent::RedrawRequested = event {
            if let Some(engine) = &mut self.engine {
                engine.tick();
            }
            return;
        }

        let Some(action) = self.input.process_event(&event) else {
            return;
        };
        let Some(engine) = &mut self.engine else {
            return;
        };

        match action {
            HostAction::Quit => {
                engine.dispose();
                event_loop.exit();
            }
            HostAction::Pointer { x, y } => {
                let viewport = engine.surface().viewport();
                engine.set_cursor_position(x, y, viewport);
            }
            HostAction::Scroll(progress) => engine.set_scroll_progress(progress),
            HostAction::Resize { width, height } => engine.on_resize(width, height),
            HostAction::PixelRatio(ratio) => engine.set_pixel_ratio(ratio),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        match (&self.frame_handle, &self.window) {
            (Some(handle), Some(window)) if handle.is_active() => window.request_redraw(),
            (Some(_), _) => event_loop.exit(),
            _ => {}
        }
    }
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            EngineConfig::from_json_str(&json)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    Ok(cli.apply(config))
}

/// Drive the engine off-screen with a synthetic pointer orbit and a steady scroll
fn run_headless(cli: &Cli, config: EngineConfig) -> Result<()> {
    let viewport = Viewport::new(cli.width, cli.height)
        .with_context(|| format!("invalid size {}x{}", cli.width, cli.height))?;
    let mut engine = SceneEngine::new(HeadlessSurface::new(viewport), config)
        .context("failed to build scene engine")?;
    let handle = engine.frame_handle();
    let mut input = WinitInput::default();
    let scroll_step = 1.0 / cli.frames.max(1) as f32;

    for frame in 0..cli.frames {
        if !handle.is_active() {
            break;
        }
        let time = frame as f32 / HEADLESS_FPS;
        let angle = time * 0.5 * TAU;
        let x = (0.5 + 0.4 * angle.cos()) * viewport.width as f32;
        let y = (0.5 + 0.4 * angle.sin()) * viewport.height as f32;

        engine.set_cursor_position(x, y, viewport);
        engine.set_scroll_progress(input.scroll_by(scroll_step));
        engine.tick_at(time);
    }

    if let Some(stats) = engine.surface().last_frame() {
        log::info!(
            "Rendered {} frames; last frame drew {} meshes, {} particles, {} lights",
            engine.surface().frames_rendered(),
            stats.meshes,
            stats.points,
            stats.lights
        );
    }
    engine.dispose();
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if cli.headless {
        return run_headless(&cli, config);
    }

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = App::new(config, cli.width, cli.height);

    log::info!("Scroll Scene - move the pointer, scroll the wheel, Escape to quit");
    event_loop.run_app(&mut app).context("event loop failed")?;

    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
