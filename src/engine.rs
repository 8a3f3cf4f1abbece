use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::EngineConfig;
use crate::core::{Clock, FrameHandle, FrameInfo, FrameLoop, Viewport};
use crate::error::EngineError;
use crate::render::{FrameView, RenderSurface};
use crate::scene::{
    CursorPosition, GeometryAnimator, InputSnapshot, LightingRig, MaterialFactory,
    PerspectiveCamera, SceneGraph, ScrollProgress,
};

/// Input written between ticks, applied at the start of the next one
#[derive(Debug, Default)]
struct PendingInput {
    cursor: Option<CursorPosition>,
    scroll: Option<ScrollProgress>,
}

/// Top-level owner of the scene and its render surface
///
/// Construction builds materials, geometry and lights in dependency order.
/// Each [`tick`](SceneEngine::tick) latches pending input, advances geometry
/// then lighting, and renders one frame. [`dispose`](SceneEngine::dispose)
/// tears everything down in reverse order and stops the frame loop.
pub struct SceneEngine<S: RenderSurface> {
    config: EngineConfig,
    clock: Clock,
    frames: FrameLoop,
    camera: PerspectiveCamera,
    graph: SceneGraph,
    materials: MaterialFactory,
    animator: GeometryAnimator,
    lighting: LightingRig,
    surface: S,
    pending: PendingInput,
    input: InputSnapshot,
    disposed: bool,
}

impl<S: RenderSurface> SceneEngine<S> {
    pub fn new(surface: S, config: EngineConfig) -> Result<Self, EngineError> {
        let viewport = surface.viewport();
        if viewport.width == 0 || viewport.height == 0 {
            return Err(EngineError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let camera = PerspectiveCamera::from_config(&config, viewport.aspect());
        let mut graph = SceneGraph::new();
        let materials = MaterialFactory::new(&mut rng);
        let mut animator = GeometryAnimator::new(&materials, &mut graph, &mut rng);
        if config.scroll_dolly {
            animator.enable_camera_dolly(config.camera_distance);
        }
        let lighting = LightingRig::new(&mut graph);

        log::info!(
            "Scene engine ready: {}x{} viewport, {} nodes, seed {:?}",
            viewport.width,
            viewport.height,
            graph.len(),
            config.seed
        );

        Ok(Self {
            config,
            clock: Clock::new(),
            frames: FrameLoop::new(),
            camera,
            graph,
            materials,
            animator,
            lighting,
            surface,
            pending: PendingInput::default(),
            input: InputSnapshot::default(),
            disposed: false,
        })
    }

    /// Run one frame at the clock's current elapsed time
    pub fn tick(&mut self) -> Option<FrameInfo> {
        let time = self.clock.elapsed();
        self.tick_at(time)
    }

    /// Run one frame at `time` seconds since start
    ///
    /// Returns `None` once the engine is disposed or for a non-finite time.
    pub fn tick_at(&mut self, time: f32) -> Option<FrameInfo> {
        if !time.is_finite() {
            log::debug!("Ignoring tick at non-finite time {}", time);
            return None;
        }
        let frame = self.frames.begin_frame(time)?;

        self.latch_input();
        self.animator.update(time);
        self.lighting.update(time);
        if let Some(z) = self.animator.camera_z() {
            self.camera.position.z = z;
        }

        let view = FrameView::collect(
            frame,
            &self.camera,
            &self.graph,
            &self.animator,
            &self.lighting,
            &self.materials,
            self.config.exposure,
            self.config.transparent,
        );
        if let Err(err) = self.surface.render(&view) {
            log::warn!("Skipped frame {}: {}", frame.number, err);
        }

        Some(frame)
    }

    fn latch_input(&mut self) {
        if let Some(cursor) = self.pending.cursor.take() {
            self.input.cursor = cursor;
            self.lighting.update_cursor_position(cursor.get());
        }
        if let Some(scroll) = self.pending.scroll.take() {
            self.input.scroll = scroll;
            self.animator.update_scroll_progress(scroll.get());
            self.lighting.update_scroll_progress(scroll.get());
        }
    }

    /// Record the pointer at pixel (`x`, `y`) of `viewport` for the next tick
    pub fn set_cursor_position(&mut self, x: f32, y: f32, viewport: Viewport) {
        if self.disposed {
            return;
        }
        match viewport.to_ndc(x, y) {
            Some(ndc) => self.pending.cursor = Some(CursorPosition::new(ndc)),
            None => log::debug!(
                "Ignoring pointer ({}, {}) on {}x{} viewport",
                x,
                y,
                viewport.width,
                viewport.height
            ),
        }
    }

    /// Record scroll progress for the next tick; values are clamped to [0, 1]
    pub fn set_scroll_progress(&mut self, progress: f32) {
        if self.disposed {
            return;
        }
        if progress.is_nan() {
            log::debug!("Ignoring NaN scroll progress");
            return;
        }
        if !(0.0..=1.0).contains(&progress) {
            log::debug!("Clamping scroll progress {}", progress);
        }
        self.pending.scroll = Some(ScrollProgress::clamped(progress));
    }

    /// Apply a new logical size to the camera and surface immediately
    pub fn on_resize(&mut self, width: u32, height: u32) {
        let Some(viewport) = Viewport::new(width, height) else {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return;
        };
        let ratio = self.surface.viewport().pixel_ratio;
        self.apply_viewport(viewport.with_pixel_ratio(ratio, self.config.max_pixel_ratio));
    }

    /// Apply a new device pixel ratio, capped by the configuration
    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        let viewport = self
            .surface
            .viewport()
            .with_pixel_ratio(ratio, self.config.max_pixel_ratio);
        self.apply_viewport(viewport);
    }

    fn apply_viewport(&mut self, viewport: Viewport) {
        if self.disposed {
            return;
        }
        self.camera.set_aspect(viewport.aspect());
        self.surface.resize(viewport);
    }

    /// Stop the frame loop and release lights, geometry, materials and the surface
    ///
    /// Returns false if the engine was already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }

        self.frames.cancel();
        self.lighting.dispose(&mut self.graph);
        self.animator.dispose(&mut self.graph, &mut self.materials);
        self.materials.dispose();
        self.surface.release();
        self.disposed = true;

        log::info!("Scene engine disposed after {} frames", self.frames.frame_count());
        true
    }

    /// Handle the host scheduler polls before requesting another frame
    pub fn frame_handle(&self) -> FrameHandle {
        self.frames.handle()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn frame_count(&self) -> u64 {
        self.frames.frame_count()
    }

    /// Input as seen by the most recent tick
    pub fn input(&self) -> InputSnapshot {
        self.input
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn materials(&self) -> &MaterialFactory {
        &self.materials
    }

    pub fn animator(&self) -> &GeometryAnimator {
        &self.animator
    }

    pub fn lighting(&self) -> &LightingRig {
        &self.lighting
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: RenderSurface> Drop for SceneEngine<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
