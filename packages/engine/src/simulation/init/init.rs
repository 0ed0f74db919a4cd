use crate::rigid_body_system::{PhysicsBackend, PhysicsWorld, BASE_DELTA_MS};

use super::settings::{DeviceClass, TagCloudConfig};
use super::viewport::{Boundaries, Viewport};

/// Upper bound on catch-up steps after a long frame (tab switch, debugger)
const MAX_STEPS_PER_FRAME: u32 = 4;

/// The drawing surface paired with a world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    pub viewport: Viewport,
    pub pixel_ratio: f32,
    attached: bool,
}

impl Surface {
    pub(super) fn new(viewport: Viewport, pixel_ratio: f32) -> Self {
        Self {
            viewport,
            pixel_ratio,
            attached: true,
        }
    }

    pub fn pixel_width(&self) -> u32 {
        (self.viewport.width * self.pixel_ratio).round() as u32
    }

    pub fn pixel_height(&self) -> u32 {
        (self.viewport.height * self.pixel_ratio).round() as u32
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub(super) fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn detach(&mut self) {
        self.attached = false;
    }
}

/// Fixed-timestep runner fed with animation frame timestamps.
#[derive(Clone, Debug, Default)]
pub struct Runner {
    running: bool,
    last: Option<f64>,
    accumulator: f64,
}

impl Runner {
    fn start(&mut self, now: f64) {
        self.running = true;
        self.last = Some(now);
        self.accumulator = 0.0;
    }

    fn stop(&mut self) {
        self.running = false;
        self.last = None;
        self.accumulator = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of fixed steps to run for a frame at `now`.
    pub(super) fn advance(&mut self, now: f64) -> u32 {
        if !self.running {
            return 0;
        }
        let last = self.last.replace(now).unwrap_or(now);
        self.accumulator += (now - last).max(0.0);

        let step = BASE_DELTA_MS as f64;
        let mut steps = 0;
        while self.accumulator >= step && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= step;
            steps += 1;
        }
        if steps == MAX_STEPS_PER_FRAME {
            // Drop the backlog instead of spiralling.
            self.accumulator = self.accumulator.min(step);
        }
        steps
    }
}

/// A live simulation: world, walls, surface and runner.
pub struct WorldHandle<W> {
    pub(super) world: W,
    pub(super) walls: Boundaries,
    pub(super) surface: Surface,
    pub(super) runner: Runner,
    pub(super) rendering: bool,
    destroyed: bool,
}

impl<W: PhysicsWorld> WorldHandle<W> {
    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn walls(&self) -> &Boundaries {
        &self.walls
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    pub fn is_rendering(&self) -> bool {
        self.rendering
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Stop the render loop and runner, drop every body and detach the
    /// surface. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.rendering = false;
        self.runner.stop();
        self.world.end_drag();
        self.world.clear();
        self.surface.detach();
        self.destroyed = true;
    }
}

/// Build a world for a non-empty `viewport`. The caller checks the size;
/// nothing here fails on zero.
pub(super) fn create_world<B: PhysicsBackend>(
    backend: &B,
    viewport: Viewport,
    config: &TagCloudConfig,
    device: DeviceClass,
    device_pixel_ratio: f32,
    now: f64,
) -> WorldHandle<B::World> {
    let profile = config.profile(device);
    let mut world = backend.create(&config.world_settings(device));
    let walls = Boundaries::build(&mut world, viewport, config.wall_thickness);

    let pixel_ratio = device_pixel_ratio.clamp(1.0, profile.max_pixel_ratio.max(1.0));

    let mut runner = Runner::default();
    runner.start(now);

    log::info!(
        "tag cloud world created: {}x{} @{}x, {:?}",
        viewport.width,
        viewport.height,
        pixel_ratio,
        device
    );

    WorldHandle {
        world,
        walls,
        surface: Surface::new(viewport, pixel_ratio),
        runner,
        rendering: true,
        destroyed: false,
    }
}
