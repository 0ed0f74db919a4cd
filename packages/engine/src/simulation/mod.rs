//! Tag cloud - labelled capsules falling into a resizable box
//!
//! The core is split the same way the browser drives it:
//! - lifecycle/   - deferred start, polling, teardown, re-init guard
//! - init/        - tunable settings and world construction
//! - spawn/       - one tag per interval, anti-clog nudges
//! - viewport/    - container size and the four walls
//! - interaction/ - drag and click repulsion
//! - render/      - pure draw command lists
//!
//! `TagCloudCore` never touches the DOM. Time comes in through `tick`/`frame`
//! and the container through a [`HostSurface`], so everything here runs in
//! plain `cargo test`. The wasm facade in `facade.rs` is the only DOM code.

use crate::core::cursor::CursorLease;
use crate::core::random::Rng;
use crate::core::scheduler::{Scheduler, TimerId};
use crate::rigid_body::{RigidBody, Vec2};
use crate::rigid_body_system::{PhysicsBackend, PhysicsWorld, BASE_DELTA_MS};

#[path = "init/settings.rs"]
mod settings;
#[path = "init/init.rs"]
mod init;
#[path = "lifecycle/lifecycle.rs"]
mod lifecycle;
#[path = "spawn/spawner.rs"]
mod spawner;
#[path = "viewport/viewport.rs"]
mod viewport;
#[path = "interaction/interaction.rs"]
mod interaction;
#[path = "render/draw.rs"]
mod draw;
#[path = "render/render_labels.rs"]
mod render_labels;
mod facade;

pub use draw::{DrawCommand, TextAlign, TextBaseline};
pub use facade::TagCloud;
pub use init::{Runner, Surface, WorldHandle};
pub use interaction::{repulsion_impulses, InteractionBridge, ListenerKind, ListenerSet};
pub use render_labels::{render_frame, render_labels, render_shapes, FrameState};
pub use settings::{DeviceClass, DeviceProfile, TagCloudConfig, TagPalette};
pub use spawner::{build_tag, spawn_x, tag_width, TagSpawner};
pub use viewport::{contain_bodies, enclosed_region, reposition_boundaries, wall_placement, Boundaries, Rect, Viewport, Wall, WallPlacement};

/// The page the cloud lives in: container size and window metrics.
pub trait HostSurface {
    /// Current container size in CSS pixels (zero while hidden or unlaid-out)
    fn measure(&self) -> Viewport;

    /// Window width used to pick the device class
    fn window_width(&self) -> f32;

    fn device_pixel_ratio(&self) -> f32 {
        1.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecyclePhase {
    Uninitialized,
    WaitingForPreconditions,
    Active,
    TearingDown,
    Destroyed,
    /// Polling gave up; the cloud stays empty until mounted again.
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerTag {
    Poll,
    Spawn,
    Jitter,
}

/// Default seed when the host does not provide one
const DEFAULT_SEED: u32 = 0x1A2B_3C4D;

pub struct TagCloudCore<B: PhysicsBackend, H: HostSurface> {
    backend: B,
    host: H,
    config: TagCloudConfig,
    labels: Vec<String>,

    // Lifecycle
    phase: LifecyclePhase,
    history: Vec<LifecyclePhase>,
    scheduler: Scheduler<TimerTag>,
    poll_timer: Option<TimerId>,
    poll_attempts: u32,

    // Live world
    world: Option<WorldHandle<B::World>>,
    device: DeviceClass,
    rng: Rng,
    spawner: TagSpawner,
    jitter_timer: Option<TimerId>,
    interaction: InteractionBridge,
    resize_observed: bool,
    cursor: Option<CursorLease>,
    worlds_built: u32,
}

impl<B: PhysicsBackend, H: HostSurface> TagCloudCore<B, H> {
    pub fn new(backend: B, host: H, config: TagCloudConfig, labels: Vec<String>) -> Self {
        Self::with_seed(backend, host, config, labels, DEFAULT_SEED)
    }

    pub fn with_seed(backend: B, host: H, config: TagCloudConfig, labels: Vec<String>, seed: u32) -> Self {
        Self {
            backend,
            host,
            config,
            labels,
            phase: LifecyclePhase::Uninitialized,
            history: vec![LifecyclePhase::Uninitialized],
            scheduler: Scheduler::new(0.0),
            poll_timer: None,
            poll_attempts: 0,
            world: None,
            device: DeviceClass::Regular,
            rng: Rng::new(seed),
            spawner: TagSpawner::default(),
            jitter_timer: None,
            interaction: InteractionBridge::default(),
            resize_observed: false,
            cursor: None,
            worlds_built: 0,
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Every phase entered since construction, in order
    pub fn history(&self) -> &[LifecyclePhase] {
        &self.history
    }

    pub fn config(&self) -> &TagCloudConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    /// Timers that would still fire (poll, spawn, jitter)
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn poll_attempts(&self) -> u32 {
        self.poll_attempts
    }

    pub fn worlds_built(&self) -> u32 {
        self.worlds_built
    }

    pub fn world(&self) -> Option<&WorldHandle<B::World>> {
        self.world.as_ref()
    }

    pub fn bodies(&self) -> &[RigidBody] {
        self.world.as_ref().map_or(&[], |h| h.world.bodies())
    }

    pub fn body_count(&self) -> usize {
        self.bodies().len()
    }

    pub fn dynamic_count(&self) -> usize {
        self.bodies().iter().filter(|b| !b.is_static).count()
    }

    /// Labels of the tags currently in the world, in spawn order
    pub fn dynamic_labels(&self) -> Vec<String> {
        self.bodies()
            .iter()
            .filter(|b| !b.is_static)
            .filter_map(|b| b.label.as_ref().map(|l| l.text.clone()))
            .collect()
    }

    pub fn walls(&self) -> Option<Boundaries> {
        self.world.as_ref().map(|h| h.walls)
    }

    pub fn enclosed_region(&self) -> Option<Rect> {
        let handle = self.world.as_ref()?;
        enclosed_region(&handle.world, &handle.walls)
    }

    pub fn listeners(&self) -> ListenerSet {
        self.interaction.listeners()
    }

    pub fn interaction(&self) -> &InteractionBridge {
        &self.interaction
    }

    pub fn spawner(&self) -> &TagSpawner {
        &self.spawner
    }

    pub fn spawn_timer_active(&self) -> bool {
        self.spawner.timer.is_some_and(|id| self.scheduler.is_scheduled(id))
    }

    pub fn is_observing_resize(&self) -> bool {
        self.resize_observed
    }

    pub fn holds_cursor(&self) -> bool {
        self.cursor.is_some()
    }

    /// Start waiting for the backend and a laid-out container.
    pub fn mount(&mut self, now: f64) {
        lifecycle::mount(self, now);
    }

    /// Fire every timer due at or before `now`.
    pub fn tick(&mut self, now: f64) {
        while let Some((id, tag)) = self.scheduler.pop_due(now) {
            let at = self.scheduler.now();
            match tag {
                TimerTag::Poll => lifecycle::poll(self, at),
                TimerTag::Spawn => spawner::on_spawn_timer(self, id),
                TimerTag::Jitter => spawner::on_jitter_timer(self),
            }
        }
        self.scheduler.set_now(now);
    }

    /// One animation frame: timers, physics, then the draw list.
    /// Empty when there is nothing to draw.
    pub fn frame(&mut self, now: f64) -> Vec<DrawCommand> {
        self.tick(now);

        let Some(handle) = self.world.as_mut() else {
            return Vec::new();
        };
        if !handle.rendering {
            return Vec::new();
        }
        for _ in 0..handle.runner.advance(now) {
            handle.world.step(BASE_DELTA_MS);
        }

        let font = self.config.profile(self.device).font(&self.config.font_family);
        render_frame(&FrameState {
            bodies: handle.world.bodies(),
            surface: &handle.surface,
            font: &font,
        })
    }

    /// Container size notification. Returns true if the walls moved.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        viewport::handle_resize(self, width, height)
    }

    pub fn pointer_down(&mut self, point: Vec2) {
        interaction::pointer_down(self, point);
    }

    pub fn pointer_move(&mut self, point: Vec2) {
        interaction::pointer_move(self, point);
    }

    pub fn pointer_up(&mut self, point: Vec2) {
        interaction::pointer_up(self, point);
    }

    pub fn pointer_leave(&mut self) {
        interaction::pointer_leave(self);
    }

    /// Tear down whatever exists and start over.
    pub fn reinitialize(&mut self, now: f64) {
        lifecycle::reinitialize(self, now);
    }

    /// Stop everything. Safe to call in any phase, any number of times.
    pub fn teardown(&mut self) {
        lifecycle::teardown(self);
    }
}

impl<B: PhysicsBackend, H: HostSurface> Drop for TagCloudCore<B, H> {
    fn drop(&mut self) {
        lifecycle::teardown(self);
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
