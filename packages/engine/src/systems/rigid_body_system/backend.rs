//! The physics capability the tag cloud depends on.
//!
//! The lifecycle code only talks to these traits, so the engine can be swapped
//! (or faked in tests) without touching spawning, sizing or rendering.

use crate::rigid_body::{BodyHandle, RigidBody, Vec2};

use super::system::RigidBodySystem;

/// Global parameters of a world
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSettings {
    pub gravity: Vec2,
    /// Contact solver passes per step
    pub iterations: u32,
    pub enable_sleeping: bool,
    /// Spring stiffness of the pointer drag constraint
    pub drag_stiffness: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 1.0),
            iterations: 10,
            enable_sleeping: true,
            drag_stiffness: 0.1,
        }
    }
}

pub trait PhysicsWorld {
    fn add_body(&mut self, body: RigidBody) -> BodyHandle;

    fn bodies(&self) -> &[RigidBody];

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies().get(handle.index())
    }

    /// Teleport a body (used for walls). Wakes everything that might have
    /// been resting on it.
    fn set_position(&mut self, handle: BodyHandle, pos: Vec2);

    fn set_extents(&mut self, handle: BodyHandle, width: f32, height: f32);

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2);

    /// Grab the topmost dynamic body under `point`.
    fn begin_drag(&mut self, point: Vec2) -> Option<BodyHandle>;

    fn move_drag(&mut self, point: Vec2);

    fn end_drag(&mut self);

    fn dragged(&self) -> Option<BodyHandle>;

    /// Advance by `delta_ms` of simulated time.
    fn step(&mut self, delta_ms: f32);

    /// Remove every body and constraint.
    fn clear(&mut self);
}

/// Something that can build worlds, possibly not yet (e.g. still loading).
pub trait PhysicsBackend {
    type World: PhysicsWorld;

    fn is_available(&self) -> bool;

    fn create(&self, settings: &WorldSettings) -> Self::World;
}

/// Backend over the in-crate [`RigidBodySystem`].
///
/// An optional gate lets the host delay availability (for example until
/// fonts or the rest of the page bundle have loaded).
#[derive(Default)]
pub struct NativeBackend {
    gate: Option<Box<dyn Fn() -> bool>>,
}

impl NativeBackend {
    pub fn new() -> Self {
        Self { gate: None }
    }

    pub fn gated(gate: impl Fn() -> bool + 'static) -> Self {
        Self {
            gate: Some(Box::new(gate)),
        }
    }
}

impl PhysicsBackend for NativeBackend {
    type World = RigidBodySystem;

    fn is_available(&self) -> bool {
        self.gate.as_ref().map_or(true, |gate| gate())
    }

    fn create(&self, settings: &WorldSettings) -> RigidBodySystem {
        RigidBodySystem::new(settings)
    }
}
