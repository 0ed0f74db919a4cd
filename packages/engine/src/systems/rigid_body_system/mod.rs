//! RigidBodySystem - Small impulse-based rigid body world for the tag cloud
//!
//! Goals:
//! - Enough physics to make labelled capsules fall, stack, tumble and be dragged.
//! - Deterministic stepping (no hash iteration, no wall-clock reads).
//! - Walls that can be moved in place when the viewport changes.
//!
//! Current behavior:
//! - Bodies collide through their rotated bounding boxes (per-axis minimum
//!   penetration), with restitution and Coulomb friction.
//! - Velocity is clamped below the wall thickness so nothing tunnels out.
//! - Optional sleeping for bodies that have come to rest.

mod backend;
mod collision;
mod drag;
mod system;

pub use backend::{NativeBackend, PhysicsBackend, PhysicsWorld, WorldSettings};
pub use system::{RigidBodySystem, BASE_DELTA_MS, MAX_SPEED};
