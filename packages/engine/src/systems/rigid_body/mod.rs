//! RigidBody - A solid body that moves as a unit
//!
//! The body stores its shape as a rounded rectangle in local coordinates
//! (centered on 0,0) and transforms to world coordinates using position and
//! rotation. Tags carry a label; walls are static and invisible.

mod vec2;
mod body;

pub use vec2::Vec2;
pub use body::{BodyHandle, BodyStyle, Label, Material, RigidBody};
