use crate::rigid_body::{BodyHandle, RigidBody, Vec2};

/// Velocity kept per step while a body is held (stops the spring ringing)
const HOLD_DAMPING: f32 = 0.85;
/// Scales how much an off-center grab twists the body
const GRAB_TWIST: f32 = 0.1;

/// Spring between a point on a body and the pointer.
#[derive(Clone, Copy, Debug)]
pub(super) struct DragConstraint {
    pub body: BodyHandle,
    /// Grab point in the body's local frame
    pub local_anchor: Vec2,
    pub target: Vec2,
}

/// Topmost (last added) dynamic body under `point`.
pub(super) fn pick(bodies: &[RigidBody], point: Vec2) -> Option<usize> {
    bodies
        .iter()
        .enumerate()
        .rev()
        .find(|(_, b)| !b.is_static && b.contains_point(point))
        .map(|(i, _)| i)
}

pub(super) fn apply(bodies: &mut [RigidBody], drag: &DragConstraint, stiffness: f32) {
    let Some(body) = bodies.get_mut(drag.body.index()) else {
        return;
    };
    if body.is_static {
        return;
    }

    let anchor = body.local_to_world(drag.local_anchor);
    let delta = drag.target - anchor;
    let r = anchor - body.pos;

    body.wake();
    body.velocity = body.velocity * HOLD_DAMPING + delta * stiffness;
    body.angular_vel += r.cross(delta) * stiffness * body.mass / body.moment_of_inertia * GRAB_TWIST;
}
