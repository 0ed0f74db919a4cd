use crate::rigid_body::{BodyHandle, RigidBody, Vec2};

use super::backend::{PhysicsWorld, WorldSettings};
use super::collision::resolve_contacts;
use super::drag::{self, DragConstraint};

/// Nominal step length; velocities are expressed in pixels per base step.
pub const BASE_DELTA_MS: f32 = 1000.0 / 60.0;
/// Gravity acceleration per ms² for gravity = 1.0
const GRAVITY_SCALE: f32 = 0.001;
/// Clamp to keep bodies from tunneling through the (100px) walls.
pub const MAX_SPEED: f32 = 40.0;
const MAX_ANGULAR_SPEED: f32 = 0.35;
/// Motion (speed² + angular²) under which a body counts as still
const SLEEP_MOTION: f32 = 0.01;
const SLEEP_STEPS: u32 = 60;

/// Manages all rigid bodies in the simulation
pub struct RigidBodySystem {
    bodies: Vec<RigidBody>,
    gravity: Vec2,
    iterations: u32,
    sleeping_enabled: bool,
    drag_stiffness: f32,
    drag: Option<DragConstraint>,
}

impl RigidBodySystem {
    pub fn new(settings: &WorldSettings) -> Self {
        Self {
            bodies: Vec::new(),
            gravity: settings.gravity,
            iterations: settings.iterations.max(1),
            sleeping_enabled: settings.enable_sleeping,
            drag_stiffness: settings.drag_stiffness.clamp(0.0, 1.0),
            drag: None,
        }
    }

    fn wake_all(&mut self) {
        for body in self.bodies.iter_mut().filter(|b| !b.is_static) {
            body.wake();
        }
    }

    fn integrate(&mut self, delta_ms: f32) {
        let scale = delta_ms / BASE_DELTA_MS;
        let accel = self.gravity * (GRAVITY_SCALE * BASE_DELTA_MS * BASE_DELTA_MS * scale);

        for body in self.bodies.iter_mut() {
            if body.is_static || body.sleeping {
                continue;
            }

            body.velocity += accel;

            // Air drag, compounded for long frames.
            let keep = (1.0 - body.material.friction_air).clamp(0.0, 1.0).powf(scale);
            body.velocity = (body.velocity * keep).clamp_length(MAX_SPEED);
            body.angular_vel = (body.angular_vel * keep).clamp(-MAX_ANGULAR_SPEED, MAX_ANGULAR_SPEED);

            body.pos += body.velocity * scale;
            body.angle += body.angular_vel * scale;
        }
    }

    fn update_sleeping(&mut self) {
        let held = self.drag.map(|d| d.body.index());
        for (i, body) in self.bodies.iter_mut().enumerate() {
            if body.is_static || body.sleeping {
                continue;
            }
            if Some(i) == held {
                body.still_steps = 0;
                continue;
            }
            let motion = body.velocity.length_squared() + body.angular_vel * body.angular_vel;
            if motion < SLEEP_MOTION {
                body.still_steps += 1;
                if body.still_steps >= SLEEP_STEPS {
                    body.sleeping = true;
                    body.velocity = Vec2::zero();
                    body.angular_vel = 0.0;
                }
            } else {
                body.still_steps = 0;
            }
        }
    }
}

impl PhysicsWorld for RigidBodySystem {
    fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(body);
        handle
    }

    fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    fn set_position(&mut self, handle: BodyHandle, pos: Vec2) {
        let Some(body) = self.bodies.get_mut(handle.index()) else {
            return;
        };
        body.pos = pos;
        if body.is_static {
            self.wake_all();
        } else {
            body.wake();
        }
    }

    fn set_extents(&mut self, handle: BodyHandle, width: f32, height: f32) {
        if let Some(body) = self.bodies.get_mut(handle.index()) {
            body.set_extents(width, height);
        }
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle.index()) {
            body.apply_impulse(impulse);
        }
    }

    fn begin_drag(&mut self, point: Vec2) -> Option<BodyHandle> {
        let idx = drag::pick(&self.bodies, point)?;
        let body = &mut self.bodies[idx];
        body.wake();
        let handle = BodyHandle(idx as u32);
        self.drag = Some(DragConstraint {
            body: handle,
            local_anchor: body.world_to_local(point),
            target: point,
        });
        Some(handle)
    }

    fn move_drag(&mut self, point: Vec2) {
        if let Some(drag) = self.drag.as_mut() {
            drag.target = point;
        }
    }

    fn end_drag(&mut self) {
        self.drag = None;
    }

    fn dragged(&self) -> Option<BodyHandle> {
        self.drag.map(|d| d.body)
    }

    fn step(&mut self, delta_ms: f32) {
        let delta_ms = delta_ms.clamp(1.0, 50.0);

        if let Some(constraint) = self.drag {
            let stiffness = self.drag_stiffness;
            drag::apply(&mut self.bodies, &constraint, stiffness);
        }

        self.integrate(delta_ms);
        resolve_contacts(&mut self.bodies, self.iterations);

        if self.sleeping_enabled {
            self.update_sleeping();
        }
    }

    fn clear(&mut self) {
        self.bodies.clear();
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rigid_body::Material;

    fn world() -> RigidBodySystem {
        RigidBodySystem::new(&WorldSettings::default())
    }

    fn floor(w: &mut RigidBodySystem, top: f32) -> BodyHandle {
        w.add_body(RigidBody::new_static(0.0, top + 50.0, 2_000.0, 100.0))
    }

    #[test]
    fn bodies_fall_under_gravity() {
        let mut w = world();
        let h = w.add_body(RigidBody::new_rect(0.0, 0.0, 40.0, 20.0, Material::default()));
        for _ in 0..10 {
            w.step(BASE_DELTA_MS);
        }
        let body = w.body(h).unwrap();
        assert!(body.pos.y > 0.0);
        assert!(body.velocity.y > 0.0);
    }

    #[test]
    fn floor_stops_a_falling_body() {
        let mut w = world();
        floor(&mut w, 300.0);
        let h = w.add_body(RigidBody::new_rect(0.0, 0.0, 40.0, 20.0, Material::default()));
        for _ in 0..600 {
            w.step(BASE_DELTA_MS);
        }
        let body = w.body(h).unwrap();
        assert!(body.pos.y + body.aabb_half_extents().y <= 300.5, "y = {}", body.pos.y);
        assert!(body.pos.y > 250.0);
    }

    #[test]
    fn resting_body_falls_asleep_and_wakes_on_impulse() {
        let mut w = world();
        floor(&mut w, 100.0);
        let h = w.add_body(RigidBody::new_rect(0.0, 89.0, 40.0, 20.0, Material::default()));
        for _ in 0..400 {
            w.step(BASE_DELTA_MS);
        }
        assert!(w.body(h).unwrap().sleeping);

        w.apply_impulse(h, Vec2::new(0.0, -0.5));
        assert!(!w.body(h).unwrap().sleeping);
    }

    #[test]
    fn tag_landing_on_a_sleeper_does_not_push_it_through_the_floor() {
        let mut w = world();
        floor(&mut w, 100.0);
        let below = w.add_body(RigidBody::new_rect(0.0, 89.0, 60.0, 20.0, Material::default()));
        for _ in 0..400 {
            w.step(BASE_DELTA_MS);
        }
        assert!(w.body(below).unwrap().sleeping);

        let above = w.add_body(RigidBody::new_rect(0.0, 20.0, 60.0, 20.0, Material::default()));
        w.apply_impulse(above, Vec2::new(0.0, 2.0));
        for _ in 0..900 {
            w.step(BASE_DELTA_MS);
            let body = w.body(below).unwrap();
            assert!(body.pos.y + body.aabb_half_extents().y <= 101.0, "sank to {}", body.pos.y);
            if body.sleeping {
                assert_eq!(body.velocity, Vec2::zero());
            }
        }
        let top = w.body(above).unwrap();
        assert!(top.pos.y < w.body(below).unwrap().pos.y);
    }

    #[test]
    fn hard_hit_wakes_a_sleeper() {
        let mut w = world();
        floor(&mut w, 100.0);
        let below = w.add_body(RigidBody::new_rect(0.0, 89.0, 60.0, 20.0, Material::default()));
        for _ in 0..400 {
            w.step(BASE_DELTA_MS);
        }
        let above = w.add_body(RigidBody::new_rect(0.0, 62.0, 60.0, 20.0, Material::default()));
        w.apply_impulse(above, Vec2::new(0.0, 10.0));
        w.step(BASE_DELTA_MS);
        assert!(!w.body(below).unwrap().sleeping);
    }

    #[test]
    fn speed_is_clamped() {
        let mut w = world();
        let h = w.add_body(RigidBody::new_rect(0.0, 0.0, 40.0, 20.0, Material::default()));
        w.apply_impulse(h, Vec2::new(1_000.0, 0.0));
        w.step(BASE_DELTA_MS);
        assert!(w.body(h).unwrap().velocity.length() <= MAX_SPEED + 1e-3);
    }

    #[test]
    fn drag_pulls_body_towards_pointer() {
        let settings = WorldSettings {
            gravity: Vec2::zero(),
            ..WorldSettings::default()
        };
        let mut w = RigidBodySystem::new(&settings);
        let h = w.add_body(RigidBody::new_rect(100.0, 100.0, 60.0, 20.0, Material::default()));

        assert_eq!(w.begin_drag(Vec2::new(100.0, 100.0)), Some(h));
        w.move_drag(Vec2::new(300.0, 100.0));
        for _ in 0..120 {
            w.step(BASE_DELTA_MS);
        }
        assert!(w.body(h).unwrap().pos.x > 250.0);

        w.end_drag();
        assert_eq!(w.dragged(), None);
    }

    #[test]
    fn drag_ignores_static_bodies_and_empty_space() {
        let mut w = world();
        floor(&mut w, 100.0);
        assert_eq!(w.begin_drag(Vec2::new(0.0, 150.0)), None);
        assert_eq!(w.begin_drag(Vec2::new(-500.0, -500.0)), None);
    }

    #[test]
    fn moving_a_wall_wakes_sleepers() {
        let mut w = world();
        let f = floor(&mut w, 100.0);
        let h = w.add_body(RigidBody::new_rect(0.0, 89.0, 40.0, 20.0, Material::default()));
        for _ in 0..400 {
            w.step(BASE_DELTA_MS);
        }
        assert!(w.body(h).unwrap().sleeping);
        w.set_position(f, Vec2::new(0.0, 400.0));
        assert!(!w.body(h).unwrap().sleeping);
    }

    #[test]
    fn clear_removes_everything() {
        let mut w = world();
        floor(&mut w, 100.0);
        let h = w.add_body(RigidBody::new_rect(0.0, 0.0, 40.0, 20.0, Material::default()));
        w.begin_drag(Vec2::new(0.0, 0.0));
        w.clear();
        assert!(w.bodies().is_empty());
        assert_eq!(w.dragged(), None);
        assert!(w.body(h).is_none());
    }
}
