use crate::rigid_body::{RigidBody, Vec2};

/// Penetration allowed before positional correction kicks in
const SLOP: f32 = 0.05;
/// Fraction of the penetration removed per solver iteration
const CORRECTION: f32 = 0.8;
/// Spin picked up from tangential (sliding) impulses
const SPIN_FROM_FRICTION: f32 = 0.02;
/// Torque pulling resting tags back onto a flat face
const RIGHTING: f32 = 0.01;
/// Normal speed above which a contact wakes sleeping bodies
const WAKE_SPEED: f32 = 0.5;

pub(super) struct Contact {
    /// Unit normal pointing from `a` towards `b`
    pub normal: Vec2,
    pub depth: f32,
}

#[inline]
fn sign(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

/// Overlap test on the rotated bounding boxes; separates along the shallower axis.
pub(super) fn detect(a: &RigidBody, b: &RigidBody) -> Option<Contact> {
    let ea = a.aabb_half_extents();
    let eb = b.aabb_half_extents();
    let d = b.pos - a.pos;

    let overlap_x = ea.x + eb.x - d.x.abs();
    if overlap_x <= 0.0 {
        return None;
    }
    let overlap_y = ea.y + eb.y - d.y.abs();
    if overlap_y <= 0.0 {
        return None;
    }

    if let Some(dir) = a.one_way {
        return one_way_contact(a, ea, b, eb, dir);
    }
    if let Some(dir) = b.one_way {
        return one_way_contact(b, eb, a, ea, dir).map(|c| Contact {
            normal: -c.normal,
            depth: c.depth,
        });
    }

    if overlap_x < overlap_y {
        Some(Contact { normal: Vec2::new(sign(d.x), 0.0), depth: overlap_x })
    } else {
        Some(Contact { normal: Vec2::new(0.0, sign(d.y)), depth: overlap_y })
    }
}

/// Contact pushing `other` out through the inner face of a one-way `wall`,
/// normal pointing from the wall towards `other`.
fn one_way_contact(wall: &RigidBody, ew: Vec2, other: &RigidBody, eo: Vec2, dir: Vec2) -> Option<Contact> {
    let reach = |e: Vec2| e.x * dir.x.abs() + e.y * dir.y.abs();
    let inner_face = wall.pos.dot(dir) + reach(ew);
    let depth = inner_face - (other.pos.dot(dir) - reach(eo));
    (depth > 0.0).then_some(Contact { normal: dir, depth })
}

fn pair_mut(bodies: &mut [RigidBody], i: usize, j: usize) -> (&mut RigidBody, &mut RigidBody) {
    debug_assert!(i < j);
    let (head, tail) = bodies.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

fn is_idle(body: &RigidBody) -> bool {
    body.is_static || body.sleeping
}

/// Sleeping bodies hold still like walls until a contact wakes them. They
/// skip their own contacts, so moving one while asleep could sink it.
fn solver_inverse_mass(body: &RigidBody) -> f32 {
    if body.sleeping { 0.0 } else { body.inverse_mass() }
}

/// Resolve all contacts. Velocities are only corrected on the first pass;
/// later passes just push bodies apart. Returns the number of contacts seen
/// on the first pass.
pub(super) fn resolve_contacts(bodies: &mut [RigidBody], iterations: u32) -> u32 {
    let n = bodies.len();
    let mut contacts = 0;

    for iteration in 0..iterations.max(1) {
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = pair_mut(bodies, i, j);
                if is_idle(a) && is_idle(b) {
                    continue;
                }
                let Some(contact) = detect(a, b) else {
                    continue;
                };

                let inv_a = solver_inverse_mass(a);
                let inv_b = solver_inverse_mass(b);
                let inv_sum = inv_a + inv_b;
                if inv_sum <= 0.0 {
                    continue;
                }

                let n_vec = contact.normal;
                let push = (contact.depth - SLOP).max(0.0) * CORRECTION / inv_sum;
                a.pos -= n_vec * (push * inv_a);
                b.pos += n_vec * (push * inv_b);

                if iteration == 0 {
                    contacts += 1;
                    apply_contact_impulse(a, b, n_vec, inv_a, inv_b);
                }
            }
        }
    }

    contacts
}

fn apply_contact_impulse(a: &mut RigidBody, b: &mut RigidBody, n: Vec2, inv_a: f32, inv_b: f32) {
    let inv_sum = inv_a + inv_b;
    let rel = b.velocity - a.velocity;
    let vn = rel.dot(n);
    if vn >= 0.0 {
        // Separating already; still let a resting tag right itself.
        settle(a, b, n);
        return;
    }

    if vn.abs() > WAKE_SPEED {
        if !a.is_static { a.wake(); }
        if !b.is_static { b.wake(); }
    }

    let restitution = a.material.restitution.max(b.material.restitution);
    let jn = -(1.0 + restitution) * vn / inv_sum;
    a.velocity -= n * (jn * inv_a);
    b.velocity += n * (jn * inv_b);

    // Coulomb friction along the contact tangent.
    let t = n.perp();
    let vt = rel.dot(t);
    let mu = a.material.friction.min(b.material.friction);
    let jt = (-vt / inv_sum).clamp(-mu * jn, mu * jn);
    a.velocity -= t * (jt * inv_a);
    b.velocity += t * (jt * inv_b);

    a.angular_vel -= jt * inv_a * SPIN_FROM_FRICTION;
    b.angular_vel += jt * inv_b * SPIN_FROM_FRICTION;

    settle(a, b, n);
}

/// A body resting on something below it is nudged towards angle 0 / PI.
fn settle(a: &mut RigidBody, b: &mut RigidBody, n: Vec2) {
    if n.y == 0.0 {
        return;
    }
    // `n` points from a to b: n.y > 0 means b is below a.
    let upper = if n.y > 0.0 { a } else { b };
    if upper.is_static || upper.sleeping {
        return;
    }
    upper.angular_vel -= (2.0 * upper.angle).sin() * RIGHTING;
}
