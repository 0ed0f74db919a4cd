//! Container size tracking and the four containment walls.

use crate::rigid_body::{BodyHandle, RigidBody, Vec2};
use crate::rigid_body_system::PhysicsWorld;

use super::{HostSurface, PhysicsBackend, TagCloudCore};

/// Size of the host container in CSS pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Zero (or nonsense) in either direction
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Axis-aligned rectangle, `min` top-left
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wall {
    Floor,
    Ceiling,
    Left,
    Right,
}

impl Wall {
    pub const ALL: [Wall; 4] = [Wall::Floor, Wall::Ceiling, Wall::Left, Wall::Right];

    /// Direction from this wall into the container
    pub fn inward(self) -> Vec2 {
        match self {
            Wall::Floor => Vec2::new(0.0, -1.0),
            Wall::Ceiling => Vec2::new(0.0, 1.0),
            Wall::Left => Vec2::new(1.0, 0.0),
            Wall::Right => Vec2::new(-1.0, 0.0),
        }
    }
}

/// Center and full size of one wall
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallPlacement {
    pub center: Vec2,
    pub size: Vec2,
}

/// Where a wall goes for a viewport. Walls span three viewport lengths so
/// the corners stay closed while the container is being resized.
pub fn wall_placement(wall: Wall, viewport: Viewport, thickness: f32) -> WallPlacement {
    let (w, h, t) = (viewport.width, viewport.height, thickness);
    match wall {
        Wall::Floor => WallPlacement {
            center: Vec2::new(w / 2.0, h + t / 2.0),
            size: Vec2::new(w * 3.0, t),
        },
        Wall::Ceiling => WallPlacement {
            center: Vec2::new(w / 2.0, -t / 2.0),
            size: Vec2::new(w * 3.0, t),
        },
        Wall::Left => WallPlacement {
            center: Vec2::new(-t / 2.0, h / 2.0),
            size: Vec2::new(t, h * 3.0),
        },
        Wall::Right => WallPlacement {
            center: Vec2::new(w + t / 2.0, h / 2.0),
            size: Vec2::new(t, h * 3.0),
        },
    }
}

/// Handles of the static walls inside a world
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boundaries {
    pub floor: BodyHandle,
    pub ceiling: BodyHandle,
    pub left: BodyHandle,
    pub right: BodyHandle,
    pub thickness: f32,
}

impl Boundaries {
    /// Add the four walls to `world`. Walls are one-way: anything overlapping
    /// one is pushed back into the container, even from the far side.
    pub fn build<W: PhysicsWorld>(world: &mut W, viewport: Viewport, thickness: f32) -> Self {
        let mut add = |wall: Wall| {
            let p = wall_placement(wall, viewport, thickness);
            world.add_body(
                RigidBody::new_static(p.center.x, p.center.y, p.size.x, p.size.y).with_one_way(wall.inward()),
            )
        };
        Self {
            floor: add(Wall::Floor),
            ceiling: add(Wall::Ceiling),
            left: add(Wall::Left),
            right: add(Wall::Right),
            thickness,
        }
    }

    pub fn handle(&self, wall: Wall) -> BodyHandle {
        match wall {
            Wall::Floor => self.floor,
            Wall::Ceiling => self.ceiling,
            Wall::Left => self.left,
            Wall::Right => self.right,
        }
    }

    pub fn is_wall(&self, handle: BodyHandle) -> bool {
        Wall::ALL.iter().any(|w| self.handle(*w) == handle)
    }
}

/// Move (and stretch) the existing walls to enclose `viewport`. The bodies
/// keep their handles.
pub fn reposition_boundaries<W: PhysicsWorld>(world: &mut W, walls: &Boundaries, viewport: Viewport) {
    for wall in Wall::ALL {
        let p = wall_placement(wall, viewport, walls.thickness);
        let handle = walls.handle(wall);
        world.set_extents(handle, p.size.x, p.size.y);
        world.set_position(handle, p.center);
    }
}

/// Move every dynamic body that ended up outside `viewport` (after a shrink)
/// back inside it. Bodies larger than the viewport are centered on that axis.
/// Returns how many bodies moved.
pub fn contain_bodies<W: PhysicsWorld>(world: &mut W, viewport: Viewport) -> usize {
    let moves: Vec<(BodyHandle, Vec2)> = world
        .bodies()
        .iter()
        .enumerate()
        .filter(|(_, b)| !b.is_static)
        .filter_map(|(i, b)| {
            let e = b.aabb_half_extents();
            let target = Vec2::new(
                clamp_axis(b.pos.x, e.x, viewport.width),
                clamp_axis(b.pos.y, e.y, viewport.height),
            );
            (target != b.pos).then_some((BodyHandle(i as u32), target))
        })
        .collect();

    for (handle, pos) in &moves {
        world.set_position(*handle, *pos);
    }
    moves.len()
}

fn clamp_axis(center: f32, half: f32, length: f32) -> f32 {
    if 2.0 * half >= length {
        length / 2.0
    } else {
        center.clamp(half, length - half)
    }
}

/// The open region between the inner faces of the walls.
pub fn enclosed_region<W: PhysicsWorld>(world: &W, walls: &Boundaries) -> Option<Rect> {
    let floor = world.body(walls.floor)?;
    let ceiling = world.body(walls.ceiling)?;
    let left = world.body(walls.left)?;
    let right = world.body(walls.right)?;
    Some(Rect {
        min: Vec2::new(left.pos.x + left.half_width, ceiling.pos.y + ceiling.half_height),
        max: Vec2::new(right.pos.x - right.half_width, floor.pos.y - floor.half_height),
    })
}

/// React to a container size notification. Zero sizes are transient layout
/// states and are ignored. Returns true if the walls moved.
pub(super) fn handle_resize<B: PhysicsBackend, H: HostSurface>(
    core: &mut TagCloudCore<B, H>,
    width: f32,
    height: f32,
) -> bool {
    if !core.resize_observed {
        return false;
    }
    let Some(handle) = core.world.as_mut() else {
        return false;
    };
    let viewport = Viewport::new(width, height);
    if viewport.is_empty() {
        log::debug!("ignoring {width}x{height} resize");
        return false;
    }

    handle.surface.resize(viewport);
    let walls = handle.walls;
    reposition_boundaries(&mut handle.world, &walls, viewport);
    let moved = contain_bodies(&mut handle.world, viewport);
    log::debug!("tag cloud resized to {width}x{height}, {moved} tags pulled back in");
    true
}
