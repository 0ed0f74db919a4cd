//! Pointer input → simulation.
//!
//! Press on a tag to drag it; a press that barely moves is a click and
//! pushes every tag away from the pointer. The wheel is never listened to,
//! so scrolling over the cloud scrolls the page.

use crate::rigid_body::{BodyHandle, RigidBody, Vec2};
use crate::rigid_body_system::PhysicsWorld;

use super::{HostSurface, PhysicsBackend, TagCloudCore};

/// Max pointer travel (px) for a press/release pair to count as a click
const CLICK_SLOP: f32 = 5.0;
/// Repulsion falls off as 1/distance, but never closer than this
const MIN_REPULSION_DISTANCE: f32 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerKind {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerLeave,
    Resize,
}

impl ListenerKind {
    pub const ALL: [ListenerKind; 5] = [
        ListenerKind::PointerDown,
        ListenerKind::PointerMove,
        ListenerKind::PointerUp,
        ListenerKind::PointerLeave,
        ListenerKind::Resize,
    ];

    /// DOM event name (`Resize` is a `ResizeObserver`, not an event)
    pub fn event_name(self) -> &'static str {
        match self {
            ListenerKind::PointerDown => "pointerdown",
            ListenerKind::PointerMove => "pointermove",
            ListenerKind::PointerUp => "pointerup",
            ListenerKind::PointerLeave => "pointerleave",
            ListenerKind::Resize => "resize",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Which listeners are currently attached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListenerSet(u8);

impl ListenerSet {
    pub fn all() -> Self {
        ListenerKind::ALL.iter().fold(Self(0), |set, k| Self(set.0 | k.bit()))
    }

    pub fn contains(&self, kind: ListenerKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = ListenerKind> + '_ {
        ListenerKind::ALL.into_iter().filter(|k| self.contains(*k))
    }
}

#[derive(Clone, Copy, Debug)]
struct Press {
    origin: Vec2,
    grabbed: Option<BodyHandle>,
    moved: bool,
}

#[derive(Debug, Default)]
pub struct InteractionBridge {
    listeners: ListenerSet,
    attachments: u32,
    press: Option<Press>,
}

impl InteractionBridge {
    /// Attach every listener. Returns false (and changes nothing) if they
    /// are already attached.
    pub(super) fn attach(&mut self) -> bool {
        if !self.listeners.is_empty() {
            return false;
        }
        self.listeners = ListenerSet::all();
        self.attachments += 1;
        true
    }

    pub(super) fn detach(&mut self) {
        self.listeners = ListenerSet::default();
        self.press = None;
    }

    pub fn listeners(&self) -> ListenerSet {
        self.listeners
    }

    /// How many times listeners have been attached over this bridge's life
    pub fn attachments(&self) -> u32 {
        self.attachments
    }

    /// Always false: wheel events are left to the page.
    pub fn captures_wheel(&self) -> bool {
        false
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }
}

/// Velocity-scaled impulses pushing every dynamic body away from `point`,
/// with some extra lift. Strength falls off with 1/distance. Tags still
/// above the viewport are not touched.
pub fn repulsion_impulses(
    bodies: &[RigidBody],
    point: Vec2,
    strength: f32,
    lift: f32,
) -> Vec<(BodyHandle, Vec2)> {
    bodies
        .iter()
        .enumerate()
        .filter(|(_, b)| !b.is_static && b.pos.y >= 0.0)
        .map(|(i, b)| {
            let offset = b.pos - point;
            let distance = offset.length().max(MIN_REPULSION_DISTANCE);
            let magnitude = strength / distance;
            let dir = offset.normalize();
            let dv = dir * magnitude + Vec2::new(0.0, -lift * magnitude);
            (BodyHandle(i as u32), dv * b.mass)
        })
        .collect()
}

fn active_world<B: PhysicsBackend, H: HostSurface>(
    core: &mut TagCloudCore<B, H>,
) -> Option<&mut B::World> {
    if !core.interaction.listeners.contains(ListenerKind::PointerDown) {
        return None;
    }
    core.world.as_mut().map(|h| &mut h.world)
}

pub(super) fn pointer_down<B: PhysicsBackend, H: HostSurface>(core: &mut TagCloudCore<B, H>, point: Vec2) {
    let Some(world) = active_world(core) else {
        return;
    };
    let grabbed = world.begin_drag(point);
    core.interaction.press = Some(Press {
        origin: point,
        grabbed,
        moved: false,
    });
}

pub(super) fn pointer_move<B: PhysicsBackend, H: HostSurface>(core: &mut TagCloudCore<B, H>, point: Vec2) {
    let press = core.interaction.press;
    let Some(world) = active_world(core) else {
        return;
    };
    let Some(mut press) = press else {
        return;
    };
    if (point - press.origin).length() > CLICK_SLOP {
        press.moved = true;
    }
    if press.grabbed.is_some() {
        world.move_drag(point);
    }
    core.interaction.press = Some(press);
}

pub(super) fn pointer_up<B: PhysicsBackend, H: HostSurface>(core: &mut TagCloudCore<B, H>, point: Vec2) {
    let press = core.interaction.press.take();
    let repel = core.config.click_repulsion;
    let (strength, lift) = (core.config.repulsion_strength, core.config.repulsion_lift);

    let Some(world) = active_world(core) else {
        return;
    };
    world.end_drag();

    let Some(press) = press else {
        return;
    };
    let is_click = !press.moved && (point - press.origin).length() <= CLICK_SLOP;
    if repel && is_click {
        for (handle, impulse) in repulsion_impulses(world.bodies(), point, strength, lift) {
            world.apply_impulse(handle, impulse);
        }
    }
}

pub(super) fn pointer_leave<B: PhysicsBackend, H: HostSurface>(core: &mut TagCloudCore<B, H>) {
    core.interaction.press = None;
    if let Some(world) = active_world(core) {
        world.end_drag();
    }
}
