use crate::core::random::Rng;
use crate::core::scheduler::TimerId;
use crate::rigid_body::{BodyHandle, BodyStyle, Label, Material, RigidBody, Vec2};
use crate::rigid_body_system::PhysicsWorld;

use super::settings::{DeviceProfile, TagCloudConfig};
use super::viewport::Viewport;
use super::{HostSurface, PhysicsBackend, TagCloudCore};

/// Bodies slower than this (px/step) count as resting for the anti-clog nudge
const RESTING_SPEED: f32 = 0.2;

/// Drops labels into the world one at a time, in list order.
#[derive(Debug, Default)]
pub struct TagSpawner {
    labels: Vec<String>,
    next: usize,
    pub(super) timer: Option<TimerId>,
}

impl TagSpawner {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            next: 0,
            timer: None,
        }
    }

    pub fn placed(&self) -> usize {
        self.next
    }

    pub fn remaining(&self) -> usize {
        self.labels.len() - self.next
    }

    pub fn is_exhausted(&self) -> bool {
        self.next >= self.labels.len()
    }

    pub fn is_scheduled(&self) -> bool {
        self.timer.is_some()
    }

    /// Add the next label to `world`. `None` once the list is used up.
    pub fn spawn_next<W: PhysicsWorld>(
        &mut self,
        world: &mut W,
        viewport: Viewport,
        profile: &DeviceProfile,
        config: &TagCloudConfig,
        rng: &mut Rng,
    ) -> Option<BodyHandle> {
        let text = self.labels.get(self.next)?;
        let x = spawn_x(viewport, config.spawn_inset, rng);
        let angle = rng.range(-0.5, 0.5);
        let dark = rng.coin_flip();

        let body = build_tag(text, x, config.spawn_y, angle, dark, profile, config);
        self.next += 1;
        Some(world.add_body(body))
    }
}

/// Label width: characters times a per-character width plus padding.
pub fn tag_width(text: &str, profile: &DeviceProfile) -> f32 {
    text.chars().count() as f32 * profile.char_width + profile.horizontal_padding
}

/// Uniform x inside the inset band of the viewport.
pub fn spawn_x(viewport: Viewport, inset: f32, rng: &mut Rng) -> f32 {
    let lo = viewport.width * inset;
    let span = viewport.width * (1.0 - 2.0 * inset);
    lo + rng.next_f32() * span
}

/// A capsule-shaped tag body. `dark` picks light text on a dark pill.
pub fn build_tag(
    text: &str,
    x: f32,
    y: f32,
    angle: f32,
    dark: bool,
    profile: &DeviceProfile,
    config: &TagCloudConfig,
) -> RigidBody {
    let width = tag_width(text, profile);
    let height = profile.tag_height;
    let palette = &config.palette;

    let (fill, stroke, text_color) = if dark {
        (&palette.dark_fill, &palette.dark_stroke, &palette.light_fill)
    } else {
        (&palette.light_fill, &palette.light_stroke, &palette.dark_fill)
    };

    let material = Material {
        friction: config.friction,
        friction_air: config.friction_air,
        restitution: config.restitution,
        ..Material::default()
    };

    RigidBody::new_rect(x, y, width, height, material)
        .with_chamfer(height / 2.0)
        .with_angle(angle)
        .with_style(BodyStyle {
            fill: fill.clone(),
            stroke: stroke.clone(),
            line_width: 1.0,
            visible: true,
        })
        .with_label(Label {
            text: text.to_string(),
            color: text_color.clone(),
        })
}

/// Give resting tags a small random shove so piles don't lock up.
/// Tags still above the viewport are left alone. Returns how many bodies were nudged.
pub(super) fn nudge_resting<W: PhysicsWorld>(world: &mut W, speed: f32, rng: &mut Rng) -> usize {
    let resting: Vec<(BodyHandle, f32)> = world
        .bodies()
        .iter()
        .enumerate()
        .filter(|(_, b)| !b.is_static && b.pos.y >= 0.0 && (b.sleeping || b.velocity.length() < RESTING_SPEED))
        .map(|(i, b)| (BodyHandle(i as u32), b.mass))
        .collect();

    for (handle, mass) in &resting {
        let dv = Vec2::new(rng.range(-1.0, 1.0) * speed, -speed * 0.5);
        world.apply_impulse(*handle, dv * *mass);
    }
    resting.len()
}

/// Spawn timer handler: place one tag, stop the timer after the last one.
pub(super) fn on_spawn_timer<B: PhysicsBackend, H: HostSurface>(core: &mut TagCloudCore<B, H>, timer: TimerId) {
    if let Some(handle) = core.world.as_mut() {
        let profile = core.config.profile(core.device);
        let viewport = handle.surface.viewport;
        if let Some(body) = core
            .spawner
            .spawn_next(&mut handle.world, viewport, profile, &core.config, &mut core.rng)
        {
            log::trace!("spawned tag {} ({} left)", body.index(), core.spawner.remaining());
        }
    }

    if core.spawner.is_exhausted() || core.world.is_none() {
        core.scheduler.cancel(timer);
        core.spawner.timer = None;
        log::debug!("tag spawning finished after {} tags", core.spawner.placed());
    }
}

pub(super) fn on_jitter_timer<B: PhysicsBackend, H: HostSurface>(core: &mut TagCloudCore<B, H>) {
    let Some(handle) = core.world.as_mut() else {
        return;
    };
    let nudged = nudge_resting(&mut handle.world, core.config.jitter_speed, &mut core.rng);
    if nudged > 0 {
        log::trace!("nudged {nudged} resting tags");
    }
}
