//! Deferred start and teardown.
//!
//! `mount` checks its preconditions right away and then on a poll interval
//! until they hold or the attempt budget runs out. Teardown cancels timers
//! before it touches the world, so nothing can fire into a cleared world.

use crate::core::cursor::CursorLease;
use crate::rigid_body_system::PhysicsBackend;

use super::init::create_world;
use super::settings::DeviceClass;
use super::spawner::TagSpawner;
use super::viewport::Viewport;
use super::{HostSurface, LifecyclePhase, TagCloudCore, TimerTag};

fn enter<B: PhysicsBackend, H: HostSurface>(core: &mut TagCloudCore<B, H>, phase: LifecyclePhase) {
    log::debug!("tag cloud: {:?} -> {:?}", core.phase, phase);
    core.phase = phase;
    core.history.push(phase);
}

pub(super) fn mount<B: PhysicsBackend, H: HostSurface>(core: &mut TagCloudCore<B, H>, now: f64) {
    match core.phase {
        LifecyclePhase::WaitingForPreconditions | LifecyclePhase::Active | LifecyclePhase::TearingDown => {
            log::debug!("mount ignored while {:?}", core.phase);
            return;
        }
        LifecyclePhase::Uninitialized | LifecyclePhase::Destroyed | LifecyclePhase::Unavailable => {}
    }

    core.scheduler.set_now(now);
    core.poll_attempts = 0;
    enter(core, LifecyclePhase::WaitingForPreconditions);

    if !try_activate(core, now) {
        let period = core.config.poll_interval_ms;
        core.poll_timer = Some(core.scheduler.schedule_every(period, TimerTag::Poll));
    }
}

/// Poll timer handler.
pub(super) fn poll<B: PhysicsBackend, H: HostSurface>(core: &mut TagCloudCore<B, H>, now: f64) {
    if core.phase != LifecyclePhase::WaitingForPreconditions {
        cancel_poll(core);
        return;
    }
    core.poll_attempts += 1;
    if try_activate(core, now) {
        return;
    }
    if core.poll_attempts >= core.config.max_poll_attempts {
        cancel_poll(core);
        log::warn!(
            "tag cloud unavailable: preconditions not met after {} attempts",
            core.poll_attempts
        );
        enter(core, LifecyclePhase::Unavailable);
    }
}

fn cancel_poll<B: PhysicsBackend, H: HostSurface>(core: &mut TagCloudCore<B, H>) {
    if let Some(id) = core.poll_timer.take() {
        core.scheduler.cancel(id);
    }
}

/// Activate if the backend is loaded and the container has a size.
fn try_activate<B: PhysicsBackend, H: HostSurface>(core: &mut TagCloudCore<B, H>, now: f64) -> bool {
    if !core.backend.is_available() {
        log::trace!("physics backend not available yet");
        return false;
    }
    let viewport = core.host.measure();
    if viewport.is_empty() {
        log::trace!("container not laid out yet ({}x{})", viewport.width, viewport.height);
        return false;
    }
    cancel_poll(core);
    activate(core, viewport, now);
    true
}

fn activate<B: PhysicsBackend, H: HostSurface>(core: &mut TagCloudCore<B, H>, viewport: Viewport, now: f64) {
    if let Some(mut previous) = core.world.take() {
        log::debug!("stopping previous world before re-init");
        previous.destroy();
        core.interaction.detach();
    }

    core.device = DeviceClass::for_width(core.host.window_width(), core.config.breakpoint);
    let profile = core.config.profile(core.device);
    let limit = profile.max_tags.unwrap_or(core.labels.len());
    let spawn_interval = profile.spawn_interval_ms;

    core.world = Some(create_world(
        &core.backend,
        viewport,
        &core.config,
        core.device,
        core.host.device_pixel_ratio(),
        now,
    ));
    core.worlds_built += 1;

    core.spawner = TagSpawner::new(core.labels.iter().take(limit).cloned().collect());
    if !core.spawner.is_exhausted() {
        core.spawner.timer = Some(core.scheduler.schedule_every(spawn_interval, TimerTag::Spawn));
    }
    if core.config.jitter_interval_ms > 0.0 {
        let period = core.config.jitter_interval_ms;
        core.jitter_timer = Some(core.scheduler.schedule_every(period, TimerTag::Jitter));
    }

    core.interaction.attach();
    core.resize_observed = true;
    if core.cursor.is_none() {
        core.cursor = Some(CursorLease::acquire());
    }
    enter(core, LifecyclePhase::Active);
}

pub(super) fn teardown<B: PhysicsBackend, H: HostSurface>(core: &mut TagCloudCore<B, H>) {
    match core.phase {
        LifecyclePhase::Uninitialized | LifecyclePhase::Destroyed | LifecyclePhase::TearingDown => return,
        LifecyclePhase::WaitingForPreconditions | LifecyclePhase::Unavailable => {
            cancel_poll(core);
            core.scheduler.clear();
            enter(core, LifecyclePhase::Destroyed);
            return;
        }
        LifecyclePhase::Active => {}
    }

    enter(core, LifecyclePhase::TearingDown);

    // Timers first.
    if let Some(id) = core.spawner.timer.take() {
        core.scheduler.cancel(id);
    }
    if let Some(id) = core.jitter_timer.take() {
        core.scheduler.cancel(id);
    }
    cancel_poll(core);

    core.resize_observed = false;
    core.interaction.detach();
    if let Some(mut handle) = core.world.take() {
        handle.destroy();
    }
    core.cursor = None;
    core.scheduler.clear();

    log::info!("tag cloud torn down");
    enter(core, LifecyclePhase::Destroyed);
}

pub(super) fn reinitialize<B: PhysicsBackend, H: HostSurface>(core: &mut TagCloudCore<B, H>, now: f64) {
    teardown(core);
    mount(core, now);
}
