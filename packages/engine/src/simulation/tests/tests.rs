use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::core::cursor::cursor_hidden;
use crate::domain::tags::brand_tags;
use crate::rigid_body_system::NativeBackend;

#[derive(Clone)]
struct FakeHost {
    size: Rc<Cell<Viewport>>,
    window_width: f32,
    pixel_ratio: f32,
}

impl HostSurface for FakeHost {
    fn measure(&self) -> Viewport {
        self.size.get()
    }

    fn window_width(&self) -> f32 {
        self.window_width
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }
}

struct Harness {
    cloud: TagCloudCore<NativeBackend, FakeHost>,
    available: Rc<Cell<bool>>,
    size: Rc<Cell<Viewport>>,
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn config() -> TagCloudConfig {
    let mut config = TagCloudConfig::default();
    config.regular.spawn_interval_ms = 200.0;
    config
}

fn harness_with(config: TagCloudConfig, names: &[&str], width: f32, height: f32, window_width: f32) -> Harness {
    harness_seeded(config, labels(names), width, height, window_width, 7)
}

fn harness_seeded(
    config: TagCloudConfig,
    names: Vec<String>,
    width: f32,
    height: f32,
    window_width: f32,
    seed: u32,
) -> Harness {
    let available = Rc::new(Cell::new(true));
    let size = Rc::new(Cell::new(Viewport::new(width, height)));
    let gate = available.clone();
    let host = FakeHost {
        size: size.clone(),
        window_width,
        pixel_ratio: 3.0,
    };
    let cloud = TagCloudCore::with_seed(
        NativeBackend::gated(move || gate.get()),
        host,
        config,
        names,
        seed,
    );
    Harness { cloud, available, size }
}

fn harness(names: &[&str]) -> Harness {
    harness_with(config(), names, 800.0, 400.0, 1280.0)
}

/// Frames every 16 ms until `until`; returns the last timestamp.
fn run_frames(h: &mut Harness, mut now: f64, until: f64) -> f64 {
    while now < until {
        now += 16.0;
        h.cloud.frame(now);
    }
    now
}

/// Every tag's bounding box lies inside `[0, width] x [0, height]`, give or take `slop`.
fn assert_tags_inside(cloud: &TagCloudCore<NativeBackend, FakeHost>, width: f32, height: f32, slop: f32) {
    for tag in cloud.bodies().iter().filter(|b| !b.is_static) {
        let e = tag.aabb_half_extents();
        let label = tag.label.as_ref().map_or("", |l| l.text.as_str());
        assert!(tag.pos.x - e.x >= -slop && tag.pos.x + e.x <= width + slop, "{label} at x = {}", tag.pos.x);
        assert!(tag.pos.y - e.y >= -slop && tag.pos.y + e.y <= height + slop, "{label} at y = {}", tag.pos.y);
    }
}

fn assert_encloses(cloud: &TagCloudCore<NativeBackend, FakeHost>, width: f32, height: f32) {
    let region = cloud.enclosed_region().unwrap();
    assert!((region.min.x - 0.0).abs() < 1e-3, "{region:?}");
    assert!((region.min.y - 0.0).abs() < 1e-3, "{region:?}");
    assert!((region.max.x - width).abs() < 1e-3, "{region:?}");
    assert!((region.max.y - height).abs() < 1e-3, "{region:?}");

    let walls = cloud.walls().unwrap();
    let body = |h: crate::rigid_body::BodyHandle| &cloud.bodies()[h.index()];
    assert!(body(walls.floor).pos.y > height);
    assert!(body(walls.ceiling).pos.y < 0.0);
    assert!(body(walls.left).pos.x < 0.0);
    assert!(body(walls.right).pos.x > width);
    assert!(body(walls.floor).width() >= width * 3.0);
    assert!(body(walls.left).height() >= height * 3.0);
}

#[test]
fn spawns_one_label_per_interval_in_order() {
    let mut h = harness(&["A", "BB", "CCC"]);
    h.cloud.mount(0.0);
    assert_eq!(h.cloud.phase(), LifecyclePhase::Active);
    assert_eq!(h.cloud.dynamic_count(), 0);
    assert!(h.cloud.spawn_timer_active());

    h.cloud.tick(199.0);
    assert_eq!(h.cloud.dynamic_count(), 0);

    h.cloud.tick(200.0);
    assert_eq!(h.cloud.dynamic_labels(), labels(&["A"]));

    h.cloud.tick(400.0);
    assert_eq!(h.cloud.dynamic_labels(), labels(&["A", "BB"]));
    assert!(h.cloud.spawn_timer_active());

    h.cloud.tick(600.0);
    assert_eq!(h.cloud.dynamic_labels(), labels(&["A", "BB", "CCC"]));
    assert!(!h.cloud.spawn_timer_active());

    h.cloud.tick(5_000.0);
    assert_eq!(h.cloud.dynamic_count(), 3);
}

#[test]
fn late_frame_catches_up_on_every_missed_spawn() {
    let mut h = harness(&["A", "BB", "CCC", "DDDD"]);
    h.cloud.mount(0.0);
    h.cloud.tick(650.0);
    assert_eq!(h.cloud.dynamic_labels(), labels(&["A", "BB", "CCC"]));
    h.cloud.tick(800.0);
    assert_eq!(h.cloud.dynamic_count(), 4);
    assert!(!h.cloud.spawn_timer_active());
}

#[test]
fn spawned_tags_start_above_the_view_inside_the_inset_band() {
    let names: Vec<String> = (0..20).map(|i| format!("Tag {i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut h = harness(&refs);
    h.cloud.mount(0.0);
    h.cloud.tick(200.0 * 20.0);

    let tags: Vec<_> = h.cloud.bodies().iter().filter(|b| !b.is_static).collect();
    assert_eq!(tags.len(), 20);
    for tag in tags {
        assert!((160.0..=640.0).contains(&tag.pos.x), "x = {}", tag.pos.x);
        assert_eq!(tag.pos.y, -50.0);
        assert!((-0.5..0.5).contains(&tag.angle));
        assert_eq!(tag.chamfer, tag.height() / 2.0);
    }
}

#[test]
fn compact_devices_show_the_first_twelve_labels() {
    let names: Vec<String> = (0..20).map(|i| format!("Label {i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut h = harness_with(TagCloudConfig::default(), &refs, 360.0, 500.0, 375.0);
    h.cloud.mount(0.0);
    assert_eq!(h.cloud.device(), DeviceClass::Compact);

    h.cloud.tick(400.0 * 30.0);
    assert_eq!(h.cloud.dynamic_count(), 12);
    assert_eq!(h.cloud.dynamic_labels(), names[..12].to_vec());
    assert_eq!(h.cloud.world().unwrap().surface().pixel_ratio, 1.0);
}

#[test]
fn regular_devices_cap_the_pixel_ratio_at_two() {
    let mut h = harness(&["A"]);
    h.cloud.mount(0.0);
    let surface = *h.cloud.world().unwrap().surface();
    assert_eq!(surface.pixel_ratio, 2.0);
    assert_eq!(surface.pixel_width(), 1_600);
    assert_eq!(surface.pixel_height(), 800);
}

#[test]
fn walls_enclose_the_container_after_resize() {
    let mut h = harness(&["A"]);
    h.cloud.mount(0.0);
    assert_encloses(&h.cloud, 800.0, 400.0);

    for (w, h_px) in [(1024.0, 600.0), (320.0, 900.0), (1.0, 1.0), (2560.0, 1440.0)] {
        assert!(h.cloud.resize(w, h_px));
        assert_encloses(&h.cloud, w, h_px);
        assert_eq!(h.cloud.world().unwrap().surface().viewport, Viewport::new(w, h_px));
    }
}

#[test]
fn zero_sized_resize_leaves_walls_alone() {
    let mut h = harness(&["A"]);
    h.cloud.mount(0.0);
    let before = h.cloud.enclosed_region();

    assert!(!h.cloud.resize(0.0, 400.0));
    assert!(!h.cloud.resize(800.0, 0.0));
    assert!(!h.cloud.resize(0.0, 0.0));
    assert_eq!(h.cloud.enclosed_region(), before);
    assert_eq!(h.cloud.world().unwrap().surface().viewport, Viewport::new(800.0, 400.0));
}

#[test]
fn rotating_the_container_keeps_every_tag() {
    let mut h = harness(&["A", "BB", "CCC"]);
    h.cloud.mount(0.0);
    let mut now = 0.0;
    while now < 2_000.0 {
        now += 16.0;
        h.cloud.frame(now);
    }
    let walls = h.cloud.walls();
    assert_eq!(h.cloud.dynamic_count(), 3);

    assert!(h.cloud.resize(400.0, 800.0));
    assert_encloses(&h.cloud, 400.0, 800.0);
    assert_eq!(h.cloud.walls(), walls);
    assert_eq!(h.cloud.body_count(), 7);
    assert_tags_inside(&h.cloud, 400.0, 800.0, 0.01);

    while now < 4_000.0 {
        now += 16.0;
        h.cloud.frame(now);
    }
    assert_eq!(h.cloud.dynamic_labels(), labels(&["A", "BB", "CCC"]));
    assert_tags_inside(&h.cloud, 400.0, 800.0, 2.0);
}

#[test]
fn shrinking_the_container_pulls_tags_back_inside() {
    let mut h = harness_seeded(TagCloudConfig::default(), brand_tags(), 1_100.0, 480.0, 1280.0, 7);
    h.cloud.mount(0.0);
    let now = run_frames(&mut h, 0.0, 15_000.0);
    assert_eq!(h.cloud.dynamic_count(), brand_tags().len());

    assert!(h.cloud.resize(500.0, 480.0));
    assert_tags_inside(&h.cloud, 500.0, 480.0, 0.01);

    run_frames(&mut h, now, 25_000.0);
    assert_eq!(h.cloud.dynamic_count(), brand_tags().len());
    assert_tags_inside(&h.cloud, 500.0, 480.0, 4.0);
}

#[test]
fn every_brand_tag_stays_inside_the_container() {
    for seed in 1..=5 {
        let mut h = harness_seeded(TagCloudConfig::default(), brand_tags(), 1_100.0, 480.0, 1280.0, seed);
        h.cloud.mount(0.0);
        run_frames(&mut h, 0.0, 20_000.0);
        assert_eq!(h.cloud.dynamic_count(), brand_tags().len(), "seed {seed}");
        assert_tags_inside(&h.cloud, 1_100.0, 480.0, 4.0);
    }
}

#[test]
fn a_long_frame_gap_does_not_leak_tags() {
    let mut h = harness_seeded(TagCloudConfig::default(), brand_tags(), 1_100.0, 480.0, 1280.0, 3);
    h.cloud.mount(0.0);
    h.cloud.frame(16.0);
    // Backgrounded tab: every spawn and jitter tick lands in one frame.
    h.cloud.frame(10_000.0);
    assert_eq!(h.cloud.dynamic_count(), brand_tags().len());

    run_frames(&mut h, 10_000.0, 20_000.0);
    assert_tags_inside(&h.cloud, 1_100.0, 480.0, 4.0);
}

#[test]
fn resize_before_activation_is_ignored() {
    let mut h = harness(&["A"]);
    assert!(!h.cloud.resize(500.0, 500.0));
    h.available.set(false);
    h.cloud.mount(0.0);
    assert!(!h.cloud.resize(500.0, 500.0));
}

#[test]
fn double_teardown_is_harmless() {
    let mut h = harness(&["A", "BB", "CCC"]);
    h.cloud.mount(0.0);
    h.cloud.tick(200.0);
    assert!(h.cloud.pending_timers() > 0);

    h.cloud.teardown();
    h.cloud.teardown();
    assert_eq!(h.cloud.pending_timers(), 0);
    assert_eq!(h.cloud.phase(), LifecyclePhase::Destroyed);
    assert!(h.cloud.world().is_none());
    assert!(h.cloud.listeners().is_empty());
    assert!(!h.cloud.is_observing_resize());

    // Timers that would have fired are gone.
    h.cloud.tick(10_000.0);
    assert_eq!(h.cloud.body_count(), 0);
    assert!(h.cloud.frame(10_016.0).is_empty());
    assert!(!h.cloud.resize(300.0, 300.0));
}

#[test]
fn teardown_before_mount_is_a_no_op() {
    let mut h = harness(&["A"]);
    h.cloud.teardown();
    assert_eq!(h.cloud.phase(), LifecyclePhase::Uninitialized);
    assert_eq!(h.cloud.history(), &[LifecyclePhase::Uninitialized]);
}

#[test]
fn active_never_jumps_straight_to_destroyed() {
    let mut h = harness(&["A"]);
    h.cloud.mount(0.0);
    h.cloud.reinitialize(100.0);
    h.cloud.teardown();

    let history = h.cloud.history();
    assert_eq!(history.last(), Some(&LifecyclePhase::Destroyed));
    for pair in history.windows(2) {
        assert_ne!(pair, [LifecyclePhase::Active, LifecyclePhase::Destroyed]);
        if pair[1] == LifecyclePhase::Active {
            assert_eq!(pair[0], LifecyclePhase::WaitingForPreconditions);
        }
    }
}

#[test]
fn waits_for_the_backend_and_activates_on_the_next_poll() {
    for n in [1u32, 3, 10] {
        let mut h = harness(&["A"]);
        h.available.set(false);
        h.cloud.mount(0.0);
        assert_eq!(h.cloud.phase(), LifecyclePhase::WaitingForPreconditions);

        for cycle in 1..n {
            h.cloud.tick(cycle as f64 * 200.0);
            assert_eq!(h.cloud.phase(), LifecyclePhase::WaitingForPreconditions, "cycle {cycle}");
            assert_eq!(h.cloud.worlds_built(), 0);
        }

        h.available.set(true);
        h.cloud.tick(n as f64 * 200.0 - 1.0);
        assert_eq!(h.cloud.phase(), LifecyclePhase::WaitingForPreconditions);
        h.cloud.tick(n as f64 * 200.0);
        assert_eq!(h.cloud.phase(), LifecyclePhase::Active);
        assert_eq!(h.cloud.poll_attempts(), n);
        assert_eq!(h.cloud.worlds_built(), 1);
    }
}

#[test]
fn waits_for_a_laid_out_container() {
    let mut h = harness(&["A"]);
    h.size.set(Viewport::new(0.0, 0.0));
    h.cloud.mount(0.0);
    h.cloud.tick(400.0);
    assert_eq!(h.cloud.phase(), LifecyclePhase::WaitingForPreconditions);

    h.size.set(Viewport::new(640.0, 320.0));
    h.cloud.tick(600.0);
    assert_eq!(h.cloud.phase(), LifecyclePhase::Active);
    assert_encloses(&h.cloud, 640.0, 320.0);
}

#[test]
fn gives_up_after_the_attempt_budget() {
    let mut h = harness(&["A"]);
    h.available.set(false);
    h.cloud.mount(0.0);

    h.cloud.tick(49.0 * 200.0);
    assert_eq!(h.cloud.phase(), LifecyclePhase::WaitingForPreconditions);
    h.cloud.tick(50.0 * 200.0);
    assert_eq!(h.cloud.phase(), LifecyclePhase::Unavailable);
    assert_eq!(h.cloud.poll_attempts(), 50);
    assert_eq!(h.cloud.pending_timers(), 0);

    // Becoming available later does nothing until mounted again.
    h.available.set(true);
    h.cloud.tick(60_000.0);
    assert_eq!(h.cloud.phase(), LifecyclePhase::Unavailable);
    h.cloud.mount(60_000.0);
    assert_eq!(h.cloud.phase(), LifecyclePhase::Active);
}

#[test]
fn mount_is_ignored_while_waiting_or_active() {
    let mut h = harness(&["A"]);
    h.available.set(false);
    h.cloud.mount(0.0);
    h.cloud.mount(10.0);
    assert_eq!(h.cloud.pending_timers(), 1);

    h.available.set(true);
    h.cloud.tick(200.0);
    h.cloud.mount(300.0);
    assert_eq!(h.cloud.worlds_built(), 1);
    assert_eq!(h.cloud.interaction().attachments(), 1);
}

#[test]
fn reinitialize_rebuilds_exactly_one_world() {
    let mut h = harness(&["A", "BB", "CCC"]);
    h.cloud.mount(0.0);
    h.cloud.tick(600.0);
    assert_eq!(h.cloud.dynamic_count(), 3);

    h.cloud.reinitialize(1_000.0);
    assert_eq!(h.cloud.phase(), LifecyclePhase::Active);
    assert_eq!(h.cloud.worlds_built(), 2);
    // Walls only; the spawner starts over.
    assert_eq!(h.cloud.body_count(), 4);
    assert_eq!(h.cloud.listeners(), ListenerSet::all());
    assert_eq!(h.cloud.interaction().attachments(), 2);

    h.cloud.tick(1_600.0);
    assert_eq!(h.cloud.dynamic_labels(), labels(&["A", "BB", "CCC"]));
}

#[test]
fn cursor_lease_follows_the_active_world() {
    let mut h = harness(&["A"]);
    h.cloud.mount(0.0);
    assert!(h.cloud.holds_cursor());
    assert!(cursor_hidden());

    h.cloud.reinitialize(50.0);
    assert!(cursor_hidden());

    h.cloud.teardown();
    assert!(!h.cloud.holds_cursor());
    assert!(!cursor_hidden());
}

#[test]
fn listeners_attach_once_and_never_include_the_wheel() {
    let mut h = harness(&["A"]);
    assert!(h.cloud.listeners().is_empty());
    h.cloud.mount(0.0);
    assert_eq!(h.cloud.listeners().len(), 5);
    assert!(h.cloud.listeners().iter().all(|k| k.event_name() != "wheel"));
    assert!(!h.cloud.interaction().captures_wheel());
}

#[test]
fn frame_draws_shapes_then_labels() {
    let mut h = harness(&["A", "BB"]);
    h.cloud.mount(0.0);
    let cmds = h.cloud.frame(400.0);

    assert!(matches!(cmds[0], DrawCommand::Clear { width, height, .. } if width == 800.0 && height == 400.0));
    let texts: Vec<_> = cmds
        .iter()
        .filter_map(|c| match c {
            DrawCommand::FillText { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, ["A", "BB"]);

    let last_shape = cmds.iter().rposition(|c| matches!(c, DrawCommand::RoundedRect { .. })).unwrap();
    let font = cmds.iter().position(|c| matches!(c, DrawCommand::SetFont(_))).unwrap();
    assert!(last_shape < font);
    assert_eq!(cmds[font], DrawCommand::SetFont("700 12px 'Inter', sans-serif".into()));
}

#[test]
fn physics_runs_on_frames_not_ticks() {
    let mut h = harness(&["A"]);
    h.cloud.mount(0.0);
    h.cloud.tick(200.0);
    let start = h.cloud.bodies()[4].pos;

    h.cloud.tick(400.0);
    assert_eq!(h.cloud.bodies()[4].pos, start);

    let mut now = 400.0;
    for _ in 0..30 {
        now += 16.7;
        h.cloud.frame(now);
    }
    assert!(h.cloud.bodies()[4].pos.y > start.y);
}

#[test]
fn tags_settle_on_the_floor() {
    let mut h = harness(&["Growth", "SEO", "Ads"]);
    h.cloud.mount(0.0);
    let mut now = 0.0;
    while now < 10_000.0 {
        now += 16.7;
        h.cloud.frame(now);
    }
    for tag in h.cloud.bodies().iter().filter(|b| !b.is_static) {
        assert!(tag.pos.y > 0.0 && tag.pos.y < 400.0, "y = {}", tag.pos.y);
        assert!(tag.pos.x > 0.0 && tag.pos.x < 800.0, "x = {}", tag.pos.x);
    }
}

#[test]
fn pressing_a_tag_grabs_it_and_release_lets_go() {
    let mut h = harness(&["Marketing"]);
    h.cloud.mount(0.0);
    h.cloud.tick(200.0);
    let tag = h.cloud.bodies()[4].pos;

    h.cloud.pointer_down(tag);
    assert!(h.cloud.interaction().is_pressed());
    assert!(h.cloud.world().unwrap().world().dragged().is_some());

    h.cloud.pointer_move(tag + Vec2::new(200.0, 0.0));
    h.cloud.pointer_up(tag + Vec2::new(200.0, 0.0));
    assert!(!h.cloud.interaction().is_pressed());
    assert!(h.cloud.world().unwrap().world().dragged().is_none());
}

#[test]
fn pointer_leave_releases_the_drag() {
    let mut h = harness(&["Marketing"]);
    h.cloud.mount(0.0);
    h.cloud.tick(200.0);
    let tag = h.cloud.bodies()[4].pos;

    h.cloud.pointer_down(tag);
    h.cloud.pointer_leave();
    assert!(!h.cloud.interaction().is_pressed());
    assert!(h.cloud.world().unwrap().world().dragged().is_none());
}

#[test]
fn click_pushes_tags_away() {
    let mut h = harness(&["A"]);
    h.cloud.mount(0.0);
    run_frames(&mut h, 0.0, 600.0);
    assert!(h.cloud.bodies()[4].pos.y > 0.0);
    let tag = h.cloud.bodies()[4].clone();

    let click = tag.pos - Vec2::new(60.0, 0.0);
    h.cloud.pointer_down(click);
    h.cloud.pointer_up(click);

    let after = &h.cloud.bodies()[4];
    assert!(after.velocity.x > tag.velocity.x);
    assert!(after.velocity.y < tag.velocity.y);
}

#[test]
fn click_repulsion_can_be_disabled() {
    let mut cfg = config();
    cfg.click_repulsion = false;
    let mut h = harness_with(cfg, &["A"], 800.0, 400.0, 1280.0);
    h.cloud.mount(0.0);
    h.cloud.tick(200.0);
    let before = h.cloud.bodies()[4].velocity;

    let click = h.cloud.bodies()[4].pos - Vec2::new(60.0, 0.0);
    h.cloud.pointer_down(click);
    h.cloud.pointer_up(click);
    assert_eq!(h.cloud.bodies()[4].velocity, before);
}

#[test]
fn pointer_input_after_teardown_is_ignored() {
    let mut h = harness(&["A"]);
    h.cloud.mount(0.0);
    h.cloud.teardown();
    h.cloud.pointer_down(Vec2::new(10.0, 10.0));
    h.cloud.pointer_up(Vec2::new(10.0, 10.0));
    assert!(!h.cloud.interaction().is_pressed());
}

#[test]
fn jitter_keeps_running_until_teardown() {
    let mut cfg = config();
    cfg.jitter_interval_ms = 6_000.0;
    let mut h = harness_with(cfg, &["A"], 800.0, 400.0, 1280.0);
    h.cloud.mount(0.0);
    run_frames(&mut h, 0.0, 5_980.0);
    assert_eq!(h.cloud.pending_timers(), 1);

    // The tag has settled on the floor when the first nudge fires.
    let before = h.cloud.bodies()[4].velocity;
    h.cloud.tick(6_000.0);
    assert_ne!(h.cloud.bodies()[4].velocity, before);
    assert!(h.cloud.bodies()[4].velocity.y < 0.0);

    h.cloud.teardown();
    assert_eq!(h.cloud.pending_timers(), 0);
}
