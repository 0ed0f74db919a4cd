//! Tunable numbers for the tag cloud.
//!
//! Everything that differs between phones and desktops lives in a
//! [`DeviceProfile`]; the breakpoint picks which one a world uses. None of the
//! defaults are load-bearing, they just reproduce the current look.

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::error::ConfigError;
use crate::rigid_body::Vec2;
use crate::rigid_body_system::WorldSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Compact,
    Regular,
}

impl DeviceClass {
    pub fn for_width(window_width: f32, breakpoint: f32) -> Self {
        if window_width < breakpoint {
            DeviceClass::Compact
        } else {
            DeviceClass::Regular
        }
    }
}

/// Per-device tuning. In JSON a profile is a partial override: fields left out
/// keep the values of that device's preset.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceProfile {
    pub gravity_y: f32,
    pub solver_iterations: u32,
    pub spawn_interval_ms: f64,
    /// Only the first `max_tags` labels are shown (`None` = all)
    pub max_tags: Option<usize>,
    pub tag_height: f32,
    /// Width added per label character
    pub char_width: f32,
    pub horizontal_padding: f32,
    pub font_weight: u16,
    pub font_px: f32,
    /// Upper bound for the backing-store pixel ratio
    pub max_pixel_ratio: f32,
}

impl DeviceProfile {
    pub fn compact() -> Self {
        Self {
            gravity_y: 0.3,
            solver_iterations: 6,
            spawn_interval_ms: 400.0,
            max_tags: Some(12),
            tag_height: 30.0,
            char_width: 6.0,
            horizontal_padding: 22.0,
            font_weight: 600,
            font_px: 10.0,
            max_pixel_ratio: 1.0,
        }
    }

    pub fn regular() -> Self {
        Self {
            gravity_y: 0.35,
            solver_iterations: 10,
            spawn_interval_ms: 250.0,
            max_tags: None,
            tag_height: 40.0,
            char_width: 8.5,
            horizontal_padding: 38.0,
            font_weight: 700,
            font_px: 12.0,
            max_pixel_ratio: 2.0,
        }
    }

    /// CSS font shorthand, e.g. `700 12px 'Inter', sans-serif`
    pub fn font(&self, family: &str) -> String {
        format!("{} {}px {}", self.font_weight, self.font_px, family)
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !(self.tag_height > 0.0) {
            return Err(ConfigError::invalid(field, "tag_height must be positive"));
        }
        if !(self.spawn_interval_ms > 0.0) {
            return Err(ConfigError::invalid(field, "spawn_interval_ms must be positive"));
        }
        if self.char_width < 0.0 || self.horizontal_padding < 0.0 {
            return Err(ConfigError::invalid(field, "tag sizing must not be negative"));
        }
        if !(self.font_px > 0.0) {
            return Err(ConfigError::invalid(field, "font_px must be positive"));
        }
        if self.solver_iterations == 0 {
            return Err(ConfigError::invalid(field, "solver_iterations must be at least 1"));
        }
        Ok(())
    }
}

/// The fields a JSON profile may set. `max_tags: null` means "show all".
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ProfileOverrides {
    gravity_y: Option<f32>,
    solver_iterations: Option<u32>,
    spawn_interval_ms: Option<f64>,
    #[serde(deserialize_with = "present")]
    max_tags: Option<Option<usize>>,
    tag_height: Option<f32>,
    char_width: Option<f32>,
    horizontal_padding: Option<f32>,
    font_weight: Option<u16>,
    font_px: Option<f32>,
    max_pixel_ratio: Option<f32>,
}

impl ProfileOverrides {
    fn apply(self, base: DeviceProfile) -> DeviceProfile {
        DeviceProfile {
            gravity_y: self.gravity_y.unwrap_or(base.gravity_y),
            solver_iterations: self.solver_iterations.unwrap_or(base.solver_iterations),
            spawn_interval_ms: self.spawn_interval_ms.unwrap_or(base.spawn_interval_ms),
            max_tags: self.max_tags.unwrap_or(base.max_tags),
            tag_height: self.tag_height.unwrap_or(base.tag_height),
            char_width: self.char_width.unwrap_or(base.char_width),
            horizontal_padding: self.horizontal_padding.unwrap_or(base.horizontal_padding),
            font_weight: self.font_weight.unwrap_or(base.font_weight),
            font_px: self.font_px.unwrap_or(base.font_px),
            max_pixel_ratio: self.max_pixel_ratio.unwrap_or(base.max_pixel_ratio),
        }
    }
}

// Tells an explicit `null` apart from a missing field.
fn present<'de, D: Deserializer<'de>, T: Deserialize<'de>>(d: D) -> Result<Option<Option<T>>, D::Error> {
    Option::<T>::deserialize(d).map(Some)
}

fn compact_profile<'de, D: Deserializer<'de>>(d: D) -> Result<DeviceProfile, D::Error> {
    Ok(ProfileOverrides::deserialize(d)?.apply(DeviceProfile::compact()))
}

fn regular_profile<'de, D: Deserializer<'de>>(d: D) -> Result<DeviceProfile, D::Error> {
    Ok(ProfileOverrides::deserialize(d)?.apply(DeviceProfile::regular()))
}

/// Fill/text colour pairs picked by coin flip for each tag
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagPalette {
    pub dark_fill: String,
    pub dark_stroke: String,
    pub light_fill: String,
    pub light_stroke: String,
}

impl Default for TagPalette {
    fn default() -> Self {
        Self {
            dark_fill: "#1a1d21".to_string(),
            dark_stroke: "rgba(255, 255, 255, 0.1)".to_string(),
            light_fill: "#ffffff".to_string(),
            light_stroke: "rgba(0, 0, 0, 0.05)".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagCloudConfig {
    /// Window widths below this use the compact profile
    pub breakpoint: f32,
    #[serde(deserialize_with = "compact_profile")]
    pub compact: DeviceProfile,
    #[serde(deserialize_with = "regular_profile")]
    pub regular: DeviceProfile,

    pub wall_thickness: f32,
    /// Fraction of the width kept free on each side when spawning
    pub spawn_inset: f32,
    /// Spawn height; negative is above the visible area
    pub spawn_y: f32,

    pub friction: f32,
    pub friction_air: f32,
    pub restitution: f32,
    pub enable_sleeping: bool,
    pub drag_stiffness: f32,

    pub poll_interval_ms: f64,
    pub max_poll_attempts: u32,

    /// 0 disables the anti-clog nudge
    pub jitter_interval_ms: f64,
    pub jitter_speed: f32,

    pub click_repulsion: bool,
    pub repulsion_strength: f32,
    pub repulsion_lift: f32,

    pub font_family: String,
    pub palette: TagPalette,
}

impl Default for TagCloudConfig {
    fn default() -> Self {
        Self {
            breakpoint: 768.0,
            compact: DeviceProfile::compact(),
            regular: DeviceProfile::regular(),
            wall_thickness: 100.0,
            spawn_inset: 0.2,
            spawn_y: -50.0,
            friction: 0.05,
            friction_air: 0.02,
            restitution: 0.7,
            enable_sleeping: true,
            drag_stiffness: 0.1,
            poll_interval_ms: 200.0,
            max_poll_attempts: 50,
            jitter_interval_ms: 3_000.0,
            jitter_speed: 1.5,
            click_repulsion: true,
            repulsion_strength: 300.0,
            repulsion_lift: 0.5,
            font_family: "'Inter', sans-serif".to_string(),
            palette: TagPalette::default(),
        }
    }
}

impl TagCloudConfig {
    /// Parse a (partial) JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TagCloudConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.breakpoint > 0.0) {
            return Err(ConfigError::invalid("breakpoint", "must be positive"));
        }
        if !(self.wall_thickness >= 100.0) {
            return Err(ConfigError::invalid(
                "wall_thickness",
                format!("must be at least 100px, got {}", self.wall_thickness),
            ));
        }
        if !(0.0..0.5).contains(&self.spawn_inset) {
            return Err(ConfigError::invalid("spawn_inset", "must be in [0, 0.5)"));
        }
        if !(self.poll_interval_ms > 0.0) {
            return Err(ConfigError::invalid("poll_interval_ms", "must be positive"));
        }
        if self.max_poll_attempts == 0 {
            return Err(ConfigError::invalid("max_poll_attempts", "must be at least 1"));
        }
        if self.jitter_interval_ms < 0.0 {
            return Err(ConfigError::invalid("jitter_interval_ms", "must not be negative"));
        }
        if !(0.0..=1.0).contains(&self.drag_stiffness) {
            return Err(ConfigError::invalid("drag_stiffness", "must be in [0, 1]"));
        }
        self.compact.validate("compact")?;
        self.regular.validate("regular")?;
        Ok(())
    }

    pub fn profile(&self, device: DeviceClass) -> &DeviceProfile {
        match device {
            DeviceClass::Compact => &self.compact,
            DeviceClass::Regular => &self.regular,
        }
    }

    pub(super) fn world_settings(&self, device: DeviceClass) -> WorldSettings {
        let profile = self.profile(device);
        WorldSettings {
            gravity: Vec2::new(0.0, profile.gravity_y),
            iterations: profile.solver_iterations,
            enable_sleeping: self.enable_sleeping,
            drag_stiffness: self.drag_stiffness,
        }
    }
}
