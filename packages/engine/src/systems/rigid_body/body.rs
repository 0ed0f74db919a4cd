use super::vec2::Vec2;

/// Index of a body inside its world's arena.
///
/// Handles stay valid for the lifetime of the world: bodies are never removed
/// individually, only cleared all at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub(crate) u32);

impl BodyHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Surface properties of a body
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Tangential friction on contact (0.0 = ice)
    pub friction: f32,
    /// Velocity damping applied every step
    pub friction_air: f32,
    /// Bounciness (0.0 = no bounce, 1.0 = full elastic)
    pub restitution: f32,
    /// Mass per square pixel
    pub density: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            friction: 0.1,
            friction_air: 0.01,
            restitution: 0.0,
            density: 0.001,
        }
    }
}

/// Fill / stroke used when drawing the body shape
#[derive(Clone, Debug, PartialEq)]
pub struct BodyStyle {
    pub fill: String,
    pub stroke: String,
    pub line_width: f32,
    pub visible: bool,
}

impl BodyStyle {
    pub fn hidden() -> Self {
        Self {
            fill: String::new(),
            stroke: String::new(),
            line_width: 0.0,
            visible: false,
        }
    }
}

/// Text drawn on top of a body
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub color: String,
}

/// Rigid Body - moves as a single unit
#[derive(Clone, Debug)]
pub struct RigidBody {
    // === Physics State ===
    /// World position (center of mass)
    pub pos: Vec2,
    /// Velocity vector (pixels per step)
    pub velocity: Vec2,
    /// Rotation angle (radians)
    pub angle: f32,
    /// Angular velocity (radians per step)
    pub angular_vel: f32,
    pub mass: f32,
    /// Moment of inertia for rotation
    pub moment_of_inertia: f32,
    /// Static bodies never move on their own
    pub is_static: bool,
    /// Static bodies only: contacts always push the other body along this
    /// unit axis, whichever side it overlaps from
    pub one_way: Option<Vec2>,
    pub sleeping: bool,
    pub(crate) still_steps: u32,

    // === Shape Definition ===
    pub half_width: f32,
    pub half_height: f32,
    /// Corner radius of the rounded rectangle
    pub chamfer: f32,

    pub material: Material,
    pub style: BodyStyle,
    pub label: Option<Label>,
}

impl RigidBody {
    /// Create a dynamic rounded rectangle centered at (x, y)
    pub fn new_rect(x: f32, y: f32, w: f32, h: f32, material: Material) -> Self {
        let w = w.max(1.0);
        let h = h.max(1.0);
        let mass = (w * h * material.density).max(0.0001);
        // I = m (w² + h²) / 12 for a solid rectangle
        let moment_of_inertia = (mass * (w * w + h * h) / 12.0).max(0.0001);

        Self {
            pos: Vec2::new(x, y),
            velocity: Vec2::zero(),
            angle: 0.0,
            angular_vel: 0.0,
            mass,
            moment_of_inertia,
            is_static: false,
            one_way: None,
            sleeping: false,
            still_steps: 0,
            half_width: w / 2.0,
            half_height: h / 2.0,
            chamfer: 0.0,
            material,
            style: BodyStyle::hidden(),
            label: None,
        }
    }

    /// Create an immovable, invisible rectangle
    pub fn new_static(x: f32, y: f32, w: f32, h: f32) -> Self {
        let mut body = Self::new_rect(x, y, w, h, Material::default());
        body.is_static = true;
        body
    }

    /// Make a static body one-way: overlapping bodies leave along `normal`.
    pub fn with_one_way(mut self, normal: Vec2) -> Self {
        self.one_way = Some(normal.normalize());
        self
    }

    pub fn with_chamfer(mut self, radius: f32) -> Self {
        self.chamfer = radius.clamp(0.0, self.half_width.min(self.half_height));
        self
    }

    pub fn with_style(mut self, style: BodyStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn width(&self) -> f32 {
        self.half_width * 2.0
    }

    pub fn height(&self) -> f32 {
        self.half_height * 2.0
    }

    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        if self.is_static { 0.0 } else { 1.0 / self.mass }
    }

    /// Transform local coordinates to world coordinates
    #[inline]
    pub fn local_to_world(&self, local: Vec2) -> Vec2 {
        self.pos + local.rotate(self.angle)
    }

    /// Transform world coordinates into the body's local frame
    #[inline]
    pub fn world_to_local(&self, world: Vec2) -> Vec2 {
        (world - self.pos).rotate(-self.angle)
    }

    /// Point-in-shape test (ignores the rounded corners)
    pub fn contains_point(&self, world: Vec2) -> bool {
        let local = self.world_to_local(world);
        local.x.abs() <= self.half_width && local.y.abs() <= self.half_height
    }

    /// Half extents of the axis-aligned box around the rotated shape
    pub fn aabb_half_extents(&self) -> Vec2 {
        let (sin, cos) = self.angle.sin_cos();
        let (sin, cos) = (sin.abs(), cos.abs());
        Vec2::new(
            cos * self.half_width + sin * self.half_height,
            sin * self.half_width + cos * self.half_height,
        )
    }

    /// Change the shape size in place, keeping position and handle
    pub fn set_extents(&mut self, w: f32, h: f32) {
        self.half_width = w.max(1.0) / 2.0;
        self.half_height = h.max(1.0) / 2.0;
        if !self.is_static {
            self.mass = (w * h * self.material.density).max(0.0001);
            self.moment_of_inertia = (self.mass * (w * w + h * h) / 12.0).max(0.0001);
        }
    }

    pub fn wake(&mut self) {
        self.sleeping = false;
        self.still_steps = 0;
    }

    /// Apply impulse at center of mass
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        if self.is_static {
            return;
        }
        self.velocity += impulse * (1.0 / self.mass);
        self.wake();
    }
}
