use std::sync::Arc;

use engine::{RenderSurface, Texture};

/// How a directional command combines with the velocity an entity already has.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum VelocityMode {
    /// Adds the command to the current velocity, clamped per axis to `speed`.
    #[default]
    Accumulate,
    /// Replaces the current velocity outright.
    Absolute,
}

/// A sprite with a position, a velocity and a collision mask. Every role in a
/// room (player, rival, backdrop, goal, hazards) shares this shape.
#[derive(Debug, Clone)]
pub(crate) struct Entity {
    texture: Arc<Texture>,
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) vel_x: f32,
    pub(crate) vel_y: f32,
    pub(crate) speed: f32,
    pub(crate) friction: f32,
    pub(crate) exists: bool,
}

impl Entity {
    pub(crate) fn new(texture: Arc<Texture>, speed: f32, friction: f32) -> Self {
        Self {
            texture,
            x: 0.0,
            y: 0.0,
            vel_x: 0.0,
            vel_y: 0.0,
            speed,
            friction,
            exists: true,
        }
    }

    /// An entity that never moves on its own (goal, backdrop, hazards).
    pub(crate) fn fixture(texture: Arc<Texture>) -> Self {
        Self::new(texture, 0.0, 0.0)
    }

    #[cfg(test)]
    pub(crate) fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }

    pub(crate) fn set_texture(&mut self, texture: Arc<Texture>) {
        self.texture = texture;
    }

    pub(crate) fn width(&self) -> f32 {
        self.texture.width() as f32
    }

    pub(crate) fn height(&self) -> f32 {
        self.texture.height() as f32
    }

    /// Centres the sprite on grid cell `(grid_x, grid_y)` and drops any
    /// pending motion.
    pub(crate) fn set_grid_position(&mut self, grid_x: i32, grid_y: i32, cell_size: u32) {
        let cell = cell_size as f32;
        self.x = grid_x as f32 * cell - self.width() / 2.0;
        self.y = grid_y as f32 * cell - self.height() / 2.0;
        self.vel_x = 0.0;
        self.vel_y = 0.0;
    }

    pub(crate) fn apply_command(&mut self, dx: f32, dy: f32, mode: VelocityMode) {
        match mode {
            VelocityMode::Accumulate => {
                let limit = self.speed.abs();
                self.vel_x = (self.vel_x + dx).clamp(-limit, limit);
                self.vel_y = (self.vel_y + dy).clamp(-limit, limit);
            }
            VelocityMode::Absolute => {
                self.vel_x = dx;
                self.vel_y = dy;
            }
        }
    }

    /// Friction pulls each axis toward zero without crossing it, then the
    /// remaining velocity is added to the position.
    pub(crate) fn physics_step(&mut self) {
        self.vel_x = decay_toward_zero(self.vel_x, self.friction);
        self.vel_y = decay_toward_zero(self.vel_y, self.friction);
        self.x += self.vel_x;
        self.y += self.vel_y;
    }

    pub(crate) fn bounding_box_overlap(&self, other: &Entity) -> bool {
        self.x < other.x + other.width()
            && self.x + self.width() > other.x
            && self.y < other.y + other.height()
            && self.y + self.height() > other.y
    }

    /// True when the bounding boxes overlap and some pixel inside their
    /// intersection is opaque in both masks.
    ///
    /// Positions are truncated to whole pixels before the masks are compared,
    /// matching where the sprites are drawn.
    pub(crate) fn pixel_collision(&self, other: &Entity) -> bool {
        if !self.bounding_box_overlap(other) {
            return false;
        }

        let (ax, ay) = (self.x.floor() as i64, self.y.floor() as i64);
        let (bx, by) = (other.x.floor() as i64, other.y.floor() as i64);
        let mask_a = self.texture.mask();
        let mask_b = other.texture.mask();

        let left = ax.max(bx);
        let right = (ax + mask_a.width() as i64).min(bx + mask_b.width() as i64);
        let top = ay.max(by);
        let bottom = (ay + mask_a.height() as i64).min(by + mask_b.height() as i64);

        (top..bottom).any(|y| {
            (left..right)
                .any(|x| mask_a.is_opaque(x - ax, y - ay) && mask_b.is_opaque(x - bx, y - by))
        })
    }

    pub(crate) fn render(&self, surface: &mut dyn RenderSurface) {
        surface.draw_texture(&self.texture, self.x, self.y, 1.0);
    }
}

fn decay_toward_zero(velocity: f32, friction: f32) -> f32 {
    if velocity > 0.0 {
        (velocity - friction).max(0.0)
    } else if velocity < 0.0 {
        (velocity + friction).min(0.0)
    } else {
        velocity
    }
}
