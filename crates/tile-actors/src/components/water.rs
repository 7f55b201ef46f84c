/// Horizontal water surface shared by swimming archetypes.
///
/// World y grows downward, so depth is positive below the surface and
/// altitude is positive above it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Water {
    level: f32,
    target: f32,
    speed: f32,
}

impl Water {
    pub fn new(level: f32) -> Self {
        Self {
            level,
            target: level,
            speed: 0.0,
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Move the surface toward `level` at `speed` units per tick.
    pub fn rise_to(&mut self, level: f32, speed: f32) {
        self.target = level;
        self.speed = speed.abs();
    }

    pub fn update(&mut self, extrp: f32) {
        let gap = self.target - self.level;
        if gap == 0.0 {
            return;
        }
        let step = self.speed * extrp;
        if gap.abs() <= step {
            self.level = self.target;
        } else {
            self.level += gap.signum() * step;
        }
    }

    /// Distance below the surface.
    pub fn depth(&self, y: f32) -> f32 {
        y - self.level
    }

    /// Distance above the surface.
    pub fn altitude(&self, y: f32) -> f32 {
        self.level - y
    }
}
