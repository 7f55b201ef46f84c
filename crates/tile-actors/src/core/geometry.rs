use glam::Vec2;

/// Axis-aligned rectangle in y-down world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Footprint of a body whose feet (bottom-centre) are at `feet`.
    pub fn from_feet(feet: Vec2, size: Vec2) -> Self {
        Self {
            min: Vec2::new(feet.x - size.x * 0.5, feet.y - size.y),
            max: Vec2::new(feet.x + size.x * 0.5, feet.y),
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn translate(self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Mirror around the vertical axis x = 0.
    pub fn mirror_x(self) -> Self {
        Self {
            min: Vec2::new(-self.max.x, self.min.y),
            max: Vec2::new(-self.min.x, self.max.y),
        }
    }

    /// Strict overlap; rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}
