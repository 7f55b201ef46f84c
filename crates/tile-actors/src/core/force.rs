use glam::Vec2;

/// A 2D direction that converges toward a destination at a bounded rate.
///
/// Each axis moves toward its destination by at most
/// `velocity * sensibility * extrp` per update and never overshoots.
/// `update` returns the exact displacement over the step (the integral of
/// the direction), so any split of a duration into smaller steps moves the
/// same distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Force {
    direction: Vec2,
    destination: Vec2,
    previous: Vec2,
    velocity: f32,
    sensibility: f32,
    vertical_max: Option<f32>,
}

impl Default for Force {
    fn default() -> Self {
        Self::new()
    }
}

impl Force {
    pub fn new() -> Self {
        Self {
            direction: Vec2::ZERO,
            destination: Vec2::ZERO,
            previous: Vec2::ZERO,
            velocity: 0.0,
            sensibility: 1.0,
            vertical_max: None,
        }
    }

    // -- Setters --

    pub fn set_direction(&mut self, x: f32, y: f32) {
        self.direction = Vec2::new(x, y);
        self.clamp();
    }

    pub fn set_destination(&mut self, x: f32, y: f32) {
        self.destination = Vec2::new(x, y);
    }

    /// Convergence rate per reference tick.
    pub fn set_velocity(&mut self, velocity: f32) {
        debug_assert!(velocity >= 0.0, "force velocity must be non-negative");
        self.velocity = velocity.max(0.0);
    }

    /// Scales the convergence rate.
    pub fn set_sensibility(&mut self, sensibility: f32) {
        debug_assert!(sensibility >= 0.0, "force sensibility must be non-negative");
        self.sensibility = sensibility.max(0.0);
    }

    /// Cap the magnitude of the vertical direction. Applies immediately.
    pub fn set_vertical_maximum(&mut self, maximum: Option<f32>) {
        self.vertical_max = maximum.map(f32::abs);
        self.clamp();
    }

    /// Zero direction and destination. Rates are kept.
    pub fn zero(&mut self) {
        self.direction = Vec2::ZERO;
        self.destination = Vec2::ZERO;
    }

    // -- Queries --

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn destination(&self) -> Vec2 {
        self.destination
    }

    pub fn direction_horizontal(&self) -> f32 {
        self.direction.x
    }

    pub fn direction_vertical(&self) -> f32 {
        self.direction.y
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn sensibility(&self) -> f32 {
        self.sensibility
    }

    pub fn vertical_maximum(&self) -> Option<f32> {
        self.vertical_max
    }

    /// Horizontal direction grew during the last update.
    pub fn is_increasing_horizontal(&self) -> bool {
        self.direction.x > self.previous.x
    }

    /// Horizontal direction shrank during the last update.
    pub fn is_decreasing_horizontal(&self) -> bool {
        self.direction.x < self.previous.x
    }

    /// Advance the direction toward the destination and return the
    /// displacement covered during the step.
    pub fn update(&mut self, extrp: f32) -> Vec2 {
        self.previous = self.direction;
        let rate = self.velocity * self.sensibility;
        let (x, dx) = approach(self.direction.x, self.destination.x, rate, extrp);
        let (y, dy) = approach(self.direction.y, self.destination.y, rate, extrp);
        self.direction = Vec2::new(x, y);
        self.clamp();
        Vec2::new(dx, dy)
    }

    fn clamp(&mut self) {
        if let Some(max) = self.vertical_max {
            self.direction.y = self.direction.y.clamp(-max, max);
        }
    }
}

/// Move `current` linearly toward `target` at `rate` per tick for `extrp`
/// ticks. Returns the new value and the area under the curve.
fn approach(current: f32, target: f32, rate: f32, extrp: f32) -> (f32, f32) {
    let gap = target - current;
    if rate <= 0.0 || gap == 0.0 || extrp <= 0.0 {
        return (current, current * extrp.max(0.0));
    }
    let arrival = gap.abs() / rate;
    if arrival <= extrp {
        let ramp = (current + target) * 0.5 * arrival;
        (target, ramp + target * (extrp - arrival))
    } else {
        let next = current + gap.signum() * rate * extrp;
        (next, (current + next) * 0.5 * extrp)
    }
}
