/// Gravity and fall-speed state of a body.
///
/// Fall speed grows by `gravity * mass` per reference tick and is clamped at
/// `gravity_max`. Integration is exact per step, so running ten steps of
/// `extrp = 1.0` moves the body as far as twenty steps of `extrp = 0.5`.
/// A suspended step does not fall at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBody {
    gravity: f32,
    gravity_max: f32,
    mass: f32,
    fall_speed: f32,
    falling: bool,
    suspended: bool,
}

impl PhysicsBody {
    pub fn new(gravity: f32, gravity_max: f32) -> Self {
        Self {
            gravity: gravity.max(0.0),
            gravity_max: gravity_max.max(0.0),
            mass: 1.0,
            fall_speed: 0.0,
            falling: false,
            suspended: false,
        }
    }

    /// A body that never accumulates fall speed.
    pub fn weightless() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass.max(0.0);
        self
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn gravity_max(&self) -> f32 {
        self.gravity_max
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn fall_speed(&self) -> f32 {
        self.fall_speed
    }

    pub fn is_falling(&self) -> bool {
        self.falling
    }

    pub fn has_gravity(&self) -> bool {
        self.gravity > 0.0 && self.mass > 0.0
    }

    pub fn set_falling(&mut self, falling: bool) {
        self.falling = falling;
    }

    /// Zero the accumulated fall speed.
    pub fn reset_gravity(&mut self) {
        self.fall_speed = 0.0;
    }

    /// Suspend gravity for the next `integrate` call only.
    pub fn suspend(&mut self) {
        self.fall_speed = 0.0;
        self.suspended = true;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Ground contact: zero fall speed and clear the falling flag.
    pub fn land(&mut self) {
        self.fall_speed = 0.0;
        self.falling = false;
    }

    /// Accumulate gravity over `extrp` ticks and return the downward
    /// displacement for the step.
    pub fn integrate(&mut self, extrp: f32) -> f32 {
        if self.suspended {
            self.suspended = false;
            self.fall_speed = 0.0;
            return 0.0;
        }
        if extrp <= 0.0 {
            return 0.0;
        }
        let accel = self.gravity * self.mass;
        let start = self.fall_speed.min(self.gravity_max);
        if accel <= 0.0 {
            return start * extrp;
        }
        let to_cap = ((self.gravity_max - start) / accel).max(0.0);
        let dy = if to_cap >= extrp {
            self.fall_speed = start + accel * extrp;
            start * extrp + 0.5 * accel * extrp * extrp
        } else {
            self.fall_speed = self.gravity_max;
            start * to_cap + 0.5 * accel * to_cap * to_cap + self.gravity_max * (extrp - to_cap)
        };
        if dy > 0.0 {
            self.falling = true;
        }
        dy
    }
}
