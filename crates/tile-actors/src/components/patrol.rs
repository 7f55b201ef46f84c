use crate::api::types::Facing;
use crate::core::time::Tick;
use crate::input::queue::ControlSignals;

/// Ticks between two direction reversals.
pub const PATROL_PERIOD: f32 = 100.0;

/// Autonomous back-and-forth control, replacing polled input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patrol {
    horizontal: f32,
    vertical: f32,
    period: f32,
    timer: Tick,
}

impl Patrol {
    pub fn new(horizontal: f32, vertical: f32) -> Self {
        let mut timer = Tick::new();
        timer.start();
        Self {
            horizontal,
            vertical,
            period: PATROL_PERIOD,
            timer,
        }
    }

    pub fn with_period(mut self, ticks: f32) -> Self {
        self.period = ticks;
        self
    }

    pub fn horizontal(&self) -> f32 {
        self.horizontal
    }

    pub fn vertical(&self) -> f32 {
        self.vertical
    }

    pub fn facing(&self) -> Option<Facing> {
        Facing::from_sign(self.horizontal)
    }

    /// Advance the timer. Returns true when the direction just reversed.
    pub fn update(&mut self, extrp: f32) -> bool {
        self.timer.update(extrp);
        if !self.timer.elapsed(self.period) {
            return false;
        }
        self.horizontal = -self.horizontal;
        self.vertical = -self.vertical;
        self.timer.restart();
        true
    }

    pub fn control(&self) -> ControlSignals {
        ControlSignals::idle()
            .with_horizontal(self.horizontal)
            .with_vertical(self.vertical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverses_every_period() {
        let mut patrol = Patrol::new(-0.5, 0.0).with_period(3.0);
        assert_eq!(patrol.facing(), Some(Facing::Left));
        assert!(!patrol.update(1.0));
        assert!(!patrol.update(1.0));
        assert!(patrol.update(1.0));
        assert_eq!(patrol.horizontal(), 0.5);
        assert_eq!(patrol.control().horizontal, 0.5);
        assert!(!patrol.update(1.0));
    }
}
