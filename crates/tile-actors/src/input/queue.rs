use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Control signals for one tick.
/// Axes range over [-1, 1]; positive vertical means up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSignals {
    pub horizontal: f32,
    pub vertical: f32,
    pub jump: bool,
    pub attack: bool,
    /// Request to leave the running level. Surfaced in the tick report only.
    pub force_exit: bool,
}

impl ControlSignals {
    pub fn idle() -> Self {
        Self::default()
    }

    // -- Builder pattern --

    pub fn with_horizontal(mut self, horizontal: f32) -> Self {
        self.horizontal = horizontal.clamp(-1.0, 1.0);
        self
    }

    pub fn with_vertical(mut self, vertical: f32) -> Self {
        self.vertical = vertical.clamp(-1.0, 1.0);
        self
    }

    pub fn with_jump(mut self, jump: bool) -> Self {
        self.jump = jump;
        self
    }

    pub fn with_attack(mut self, attack: bool) -> Self {
        self.attack = attack;
        self
    }

    pub fn with_force_exit(mut self, force_exit: bool) -> Self {
        self.force_exit = force_exit;
        self
    }
}

/// Control state of an entity with one tick of history for edge detection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Control {
    current: ControlSignals,
    previous: ControlSignals,
}

impl Control {
    /// Latch this tick's signals.
    pub fn feed(&mut self, signals: ControlSignals) {
        self.previous = self.current;
        self.current = signals;
    }

    pub fn signals(&self) -> &ControlSignals {
        &self.current
    }

    pub fn horizontal(&self) -> f32 {
        self.current.horizontal
    }

    pub fn vertical(&self) -> f32 {
        self.current.vertical
    }

    pub fn is_going_left(&self) -> bool {
        self.current.horizontal < 0.0
    }

    pub fn is_going_right(&self) -> bool {
        self.current.horizontal > 0.0
    }

    pub fn is_going_horizontal(&self) -> bool {
        self.current.horizontal != 0.0
    }

    pub fn jump(&self) -> bool {
        self.current.jump
    }

    /// Jump pressed this tick and not the previous one.
    pub fn jump_once(&self) -> bool {
        self.current.jump && !self.previous.jump
    }

    pub fn attack(&self) -> bool {
        self.current.attack
    }

    /// Attack pressed this tick and not the previous one.
    pub fn attack_once(&self) -> bool {
        self.current.attack && !self.previous.attack
    }
}

/// Supplies an entity's control signals, polled once per tick.
pub trait InputSource {
    fn poll(&mut self, tick: u64) -> ControlSignals;
}

/// Input source that never does anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleInput;

impl InputSource for IdleInput {
    fn poll(&mut self, _tick: u64) -> ControlSignals {
        ControlSignals::idle()
    }
}

/// A queue of per-tick control signals.
/// The caller pushes one entry per tick (keyboard adapter, replay, test
/// script); each poll consumes the front. An empty queue polls idle.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    frames: VecDeque<ControlSignals>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            frames: VecDeque::with_capacity(32),
        }
    }

    /// Queue a whole script at once.
    pub fn from_script(frames: impl IntoIterator<Item = ControlSignals>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Queue `signals` for the next `ticks` polls.
    pub fn hold(mut self, signals: ControlSignals, ticks: usize) -> Self {
        self.frames.extend(std::iter::repeat(signals).take(ticks));
        self
    }

    pub fn push(&mut self, signals: ControlSignals) {
        self.frames.push_back(signals);
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for InputQueue {
    fn poll(&mut self, _tick: u64) -> ControlSignals {
        self.frames.pop_front().unwrap_or_default()
    }
}
