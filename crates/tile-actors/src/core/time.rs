/// Frame-rate independent tick counter.
///
/// Counts reference ticks rather than wall time: `update(extrp)` adds the
/// frame's extrapolation factor, so a delay lasts the same logical time
/// whatever the actual frame rate is. Queries never mutate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tick {
    current: f32,
    started: bool,
}

impl Tick {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting if not already started.
    pub fn start(&mut self) {
        self.started = true;
    }

    /// Zero the counter and start counting.
    pub fn restart(&mut self) {
        self.current = 0.0;
        self.started = true;
    }

    /// Zero the counter and stop counting.
    pub fn stop(&mut self) {
        self.current = 0.0;
        self.started = false;
    }

    /// Force the counter value (in ticks).
    pub fn set(&mut self, ticks: f32) {
        self.current = ticks;
    }

    /// Advance by `extrp` reference ticks. Ignored while stopped.
    pub fn update(&mut self, extrp: f32) {
        if self.started {
            self.current += extrp;
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Elapsed reference ticks.
    pub fn ticks(&self) -> f32 {
        self.current
    }

    /// Whether at least `ticks` reference ticks elapsed since start.
    pub fn elapsed(&self, ticks: f32) -> bool {
        self.started && self.current >= ticks
    }

    /// Elapsed time in milliseconds at the given tick rate.
    pub fn elapsed_ms(&self, rate: f32) -> f32 {
        self.current * 1000.0 / rate
    }

    /// Whether at least `ms` milliseconds elapsed at the given tick rate.
    pub fn elapsed_time(&self, rate: f32, ms: f32) -> bool {
        self.started && self.elapsed_ms(rate) >= ms
    }
}

/// Fixed timestep accumulator.
/// Turns variable frame durations into whole simulation ticks, or into an
/// `extrp` factor for callers stepping once per rendered frame.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// The fixed delta time per tick, in seconds.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    /// Maximum ticks returned by one `accumulate` call.
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: 10,
        }
    }

    /// Timestep for a rate in ticks per second.
    pub fn from_rate(rate: f32) -> Self {
        Self::new(1.0 / rate)
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt;
        let steps = ((self.accumulator / self.dt) as u32).min(self.max_steps);
        self.accumulator -= steps as f32 * self.dt;
        // Cap to prevent spiral of death
        if steps == self.max_steps {
            self.accumulator = self.accumulator.min(self.dt * 0.5);
        }
        steps
    }

    /// Ratio of a frame duration to the reference tick duration.
    pub fn extrp(&self, frame_dt: f32) -> f32 {
        frame_dt / self.dt
    }

    /// Interpolation alpha for rendering between ticks (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}
