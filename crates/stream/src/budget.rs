use std::collections::VecDeque;
use std::time::Duration;

/// What one scheduler tick did, for instrumentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Slots admitted into generation this tick.
    pub slots_started: usize,
    /// Slots whose last sub-mesh was committed this tick.
    pub slots_finished: usize,
    /// Slots relabelled by a treadmill shift or a re-seat.
    pub slots_relabelled: usize,
    /// The whole window was re-seated (teleport, first seating or repair).
    pub reseated: bool,
    pub maze_steps: u32,
    pub sub_meshes_committed: usize,
    /// Slots generating or meshing after the tick.
    pub busy_slots: usize,
    /// Slots reset after a meshing contract violation.
    pub slots_failed: usize,
    pub tick_time: Duration,
    /// `tick_time` exceeded the scheduler's tick budget.
    pub over_budget: bool,
}

/// Recent tick durations measured against a per-tick time budget.
///
/// Streaming work shares the host frame, so the interesting numbers are how
/// often and by how much a tick overran its slice, not only the average.
#[derive(Debug)]
pub struct TickTimer {
    recent: VecDeque<Duration>,
    window: usize,
    budget: Duration,
    overruns: u64,
    worst_overrun: Duration,
}

impl TickTimer {
    /// Keep the last `window` samples (at least one) and count every tick
    /// longer than `budget`.
    pub fn new(window: usize, budget: Duration) -> Self {
        let window = window.max(1);
        Self {
            recent: VecDeque::with_capacity(window),
            window,
            budget,
            overruns: 0,
            worst_overrun: Duration::ZERO,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn set_budget(&mut self, budget: Duration) {
        self.budget = budget;
    }

    /// Record one tick. Returns `true` when it exceeded the budget.
    pub fn record(&mut self, dt: Duration) -> bool {
        if self.recent.len() == self.window {
            self.recent.pop_front();
        }
        self.recent.push_back(dt);

        let over = dt.saturating_sub(self.budget);
        if over.is_zero() {
            return false;
        }
        self.overruns += 1;
        self.worst_overrun = self.worst_overrun.max(over);
        true
    }

    /// Number of samples currently held.
    pub fn samples(&self) -> usize {
        self.recent.len()
    }

    pub fn average(&self) -> Duration {
        match self.recent.len() {
            0 => Duration::ZERO,
            n => self.recent.iter().sum::<Duration>() / n as u32,
        }
    }

    pub fn max(&self) -> Duration {
        self.recent.iter().copied().max().unwrap_or_default()
    }

    pub fn min(&self) -> Duration {
        self.recent.iter().copied().min().unwrap_or_default()
    }

    /// Over-budget ticks since creation, not just within the window.
    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    /// Largest amount any tick went past the budget.
    pub fn worst_overrun(&self) -> Duration {
        self.worst_overrun
    }

    /// Share of the held samples that went over budget.
    pub fn overrun_ratio(&self) -> f32 {
        if self.recent.is_empty() {
            return 0.0;
        }
        let over = self.recent.iter().filter(|&&dt| dt > self.budget).count();
        over as f32 / self.recent.len() as f32
    }
}
