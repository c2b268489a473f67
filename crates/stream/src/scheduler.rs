use std::time::{Duration, Instant};

use glam::Vec3;
use mazeworld_common::{ConfigError, GridPos, SeedAuthority, WorldGenConfig, WorldSeed};
use mazeworld_kernel::Xorshift;

use crate::budget::{TickStats, TickTimer};
use crate::sink::GeometrySink;
use crate::window::StreamingGrid;

const TIMER_WINDOW: usize = 120;
/// Default share of a host frame the streaming work may take.
const DEFAULT_TICK_BUDGET: Duration = Duration::from_millis(2);

/// Drives the streaming grid once per host frame.
///
/// Owns the process-wide PRNG shared by every slot and records per-tick
/// instrumentation. Everything runs on the caller's thread.
#[derive(Debug)]
pub struct Scheduler {
    rng: Xorshift,
    grid: StreamingGrid,
    timer: TickTimer,
    last: TickStats,
    ticks: u64,
}

impl Scheduler {
    /// A replica that waits for the authority's seed via [`Self::receive_seed`].
    pub fn new(config: WorldGenConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            rng: Xorshift::default(),
            grid: StreamingGrid::new(config)?,
            timer: TickTimer::new(TIMER_WINDOW, DEFAULT_TICK_BUDGET),
            last: TickStats::default(),
            ticks: 0,
        })
    }

    /// The seed-owning peer: resolves the world seed itself and is ready to
    /// generate on its first tick.
    pub fn authority(config: WorldGenConfig) -> Result<Self, ConfigError> {
        let seed = SeedAuthority::resolve(&config);
        let mut scheduler = Self::new(config)?;
        scheduler.receive_seed(seed);
        Ok(scheduler)
    }

    pub fn receive_seed(&mut self, seed: WorldSeed) {
        self.grid.receive_seed(seed);
    }

    /// Run one tick for an observer at `position` in world space.
    pub fn tick_world(&mut self, position: Vec3, sink: &mut impl GeometrySink) -> &TickStats {
        let observer = GridPos::from_world(position, self.grid.config().tile_size);
        self.tick(observer, sink)
    }

    /// Run one tick: reposition the window, admit slots and advance every
    /// busy pipeline by one bounded batch.
    pub fn tick(&mut self, observer: GridPos, sink: &mut impl GeometrySink) -> &TickStats {
        let span = tracing::info_span!("stream_tick", tick = self.ticks);
        let _enter = span.enter();

        let start = Instant::now();
        let mut stats = self.grid.tick(observer, &mut self.rng, sink);
        stats.tick_time = start.elapsed();
        stats.over_budget = self.timer.record(stats.tick_time);
        self.ticks += 1;

        if stats.over_budget {
            tracing::debug!(
                elapsed = ?stats.tick_time,
                budget = ?self.timer.budget(),
                busy = stats.busy_slots,
                "tick over budget"
            );
        }

        if stats.slots_finished > 0 || stats.reseated {
            tracing::debug!(
                started = stats.slots_started,
                finished = stats.slots_finished,
                relabelled = stats.slots_relabelled,
                busy = stats.busy_slots,
                "tick"
            );
        }
        self.last = stats;
        &self.last
    }

    pub fn grid(&self) -> &StreamingGrid {
        &self.grid
    }

    pub fn last_stats(&self) -> &TickStats {
        &self.last
    }

    pub fn timer(&self) -> &TickTimer {
        &self.timer
    }

    /// Time slice a tick should stay within; overruns are counted, not
    /// prevented.
    pub fn set_tick_budget(&mut self, budget: Duration) {
        self.timer.set_budget(budget);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
