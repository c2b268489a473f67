//! The sliding window of tile slots around the observer.
//!
//! The window is an `N×N` arena of slots whose coordinates are relabelled as
//! the observer walks ("treadmill"): when the observer crosses onto an even
//! coordinate, the two trailing columns or rows become the two leading ones.
//! Triggering only on even coordinates keeps an observer pacing back and
//! forth across one border from regenerating tiles each crossing.

use std::collections::HashSet;

use mazeworld_common::{ConfigError, GridPos, TileCoord, WorldGenConfig, WorldSeed};
use mazeworld_kernel::Xorshift;

use crate::budget::TickStats;
use crate::sink::GeometrySink;
use crate::slot::{SlotState, TileSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Fixed-size window of tile pipelines over the infinite tile plane.
#[derive(Debug)]
pub struct StreamingGrid {
    config: WorldGenConfig,
    slots: Vec<TileSlot>,
    world_seed: Option<WorldSeed>,
    ready: bool,
    observer: GridPos,
    prev_observer: GridPos,
    /// Even coordinate per axis the window is currently centred on.
    anchor: GridPos,
}

impl StreamingGrid {
    pub fn new(config: WorldGenConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let slots = (0..config.slot_count())
            .map(|_| TileSlot::new(&config))
            .collect();
        Ok(Self {
            config,
            slots,
            world_seed: None,
            ready: false,
            observer: GridPos::default(),
            prev_observer: GridPos::default(),
            anchor: GridPos::default(),
        })
    }

    pub fn config(&self) -> &WorldGenConfig {
        &self.config
    }

    /// Accept the distributed world seed. The first value wins; a differing
    /// later value is ignored, since tiles may already have been generated.
    pub fn receive_seed(&mut self, seed: WorldSeed) {
        match self.world_seed {
            None => {
                tracing::info!(%seed, "world seed received");
                self.world_seed = Some(seed);
            }
            Some(current) if current != seed => {
                tracing::warn!(%current, ignored = %seed, "conflicting world seed ignored");
            }
            Some(_) => {}
        }
    }

    pub fn world_seed(&self) -> Option<WorldSeed> {
        self.world_seed
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn observer(&self) -> GridPos {
        self.observer
    }

    pub fn window_size(&self) -> usize {
        self.config.window_size
    }

    pub fn slots(&self) -> &[TileSlot] {
        &self.slots
    }

    /// Coordinates of all labelled slots, in arena order.
    pub fn slot_coords(&self) -> Vec<TileCoord> {
        self.slots.iter().filter_map(TileSlot::coord).collect()
    }

    pub fn slot_at(&self, coord: TileCoord) -> Option<&TileSlot> {
        self.slots.iter().find(|s| s.coord() == Some(coord))
    }

    /// Lowest corner of the window, once seated.
    pub fn min_corner(&self) -> Option<TileCoord> {
        let coords = self.slot_coords();
        let x = coords.iter().map(|c| c.x).min()?;
        let y = coords.iter().map(|c| c.y).min()?;
        Some(TileCoord::new(x, y))
    }

    pub fn busy_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.state().is_busy()).count()
    }

    /// Ready once the seed is known and every slot's generator and sub-mesh
    /// storage were built for the current configuration.
    fn check_ready(&self) -> bool {
        if self.world_seed.is_none() {
            return false;
        }
        let misconfigured = self.slots.iter().position(|s| {
            s.maze().grid().size() != self.config.maze_size
                || s.sub_meshes().len() != self.config.sub_mesh_count()
        });
        if let Some(index) = misconfigured {
            tracing::warn!(index, "slot storage does not match the config, not ready");
            return false;
        }
        self.slots.len() == self.config.slot_count()
    }

    /// Advance the window by one tick for the given observer position.
    pub fn tick(
        &mut self,
        observer: GridPos,
        rng: &mut Xorshift,
        sink: &mut impl GeometrySink,
    ) -> TickStats {
        let mut stats = TickStats::default();
        self.prev_observer = self.observer;
        self.observer = observer;

        let Some(world_seed) = self.world_seed else {
            return stats;
        };
        if !self.ready {
            if !self.check_ready() {
                return stats;
            }
            self.ready = true;
            tracing::info!(observer = ?self.observer, "streaming grid ready");
            stats.slots_relabelled += self.reseat(sink);
            stats.reseated = true;
        } else {
            self.update_positions(sink, &mut stats);
        }

        self.advance_slots(world_seed, rng, sink, &mut stats);
        stats.busy_slots = self.busy_slots();
        stats
    }

    /// Relabel slots for the observer's latest move.
    fn update_positions(&mut self, sink: &mut impl GeometrySink, stats: &mut TickStats) {
        let (cur, prev) = (self.observer, self.prev_observer);
        if cur == prev {
            return;
        }
        if cur.x.abs_diff(prev.x) > 1 || cur.y.abs_diff(prev.y) > 1 {
            tracing::info!(from = ?prev, to = ?cur, "observer teleported, re-seating window");
            stats.slots_relabelled += self.reseat(sink);
            stats.reseated = true;
            return;
        }

        let mut shifted = false;
        if cur.x != prev.x && cur.x % 2 == 0 {
            stats.slots_relabelled += self.shift(Axis::X, cur.x > prev.x, sink);
            shifted = true;
        }
        if cur.y != prev.y && cur.y % 2 == 0 {
            stats.slots_relabelled += self.shift(Axis::Y, cur.y > prev.y, sink);
            shifted = true;
        }

        let broken = shifted && !self.is_rectangular();
        debug_assert!(!broken, "window lost rectangularity moving {prev:?} -> {cur:?}");
        if broken {
            tracing::error!(from = ?prev, to = ?cur, "window lost rectangularity, re-seating");
            stats.slots_relabelled += self.reseat(sink);
            stats.reseated = true;
        }
    }

    /// Place every slot at its canonical position around the observer's
    /// even-rounded coordinate and reset it.
    fn reseat(&mut self, sink: &mut impl GeometrySink) -> usize {
        let n = self.config.window_size;
        let half = (n / 2) as i32;
        let centre = self.observer.to_even();
        self.anchor = centre;
        for (k, slot) in self.slots.iter_mut().enumerate() {
            let (i, j) = ((k / n) as i32, (k % n) as i32);
            let coord = TileCoord::new(i + centre.x - half, j + centre.y - half);
            if let Some(old) = slot.relabel(coord) {
                sink.clear_tile(old);
            }
        }
        self.slots.len()
    }

    /// Move the two trailing lines of slots on `axis` to the leading edge.
    fn shift(&mut self, axis: Axis, positive: bool, sink: &mut impl GeometrySink) -> usize {
        let n = self.config.window_size as i32;
        let half = n / 2;
        let (p, cross_anchor) = match axis {
            Axis::X => (self.observer.x, self.anchor.y),
            Axis::Y => (self.observer.y, self.anchor.x),
        };
        let (mut lead, cutoff) = if positive {
            (p + half - 2, p - half)
        } else {
            (p - half, p + half - 1)
        };
        let cross_start = cross_anchor - half;
        let mut cross = cross_start;
        let mut moved = 0;

        for slot in &mut self.slots {
            let Some(coord) = slot.coord() else {
                continue;
            };
            let along = match axis {
                Axis::X => coord.x,
                Axis::Y => coord.y,
            };
            let trailing = if positive { along < cutoff } else { along > cutoff };
            if !trailing {
                continue;
            }
            let target = match axis {
                Axis::X => TileCoord::new(lead, cross),
                Axis::Y => TileCoord::new(cross, lead),
            };
            if let Some(old) = slot.relabel(target) {
                sink.clear_tile(old);
            }
            cross += 1;
            if cross == cross_start + n {
                cross = cross_start;
                lead += 1;
            }
            moved += 1;
            if moved == 2 * n as usize {
                break;
            }
        }

        match axis {
            Axis::X => self.anchor.x = p,
            Axis::Y => self.anchor.y = p,
        }
        if moved > 0 {
            tracing::debug!(?axis, positive, moved, observer = ?self.observer, "window shifted");
        }
        moved
    }

    /// True when the slot coordinates form a gapless, duplicate-free `N×N`
    /// square.
    pub fn is_rectangular(&self) -> bool {
        let n = self.config.window_size as i32;
        let coords = self.slot_coords();
        if coords.len() != self.slots.len() {
            return false;
        }
        let Some(min) = self.min_corner() else {
            return false;
        };
        let unique: HashSet<TileCoord> = coords.iter().copied().collect();
        unique.len() == coords.len()
            && coords
                .iter()
                .all(|c| c.x - min.x < n && c.y - min.y < n)
    }

    /// Visibility, admission and one bounded batch per busy slot.
    fn advance_slots(
        &mut self,
        world_seed: WorldSeed,
        rng: &mut Xorshift,
        sink: &mut impl GeometrySink,
        stats: &mut TickStats,
    ) {
        let observer_tile = self.observer.tile();
        let mut busy = self.busy_slots();

        for slot in &mut self.slots {
            let Some(coord) = slot.coord() else {
                continue;
            };
            let near = coord.is_adjacent_or_same(observer_tile);
            slot.set_visible(near);
            slot.mark_pending();

            if slot.state() == SlotState::PendingGeneration
                && near
                && busy < self.config.max_parallel_chunks
            {
                slot.start(rng, world_seed);
                busy += 1;
                stats.slots_started += 1;
            }

            match slot.advance(rng, world_seed, &self.config, sink) {
                Ok(progress) => {
                    stats.maze_steps += progress.maze_steps;
                    stats.sub_meshes_committed += progress.commits;
                    if progress.finished {
                        busy -= 1;
                        stats.slots_finished += 1;
                    }
                }
                Err(err) => {
                    tracing::error!(%coord, %err, "tile build aborted, resetting slot");
                    slot.reset();
                    sink.clear_tile(coord);
                    busy -= 1;
                    stats.slots_failed += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CountingSink;
    use mazeworld_kernel::MazeGenerator;

    fn small_config() -> WorldGenConfig {
        WorldGenConfig {
            maze_size: 16,
            generation_iters: 64,
            build_iters: 4,
            ..WorldGenConfig::default()
        }
    }

    fn ready_grid(config: WorldGenConfig, observer: GridPos) -> (StreamingGrid, Xorshift) {
        let mut grid = StreamingGrid::new(config).unwrap();
        let mut rng = Xorshift::default();
        grid.receive_seed(WorldSeed(523_416_426));
        grid.tick(observer, &mut rng, &mut ());
        assert!(grid.is_ready());
        (grid, rng)
    }

    fn coord_set(grid: &StreamingGrid) -> HashSet<TileCoord> {
        grid.slot_coords().into_iter().collect()
    }

    fn square(x0: i32, y0: i32, n: i32) -> HashSet<TileCoord> {
        (x0..x0 + n)
            .flat_map(|x| (y0..y0 + n).map(move |y| TileCoord::new(x, y)))
            .collect()
    }

    #[test]
    fn waits_for_seed() {
        let mut grid = StreamingGrid::new(small_config()).unwrap();
        let mut rng = Xorshift::default();
        for _ in 0..10 {
            let stats = grid.tick(GridPos::new(0, 0), &mut rng, &mut ());
            assert_eq!(stats, TickStats::default());
        }
        assert!(!grid.is_ready());
        assert!(grid.slot_coords().is_empty());
        assert!(grid.slots().iter().all(|s| s.state() == SlotState::Idle));
    }

    #[test]
    fn first_seat_centres_on_even_observer() {
        let (grid, _) = ready_grid(small_config(), GridPos::new(3, -1));
        // (3, -1) rounds to (2, 0); the window spans -1..=4 by -3..=2.
        assert_eq!(coord_set(&grid), square(-1, -3, 6));
        assert!(grid.is_rectangular());
    }

    #[test]
    fn even_boundary_shift_relabels_two_columns() {
        let (mut grid, mut rng) = ready_grid(small_config(), GridPos::new(0, 0));
        assert_eq!(grid.min_corner(), Some(TileCoord::new(-3, -3)));
        let before = grid.slot_coords();

        let stats = grid.tick(GridPos::new(1, 0), &mut rng, &mut ());
        assert_eq!(stats.slots_relabelled, 0);
        assert_eq!(grid.slot_coords(), before);

        let stats = grid.tick(GridPos::new(2, 0), &mut rng, &mut ());
        assert_eq!(stats.slots_relabelled, 12);
        let after = grid.slot_coords();

        let mut relabelled = 0;
        for (old, new) in before.iter().zip(&after) {
            if old != new {
                relabelled += 1;
                assert!(old.x == -3 || old.x == -2);
                assert!(new.x == 3 || new.x == 4);
            }
        }
        assert_eq!(relabelled, 12);
        assert_eq!(grid.min_corner(), Some(TileCoord::new(-1, -3)));
        assert_eq!(coord_set(&grid), square(-1, -3, 6));
        assert_eq!(coord_set(&grid).len(), 36);
    }

    #[test]
    fn negative_shift_mirrors_positive() {
        let (mut grid, mut rng) = ready_grid(small_config(), GridPos::new(0, 0));
        grid.tick(GridPos::new(0, -1), &mut rng, &mut ());
        let stats = grid.tick(GridPos::new(0, -2), &mut rng, &mut ());
        assert_eq!(stats.slots_relabelled, 12);
        assert_eq!(coord_set(&grid), square(-3, -5, 6));
    }

    #[test]
    fn oscillation_does_not_relabel() {
        let (mut grid, mut rng) = ready_grid(small_config(), GridPos::new(0, 0));
        let before = grid.slot_coords();
        for step in 0..10 {
            let x = if step % 2 == 0 { 1 } else { 0 };
            let stats = grid.tick(GridPos::new(x, 0), &mut rng, &mut ());
            assert_eq!(stats.slots_relabelled, 0);
        }
        assert_eq!(grid.slot_coords(), before);
    }

    #[test]
    fn diagonal_step_shifts_both_axes() {
        let (mut grid, mut rng) = ready_grid(small_config(), GridPos::new(0, 0));
        grid.tick(GridPos::new(1, 1), &mut rng, &mut ());
        let stats = grid.tick(GridPos::new(2, 2), &mut rng, &mut ());
        assert_eq!(stats.slots_relabelled, 24);
        assert_eq!(coord_set(&grid), square(-1, -1, 6));
    }

    #[test]
    fn teleport_reseats_everything() {
        let (mut grid, mut rng) = ready_grid(small_config(), GridPos::new(0, 0));
        let mut sink = CountingSink::default();
        let stats = grid.tick(GridPos::new(10, -7), &mut rng, &mut sink);
        assert!(stats.reseated);
        assert_eq!(stats.slots_relabelled, 36);
        assert_eq!(sink.cleared_tiles, 36);
        assert_eq!(coord_set(&grid), square(7, -9, 6));
    }

    #[test]
    fn admission_respects_parallel_limit_and_adjacency() {
        let config = WorldGenConfig {
            max_parallel_chunks: 2,
            ..small_config()
        };
        let (mut grid, mut rng) = ready_grid(config, GridPos::new(0, 0));
        let observer = TileCoord::new(0, 0);
        for _ in 0..2000 {
            let stats = grid.tick(GridPos::new(0, 0), &mut rng, &mut ());
            assert!(stats.busy_slots <= 2);
            for slot in grid.slots() {
                let coord = slot.coord().unwrap();
                if !coord.is_adjacent_or_same(observer) {
                    assert_eq!(slot.state(), SlotState::PendingGeneration);
                    assert!(!slot.visible());
                }
            }
        }
        let ready = grid
            .slots()
            .iter()
            .filter(|s| s.state() == SlotState::Ready)
            .count();
        assert_eq!(ready, 5);
        assert!(grid.slots().iter().filter(|s| s.visible()).count() == 5);
    }

    #[test]
    fn ready_tiles_stream_geometry_to_sink() {
        let (mut grid, mut rng) = ready_grid(small_config(), GridPos::new(0, 0));
        let mut sink = CountingSink::default();
        for _ in 0..3000 {
            grid.tick(GridPos::new(0, 0), &mut rng, &mut sink);
        }
        assert_eq!(sink.sub_meshes, 5 * 16);
        let faces: usize = grid.slots().iter().map(TileSlot::face_count).sum();
        assert_eq!(sink.faces, faces);
    }

    #[test]
    fn relabelled_ready_tile_is_cleared() {
        let (mut grid, mut rng) = ready_grid(small_config(), GridPos::new(-2, 0));
        let west = TileCoord::new(-3, 0);
        for _ in 0..3000 {
            grid.tick(GridPos::new(-2, 0), &mut rng, &mut ());
        }
        assert_eq!(grid.slot_at(west).unwrap().state(), SlotState::Ready);

        let mut sink = CountingSink::default();
        for x in -1..=2 {
            grid.tick(GridPos::new(x, 0), &mut rng, &mut sink);
        }
        assert!(grid.slot_at(west).is_none());
        assert_eq!(sink.cleared_tiles, 24);
        assert_eq!(coord_set(&grid), square(-1, -3, 6));
    }

    /// Tick at the origin until the origin slot is meshing and `ready_to_break`
    /// holds for it; returns the slot's arena index.
    fn tick_until_meshing(
        grid: &mut StreamingGrid,
        rng: &mut Xorshift,
        sink: &mut CountingSink,
        ready_to_break: impl Fn(&TileSlot) -> bool,
    ) -> usize {
        for _ in 0..2000 {
            let index = grid
                .slots
                .iter()
                .position(|s| s.coord() == Some(TileCoord::ORIGIN))
                .unwrap();
            let slot = &grid.slots[index];
            if slot.state() == SlotState::Meshing && ready_to_break(slot) {
                return index;
            }
            grid.tick(GridPos::new(0, 0), rng, sink);
        }
        panic!("origin slot never reached the meshing stage");
    }

    #[test]
    fn mesh_failure_resets_slot_and_clears_tile() {
        let (mut grid, mut rng) = ready_grid(small_config(), GridPos::new(0, 0));
        let mut sink = CountingSink::default();
        let index = tick_until_meshing(&mut grid, &mut rng, &mut sink, |_| true);

        // A generator of the wrong size makes the mesher reject the grid.
        grid.slots[index].replace_maze(MazeGenerator::new(8));
        let cleared = sink.cleared_tiles;
        let stats = grid.tick(GridPos::new(0, 0), &mut rng, &mut sink);

        assert_eq!(stats.slots_failed, 1);
        assert_eq!(sink.cleared_tiles, cleared + 1);
        assert!(stats.busy_slots <= grid.config().max_parallel_chunks);
        let slot = grid.slot_at(TileCoord::ORIGIN).unwrap();
        assert_eq!(slot.state(), SlotState::Idle);
        assert_eq!(slot.face_count(), 0);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn face_count_violation_rebuilds_tile() {
        use mazeworld_kernel::{TileSeedKey, generate_tile};
        use mazeworld_mesh::{BuildPhase, for_each_cell_face};

        let config = small_config();
        let sub_size = config.sub_mesh_size();
        let partitions = config.sub_mesh_partitions;
        let (mut grid, mut rng) = ready_grid(config, GridPos::new(0, 0));
        let mut sink = CountingSink::default();

        // Wait until a non-empty sub-mesh has been counted but not emitted.
        let index = tick_until_meshing(&mut grid, &mut rng, &mut sink, |slot| {
            let sub = slot.builder().current_sub_mesh();
            let (x0, y0) = ((sub % partitions) * sub_size, (sub / partitions) * sub_size);
            let mut faces = 0;
            for x in x0..x0 + sub_size {
                for y in y0..y0 + sub_size {
                    for_each_cell_face(slot.maze().grid(), x, y, |_| faces += 1);
                }
            }
            slot.builder().phase() == BuildPhase::Emit && faces > 0
        });

        // An empty grid emits fewer faces than were counted.
        grid.slots[index].replace_maze(MazeGenerator::new(16));
        let cleared = sink.cleared_tiles;
        let stats = grid.tick(GridPos::new(0, 0), &mut rng, &mut sink);
        assert_eq!(stats.slots_failed, 1);
        assert_eq!(sink.cleared_tiles, cleared + 1);
        assert_eq!(grid.slot_at(TileCoord::ORIGIN).unwrap().state(), SlotState::Idle);

        for _ in 0..3000 {
            grid.tick(GridPos::new(0, 0), &mut rng, &mut sink);
        }
        let slot = grid.slot_at(TileCoord::ORIGIN).unwrap();
        assert_eq!(slot.state(), SlotState::Ready);
        let key = TileSeedKey::new(TileCoord::ORIGIN, WorldSeed(523_416_426));
        assert_eq!(slot.maze().grid(), generate_tile(16, key, true).grid());
    }

    #[test]
    fn misconfigured_slot_blocks_readiness() {
        let mut grid = StreamingGrid::new(small_config()).unwrap();
        grid.slots[0].replace_maze(MazeGenerator::new(8));
        grid.receive_seed(WorldSeed(4));
        let mut rng = Xorshift::default();
        let stats = grid.tick(GridPos::new(0, 0), &mut rng, &mut ());
        assert!(!grid.is_ready());
        assert!(!stats.reseated);
        assert!(grid.slot_coords().is_empty());
    }

    #[test]
    fn conflicting_seed_is_ignored() {
        let mut grid = StreamingGrid::new(small_config()).unwrap();
        grid.receive_seed(WorldSeed(1));
        grid.receive_seed(WorldSeed(2));
        assert_eq!(grid.world_seed(), Some(WorldSeed(1)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = WorldGenConfig {
            window_size: 3,
            ..WorldGenConfig::default()
        };
        assert!(StreamingGrid::new(config).is_err());
    }
}
