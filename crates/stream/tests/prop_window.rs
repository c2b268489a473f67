use std::collections::HashSet;

use mazeworld_common::{GridPos, TileCoord, WorldGenConfig, WorldSeed};
use mazeworld_stream::Scheduler;
use proptest::prelude::*;

fn step() -> impl Strategy<Value = (i32, i32)> {
    (-1i32..=1, -1i32..=1)
}

fn config(window_size: usize) -> WorldGenConfig {
    WorldGenConfig {
        maze_size: 8,
        sub_mesh_partitions: 2,
        window_size,
        ..WorldGenConfig::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // unit-step walks keep the window a gapless square containing the observer
    #[test]
    fn walk_keeps_window_square(
        start in (-50i32..=50, -50i32..=50),
        steps in prop::collection::vec(step(), 1..120),
        half in 2usize..=4,
    ) {
        let n = (half * 2) as i32;
        let mut scheduler = Scheduler::new(config(half * 2)).unwrap();
        scheduler.receive_seed(WorldSeed(5));
        let mut pos = GridPos::new(start.0, start.1);
        scheduler.tick(pos, &mut ());

        for (dx, dy) in steps {
            pos = GridPos::new(pos.x + dx, pos.y + dy);
            let stats = scheduler.tick(pos, &mut ());
            prop_assert!(!stats.reseated);
            prop_assert!(stats.slots_relabelled <= 4 * n as usize);

            let grid = scheduler.grid();
            prop_assert!(grid.is_rectangular());
            let coords: HashSet<TileCoord> = grid.slot_coords().into_iter().collect();
            prop_assert_eq!(coords.len(), (n * n) as usize);
            prop_assert!(coords.contains(&pos.tile()));
            let min = grid.min_corner().unwrap();
            // The observer trails the leading edge by at most one cell.
            prop_assert!(pos.x - min.x >= 1 && pos.y - min.y >= 1);
        }
    }

    // a jump of more than one cell re-seats around the even-rounded observer
    #[test]
    fn teleport_reseats(
        to in (-1000i32..=1000, -1000i32..=1000),
    ) {
        prop_assume!(to.0.abs() > 1 || to.1.abs() > 1);
        let mut scheduler = Scheduler::new(config(6)).unwrap();
        scheduler.receive_seed(WorldSeed(5));
        scheduler.tick(GridPos::default(), &mut ());

        let target = GridPos::new(to.0, to.1);
        let stats = scheduler.tick(target, &mut ()).clone();
        prop_assert!(stats.reseated);
        let centre = target.to_even();
        prop_assert_eq!(
            scheduler.grid().min_corner(),
            Some(TileCoord::new(centre.x - 3, centre.y - 3))
        );
    }
}
