use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use mazeworld_common::{TileCoord, WorldGenConfig, WorldSeed};
use mazeworld_kernel::{TileSeedKey, generate_tile};
use mazeworld_mesh::count_tile_faces;
use mazeworld_stream::{CountingSink, Scheduler};
use mazeworld_tools::{MazeInspector, WindowInspector};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mazeworld-cli", about = "CLI tool for the streamed maze world")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// World generation config (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective configuration summary
    Info,
    /// Generate a single tile and print it
    Maze {
        /// Tile X coordinate
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        x: i32,
        /// Tile Y coordinate
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        y: i32,
        /// World seed; defaults to the configured seed
        #[arg(short, long, allow_hyphen_values = true)]
        seed: Option<i32>,
        /// Carve the spawn room even when the tile is not the origin
        #[arg(long)]
        spawn_room: bool,
        /// Write a PGM image instead of printing ASCII
        #[arg(long)]
        pgm: Option<PathBuf>,
    },
    /// Simulate an observer walking through the streamed world
    Walk {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "2000")]
        ticks: u64,
        /// Tiles moved along X per step
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        dx: i32,
        /// Tiles moved along Y per step
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        dy: i32,
        /// Ticks between observer steps
        #[arg(short, long, default_value = "200")]
        every: u64,
    },
    /// Print the effective configuration as YAML
    Config,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<WorldGenConfig> {
    match path {
        Some(path) => {
            let config = WorldGenConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?;
            tracing::info!(path = %path.display(), "loaded config");
            Ok(config)
        }
        None => Ok(WorldGenConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("mazeworld-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "tile: {0}x{0} cells, {1} units, {2} sub-meshes of {3}x{3}",
                config.maze_size,
                config.tile_size,
                config.sub_mesh_count(),
                config.sub_mesh_size()
            );
            println!(
                "window: {0}x{0} slots, {1} parallel, seed {2}{3}",
                config.window_size,
                config.max_parallel_chunks,
                config.world_seed,
                if config.randomize_seed_on_start { " (randomized)" } else { "" }
            );
            println!(
                "budgets: generation={} build={} init={}",
                config.generation_iters,
                config.build_iters,
                config.init_iters()
            );
        }
        Commands::Maze {
            x,
            y,
            seed,
            spawn_room,
            pgm,
        } => {
            let tile = TileCoord::new(x, y);
            let seed = WorldSeed(seed.unwrap_or(config.world_seed));
            let key = TileSeedKey::new(tile, seed);
            let maze = generate_tile(config.maze_size, key, spawn_room || tile == TileCoord::ORIGIN);
            let faces = count_tile_faces(maze.grid());

            match pgm {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    let mut out = BufWriter::new(file);
                    MazeInspector::write_pgm(maze.grid(), &mut out)?;
                    out.flush()?;
                    println!("wrote {}", path.display());
                }
                None => print!("{}", MazeInspector::ascii(maze.grid())),
            }
            println!("tile {tile} seed {seed}: {}", MazeInspector::summary(&maze));
            println!("faces: {faces}");
        }
        Commands::Walk {
            ticks,
            dx,
            dy,
            every,
        } => {
            let tile_size = config.tile_size;
            let mut scheduler = Scheduler::authority(config)?;
            let mut sink = CountingSink::default();
            let step = Vec3::new(dx as f32 * tile_size, 0.0, dy as f32 * tile_size);
            let mut position = Vec3::ZERO;

            for tick in 0..ticks {
                if tick > 0 && every > 0 && tick % every == 0 {
                    position += step;
                }
                scheduler.tick_world(position, &mut sink);
            }

            let timer = scheduler.timer();
            let observer = scheduler.grid().observer().tile();
            println!("{}", WindowInspector::summary(scheduler.grid()));
            println!(
                "observer tile {observer} centred at world {}",
                observer.world_origin(tile_size)
            );
            println!(
                "sink: sub_meshes={} faces={} cleared_tiles={}",
                sink.sub_meshes, sink.faces, sink.cleared_tiles
            );
            println!(
                "ticks={} avg={:?} min={:?} max={:?} over_budget={} (worst +{:?} past {:?})",
                scheduler.ticks(),
                timer.average(),
                timer.min(),
                timer.max(),
                timer.overruns(),
                timer.worst_overrun(),
                timer.budget()
            );
        }
        Commands::Config => {
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}
