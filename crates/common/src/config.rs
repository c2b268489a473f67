use serde::{Deserialize, Serialize};
use std::path::Path;

/// Generation, meshing and streaming parameters.
///
/// All per-tick budgets are counts of bounded work units: maze stack
/// operations for `generation_iters`, sub-mesh cell columns for
/// `build_iters` (and `init_iters`, which is always four times it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    /// Side of the square wall grid of one tile, in cells.
    pub maze_size: usize,
    /// World-space span of one tile.
    pub tile_size: f32,
    /// Sub-meshes per tile side; a tile holds `partitions²` sub-meshes.
    pub sub_mesh_partitions: usize,
    /// Maximum number of slots generating or meshing at the same time.
    pub max_parallel_chunks: usize,
    /// Maze generator steps per slot per tick.
    pub generation_iters: usize,
    /// Emit-phase columns per slot per tick.
    pub build_iters: usize,
    /// Wall height in world units.
    pub wall_height: f32,
    /// Scales wall slab thickness and connector UVs.
    pub wall_thickness_factor: f32,
    /// Side of the streaming window, in tiles.
    pub window_size: usize,
    pub world_seed: i32,
    /// Ignore `world_seed` on the authority and draw a fresh one.
    pub randomize_seed_on_start: bool,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            maze_size: 64,
            tile_size: 8.0,
            sub_mesh_partitions: 4,
            max_parallel_chunks: 1,
            generation_iters: 8,
            build_iters: 8,
            wall_height: 0.25,
            wall_thickness_factor: 1.0,
            window_size: 6,
            world_seed: 523_416_426,
            randomize_seed_on_start: false,
        }
    }
}

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl WorldGenConfig {
    /// Count-phase columns per slot per tick.
    pub fn init_iters(&self) -> usize {
        self.build_iters * 4
    }

    /// Cells per sub-mesh side.
    pub fn sub_mesh_size(&self) -> usize {
        self.maze_size / self.sub_mesh_partitions
    }

    pub fn sub_mesh_count(&self) -> usize {
        self.sub_mesh_partitions * self.sub_mesh_partitions
    }

    pub fn slot_count(&self) -> usize {
        self.window_size * self.window_size
    }

    /// Load a config file, picking the format from the extension
    /// (`.yaml`/`.yml` or `.json`). The result is validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config: Self = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        config.validate()?;
        tracing::debug!(?path, "loaded world generation config");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject configurations the core cannot run. Tiny mazes are allowed:
    /// they collapse to a single open room.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.maze_size < 2 {
            return Err(invalid("maze_size", "must be at least 2"));
        }
        if self.sub_mesh_partitions == 0 {
            return Err(invalid("sub_mesh_partitions", "must be positive"));
        }
        if self.maze_size % self.sub_mesh_partitions != 0 {
            return Err(invalid(
                "maze_size",
                format!(
                    "{} is not a multiple of sub_mesh_partitions ({})",
                    self.maze_size, self.sub_mesh_partitions
                ),
            ));
        }
        if self.window_size < 4 || self.window_size % 2 != 0 {
            return Err(invalid("window_size", "must be even and at least 4"));
        }
        if self.max_parallel_chunks == 0 {
            return Err(invalid("max_parallel_chunks", "must be positive"));
        }
        if self.generation_iters == 0 {
            return Err(invalid("generation_iters", "must be positive"));
        }
        if self.build_iters == 0 {
            return Err(invalid("build_iters", "must be positive"));
        }
        if !(self.tile_size > 0.0) {
            return Err(invalid("tile_size", "must be positive"));
        }
        if self.wall_height < 0.0 {
            return Err(invalid("wall_height", "must not be negative"));
        }
        if self.wall_thickness_factor < 0.0 {
            return Err(invalid("wall_thickness_factor", "must not be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = WorldGenConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.init_iters(), 32);
        assert_eq!(config.sub_mesh_size(), 16);
        assert_eq!(config.sub_mesh_count(), 16);
        assert_eq!(config.slot_count(), 36);
    }

    #[test]
    fn rejects_odd_window() {
        let config = WorldGenConfig {
            window_size: 5,
            ..WorldGenConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "window_size",
                ..
            })
        ));
    }

    #[test]
    fn rejects_uneven_partition() {
        let config = WorldGenConfig {
            maze_size: 30,
            ..WorldGenConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn tiny_maze_is_accepted() {
        let config = WorldGenConfig {
            maze_size: 4,
            ..WorldGenConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn yaml_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.yaml");
        let config = WorldGenConfig {
            window_size: 8,
            world_seed: -77,
            ..WorldGenConfig::default()
        };
        std::fs::write(&path, config.to_yaml().unwrap()).unwrap();

        let loaded = WorldGenConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.json");
        std::fs::write(&path, r#"{ "max_parallel_chunks": 3 }"#).unwrap();

        let loaded = WorldGenConfig::load(&path).unwrap();
        assert_eq!(loaded.max_parallel_chunks, 3);
        assert_eq!(loaded.maze_size, 64);
    }

    #[test]
    fn unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.toml");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(
            WorldGenConfig::load(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
