use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use engine::LoopConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub(crate) const CONFIG_ENV_VAR: &str = "PLATFORMER_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) window: LoopConfig,
    pub(crate) world: WorldConfig,
    pub(crate) player: PlayerTuning,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WorldConfig {
    /// Relative to the assets directory.
    pub(crate) map_path: PathBuf,
    pub(crate) tile_size: u32,
    /// Tiles per chunk edge.
    pub(crate) chunk_size: u32,
    pub(crate) start_scroll: [f32; 2],
    /// Camera smoothing divisor per axis; 1 snaps the camera onto the player.
    pub(crate) scroll_delay: [f32; 2],
    /// An `A` tile spawns a firefly with probability `1 / firefly_one_in`. 0 disables them.
    pub(crate) firefly_one_in: u32,
    pub(crate) seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            map_path: PathBuf::from("maps/level.txt"),
            tile_size: 64,
            chunk_size: 8,
            start_scroll: [1300.0, 1500.0],
            scroll_delay: [32.0, 24.0],
            firefly_one_in: 100,
            seed: None,
        }
    }
}

impl WorldConfig {
    pub(crate) fn chunk_resolution(&self) -> i32 {
        (self.tile_size * self.chunk_size) as i32
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct PlayerTuning {
    pub(crate) gravity: f32,
    pub(crate) friction: f32,
    pub(crate) air_resistance: [f32; 2],
    pub(crate) acceleration: [f32; 2],
    /// Vertical velocity applied by a jump; negative is up.
    pub(crate) jump_impulse: f32,
    pub(crate) jump_buffer_ticks: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            gravity: 1.0,
            friction: 1.0,
            air_resistance: [100.0, 300.0],
            acceleration: [2.0, 1.0],
            jump_impulse: -28.0,
            jump_buffer_ticks: 2,
            width: 64,
            height: 64,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config '{path}' at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Reads the config named by `PLATFORMER_CONFIG`, falling back to
/// `<assets>/config.json`. Only the fallback file may be absent.
pub(crate) fn load_config(assets_dir: &Path) -> Result<GameConfig, ConfigError> {
    let config = match env::var_os(CONFIG_ENV_VAR) {
        Some(path) => read_config_file(Path::new(&path))?,
        None => {
            let path = assets_dir.join(DEFAULT_CONFIG_FILE);
            if path.is_file() {
                read_config_file(&path)?
            } else {
                info!(path = %path.display(), "config_defaults_used");
                GameConfig::default()
            }
        }
    };
    validate_config(&config)?;
    Ok(config)
}

pub(crate) fn read_config_file(path: &Path) -> Result<GameConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config_json(path, &raw)?;
    info!(path = %path.display(), "config_loaded");
    Ok(config)
}

fn parse_config_json(path: &Path, raw: &str) -> Result<GameConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, GameConfig>(&mut deserializer).map_err(|error| {
        let field = error.path().to_string();
        ConfigError::Parse {
            path: path.to_path_buf(),
            field,
            source: error.into_inner(),
        }
    })
}

pub(crate) fn validate_config(config: &GameConfig) -> Result<(), ConfigError> {
    let world = &config.world;
    let player = &config.player;
    if config.window.window_width == 0 || config.window.window_height == 0 {
        return Err(invalid("window", "width and height must be positive"));
    }
    if world.tile_size == 0 {
        return Err(invalid("world.tile_size", "must be positive"));
    }
    if world.chunk_size == 0 {
        return Err(invalid("world.chunk_size", "must be positive"));
    }
    let resolution = world.tile_size.checked_mul(world.chunk_size);
    if !matches!(resolution, Some(pixels) if pixels <= i32::MAX as u32) {
        return Err(invalid("world.chunk_size", "chunk pixel size overflows"));
    }
    if world.scroll_delay.iter().any(|delay| !(*delay >= 1.0)) {
        return Err(invalid("world.scroll_delay", "each axis must be at least 1"));
    }
    if player.air_resistance.iter().any(|res| !(*res > 0.0)) {
        return Err(invalid("player.air_resistance", "each axis must be positive"));
    }
    if !(player.friction >= 0.0) {
        return Err(invalid("player.friction", "must not be negative"));
    }
    if player.width == 0 || player.height == 0 {
        return Err(invalid("player", "width and height must be positive"));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
