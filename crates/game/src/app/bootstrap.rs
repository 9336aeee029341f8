use engine::{resolve_app_paths, AssetError, LoopConfig, Scene, SpriteCache, StartupError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{load_config, ConfigError};
use super::level::{LevelScene, LevelTextures, MapError, TileMap, World, WorldError};

const TEXTURES_DIR: &str = "textures";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    World(#[from] WorldError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    info!("=== Platformer Startup ===");

    let paths = resolve_app_paths()?;
    let config = load_config(&paths.assets_dir)?;

    let map_path = paths.assets_dir.join(&config.world.map_path);
    let map = TileMap::load(&map_path)?;

    let mut sprites = SpriteCache::new(paths.assets_dir.join(TEXTURES_DIR));
    let textures = LevelTextures::load(&mut sprites)?;

    let seed = config.world.seed.unwrap_or_else(rand::random);
    let world = World::new(
        map,
        &config.world,
        config.player.clone(),
        (config.window.window_width, config.window.window_height),
        ChaCha8Rng::seed_from_u64(seed),
    )?;

    info!(
        root = %paths.root.display(),
        map = %map_path.display(),
        seed,
        loaded_chunks = world.loaded_chunk_count(),
        "startup_ready"
    );

    Ok(AppWiring {
        config: config.window,
        scene: Box::new(LevelScene::new(world, textures)),
    })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
