use std::sync::Arc;

use engine::{AssetError, Sprite, SpriteCache, SpriteLoad};

/// Source art is authored at 16 px per tile.
pub(crate) const TEXTURE_SCALE: u32 = 4;

const DIRT_KEY: &str = "dirt";
const GRASS_KEY: &str = "grass_block_side";
const PLAYER_KEY: &str = "bricks";
const COIN_SHEET_KEY: &str = "coins";

/// Every texture the level draws, decoded once at startup and shared by all
/// entity instances.
#[derive(Debug, Clone)]
pub(crate) struct LevelTextures {
    pub(crate) dirt: Arc<Sprite>,
    pub(crate) grass: Arc<Sprite>,
    pub(crate) player: Arc<Sprite>,
    pub(crate) coins: Arc<Sprite>,
}

impl LevelTextures {
    pub(crate) fn load(cache: &mut SpriteCache) -> Result<Self, AssetError> {
        let opaque = SpriteLoad {
            scale: TEXTURE_SCALE,
            color_key: None,
        };
        let keyed = SpriteLoad {
            scale: TEXTURE_SCALE,
            color_key: Some([0, 0, 0]),
        };
        Ok(Self {
            dirt: cache.load(DIRT_KEY, opaque)?,
            grass: cache.load(GRASS_KEY, opaque)?,
            player: cache.load(PLAYER_KEY, opaque)?,
            coins: cache.load(COIN_SHEET_KEY, keyed)?,
        })
    }
}
