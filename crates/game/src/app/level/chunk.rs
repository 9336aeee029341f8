use engine::{DrawSurface, Vec2};
use rand::Rng;

use super::entities::{Coin, Rect, Tile};
use super::particles::{Firefly, Particle, ParticleGroup};
use super::textures::LevelTextures;
use super::tile_map::{MapError, TileMap};
use super::Layer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ChunkKey {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl ChunkKey {
    pub(crate) const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk containing the world pixel `(x, y)`.
    pub(crate) fn containing(x: i32, y: i32, resolution: i32) -> Self {
        Self::new(x.div_euclid(resolution), y.div_euclid(resolution))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChunkGeometry {
    pub(crate) tile_size: u32,
    pub(crate) chunk_size: u32,
    /// `A` tiles spawn a firefly with probability `1 / firefly_one_in`; 0 never.
    pub(crate) firefly_one_in: u32,
}

/// One streamed block of the world. Each layer slot is `None` until the
/// block actually contains something for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Chunk {
    background: Option<Vec<Tile>>,
    solid: Option<Vec<Tile>>,
    coins: Option<Vec<Coin>>,
    effects: Option<ParticleGroup>,
    fireflies: Option<ParticleGroup>,
}

impl Chunk {
    pub(crate) fn decode<R: Rng + ?Sized>(
        key: ChunkKey,
        map: &TileMap,
        geometry: &ChunkGeometry,
        rng: &mut R,
    ) -> Result<Self, MapError> {
        let (left, top) = map.chunk_block(key, geometry.chunk_size)?;
        let size = geometry.chunk_size as usize;
        let tile_size = geometry.tile_size;
        let mut chunk = Chunk::default();

        for column in left..left + size {
            for row in top..top + size {
                let Some(symbol) = map.char_at(column, row) else {
                    continue;
                };
                let tile_pos = Vec2::new(
                    (column as u32 * tile_size) as f32,
                    (row as u32 * tile_size) as f32,
                );
                match symbol {
                    'D' => chunk
                        .background
                        .get_or_insert_with(Vec::new)
                        .push(Tile::new(tile_pos, tile_size)),
                    'G' => chunk
                        .solid
                        .get_or_insert_with(Vec::new)
                        .push(Tile::new(tile_pos, tile_size)),
                    'C' => chunk
                        .coins
                        .get_or_insert_with(Vec::new)
                        .push(Coin::new(tile_pos, tile_size)),
                    'A' if geometry.firefly_one_in > 0
                        && rng.random_ratio(1, geometry.firefly_one_in) =>
                    {
                        chunk
                            .fireflies
                            .get_or_insert_with(ParticleGroup::fireflies)
                            .add(Particle::Firefly(Firefly::new(tile_pos)));
                    }
                    _ => {}
                }
            }
        }

        Ok(chunk)
    }

    pub(crate) fn has_layer(&self, layer: Layer) -> bool {
        match layer {
            Layer::Background => self.background.is_some(),
            Layer::Solid => self.solid.is_some(),
            Layer::Coins => self.coins.is_some(),
            Layer::Effects => self.effects.is_some(),
            Layer::Fireflies => self.fireflies.is_some(),
        }
    }

    pub(crate) fn background_tiles(&self) -> &[Tile] {
        self.background.as_deref().unwrap_or_default()
    }

    pub(crate) fn solid_tiles(&self) -> &[Tile] {
        self.solid.as_deref().unwrap_or_default()
    }

    pub(crate) fn coins(&self) -> &[Coin] {
        self.coins.as_deref().unwrap_or_default()
    }

    pub(crate) fn effects(&self) -> Option<&ParticleGroup> {
        self.effects.as_ref()
    }

    pub(crate) fn fireflies(&self) -> Option<&ParticleGroup> {
        self.fireflies.as_ref()
    }

    /// The effects group, created on first emission.
    pub(crate) fn effects_mut(&mut self) -> &mut ParticleGroup {
        self.effects.get_or_insert_with(ParticleGroup::bursts)
    }

    /// Removes and returns every coin overlapping `rect`.
    pub(crate) fn take_coins_overlapping(&mut self, rect: &Rect) -> Vec<Coin> {
        let Some(coins) = self.coins.as_mut() else {
            return Vec::new();
        };
        let mut taken = Vec::new();
        let mut index = 0;
        while index < coins.len() {
            if coins[index].rect().overlaps(rect) {
                taken.push(coins.remove(index));
            } else {
                index += 1;
            }
        }
        taken
    }

    pub(crate) fn update<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for layer in Layer::ANIMATED {
            match layer {
                Layer::Coins => {
                    for coin in self.coins.iter_mut().flatten() {
                        coin.update();
                    }
                }
                Layer::Effects => {
                    if let Some(group) = self.effects.as_mut() {
                        group.update(rng);
                    }
                }
                Layer::Fireflies => {
                    if let Some(group) = self.fireflies.as_mut() {
                        group.update(rng);
                    }
                }
                Layer::Background | Layer::Solid => {}
            }
        }
    }

    pub(crate) fn draw_layer(
        &self,
        layer: Layer,
        surface: &mut dyn DrawSurface,
        scroll: Vec2,
        textures: &LevelTextures,
    ) {
        match layer {
            Layer::Background => {
                for tile in self.background_tiles() {
                    tile.draw(surface, scroll, &textures.dirt);
                }
            }
            Layer::Solid => {
                for tile in self.solid_tiles() {
                    tile.draw(surface, scroll, &textures.grass);
                }
            }
            Layer::Coins => {
                for coin in self.coins() {
                    coin.draw(surface, scroll, &textures.coins);
                }
            }
            Layer::Effects => {
                if let Some(group) = &self.effects {
                    group.draw(surface, scroll);
                }
            }
            Layer::Fireflies => {
                if let Some(group) = &self.fireflies {
                    group.draw(surface, scroll);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const GEOMETRY: ChunkGeometry = ChunkGeometry {
        tile_size: 64,
        chunk_size: 2,
        firefly_one_in: 100,
    };

    fn map(rows: &[&str]) -> TileMap {
        TileMap::parse(&rows.join("\n")).expect("map")
    }

    #[test]
    fn decode_places_symbols_on_their_layers() {
        let map = map(&["....", "..DG", "..C.", "...."]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let chunk = Chunk::decode(ChunkKey::new(1, 0), &map, &GEOMETRY, &mut rng).expect("chunk");
        assert!(chunk.has_layer(Layer::Background));
        assert!(chunk.has_layer(Layer::Solid));
        assert!(!chunk.has_layer(Layer::Coins));
        assert_eq!(
            chunk.background_tiles()[0].rect(),
            Rect::new(128.0, 64.0, 64.0, 64.0)
        );
        assert_eq!(
            chunk.solid_tiles()[0].rect(),
            Rect::new(192.0, 64.0, 64.0, 64.0)
        );

        let below = Chunk::decode(ChunkKey::new(1, 1), &map, &GEOMETRY, &mut rng).expect("chunk");
        assert_eq!(below.coins().len(), 1);
        assert_eq!(below.coins()[0].pos(), Vec2::new(160.0, 160.0));
        assert!(!below.has_layer(Layer::Solid));
        assert!(!below.has_layer(Layer::Effects));
    }

    #[test]
    fn empty_chunk_has_no_layers() {
        let map = map(&["..", ".."]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let chunk = Chunk::decode(ChunkKey::new(0, 0), &map, &GEOMETRY, &mut rng).expect("chunk");
        assert!(Layer::ALL.iter().all(|layer| !chunk.has_layer(*layer)));
    }

    #[test]
    fn decode_rejects_chunk_outside_map() {
        let map = map(&["..", ".."]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let error = Chunk::decode(ChunkKey::new(1, 0), &map, &GEOMETRY, &mut rng)
            .expect_err("out of bounds");
        assert!(matches!(error, MapError::ChunkOutOfBounds { chunk_x: 1, .. }));
    }

    #[test]
    fn redecoding_reproduces_tiles_and_coins() {
        let map = map(&["GDCA", "ACDG", "GGCC", "AAAA"]);
        let first = Chunk::decode(
            ChunkKey::new(1, 1),
            &map,
            &GEOMETRY,
            &mut ChaCha8Rng::seed_from_u64(5),
        )
        .expect("first");
        let second = Chunk::decode(
            ChunkKey::new(1, 1),
            &map,
            &GEOMETRY,
            &mut ChaCha8Rng::seed_from_u64(99),
        )
        .expect("second");

        assert_eq!(first.background_tiles(), second.background_tiles());
        assert_eq!(first.solid_tiles(), second.solid_tiles());
        assert_eq!(first.coins(), second.coins());
    }

    #[test]
    fn firefly_density_is_about_one_in_a_hundred() {
        let geometry = ChunkGeometry {
            chunk_size: 100,
            ..GEOMETRY
        };
        let map = TileMap::parse(&format!("{}\n", "A".repeat(100)).repeat(100)).expect("map");
        let mut rng = ChaCha8Rng::seed_from_u64(2024);

        let mut total = 0;
        for _ in 0..5 {
            let chunk = Chunk::decode(ChunkKey::new(0, 0), &map, &geometry, &mut rng).expect("chunk");
            total += chunk.fireflies().map_or(0, ParticleGroup::len);
        }
        // 50_000 tiles at p = 0.01: mean 500, sd ~22.
        assert!((400..=600).contains(&total), "{total}");
    }

    #[test]
    fn fireflies_spawn_on_their_own_tile() {
        let geometry = ChunkGeometry {
            firefly_one_in: 1,
            ..GEOMETRY
        };
        let map = map(&["....", "...A", "....", "...."]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let chunk = Chunk::decode(ChunkKey::new(1, 0), &map, &geometry, &mut rng).expect("chunk");

        let fireflies = chunk.fireflies().expect("firefly layer");
        let positions: Vec<Vec2> = fireflies.iter().map(Particle::pos).collect();
        assert_eq!(positions, vec![Vec2::new(192.0, 64.0)]);
    }

    #[test]
    fn disabled_fireflies_never_spawn() {
        let geometry = ChunkGeometry {
            firefly_one_in: 0,
            ..GEOMETRY
        };
        let map = map(&["AA", "AA"]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let chunk = Chunk::decode(ChunkKey::new(0, 0), &map, &geometry, &mut rng).expect("chunk");
        assert!(!chunk.has_layer(Layer::Fireflies));
    }

    #[test]
    fn take_coins_removes_only_overlapping_coins() {
        let map = map(&["CC", ".."]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut chunk = Chunk::decode(ChunkKey::new(0, 0), &map, &GEOMETRY, &mut rng).expect("chunk");

        let taken = chunk.take_coins_overlapping(&Rect::new(0.0, 0.0, 40.0, 40.0));
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].pos(), Vec2::new(32.0, 32.0));
        assert_eq!(chunk.coins().len(), 1);
        assert!(chunk.has_layer(Layer::Coins));
    }

    #[test]
    fn update_only_touches_animated_layers() {
        let map = map(&["CG", "D."]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut chunk = Chunk::decode(ChunkKey::new(0, 0), &map, &GEOMETRY, &mut rng).expect("chunk");
        let tiles_before = chunk.solid_tiles().to_vec();
        let coin_before = chunk.coins()[0].pos();

        chunk.update(&mut rng);

        assert_eq!(chunk.solid_tiles(), tiles_before.as_slice());
        assert_ne!(chunk.coins()[0].pos(), coin_before);
    }

    #[test]
    fn key_for_negative_pixels_rounds_down() {
        assert_eq!(ChunkKey::containing(-1, 511, 512), ChunkKey::new(-1, 0));
        assert_eq!(ChunkKey::containing(512, -513, 512), ChunkKey::new(1, -2));
    }
}
