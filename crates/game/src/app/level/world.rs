use std::collections::{BTreeMap, BTreeSet};

use engine::{DrawSurface, InputSnapshot, Rgba, Vec2};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, warn};

use crate::app::config::{PlayerTuning, WorldConfig};

use super::chunk::{Chunk, ChunkGeometry, ChunkKey};
use super::entities::Rect;
use super::particles::{dust_angle, CircleBurst, Particle, ParticleGroup};
use super::player::Player;
use super::textures::LevelTextures;
use super::tile_map::{MapError, TileMap};
use super::{DrawStep, Layer, DRAW_ORDER};

const COIN_BURST_PARTICLES: usize = 16;
const DUST_SPEED_THRESHOLD: f32 = 2.0;
const DUST_SKID_THRESHOLD: f32 = 4.0;
const SCORE_POSITION: Vec2 = Vec2::new(200.0, 100.0);
const SCORE_COLOR: Rgba = [127, 127, 127, 255];

#[derive(Debug, Error)]
pub(crate) enum WorldError {
    #[error("chunk streaming failed: {0}")]
    Map(#[from] MapError),
}

/// Streams chunks around the camera, moves the player through them and owns
/// all world-level randomness.
#[derive(Debug)]
pub(crate) struct World {
    map: TileMap,
    geometry: ChunkGeometry,
    chunk_resolution: i32,
    chunks: BTreeMap<ChunkKey, Chunk>,
    player: Player,
    screen_pos: Vec2,
    screen_size: Vec2,
    scroll_delay: Vec2,
    coins: u32,
    rng: ChaCha8Rng,
}

impl World {
    /// Places the player at the centre of the initial view and streams in
    /// every chunk that view touches.
    pub(crate) fn new(
        map: TileMap,
        config: &WorldConfig,
        tuning: PlayerTuning,
        screen_size: (u32, u32),
        rng: ChaCha8Rng,
    ) -> Result<Self, WorldError> {
        let screen_size = Vec2::new(screen_size.0 as f32, screen_size.1 as f32);
        let screen_pos = Vec2::new(config.start_scroll[0], config.start_scroll[1]);
        let player = Player::new(screen_pos + screen_size * 0.5, tuning);
        let mut world = Self {
            map,
            geometry: ChunkGeometry {
                tile_size: config.tile_size,
                chunk_size: config.chunk_size,
                firefly_one_in: config.firefly_one_in,
            },
            chunk_resolution: config.chunk_resolution(),
            chunks: BTreeMap::new(),
            player,
            screen_pos,
            screen_size,
            scroll_delay: Vec2::new(config.scroll_delay[0], config.scroll_delay[1]),
            coins: 0,
            rng,
        };
        world.stream_chunks()?;
        Ok(world)
    }

    pub(crate) fn jump(&mut self) {
        self.player.jump();
    }

    /// One simulation tick: stream, animate, move the player, collect coins.
    pub(crate) fn update(&mut self, input: &InputSnapshot) -> Result<(), WorldError> {
        self.stream_chunks()?;
        for chunk in self.chunks.values_mut() {
            chunk.update(&mut self.rng);
        }
        self.player.update(input);
        self.move_player_x();
        self.move_player_y();
        self.collect_coins();
        Ok(())
    }

    pub(crate) fn draw(&self, surface: &mut dyn DrawSurface, textures: &LevelTextures) {
        for step in DRAW_ORDER {
            match step {
                DrawStep::Layer(layer) => {
                    for chunk in self.chunks.values().filter(|chunk| chunk.has_layer(layer)) {
                        chunk.draw_layer(layer, surface, self.screen_pos, textures);
                    }
                }
                DrawStep::Player => self.player.draw(surface, self.screen_pos, &textures.player),
            }
        }
        surface.text_centered(&format!("coins: {}", self.coins), SCORE_POSITION, SCORE_COLOR);
    }

    pub(crate) fn coins(&self) -> u32 {
        self.coins
    }

    pub(crate) fn screen_pos(&self) -> Vec2 {
        self.screen_pos
    }

    pub(crate) fn player(&self) -> &Player {
        &self.player
    }

    #[cfg(test)]
    pub(crate) fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    #[cfg(test)]
    pub(crate) fn chunk(&self, key: ChunkKey) -> Option<&Chunk> {
        self.chunks.get(&key)
    }

    pub(crate) fn is_loaded(&self, key: ChunkKey) -> bool {
        self.chunks.contains_key(&key)
    }

    pub(crate) fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Live burst and firefly particles across every loaded chunk.
    pub(crate) fn particle_count(&self) -> usize {
        self.chunks
            .values()
            .flat_map(|chunk| [chunk.effects(), chunk.fireflies()])
            .flatten()
            .map(ParticleGroup::len)
            .sum()
    }

    #[cfg(test)]
    pub(crate) fn loaded_chunks(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.chunks.keys().copied()
    }

    /// Every chunk the view rectangle touches, including the chunk holding
    /// its right and bottom edge.
    pub(crate) fn chunks_on_screen(&self) -> BTreeSet<ChunkKey> {
        let left = self.screen_pos.x.floor() as i32;
        let top = self.screen_pos.y.floor() as i32;
        let first = ChunkKey::containing(left, top, self.chunk_resolution);
        let last = ChunkKey::containing(
            left + self.screen_size.x as i32,
            top + self.screen_size.y as i32,
            self.chunk_resolution,
        );
        (first.x..=last.x)
            .flat_map(|x| (first.y..=last.y).map(move |y| ChunkKey::new(x, y)))
            .collect()
    }

    pub(crate) fn player_chunk(&self) -> ChunkKey {
        let center = self.player.pos.round();
        ChunkKey::containing(center.x as i32, center.y as i32, self.chunk_resolution)
    }

    /// Loaded chunks in the 3x3 block around the player's chunk.
    pub(crate) fn chunks_around_player(&self) -> Vec<ChunkKey> {
        let center = self.player_chunk();
        (center.x - 1..=center.x + 1)
            .flat_map(|x| (center.y - 1..=center.y + 1).map(move |y| ChunkKey::new(x, y)))
            .filter(|key| self.is_loaded(*key))
            .collect()
    }

    fn stream_chunks(&mut self) -> Result<(), WorldError> {
        let visible = self.chunks_on_screen();
        self.chunks.retain(|key, _| {
            let keep = visible.contains(key);
            if !keep {
                debug!(chunk_x = key.x, chunk_y = key.y, "chunk_unloaded");
            }
            keep
        });

        for key in visible {
            if self.chunks.contains_key(&key) {
                continue;
            }
            let chunk = Chunk::decode(key, &self.map, &self.geometry, &mut self.rng)?;
            debug!(chunk_x = key.x, chunk_y = key.y, "chunk_loaded");
            self.chunks.insert(key, chunk);
        }
        Ok(())
    }

    /// Last solid tile overlapping the player, in neighbourhood scan order.
    fn solid_hit(&self) -> Option<Rect> {
        let player_rect = self.player.rect();
        self.chunks_around_player()
            .into_iter()
            .filter_map(|key| self.chunks.get(&key))
            .flat_map(|chunk| chunk.solid_tiles())
            .map(|tile| tile.rect())
            .filter(|rect| rect.overlaps(&player_rect))
            .last()
    }

    fn move_player_x(&mut self) {
        self.screen_pos.x += camera_step(
            self.player.pos.x,
            self.screen_pos.x,
            self.screen_size.x,
            self.scroll_delay.x,
        );
        self.player.pos.x += self.player.vel.x;

        if let Some(tile) = self.solid_hit() {
            let half_width = self.player.half_size().x;
            self.player.vel.x = 0.0;
            self.player.pos.x = if self.player.facing_east {
                tile.left - half_width
            } else {
                tile.right() + half_width
            };
        }
    }

    fn move_player_y(&mut self) {
        self.screen_pos.y += camera_step(
            self.player.pos.y,
            self.screen_pos.y,
            self.screen_size.y,
            self.scroll_delay.y,
        );
        self.player.pos.y += self.player.vel.y;

        self.player.on_ground = false;
        let Some(tile) = self.solid_hit() else {
            return;
        };
        let impact = self.player.vel;
        let half_height = self.player.half_size().y;
        self.player.vel.y = 0.0;
        if self.player.facing_down {
            self.player.pos.y = tile.top - half_height;
            self.player.land();
            self.emit_landing_dust(impact);
        } else {
            self.player.pos.y = tile.bottom() + half_height;
        }
    }

    fn emit_landing_dust(&mut self, impact: Vec2) {
        let mut count = (impact.y - DUST_SPEED_THRESHOLD).round().max(0.0) as usize;
        if impact.x.abs() > DUST_SKID_THRESHOLD {
            count += 1;
        }
        if count == 0 {
            return;
        }
        let origin = self.player.rect().mid_bottom();
        let dust = CircleBurst::default();
        let particles: Vec<Particle> = (0..count)
            .map(|_| dust.spawn_at_angle(origin, dust_angle(&mut self.rng)))
            .collect();
        debug!(particles = count, impact_speed = impact.y, "player_landed");
        self.emit_effects(particles);
    }

    fn collect_coins(&mut self) {
        let player_rect = self.player.rect();
        let mut collected = Vec::new();
        for key in self.chunks_around_player() {
            if let Some(chunk) = self.chunks.get_mut(&key) {
                collected.extend(chunk.take_coins_overlapping(&player_rect));
            }
        }
        if collected.is_empty() {
            return;
        }

        let mut particles = Vec::with_capacity(collected.len() * COIN_BURST_PARTICLES);
        for coin in &collected {
            self.coins += 1;
            debug!(coins = self.coins, x = coin.pos().x, y = coin.pos().y, "coin_collected");
            for _ in 0..COIN_BURST_PARTICLES {
                particles.push(CircleBurst::COIN_PICKUP.spawn(coin.pos(), &mut self.rng));
            }
        }
        self.emit_effects(particles);
    }

    /// Effects belong to the player's chunk. If that chunk is not streamed in
    /// the particles have nowhere to live and are dropped.
    fn emit_effects(&mut self, particles: Vec<Particle>) {
        let key = self.player_chunk();
        match self.chunks.get_mut(&key) {
            Some(chunk) => chunk.effects_mut().extend(particles),
            None => warn!(
                chunk_x = key.x,
                chunk_y = key.y,
                dropped = particles.len(),
                "effects_chunk_not_loaded"
            ),
        }
    }
}

/// Exponential camera follow: closes `1 / delay` of the gap between the view
/// origin and the origin that would centre the player.
fn camera_step(player: f32, screen: f32, screen_extent: f32, delay: f32) -> f32 {
    (player - screen_extent / 2.0 - screen) / delay
}
