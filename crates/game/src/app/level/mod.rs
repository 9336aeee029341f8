mod chunk;
mod entities;
mod layer;
mod particles;
mod player;
mod textures;
mod tile_map;
mod world;


use engine::{DrawSurface, InputSnapshot, Rgba, Scene, SceneCommand};
use tracing::{error, info};

pub(crate) use layer::{DrawStep, Layer, DRAW_ORDER};
pub(crate) use textures::LevelTextures;
pub(crate) use tile_map::{MapError, TileMap};
pub(crate) use world::{World, WorldError};

const BACKGROUND_COLOR: Rgba = [0, 0, 15, 255];

/// Hosts the [`World`] inside the engine loop: forwards discrete input,
/// ticks the world and paints it over the background.
pub(crate) struct LevelScene {
    world: World,
    textures: LevelTextures,
    menu_open: bool,
}

impl LevelScene {
    pub(crate) fn new(world: World, textures: LevelTextures) -> Self {
        Self {
            world,
            textures,
            menu_open: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    #[cfg(test)]
    pub(crate) fn menu_open(&self) -> bool {
        self.menu_open
    }
}

impl Scene for LevelScene {
    fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Exit;
        }
        if input.menu_toggle_pressed() {
            self.menu_open = !self.menu_open;
            info!(menu_open = self.menu_open, "menu_toggled");
        }
        if input.jump_pressed() {
            self.world.jump();
        }
        match self.world.update(input) {
            Ok(()) => SceneCommand::None,
            Err(err) => {
                error!(error = %err, "world_update_failed");
                SceneCommand::Exit
            }
        }
    }

    fn render(&mut self, surface: &mut dyn DrawSurface) {
        surface.clear(BACKGROUND_COLOR);
        self.world.draw(surface, &self.textures);
    }

    fn debug_summary(&self) -> Option<String> {
        let player = self.world.player().pos;
        let screen = self.world.screen_pos();
        Some(format!(
            "chunks={} particles={} coins={} player=({:.0}, {:.0}) screen=({:.0}, {:.0})",
            self.world.loaded_chunk_count(),
            self.world.particle_count(),
            self.world.coins(),
            player.x,
            player.y,
            screen.x,
            screen.y
        ))
    }
}
