use engine::{DrawSurface, InputAction, InputSnapshot, Sprite, Vec2};

use crate::app::config::PlayerTuning;

use super::entities::Rect;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Player {
    pub(crate) pos: Vec2,
    pub(crate) vel: Vec2,
    /// Remaining air jumps, 0 or 1.
    pub(crate) stamina: u8,
    pub(crate) facing_east: bool,
    pub(crate) facing_down: bool,
    pub(crate) on_ground: bool,
    pub(crate) jump_buffer: u32,
    tuning: PlayerTuning,
}

impl Player {
    pub(crate) fn new(pos: Vec2, tuning: PlayerTuning) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            stamina: 1,
            facing_east: true,
            facing_down: true,
            on_ground: false,
            jump_buffer: 0,
            tuning,
        }
    }

    pub(crate) fn half_size(&self) -> Vec2 {
        Vec2::new(
            self.tuning.width as f32 / 2.0,
            self.tuning.height as f32 / 2.0,
        )
    }

    /// World-space collision box centred on the rounded position.
    pub(crate) fn rect(&self) -> Rect {
        Rect::centered(self.pos, self.tuning.width, self.tuning.height)
    }

    /// Grounded jumps are free, an airborne jump spends stamina, and a jump
    /// with nothing left is buffered until the next landing.
    pub(crate) fn jump(&mut self) {
        if self.stamina > 0 {
            self.vel.y = self.tuning.jump_impulse;
            if !self.on_ground {
                self.stamina -= 1;
            }
        } else if !self.on_ground {
            self.jump_buffer = self.tuning.jump_buffer_ticks;
        }
    }

    pub(crate) fn land(&mut self) {
        self.stamina = 1;
        self.on_ground = true;
    }

    /// Velocity integration for one tick. Position and collision are resolved
    /// by the world afterwards, one axis at a time.
    pub(crate) fn update(&mut self, input: &InputSnapshot) {
        if self.jump_buffer > 0 {
            if self.on_ground {
                self.jump();
            }
            self.jump_buffer -= 1;
        }

        let tuning = &self.tuning;
        if input.is_down(InputAction::MoveLeft) {
            self.vel.x -= tuning.acceleration[0];
        }
        if input.is_down(InputAction::MoveRight) {
            self.vel.x += tuning.acceleration[0];
        }
        if input.is_down(InputAction::MoveDown) {
            self.vel.y += tuning.acceleration[1];
        }

        self.vel.y += tuning.gravity;

        self.vel.x *= 1.0 - (self.vel.x.abs() / tuning.air_resistance[0]).tanh();
        self.vel.y *= 1.0 - (self.vel.y.abs() / tuning.air_resistance[1]).tanh();

        if self.vel.x.abs() <= tuning.friction {
            self.vel.x = 0.0;
        } else {
            self.vel.x -= tuning.friction * self.vel.x.signum();
        }

        if self.facing_east && self.vel.x < 0.0 {
            self.facing_east = false;
        } else if !self.facing_east && self.vel.x > 0.0 {
            self.facing_east = true;
        }
        if self.facing_down && self.vel.y < 0.0 {
            self.facing_down = false;
        } else if !self.facing_down && self.vel.y > 0.0 {
            self.facing_down = true;
        }
    }

    pub(crate) fn draw(&self, surface: &mut dyn DrawSurface, scroll: Vec2, texture: &Sprite) {
        surface.blit(texture, None, self.rect().screen_top_left(scroll));
    }
}
