use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use super::input::{ActionStates, InputAction};
use super::rendering::DrawSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Exit,
}

/// Per-tick input. Held actions reflect the key state when the tick starts;
/// the `*_pressed` flags are edges and are true for exactly one tick per press.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    jump_pressed: bool,
    menu_toggle_pressed: bool,
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        jump_pressed: bool,
        menu_toggle_pressed: bool,
        actions: ActionStates,
    ) -> Self {
        Self {
            quit_requested,
            jump_pressed,
            menu_toggle_pressed,
            actions,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    pub fn menu_toggle_pressed(&self) -> bool {
        self.menu_toggle_pressed
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_jump_pressed(mut self, jump_pressed: bool) -> Self {
        self.jump_pressed = jump_pressed;
        self
    }

    pub fn with_menu_toggle_pressed(mut self, menu_toggle_pressed: bool) -> Self {
        self.menu_toggle_pressed = menu_toggle_pressed;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Screen-space polar constructor: 0 degrees points along +x and positive
    /// angles rotate towards +y (downwards on screen).
    pub fn from_polar(length: f32, angle_degrees: f32) -> Self {
        let radians = angle_degrees.to_radians();
        Self {
            x: length * radians.cos(),
            y: length * radians.sin(),
        }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn round(self) -> Self {
        Self {
            x: self.x.round(),
            y: self.y.round(),
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// A frame-stepped scene driven by the host loop: exactly one `update` then
/// one `render` per tick.
pub trait Scene {
    fn update(&mut self, input: &InputSnapshot) -> SceneCommand;
    fn render(&mut self, surface: &mut dyn DrawSurface);
    fn debug_title(&self) -> Option<String> {
        None
    }
    /// Extra fields appended to the periodic `loop_metrics` log line.
    fn debug_summary(&self) -> Option<String> {
        None
    }
}
