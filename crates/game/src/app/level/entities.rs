use engine::{DrawSurface, PixelRect, Sprite, Vec2};

/// World-space axis-aligned rectangle. Edges are whole pixels for every
/// rectangle the level builds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rect {
    pub(crate) left: f32,
    pub(crate) top: f32,
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl Rect {
    pub(crate) const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Centres a `width`×`height` box on `center` rounded to the pixel grid;
    /// odd sizes put the extra pixel on the right/bottom.
    pub(crate) fn centered(center: Vec2, width: u32, height: u32) -> Self {
        let center = center.round();
        Self::new(
            center.x - (width / 2) as f32,
            center.y - (height / 2) as f32,
            width as f32,
            height as f32,
        )
    }

    pub(crate) fn right(&self) -> f32 {
        self.left + self.width
    }

    pub(crate) fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub(crate) fn mid_bottom(&self) -> Vec2 {
        Vec2::new(self.left + (self.width / 2.0).floor(), self.bottom())
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    pub(crate) fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    pub(crate) fn screen_top_left(&self, scroll: Vec2) -> (i32, i32) {
        (
            (self.left - scroll.x).round() as i32,
            (self.top - scroll.y).round() as i32,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tile {
    rect: Rect,
}

impl Tile {
    pub(crate) fn new(top_left: Vec2, size: u32) -> Self {
        Self {
            rect: Rect::new(top_left.x, top_left.y, size as f32, size as f32),
        }
    }

    pub(crate) fn rect(&self) -> Rect {
        self.rect
    }

    pub(crate) fn draw(&self, surface: &mut dyn DrawSurface, scroll: Vec2, texture: &Sprite) {
        surface.blit(texture, None, self.rect.screen_top_left(scroll));
    }
}

const FRAMES_PER_BOUNCE: u32 = 150;
const FRAMES_PER_ROTATION: u32 = 120;
const FRAMES_PER_ANIMATION_STATE: u32 = 15;
const BOUNCE_DIVISOR: f32 = 44.0;

/// Source rectangles of the spinning-coin frames in the scaled sheet.
pub(crate) const COIN_FRAMES: [PixelRect; 8] = [
    PixelRect::new(0, 0, 64, 64),
    PixelRect::new(68, 0, 56, 64),
    PixelRect::new(128, 0, 48, 64),
    PixelRect::new(180, 0, 36, 64),
    PixelRect::new(220, 0, 20, 64),
    PixelRect::new(0, 68, 36, 64),
    PixelRect::new(40, 68, 48, 64),
    PixelRect::new(92, 68, 56, 64),
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Coin {
    pos: Vec2,
    bounce_counter: u32,
    rotation_counter: u32,
    animation_state: usize,
}

impl Coin {
    /// Coins hover around the centre of the tile they were authored on.
    pub(crate) fn new(tile_top_left: Vec2, tile_size: u32) -> Self {
        let half = tile_size as f32 / 2.0;
        Self {
            pos: tile_top_left + Vec2::new(half, half),
            bounce_counter: 0,
            rotation_counter: 0,
            animation_state: 0,
        }
    }

    pub(crate) fn pos(&self) -> Vec2 {
        self.pos
    }

    #[cfg(test)]
    pub(crate) fn animation_state(&self) -> usize {
        self.animation_state
    }

    pub(crate) fn update(&mut self) {
        self.bounce_counter = (self.bounce_counter + 1) % FRAMES_PER_BOUNCE;
        let midpoint = (FRAMES_PER_BOUNCE - 1) as f32 / 2.0;
        self.pos.y += (self.bounce_counter as f32 - midpoint) / BOUNCE_DIVISOR;

        self.rotation_counter = (self.rotation_counter + 1) % FRAMES_PER_ROTATION;
        self.animation_state = (self.rotation_counter / FRAMES_PER_ANIMATION_STATE) as usize;
    }

    pub(crate) fn frame(&self) -> PixelRect {
        COIN_FRAMES[self.animation_state]
    }

    pub(crate) fn rect(&self) -> Rect {
        let frame = self.frame();
        Rect::centered(self.pos, frame.width as u32, frame.height as u32)
    }

    pub(crate) fn draw(&self, surface: &mut dyn DrawSurface, scroll: Vec2, sheet: &Sprite) {
        surface.blit(sheet, Some(self.frame()), self.rect().screen_top_left(scroll));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 64.0, 64.0);
        let b = Rect::new(64.0, 0.0, 64.0, 64.0);
        let c = Rect::new(63.0, 63.0, 64.0, 64.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));
    }

    #[test]
    fn centered_rect_rounds_its_center() {
        let rect = Rect::centered(Vec2::new(100.4, 99.6), 64, 64);
        assert_eq!(rect, Rect::new(68.0, 68.0, 64.0, 64.0));
        assert_eq!(rect.mid_bottom(), Vec2::new(100.0, 132.0));
    }

    #[test]
    fn coin_sits_in_tile_center() {
        let coin = Coin::new(Vec2::new(128.0, 64.0), 64);
        assert_eq!(coin.pos(), Vec2::new(160.0, 96.0));
        assert_eq!(coin.rect(), Rect::new(128.0, 64.0, 64.0, 64.0));
    }

    #[test]
    fn coin_bounce_returns_to_start_each_period() {
        let mut coin = Coin::new(Vec2::ZERO, 64);
        let start = coin.pos();
        for _ in 0..FRAMES_PER_BOUNCE {
            coin.update();
        }
        assert!((coin.pos().y - start.y).abs() < 1e-3, "{:?}", coin.pos());
        assert_eq!(coin.pos().x, start.x);
    }

    #[test]
    fn coin_steps_through_every_frame_per_rotation() {
        let mut coin = Coin::new(Vec2::ZERO, 64);
        let mut seen = Vec::new();
        for _ in 0..FRAMES_PER_ROTATION {
            coin.update();
            if seen.last() != Some(&coin.animation_state()) {
                seen.push(coin.animation_state());
            }
        }
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5, 6, 7, 0]);
    }

    #[test]
    fn coin_collision_box_follows_frame_width() {
        let mut coin = Coin::new(Vec2::ZERO, 64);
        for _ in 0..FRAMES_PER_ANIMATION_STATE * 4 {
            coin.update();
        }
        assert_eq!(coin.animation_state(), 4);
        assert_eq!(coin.rect().width, 20.0);
    }
}
