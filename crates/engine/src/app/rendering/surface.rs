use crate::app::Vec2;

use super::Sprite;

pub type Rgba = [u8; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Source replaces destination, weighted by source alpha.
    #[default]
    Normal,
    /// Source RGB is added to destination RGB, saturating at 255.
    Additive,
}

/// Integer pixel rectangle, `x`/`y` being the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn intersection(&self, other: PixelRect) -> Option<PixelRect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return None;
        }
        Some(PixelRect::new(left, top, right - left, bottom - top))
    }
}

/// Abstract 2D render sink. All coordinates are screen space; callers convert
/// from world space by subtracting the current scroll offset.
pub trait DrawSurface {
    fn size(&self) -> (u32, u32);

    fn clear(&mut self, color: Rgba);

    /// Copies `source` (or the whole sprite) with its top-left corner at `top_left`.
    fn blit(&mut self, sprite: &Sprite, source: Option<PixelRect>, top_left: (i32, i32));

    fn fill_rect(&mut self, rect: PixelRect, color: Rgba);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba, blend: BlendMode);

    /// Ring of the given `width` whose outer edge lies on `radius`.
    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba);

    /// Filled when `width` is 0, otherwise an outline `width` pixels thick.
    fn polygon(&mut self, points: &[Vec2], color: Rgba, width: u32);

    fn text_centered(&mut self, text: &str, center: Vec2, color: Rgba);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_clips_to_overlap() {
        let a = PixelRect::new(0, 0, 10, 10);
        let b = PixelRect::new(5, -5, 10, 10);
        assert_eq!(a.intersection(b), Some(PixelRect::new(5, 0, 5, 5)));
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = PixelRect::new(0, 0, 10, 10);
        let b = PixelRect::new(10, 0, 10, 10);
        assert_eq!(a.intersection(b), None);
        assert!(PixelRect::new(0, 0, 0, 4).is_empty());
    }
}
