use crate::app::Vec2;

use super::text::{glyph_rows, text_extent, GLYPH_ADVANCE, GLYPH_WIDTH, TEXT_SCALE};
use super::{BlendMode, DrawSurface, PixelRect, Rgba, Sprite};

/// Software [`DrawSurface`] over a tightly packed RGBA8 buffer.
pub struct PixelFrame<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> PixelFrame<'a> {
    /// Returns `None` when `frame` is smaller than `width * height` pixels.
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Option<Self> {
        let required = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if frame.len() < required {
            return None;
        }
        Some(Self {
            frame,
            width,
            height,
        })
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        let offset = self.offset(x, y)?;
        let mut color = [0u8; 4];
        color.copy_from_slice(&self.frame[offset..offset + 4]);
        Some(color)
    }

    fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width as i32, self.height as i32)
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }

    fn write_pixel(&mut self, x: i32, y: i32, color: Rgba, blend: BlendMode) {
        let Some(offset) = self.offset(x, y) else {
            return;
        };
        let dst = &mut self.frame[offset..offset + 4];
        match blend {
            BlendMode::Normal => blend_over(dst, color),
            BlendMode::Additive => {
                for channel in 0..3 {
                    dst[channel] = dst[channel].saturating_add(color[channel]);
                }
            }
        }
    }

    fn span(&mut self, y: i32, x_start: i32, x_end: i32, color: Rgba, blend: BlendMode) {
        for x in x_start.max(0)..x_end.min(self.width as i32) {
            self.write_pixel(x, y, color, blend);
        }
    }

    /// Square brush used for thick outlines.
    fn stamp(&mut self, x: i32, y: i32, size: i32, color: Rgba) {
        let half = size / 2;
        for py in (y - half)..(y - half + size.max(1)) {
            self.span(py, x - half, x - half + size.max(1), color, BlendMode::Normal);
        }
    }

    fn line(&mut self, from: (i32, i32), to: (i32, i32), width: i32, color: Rgba) {
        let (mut x0, mut y0) = from;
        let (x1, y1) = to;
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.stamp(x0, y0, width, color);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Rgba) {
        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let y_start = (min_y.floor() as i32).max(0);
        let y_end = (max_y.ceil() as i32).min(self.height as i32);
        let mut crossings = Vec::with_capacity(points.len());

        for y in y_start..y_end {
            let sample_y = y as f32 + 0.5;
            crossings.clear();
            for (index, a) in points.iter().enumerate() {
                let b = points[(index + 1) % points.len()];
                let (low, high) = if a.y <= b.y { (*a, b) } else { (b, *a) };
                if sample_y < low.y || sample_y >= high.y {
                    continue;
                }
                let t = (sample_y - low.y) / (high.y - low.y);
                crossings.push(low.x + t * (high.x - low.x));
            }
            crossings.sort_by(f32::total_cmp);
            for pair in crossings.chunks_exact(2) {
                let x_start = (pair[0] - 0.5).ceil() as i32;
                let x_end = (pair[1] - 0.5).ceil() as i32;
                self.span(y, x_start, x_end, color, BlendMode::Normal);
            }
        }
    }
}

fn blend_over(dst: &mut [u8], src: Rgba) {
    match src[3] {
        0 => {}
        255 => dst.copy_from_slice(&src),
        alpha => {
            let a = alpha as u16;
            for channel in 0..3 {
                let mixed = (src[channel] as u16 * a + dst[channel] as u16 * (255 - a)) / 255;
                dst[channel] = mixed as u8;
            }
            dst[3] = dst[3].max(alpha);
        }
    }
}

impl DrawSurface for PixelFrame<'_> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgba) {
        let used = self.width as usize * self.height as usize * 4;
        for pixel in self.frame[..used].chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    fn blit(&mut self, sprite: &Sprite, source: Option<PixelRect>, top_left: (i32, i32)) {
        let sprite_bounds = PixelRect::new(0, 0, sprite.width() as i32, sprite.height() as i32);
        let Some(source) = source
            .unwrap_or(sprite_bounds)
            .intersection(sprite_bounds)
        else {
            return;
        };
        let dest = PixelRect::new(top_left.0, top_left.1, source.width, source.height);
        let Some(visible) = dest.intersection(self.bounds()) else {
            return;
        };

        let rgba = sprite.rgba();
        let sprite_width = sprite.width() as usize;
        for out_y in visible.y..visible.bottom() {
            let src_y = (source.y + out_y - dest.y) as usize;
            for out_x in visible.x..visible.right() {
                let src_x = (source.x + out_x - dest.x) as usize;
                let src_offset = (src_y * sprite_width + src_x) * 4;
                let mut color = [0u8; 4];
                color.copy_from_slice(&rgba[src_offset..src_offset + 4]);
                self.write_pixel(out_x, out_y, color, BlendMode::Normal);
            }
        }
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgba) {
        let Some(visible) = rect.intersection(self.bounds()) else {
            return;
        };
        for y in visible.y..visible.bottom() {
            self.span(y, visible.x, visible.right(), color, BlendMode::Normal);
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba, blend: BlendMode) {
        if !(radius > 0.0) {
            return;
        }
        let radius_sq = radius * radius;
        let y_start = (center.y - radius).floor() as i32;
        let y_end = (center.y + radius).ceil() as i32;
        for y in y_start..=y_end {
            let dy = y as f32 + 0.5 - center.y;
            let half_sq = radius_sq - dy * dy;
            if half_sq < 0.0 {
                continue;
            }
            let half = half_sq.sqrt();
            let x_start = (center.x - half - 0.5).ceil() as i32;
            let x_end = (center.x + half - 0.5).floor() as i32 + 1;
            self.span(y, x_start, x_end, color, blend);
        }
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, width: f32, color: Rgba) {
        if !(radius > 0.0) || !(width > 0.0) {
            return;
        }
        let inner_sq = (radius - width).max(0.0).powi(2);
        let outer_sq = radius * radius;
        let y_start = (center.y - radius).floor() as i32;
        let y_end = (center.y + radius).ceil() as i32;
        let x_start = (center.x - radius).floor() as i32;
        let x_end = (center.x + radius).ceil() as i32;
        for y in y_start..=y_end {
            let dy = y as f32 + 0.5 - center.y;
            for x in x_start..=x_end {
                let dx = x as f32 + 0.5 - center.x;
                let dist_sq = dx * dx + dy * dy;
                if dist_sq <= outer_sq && dist_sq > inner_sq {
                    self.write_pixel(x, y, color, BlendMode::Normal);
                }
            }
        }
    }

    fn polygon(&mut self, points: &[Vec2], color: Rgba, width: u32) {
        if points.len() < 2 {
            return;
        }
        if width == 0 && points.len() >= 3 {
            self.fill_polygon(points, color);
            return;
        }
        let brush = width.max(1) as i32;
        for (index, a) in points.iter().enumerate() {
            let b = points[(index + 1) % points.len()];
            self.line(
                (a.x.round() as i32, a.y.round() as i32),
                (b.x.round() as i32, b.y.round() as i32),
                brush,
                color,
            );
        }
    }

    fn text_centered(&mut self, text: &str, center: Vec2, color: Rgba) {
        let (text_width, text_height) = text_extent(text);
        let left = center.x.round() as i32 - text_width / 2;
        let top = center.y.round() as i32 - text_height / 2;

        for (index, ch) in text.chars().enumerate() {
            let glyph_left = left + index as i32 * GLYPH_ADVANCE;
            for (row, bits) in glyph_rows(ch).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    self.fill_rect(
                        PixelRect::new(
                            glyph_left + col * TEXT_SCALE,
                            top + row as i32 * TEXT_SCALE,
                            TEXT_SCALE,
                            TEXT_SCALE,
                        ),
                        color,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [255, 0, 0, 255];
    const BLACK: Rgba = [0, 0, 0, 255];

    fn lit_pixels(frame: &PixelFrame<'_>) -> usize {
        let (width, height) = frame.size();
        (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| (x, y)))
            .filter(|&(x, y)| frame.pixel(x, y) != Some(BLACK))
            .count()
    }

    #[test]
    fn new_rejects_undersized_buffer() {
        let mut buffer = vec![0u8; 15];
        assert!(PixelFrame::new(&mut buffer, 2, 2).is_none());
    }

    #[test]
    fn blit_clips_against_frame_edges() {
        let mut buffer = vec![0u8; 4 * 4 * 4];
        let mut frame = PixelFrame::new(&mut buffer, 4, 4).expect("frame");
        frame.clear(BLACK);
        frame.blit(&Sprite::filled(3, 3, RED), None, (-1, 2));

        assert_eq!(frame.pixel(0, 2), Some(RED));
        assert_eq!(frame.pixel(1, 3), Some(RED));
        assert_eq!(frame.pixel(2, 2), Some(BLACK));
        assert_eq!(lit_pixels(&frame), 4);
    }

    #[test]
    fn blit_uses_source_rect_and_skips_transparent_pixels() {
        let sheet = Sprite::from_rgba(
            2,
            1,
            vec![0, 0, 0, 0, 255, 0, 0, 255],
        )
        .expect("sheet");
        let mut buffer = vec![0u8; 3 * 3 * 4];
        let mut frame = PixelFrame::new(&mut buffer, 3, 3).expect("frame");
        frame.clear(BLACK);

        frame.blit(&sheet, Some(PixelRect::new(1, 0, 1, 1)), (0, 0));
        frame.blit(&sheet, Some(PixelRect::new(0, 0, 1, 1)), (2, 2));

        assert_eq!(frame.pixel(0, 0), Some(RED));
        assert_eq!(frame.pixel(2, 2), Some(BLACK));
    }

    #[test]
    fn additive_circle_saturates_instead_of_replacing() {
        let mut buffer = vec![0u8; 8 * 8 * 4];
        let mut frame = PixelFrame::new(&mut buffer, 8, 8).expect("frame");
        frame.clear([250, 10, 0, 255]);
        frame.fill_circle(Vec2::new(4.0, 4.0), 2.0, [32, 16, 0, 255], BlendMode::Additive);

        assert_eq!(frame.pixel(4, 4), Some([255, 26, 0, 255]));
        assert_eq!(frame.pixel(0, 0), Some([250, 10, 0, 255]));
    }

    #[test]
    fn circle_with_non_positive_radius_draws_nothing() {
        let mut buffer = vec![0u8; 8 * 8 * 4];
        let mut frame = PixelFrame::new(&mut buffer, 8, 8).expect("frame");
        frame.clear(BLACK);
        frame.fill_circle(Vec2::new(4.0, 4.0), 0.0, RED, BlendMode::Normal);
        frame.fill_circle(Vec2::new(4.0, 4.0), -3.0, RED, BlendMode::Normal);
        frame.stroke_circle(Vec2::new(4.0, 4.0), -1.0, 1.0, RED);
        assert_eq!(lit_pixels(&frame), 0);
    }

    #[test]
    fn circle_area_is_close_to_pi_r_squared() {
        let mut buffer = vec![0u8; 64 * 64 * 4];
        let mut frame = PixelFrame::new(&mut buffer, 64, 64).expect("frame");
        frame.clear(BLACK);
        frame.fill_circle(Vec2::new(32.0, 32.0), 16.0, RED, BlendMode::Normal);

        let expected = std::f32::consts::PI * 256.0;
        let lit = lit_pixels(&frame) as f32;
        assert!((lit - expected).abs() / expected < 0.05, "lit={lit}");
    }

    #[test]
    fn ring_leaves_center_untouched() {
        let mut buffer = vec![0u8; 32 * 32 * 4];
        let mut frame = PixelFrame::new(&mut buffer, 32, 32).expect("frame");
        frame.clear(BLACK);
        frame.stroke_circle(Vec2::new(16.0, 16.0), 10.0, 2.0, RED);

        assert_eq!(frame.pixel(16, 16), Some(BLACK));
        assert_eq!(frame.pixel(16, 7), Some(RED));
    }

    #[test]
    fn filled_square_polygon_covers_its_area() {
        let mut buffer = vec![0u8; 16 * 16 * 4];
        let mut frame = PixelFrame::new(&mut buffer, 16, 16).expect("frame");
        frame.clear(BLACK);
        let square = [
            Vec2::new(2.0, 2.0),
            Vec2::new(10.0, 2.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(2.0, 10.0),
        ];
        frame.polygon(&square, RED, 0);

        assert_eq!(lit_pixels(&frame), 64);
        assert_eq!(frame.pixel(2, 2), Some(RED));
        assert_eq!(frame.pixel(10, 10), Some(BLACK));
    }

    #[test]
    fn outlined_polygon_keeps_interior_clear() {
        let mut buffer = vec![0u8; 16 * 16 * 4];
        let mut frame = PixelFrame::new(&mut buffer, 16, 16).expect("frame");
        frame.clear(BLACK);
        let square = [
            Vec2::new(2.0, 2.0),
            Vec2::new(12.0, 2.0),
            Vec2::new(12.0, 12.0),
            Vec2::new(2.0, 12.0),
        ];
        frame.polygon(&square, RED, 1);

        assert_eq!(frame.pixel(2, 7), Some(RED));
        assert_eq!(frame.pixel(7, 7), Some(BLACK));
    }

    #[test]
    fn text_is_centered_on_the_requested_point() {
        let mut buffer = vec![0u8; 64 * 64 * 4];
        let mut frame = PixelFrame::new(&mut buffer, 64, 64).expect("frame");
        frame.clear(BLACK);
        frame.text_centered("1", Vec2::new(32.0, 32.0), RED);

        // '1' has a full-width bottom row.
        assert_eq!(frame.pixel(25, 43), Some(RED));
        assert_eq!(frame.pixel(39, 43), Some(RED));
        assert_eq!(frame.pixel(24, 43), Some(BLACK));
    }

    #[test]
    fn drawing_far_outside_never_panics() {
        let mut buffer = vec![0u8; 4];
        let mut frame = PixelFrame::new(&mut buffer, 1, 1).expect("frame");
        frame.fill_rect(PixelRect::new(-100, -100, 50, 50), RED);
        frame.fill_circle(Vec2::new(1e6, -1e6), 10.0, RED, BlendMode::Additive);
        frame.polygon(&[Vec2::new(-5.0, -5.0), Vec2::new(5.0, 9.0)], RED, 3);
        frame.text_centered("coins: 12", Vec2::new(-400.0, 0.0), RED);
        assert_eq!(frame.size(), (1, 1));
    }
}
