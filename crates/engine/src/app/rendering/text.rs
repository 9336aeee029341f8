//! Minimal 3x5 bitmap face for UI readouts drawn straight into the frame.

pub(crate) const GLYPH_WIDTH: i32 = 3;
pub(crate) const GLYPH_HEIGHT: i32 = 5;
pub(crate) const TEXT_SCALE: i32 = 5;
pub(crate) const GLYPH_ADVANCE: i32 = (GLYPH_WIDTH + 1) * TEXT_SCALE;

pub(crate) type GlyphRows = [u8; GLYPH_HEIGHT as usize];

const BLANK: GlyphRows = [0; GLYPH_HEIGHT as usize];
const UNKNOWN: GlyphRows = [0b111; GLYPH_HEIGHT as usize];

/// Pixel extent of `text` once laid out on one line.
pub(crate) fn text_extent(text: &str) -> (i32, i32) {
    let chars = text.chars().count() as i32;
    if chars == 0 {
        return (0, 0);
    }
    (chars * GLYPH_ADVANCE - TEXT_SCALE, GLYPH_HEIGHT * TEXT_SCALE)
}

/// Letters are case-folded; anything without a glyph renders as a solid block.
pub(crate) fn glyph_rows(ch: char) -> GlyphRows {
    match ch.to_ascii_lowercase() {
        ' ' => BLANK,
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b011, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'b' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'd' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'f' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'g' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'h' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'k' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'n' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'o' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'p' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'r' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' => [0b011, 0b100, 0b010, 0b001, 0b110],
        't' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'w' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'x' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '?' => [0b111, 0b001, 0b011, 0b000, 0b010],
        _ => UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_readout_characters_have_real_glyphs() {
        for ch in "coins: 0123456789".chars() {
            if ch != ' ' {
                assert_ne!(glyph_rows(ch), UNKNOWN, "missing glyph for '{ch}'");
            }
        }
    }

    #[test]
    fn letters_are_case_folded() {
        assert_eq!(glyph_rows('C'), glyph_rows('c'));
    }

    #[test]
    fn unknown_characters_fall_back_to_box() {
        assert_eq!(glyph_rows('\u{1f642}'), UNKNOWN);
    }

    #[test]
    fn extent_drops_trailing_gap() {
        assert_eq!(text_extent(""), (0, 0));
        assert_eq!(text_extent("a"), (GLYPH_WIDTH * TEXT_SCALE, 25));
        assert_eq!(text_extent("ab"), (GLYPH_ADVANCE + GLYPH_WIDTH * TEXT_SCALE, 25));
    }
}
