use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must not start or end with '/'")]
    DanglingSlash,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Keys are lowercase, slash-separated relative names without an extension,
/// e.g. `grass_block_side` or `ui/coin`.
pub(crate) fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(SpriteKeyError::DanglingSlash);
    }
    if key.contains("..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    match key
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-')))
    {
        Some(character) => Err(SpriteKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}

pub(crate) fn sprite_path(textures_dir: &Path, key: &str) -> Result<PathBuf, SpriteKeyError> {
    validate_sprite_key(key)?;
    Ok(textures_dir.join(format!("{key}.png")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_keys() {
        for key in ["bricks", "grass_block_side", "ui/coin-sheet_2"] {
            assert!(validate_sprite_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "/a", "a/", "..", "a/../b", r"a\b", "Dirt", "a.png", "coins 3"] {
            assert!(validate_sprite_key(key).is_err(), "key={key}");
        }
    }

    #[test]
    fn sprite_path_appends_png_extension() {
        let path = sprite_path(Path::new("assets/textures"), "dirt").expect("path");
        assert_eq!(path, Path::new("assets/textures/dirt.png"));
    }

    #[test]
    fn sprite_path_reports_offending_character() {
        let error = sprite_path(Path::new("t"), "coins 3").expect_err("space");
        assert_eq!(error, SpriteKeyError::InvalidCharacter { character: ' ' });
    }
}
