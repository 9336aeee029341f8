use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::chunk::ChunkKey;

#[derive(Debug, Error)]
pub(crate) enum MapError {
    #[error("failed to read map '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("map has no rows")]
    Empty,
    #[error("map row {row} has {actual} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error(
        "chunk ({chunk_x}, {chunk_y}) reaches outside the {width}x{height} map; \
the map must cover every chunk the camera can see"
    )]
    ChunkOutOfBounds {
        chunk_x: i32,
        chunk_y: i32,
        width: usize,
        height: usize,
    },
}

/// Immutable character grid, one char per tile, addressed as `(column, row)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TileMap {
    rows: Vec<Vec<char>>,
    width: usize,
}

impl TileMap {
    /// Trailing blank lines and `\r` line endings are tolerated; every other
    /// row must have the same width as the first.
    pub(crate) fn parse(text: &str) -> Result<Self, MapError> {
        let mut rows: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.trim_end_matches('\r').chars().collect())
            .collect();
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }

        let width = rows.first().map(Vec::len).ok_or(MapError::Empty)?;
        if width == 0 {
            return Err(MapError::Empty);
        }
        if let Some((row, actual)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != width)
        {
            return Err(MapError::Ragged {
                row,
                expected: width,
                actual,
            });
        }

        Ok(Self { rows, width })
    }

    pub(crate) fn load(path: &Path) -> Result<Self, MapError> {
        let text = fs::read_to_string(path).map_err(|source| MapError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    #[cfg(test)]
    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn char_at(&self, x: usize, y: usize) -> Option<char> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Checks that the whole `chunk_size`² block behind `key` lies inside the
    /// map and returns its top-left tile.
    pub(crate) fn chunk_block(
        &self,
        key: ChunkKey,
        chunk_size: u32,
    ) -> Result<(usize, usize), MapError> {
        let out_of_bounds = || MapError::ChunkOutOfBounds {
            chunk_x: key.x,
            chunk_y: key.y,
            width: self.width,
            height: self.height(),
        };
        let size = chunk_size as i64;
        let left = key.x as i64 * size;
        let top = key.y as i64 * size;
        if left < 0 || top < 0 {
            return Err(out_of_bounds());
        }
        if left + size > self.width as i64 || top + size > self.height() as i64 {
            return Err(out_of_bounds());
        }
        Ok((left as usize, top as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_rows_and_columns() {
        let map = TileMap::parse("AAD\nGCA\n").expect("map");
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 2);
        assert_eq!(map.char_at(2, 0), Some('D'));
        assert_eq!(map.char_at(1, 1), Some('C'));
        assert_eq!(map.char_at(3, 0), None);
        assert_eq!(map.char_at(0, 2), None);
    }

    #[test]
    fn parse_accepts_crlf_and_trailing_blank_lines() {
        let map = TileMap::parse("AG\r\nDC\r\n\r\n\n").expect("map");
        assert_eq!(map.height(), 2);
        assert_eq!(map.char_at(1, 1), Some('C'));
    }

    #[test]
    fn parse_rejects_empty_and_ragged_maps() {
        assert!(matches!(TileMap::parse(""), Err(MapError::Empty)));
        assert!(matches!(TileMap::parse("\n\n"), Err(MapError::Empty)));
        assert!(matches!(
            TileMap::parse("AAAA\nAA\nAAAA"),
            Err(MapError::Ragged {
                row: 1,
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn chunk_block_accepts_blocks_inside_the_map() {
        let map = TileMap::parse(&"AAAA\n".repeat(4)).expect("map");
        assert_eq!(map.chunk_block(ChunkKey::new(1, 1), 2).expect("inside"), (2, 2));
        assert_eq!(map.chunk_block(ChunkKey::new(0, 0), 4).expect("inside"), (0, 0));
    }

    #[test]
    fn chunk_block_rejects_keys_past_any_edge() {
        let map = TileMap::parse(&"AAAA\n".repeat(4)).expect("map");
        for key in [
            ChunkKey::new(2, 0),
            ChunkKey::new(0, 2),
            ChunkKey::new(-1, 0),
            ChunkKey::new(0, -1),
        ] {
            assert!(
                matches!(
                    map.chunk_block(key, 2),
                    Err(MapError::ChunkOutOfBounds { .. })
                ),
                "{key:?} should be out of bounds"
            );
        }
        // Partially covered blocks are rejected too.
        assert!(map.chunk_block(ChunkKey::new(1, 0), 3).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = TileMap::load(&dir.path().join("nope.txt")).expect_err("missing");
        assert!(matches!(error, MapError::Read { .. }));
    }

    #[test]
    fn load_reads_map_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("level.txt");
        fs::write(&path, "GG\nDD\n").expect("write map");
        let map = TileMap::load(&path).expect("map");
        assert_eq!(map.char_at(0, 1), Some('D'));
    }
}
