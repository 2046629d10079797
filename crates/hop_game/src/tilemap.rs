//! Tile map: a static grid of one-character tiles loaded from a text file.
//!
//! Lines starting with `#` are comments. Rows shorter than the widest row are
//! padded with the empty tile. Any lookup outside the grid returns
//! [`EMPTY_TILE`], so lookups below the floor or left of the map never fault.

use std::path::Path;

use hop_core::error::read_text;
use hop_core::ResourceError;

/// Passable sentinel returned for empty cells and out-of-range lookups.
pub const EMPTY_TILE: char = '.';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileKind {
    /// Ground (`p`) and dirt (`b`).
    Solid,
    /// Lava (`t`).
    Hazard,
    /// Level exit flag (`f`).
    Finish,
    Empty,
}

impl TileKind {
    pub fn of(symbol: char) -> Self {
        match symbol {
            'p' | 'b' => Self::Solid,
            't' => Self::Hazard,
            'f' => Self::Finish,
            _ => Self::Empty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TileGrid {
    rows: Vec<Vec<char>>,
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
}

impl TileGrid {
    pub fn parse(text: &str, tile_width: u32, tile_height: u32) -> Result<Self, String> {
        if tile_width == 0 || tile_height == 0 {
            return Err("tile size must be > 0".to_string());
        }

        let mut rows: Vec<Vec<char>> = text
            .lines()
            .filter(|line| !line.starts_with('#'))
            .map(|line| line.trim_end().chars().collect())
            .collect();
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if rows.is_empty() || width == 0 {
            return Err("map has no tiles".to_string());
        }
        for row in &mut rows {
            row.resize(width, EMPTY_TILE);
        }

        Ok(Self {
            height: rows.len() as u32,
            width: width as u32,
            rows,
            tile_width,
            tile_height,
        })
    }

    /// Width in tiles.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn pixel_width(&self) -> f32 {
        (self.width * self.tile_width) as f32
    }

    pub fn pixel_height(&self) -> f32 {
        (self.height * self.tile_height) as f32
    }

    pub fn column_at(&self, x: f32) -> i32 {
        (x / self.tile_width as f32).floor() as i32
    }

    pub fn row_at(&self, y: f32) -> i32 {
        (y / self.tile_height as f32).floor() as i32
    }

    pub fn tile_char(&self, column: i32, row: i32) -> char {
        if column < 0 || row < 0 {
            return EMPTY_TILE;
        }
        self.rows
            .get(row as usize)
            .and_then(|r| r.get(column as usize))
            .copied()
            .unwrap_or(EMPTY_TILE)
    }

    pub fn tile_kind(&self, column: i32, row: i32) -> TileKind {
        TileKind::of(self.tile_char(column, row))
    }

    /// Every non-empty cell as `(column, row, symbol)`, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (u32, u32, char)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|&(_, &c)| c != EMPTY_TILE)
                .map(move |(column, &c)| (column as u32, row as u32, c))
        })
    }
}

pub fn load_tile_grid_from_path(
    path: &Path,
    tile_width: u32,
    tile_height: u32,
) -> Result<TileGrid, ResourceError> {
    let raw = read_text(path)?;
    let grid = TileGrid::parse(&raw, tile_width, tile_height)
        .map_err(|message| ResourceError::invalid(path, message))?;
    log::info!(
        "Loaded map {} ({}x{} tiles of {}x{} px)",
        path.display(),
        grid.width(),
        grid.height(),
        tile_width,
        tile_height
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    const SAMPLE: &str = "\
# two ledges and a pit
......
.f..
pp.tbb
";

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hop_tilemap_test_{}_{}_{}.txt",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn parse_skips_comments_and_pads_ragged_rows() {
        let grid = TileGrid::parse(SAMPLE, 32, 32).expect("sample parses");
        assert_eq!(grid.width(), 6);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.tile_char(1, 1), 'f');
        assert_eq!(grid.tile_char(5, 1), EMPTY_TILE);
        assert_eq!(grid.pixel_width(), 192.0);
        assert_eq!(grid.pixel_height(), 96.0);
    }

    #[test]
    fn tile_kinds_follow_symbols() {
        let grid = TileGrid::parse(SAMPLE, 32, 32).expect("sample parses");
        assert_eq!(grid.tile_kind(0, 2), TileKind::Solid);
        assert_eq!(grid.tile_kind(4, 2), TileKind::Solid);
        assert_eq!(grid.tile_kind(3, 2), TileKind::Hazard);
        assert_eq!(grid.tile_kind(1, 1), TileKind::Finish);
        assert_eq!(grid.tile_kind(2, 2), TileKind::Empty);
    }

    #[test]
    fn out_of_bounds_lookups_return_empty() {
        let grid = TileGrid::parse(SAMPLE, 32, 32).expect("sample parses");
        assert_eq!(grid.tile_char(-1, 0), EMPTY_TILE);
        assert_eq!(grid.tile_char(0, -1), EMPTY_TILE);
        assert_eq!(grid.tile_char(6, 2), EMPTY_TILE);
        assert_eq!(grid.tile_char(0, 3), EMPTY_TILE);
        assert_eq!(grid.tile_kind(100, 100), TileKind::Empty);
    }

    #[test]
    fn pixel_coordinates_floor_into_cells() {
        let grid = TileGrid::parse(SAMPLE, 32, 16).expect("sample parses");
        assert_eq!(grid.column_at(31.999), 0);
        assert_eq!(grid.column_at(32.0), 1);
        assert_eq!(grid.column_at(-0.5), -1);
        assert_eq!(grid.row_at(47.9), 2);
    }

    #[test]
    fn occupied_lists_non_empty_cells_in_row_order() {
        let grid = TileGrid::parse(SAMPLE, 32, 32).expect("sample parses");
        let cells: Vec<_> = grid.occupied().collect();
        assert_eq!(cells[0], (1, 1, 'f'));
        assert_eq!(cells.len(), 6);
    }

    #[test]
    fn empty_map_is_rejected() {
        assert!(TileGrid::parse("# only a comment\n\n", 32, 32).is_err());
        assert!(TileGrid::parse("", 32, 32).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let path = temp_file_path("missing");
        let err = load_tile_grid_from_path(&path, 32, 32).expect_err("missing map must fail");
        assert!(matches!(err, ResourceError::Read { .. }));
    }

    #[test]
    fn load_parses_file_from_disk() {
        let path = temp_file_path("disk");
        fs::write(&path, SAMPLE).expect("write map");
        let grid = load_tile_grid_from_path(&path, 32, 32).expect("map loads");
        assert_eq!(grid.height(), 3);
        let _ = fs::remove_file(path);
    }
}
