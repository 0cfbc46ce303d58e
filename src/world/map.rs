use thiserror::Error;

/// Symbol of a walkable cell.  Anything else is a wall.
pub const EMPTY: char = ' ';

/// Things that can go wrong when building or querying a map.
#[derive(Debug, Error, PartialEq)]
pub enum MapError {
    /// `symbols.len()` does not match `width * height`.
    #[error("map data length mismatch: expected {expected} cells, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("map must be at least 1x1")]
    ZeroDimension,

    /// Lookup outside `0 .. width` × `0 .. height`.
    #[error("map coordinate ({x}, {y}) out of bounds")]
    OutOfBounds { x: f64, y: f64 },
}

/// Immutable `width × height` grid of single-character cells (row-major).
///
/// Built once per level; read-only afterwards.
#[derive(Clone, Debug)]
pub struct TileMap {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl TileMap {
    /// Build a map from a flat symbol string.
    pub fn new(symbols: &str, width: usize, height: usize) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::ZeroDimension);
        }
        let cells: Vec<char> = symbols.chars().collect();
        let expected = width * height;
        if cells.len() != expected {
            return Err(MapError::SizeMismatch {
                expected,
                actual: cells.len(),
            });
        }
        tracing::debug!(width, height, "tile map built");
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Symbol of the cell containing map coordinate `(x, y)`.
    pub fn symbol_at(&self, x: f64, y: f64) -> Result<char, MapError> {
        let (cx, cy) = (x.floor(), y.floor());
        if !(cx >= 0.0 && cy >= 0.0 && cx < self.width as f64 && cy < self.height as f64) {
            return Err(MapError::OutOfBounds { x, y });
        }
        Ok(self.cells[cx as usize + cy as usize * self.width])
    }

    /// `true` for walkable cells; out-of-bounds counts as solid.
    #[inline]
    pub fn is_empty_at(&self, x: f64, y: f64) -> bool {
        matches!(self.symbol_at(x, y), Ok(EMPTY))
    }

    /// Every cell as `(col, row, symbol)`, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, char)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &c)| (i % self.width, i / self.width, c))
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
