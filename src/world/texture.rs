// Tile atlases: one decoded image cut into equally sized square tiles.
// The renderer only ever asks for single columns of a tile, so every tile
// stores its texels column-major and hands out ready-made 1-px strips.

use std::ops::Range;

use thiserror::Error;

/// Pixel format shared by textures and the frame-buffer (0xAARRGGBB).
pub type Rgba = u32;

/// Tile edge length used when the asset does not say otherwise.
pub const DEFAULT_TILE_SIZE: usize = 64;

/// Meta colour (178, 0, 255) artists use for tile boundaries.
/// Replaced by [`TRANSPARENT`] when an atlas is built.
pub const OVERLAY_COLOUR: Rgba = 0xFF_B2_00_FF;

pub const TRANSPARENT: Rgba = 0x00_00_00_00;

/// CPU-side image in row-major order, as handed over by the asset loader.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<Rgba>,
}

/// Convenience checkerboard 8×8 (dark/light grey).
impl Default for Texture {
    fn default() -> Self {
        const LIGHT: Rgba = 0xFF_A0_A0_A0;
        const DARK: Rgba = 0xFF_40_40_40;
        let mut pix = vec![0; 8 * 8];
        for y in 0..8 {
            for x in 0..8 {
                pix[y * 8 + x] = if (x ^ y) & 1 == 0 { LIGHT } else { DARK };
            }
        }
        Texture {
            w: 8,
            h: 8,
            pixels: pix,
        }
    }
}

impl Texture {
    /// Single-colour image.
    pub fn solid(w: usize, h: usize, colour: Rgba) -> Self {
        Self {
            w,
            h,
            pixels: vec![colour; w * h],
        }
    }
}

/// Asset-time failures; fatal for the atlas being built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AtlasError {
    #[error("image {width}x{height} cannot be split into {tile_size}px tiles")]
    NotDivisible {
        width: usize,
        height: usize,
        tile_size: usize,
    },

    #[error("tile size must be non-zero")]
    ZeroTileSize,

    #[error("image claims {expected} pixels but holds {actual}")]
    PixelCount { expected: usize, actual: usize },
}

/// Frame-time lookup failures.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum TileLookupError {
    #[error("tile column {col} out of range (atlas has {max})")]
    Column { col: usize, max: usize },

    #[error("tile row {row} out of range (atlas has {max})")]
    Row { row: usize, max: usize },

    #[error("slice {x} outside {tile_size}px tile")]
    Slice { x: usize, tile_size: usize },

    /// Map symbol that does not name a tile column.
    #[error("map symbol `{0}` has no tile")]
    Symbol(char),
}

/// `(col, row)` inside an atlas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileIndex {
    pub col: usize,
    pub row: usize,
}

impl TileIndex {
    pub const fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// One square tile with its vertical strips cut in advance.
#[derive(Clone, Debug)]
pub struct Tile {
    size: usize,
    /// column-major: strip `x` is `columns[x*size .. (x+1)*size]`
    columns: Vec<Rgba>,
}

impl Tile {
    fn cut(image: &Texture, left: usize, top: usize, size: usize) -> Self {
        let mut columns = Vec::with_capacity(size * size);
        for x in 0..size {
            for y in 0..size {
                columns.push(image.pixels[(top + y) * image.w + left + x]);
            }
        }
        Self { size, columns }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The 1-px wide strip at local offset `x`.
    #[inline]
    pub fn column_slice(&self, x: usize) -> Result<&[Rgba], TileLookupError> {
        if x >= self.size {
            return Err(TileLookupError::Slice {
                x,
                tile_size: self.size,
            });
        }
        Ok(&self.columns[x * self.size..(x + 1) * self.size])
    }

    /// Append rows `rows` of strip `x` stretched to `target_h` pixels.
    ///
    /// `rows` is relative to the top of the stretched strip and is clamped
    /// to `0 .. target_h`, so callers can pass the on-screen window
    /// directly instead of materialising a column taller than the screen.
    pub fn scaled_column_into(
        &self,
        x: usize,
        target_h: usize,
        rows: Range<i64>,
        out: &mut Vec<Rgba>,
    ) -> Result<(), TileLookupError> {
        let src = self.column_slice(x)?;
        let start = rows.start.max(0);
        let end = rows.end.min(target_h as i64);
        if target_h == 0 || start >= end {
            return Ok(());
        }
        let n = src.len();
        let ratio = n as f64 / target_h as f64;
        for j in start..end {
            // sample at the centre of the destination pixel
            let s = ((j as f64 + 0.5) * ratio - 0.5).clamp(0.0, (n - 1) as f64);
            let i0 = s as usize;
            let i1 = (i0 + 1).min(n - 1);
            out.push(lerp_rgba(src[i0], src[i1], s - i0 as f64));
        }
        Ok(())
    }
}

/// Per-channel linear blend, alpha included.
#[inline]
fn lerp_rgba(a: Rgba, b: Rgba, t: f64) -> Rgba {
    if t <= 0.0 || a == b {
        return a;
    }
    let mut out = 0;
    for shift in [0, 8, 16, 24] {
        let ca = ((a >> shift) & 0xFF) as f64;
        let cb = ((b >> shift) & 0xFF) as f64;
        let c = (ca + (cb - ca) * t).round() as u32;
        out |= c.min(0xFF) << shift;
    }
    out
}

/// An image split into `horizontal_tiles × vertical_tiles` square tiles.
///
/// Immutable once built; share it behind an `Arc`.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    tile_size: usize,
    horizontal_tiles: usize,
    vertical_tiles: usize,
    /// row-major
    tiles: Vec<Tile>,
}

impl TextureAtlas {
    /// Cut `image` into `tile_size` tiles, stripping [`OVERLAY_COLOUR`].
    pub fn new(mut image: Texture, tile_size: usize) -> Result<Self, AtlasError> {
        if tile_size == 0 {
            return Err(AtlasError::ZeroTileSize);
        }
        if image.pixels.len() != image.w * image.h {
            return Err(AtlasError::PixelCount {
                expected: image.w * image.h,
                actual: image.pixels.len(),
            });
        }
        if image.w % tile_size != 0 || image.h % tile_size != 0 || image.w == 0 || image.h == 0 {
            return Err(AtlasError::NotDivisible {
                width: image.w,
                height: image.h,
                tile_size,
            });
        }

        for px in image.pixels.iter_mut() {
            if *px & 0x00FF_FFFF == OVERLAY_COLOUR & 0x00FF_FFFF && *px >> 24 != 0 {
                *px = TRANSPARENT;
            }
        }

        let horizontal_tiles = image.w / tile_size;
        let vertical_tiles = image.h / tile_size;
        let mut tiles = Vec::with_capacity(horizontal_tiles * vertical_tiles);
        for row in 0..vertical_tiles {
            for col in 0..horizontal_tiles {
                tiles.push(Tile::cut(&image, col * tile_size, row * tile_size, tile_size));
            }
        }

        tracing::debug!(horizontal_tiles, vertical_tiles, tile_size, "texture atlas built");
        Ok(Self {
            tile_size,
            horizontal_tiles,
            vertical_tiles,
            tiles,
        })
    }

    #[inline]
    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    #[inline]
    pub fn horizontal_tiles(&self) -> usize {
        self.horizontal_tiles
    }

    #[inline]
    pub fn vertical_tiles(&self) -> usize {
        self.vertical_tiles
    }

    /// Bounds-checked tile lookup.
    pub fn get_tile(&self, col: usize, row: usize) -> Result<&Tile, TileLookupError> {
        // check each axis: the flat index alone would wrap into the next row
        if col >= self.horizontal_tiles {
            return Err(TileLookupError::Column {
                col,
                max: self.horizontal_tiles,
            });
        }
        if row >= self.vertical_tiles {
            return Err(TileLookupError::Row {
                row,
                max: self.vertical_tiles,
            });
        }
        Ok(&self.tiles[col + row * self.horizontal_tiles])
    }

    #[inline]
    pub fn tile(&self, idx: TileIndex) -> Result<&Tile, TileLookupError> {
        self.get_tile(idx.col, idx.row)
    }

    /// Strip `x` of tile `(tile_col, tile_row)` stretched to `target_h`.
    pub fn get_scaled_column(
        &self,
        tile_col: usize,
        tile_row: usize,
        x: usize,
        target_h: usize,
    ) -> Result<Vec<Rgba>, TileLookupError> {
        let mut out = Vec::with_capacity(target_h);
        self.get_tile(tile_col, tile_row)?
            .scaled_column_into(x, target_h, 0..target_h as i64, &mut out)?;
        Ok(out)
    }
}

/// Wall atlas column selected by a map symbol (`'0'` → 0, `'7'` → 7).
pub fn tile_for_symbol(symbol: char) -> Result<usize, TileLookupError> {
    symbol
        .to_digit(10)
        .map(|d| d as usize)
        .ok_or(TileLookupError::Symbol(symbol))
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
