pub mod camera;
pub mod geometry;
pub mod map;
pub mod march;
pub mod texture;

pub use camera::Camera;

pub use map::{EMPTY, MapError, TileMap};

pub use march::{Axes, Crossing, GridMarch, has_los};

pub use texture::{
    AtlasError, Rgba, Texture, TextureAtlas, Tile, TileIndex, TileLookupError, tile_for_symbol,
};
