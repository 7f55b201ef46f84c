use crate::components::tilemap::{CollisionCategory, Tile, TileMap, MAX_TILES};
use crate::components::water::Water;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One tile as delivered by the level loader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileData {
    pub tx: u32,
    pub ty: u32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub pattern: u32,
    #[serde(default)]
    pub category: CollisionCategory,
}

/// A level's collision layer, as produced by an external loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    pub tile_width: f32,
    pub tile_height: f32,
    /// World position of the map's top-left corner.
    #[serde(default)]
    pub origin: Vec2,
    #[serde(default)]
    pub tiles: Vec<TileData>,
    /// Initial water line, for levels with water.
    #[serde(default)]
    pub water_level: Option<f32>,
}

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("invalid level data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("level map has no tiles ({width}x{height})")]
    EmptyMap { width: u32, height: u32 },
    #[error("level map of {width}x{height} tiles exceeds the {max} tile limit")]
    TooLarge { width: u32, height: u32, max: usize },
    #[error("tile size {width}x{height} is not positive")]
    InvalidTileSize { width: f32, height: f32 },
    #[error("tile ({tx}, {ty}) lies outside the {width}x{height} grid")]
    TileOutOfGrid { tx: u32, ty: u32, width: u32, height: u32 },
    #[error("tile ({tx}, {ty}) is {found:?}, the map uses {expected:?}")]
    TileSizeMismatch {
        tx: u32,
        ty: u32,
        found: (f32, f32),
        expected: (f32, f32),
    },
}

impl LevelData {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the tile map, rejecting tiles that do not fit the grid.
    pub fn into_map(self) -> Result<TileMap, LevelError> {
        if self.width == 0 || self.height == 0 {
            return Err(LevelError::EmptyMap {
                width: self.width,
                height: self.height,
            });
        }
        if !TileMap::cell_count(self.width, self.height).is_some_and(|count| count <= MAX_TILES) {
            return Err(LevelError::TooLarge {
                width: self.width,
                height: self.height,
                max: MAX_TILES,
            });
        }
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.tile_width) || !positive(self.tile_height) {
            return Err(LevelError::InvalidTileSize {
                width: self.tile_width,
                height: self.tile_height,
            });
        }
        let mut map = TileMap::new(self.width, self.height, self.tile_width, self.tile_height)
            .with_origin(self.origin);
        for tile in &self.tiles {
            if tile.tx >= self.width || tile.ty >= self.height {
                return Err(LevelError::TileOutOfGrid {
                    tx: tile.tx,
                    ty: tile.ty,
                    width: self.width,
                    height: self.height,
                });
            }
            if tile.width != self.tile_width || tile.height != self.tile_height {
                return Err(LevelError::TileSizeMismatch {
                    tx: tile.tx,
                    ty: tile.ty,
                    found: (tile.width, tile.height),
                    expected: (self.tile_width, self.tile_height),
                });
            }
            map.set(tile.tx, tile.ty, Some(Tile::new(tile.pattern, tile.category)));
        }
        log::info!(
            "level loaded: {}x{} tiles, {} placed",
            self.width,
            self.height,
            map.tile_count()
        );
        Ok(map)
    }

    pub fn water(&self) -> Option<Water> {
        self.water_level.map(Water::new)
    }
}
