//! Tile grid with collision categories.
//!
//! Tiles are stored in row-major order (index = ty * width + tx). Row 0 is the
//! top row and world y grows downward from `origin`. The map never changes
//! while a level runs.
//!
//! Probes answer "which surface does this footprint hit when it moves by at
//! most `reach` along one axis". Out-of-grid cells have no tile, so an entity
//! walking off the edge of the map simply falls.

use crate::core::geometry::Rect;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Tolerance for treating a feet line as resting on a surface.
pub const SNAP_EPSILON: f32 = 1e-3;
/// Largest grid a map may hold, in tiles.
pub const MAX_TILES: usize = 1 << 24;

/// Collision behaviour of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionCategory {
    /// Decorative, no collision.
    #[default]
    None,
    /// One-way floor: supports from above, passable from below and the sides.
    Ground,
    /// Solid from every direction.
    Wall,
    /// Floor that hurts whoever stands on it.
    Hazard,
    /// Floor rising toward +x.
    SlopeUpRight,
    /// Floor rising toward -x.
    SlopeUpLeft,
}

impl CollisionCategory {
    /// Supports a body coming from above.
    pub fn is_floor(self) -> bool {
        !matches!(self, CollisionCategory::None)
    }

    /// Blocks bodies moving up or sideways.
    pub fn is_solid(self) -> bool {
        matches!(self, CollisionCategory::Wall)
    }

    pub fn is_slope(self) -> bool {
        matches!(
            self,
            CollisionCategory::SlopeUpRight | CollisionCategory::SlopeUpLeft
        )
    }

    pub fn is_hazard(self) -> bool {
        matches!(self, CollisionCategory::Hazard)
    }
}

/// A single tile. Grid coordinates are stamped by `TileMap::set`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub tx: u32,
    pub ty: u32,
    /// Graphic pattern index, opaque to the simulation.
    pub pattern: u32,
    pub category: CollisionCategory,
}

impl Tile {
    pub fn new(pattern: u32, category: CollisionCategory) -> Self {
        Self {
            tx: 0,
            ty: 0,
            pattern,
            category,
        }
    }
}

/// A blocking tile edge found by a probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub tx: u32,
    pub ty: u32,
    pub category: CollisionCategory,
    /// World coordinate of the blocking edge along the probed axis.
    pub position: f32,
}

/// Tile grid.
#[derive(Debug, Clone)]
pub struct TileMap {
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    pub tile_width: f32,
    pub tile_height: f32,
    /// World position of the top-left corner of tile (0, 0).
    pub origin: Vec2,
    tiles: Vec<Option<Tile>>,
}

impl TileMap {
    /// Create a new empty map.
    ///
    /// # Panics
    ///
    /// If the grid holds more than `MAX_TILES` tiles. Level data goes
    /// through `LevelData::into_map`, which rejects such grids first.
    pub fn new(width: u32, height: u32, tile_width: f32, tile_height: f32) -> Self {
        debug_assert!(tile_width > 0.0 && tile_height > 0.0, "tile size must be positive");
        let count = match Self::cell_count(width, height) {
            Some(count) if count <= MAX_TILES => count,
            _ => panic!("{width}x{height} tiles exceed the {MAX_TILES} tile limit"),
        };
        Self {
            width,
            height,
            tile_width,
            tile_height,
            origin: Vec2::ZERO,
            tiles: vec![None; count],
        }
    }

    /// Number of cells of a `width` x `height` grid, if it fits in memory.
    pub fn cell_count(width: u32, height: u32) -> Option<usize> {
        (width as usize).checked_mul(height as usize)
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    /// Tile at grid position (tx, ty).
    pub fn get(&self, tx: u32, ty: u32) -> Option<&Tile> {
        if tx >= self.width || ty >= self.height {
            return None;
        }
        self.tiles[self.index(tx, ty)].as_ref()
    }

    /// Set a tile at grid position (tx, ty). Out-of-grid writes are ignored.
    pub fn set(&mut self, tx: u32, ty: u32, tile: Option<Tile>) {
        if tx < self.width && ty < self.height {
            let index = self.index(tx, ty);
            self.tiles[index] = tile.map(|t| Tile { tx, ty, ..t });
        }
    }

    fn index(&self, tx: u32, ty: u32) -> usize {
        ty as usize * self.width as usize + tx as usize
    }

    /// Fill a rectangular region with a tile.
    pub fn fill_rect(&mut self, tx: u32, ty: u32, w: u32, h: u32, tile: Option<Tile>) {
        for y in ty..ty.saturating_add(h).min(self.height) {
            for x in tx..tx.saturating_add(w).min(self.width) {
                self.set(x, y, tile);
            }
        }
    }

    /// World-space bounds of the grid.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin,
            self.origin
                + Vec2::new(
                    self.width as f32 * self.tile_width,
                    self.height as f32 * self.tile_height,
                ),
        )
    }

    /// Convert a world position to grid coordinates.
    pub fn world_to_tile(&self, world_pos: Vec2) -> Option<(u32, u32)> {
        let tx = self.column(world_pos.x);
        let ty = self.row(world_pos.y);
        if tx < 0 || ty < 0 || tx >= self.width as i64 || ty >= self.height as i64 {
            return None;
        }
        Some((tx as u32, ty as u32))
    }

    /// World position of a tile's top-left corner.
    pub fn tile_origin(&self, tx: u32, ty: u32) -> Vec2 {
        self.origin + Vec2::new(tx as f32 * self.tile_width, ty as f32 * self.tile_height)
    }

    /// World position of a tile's centre.
    pub fn tile_to_world(&self, tx: u32, ty: u32) -> Vec2 {
        self.tile_origin(tx, ty) + Vec2::new(self.tile_width, self.tile_height) * 0.5
    }

    /// Tile covering a world position.
    pub fn tile_at(&self, world_pos: Vec2) -> Option<&Tile> {
        let (tx, ty) = self.world_to_tile(world_pos)?;
        self.get(tx, ty)
    }

    /// Count of non-empty tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    /// Total capacity in tiles.
    pub fn capacity(&self) -> usize {
        self.tiles.len()
    }

    /// Height of a tile's walkable surface at world x.
    pub fn surface_height(&self, tile: &Tile, x: f32) -> f32 {
        let corner = self.tile_origin(tile.tx, tile.ty);
        let t = ((x - corner.x) / self.tile_width).clamp(0.0, 1.0);
        match tile.category {
            CollisionCategory::SlopeUpRight => corner.y + self.tile_height * (1.0 - t),
            CollisionCategory::SlopeUpLeft => corner.y + self.tile_height * t,
            _ => corner.y,
        }
    }

    // -- Probes --

    /// Nearest blocking surface when `rect` moves vertically by at most
    /// `reach`. `dir > 0` probes downward (floors), otherwise upward
    /// (ceilings).
    pub fn probe_vertical(&self, rect: &Rect, dir: f32, reach: f32) -> Option<Surface> {
        if dir > 0.0 {
            self.probe_down(rect, reach.max(0.0))
        } else {
            self.probe_up(rect, reach.max(0.0))
        }
    }

    /// Nearest wall when `rect` moves horizontally by at most `reach`.
    /// `dir > 0` probes to the right, otherwise to the left.
    pub fn probe_horizontal(&self, rect: &Rect, dir: f32, reach: f32) -> Option<Surface> {
        let reach = reach.max(0.0);
        let (r0, r1) = span(
            self.row(rect.min.y + SNAP_EPSILON),
            self.row(rect.max.y - SNAP_EPSILON),
            self.height,
        )?;
        if dir > 0.0 {
            let edge = rect.max.x;
            let (c0, c1) = span(self.column(edge), self.column(edge + reach), self.width)?;
            (c0..=c1).find_map(|tx| {
                let x = self.tile_origin(tx, 0).x;
                if x < edge - SNAP_EPSILON || x > edge + reach {
                    return None;
                }
                self.solid_in_column(tx, r0, r1, x)
            })
        } else {
            let edge = rect.min.x;
            let (c0, c1) = span(self.column(edge - reach), self.column(edge), self.width)?;
            (c0..=c1).rev().find_map(|tx| {
                let x = self.tile_origin(tx, 0).x + self.tile_width;
                if x > edge + SNAP_EPSILON || x < edge - reach {
                    return None;
                }
                self.solid_in_column(tx, r0, r1, x)
            })
        }
    }

    fn solid_in_column(&self, tx: u32, r0: u32, r1: u32, position: f32) -> Option<Surface> {
        (r0..=r1).find_map(|ty| {
            let tile = self.get(tx, ty)?;
            tile.category.is_solid().then_some(Surface {
                tx,
                ty,
                category: tile.category,
                position,
            })
        })
    }

    fn probe_down(&self, rect: &Rect, reach: f32) -> Option<Surface> {
        let feet = rect.max.y;
        let step = self.tile_height * 0.5;
        let (c0, c1) = self.columns_of(rect)?;
        let (r0, r1) = span(self.row(feet - step), self.row(feet + reach), self.height)?;
        let probe_x = rect.center().x;
        for ty in r0..=r1 {
            let mut best: Option<Surface> = None;
            for tx in c0..=c1 {
                let Some(tile) = self.get(tx, ty) else {
                    continue;
                };
                if !tile.category.is_floor() {
                    continue;
                }
                // Slopes accept feet up to half a tile below their surface
                let (y, tolerance) = if tile.category.is_slope() {
                    (self.surface_height(tile, probe_x), step)
                } else {
                    (self.surface_height(tile, probe_x), SNAP_EPSILON)
                };
                if y < feet - tolerance || y > feet + reach {
                    continue;
                }
                if best.map_or(true, |b| y < b.position) {
                    best = Some(Surface {
                        tx,
                        ty,
                        category: tile.category,
                        position: y,
                    });
                }
            }
            if best.is_some() {
                return best;
            }
        }
        None
    }

    fn probe_up(&self, rect: &Rect, reach: f32) -> Option<Surface> {
        let head = rect.min.y;
        let (c0, c1) = self.columns_of(rect)?;
        let (r0, r1) = span(self.row(head - reach), self.row(head), self.height)?;
        for ty in (r0..=r1).rev() {
            let bottom = self.tile_origin(0, ty).y + self.tile_height;
            if bottom > head + SNAP_EPSILON || bottom < head - reach {
                continue;
            }
            let hit = (c0..=c1).find_map(|tx| {
                let tile = self.get(tx, ty)?;
                tile.category.is_solid().then_some(Surface {
                    tx,
                    ty,
                    category: tile.category,
                    position: bottom,
                })
            });
            if hit.is_some() {
                return hit;
            }
        }
        None
    }

    fn columns_of(&self, rect: &Rect) -> Option<(u32, u32)> {
        span(
            self.column(rect.min.x + SNAP_EPSILON),
            self.column(rect.max.x - SNAP_EPSILON),
            self.width,
        )
    }

    fn column(&self, x: f32) -> i64 {
        ((x - self.origin.x) / self.tile_width).floor() as i64
    }

    fn row(&self, y: f32) -> i64 {
        ((y - self.origin.y) / self.tile_height).floor() as i64
    }
}

/// Clamp an inclusive index range into `0..len`.
fn span(lo: i64, hi: i64, len: u32) -> Option<(u32, u32)> {
    let lo = lo.max(0);
    let hi = hi.min(len as i64 - 1);
    if lo > hi {
        None
    } else {
        Some((lo as u32, hi as u32))
    }
}
