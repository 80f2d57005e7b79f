//! Tile ↔ world mapping for diamond grids.
//!
//! Collision and rendering both place tiles through [`IsoProjection`]; a sprite
//! drawn at [`IsoProjection::tile_top`] lines up with the polygon the resolver
//! separates against.

use glam::DVec2;

use crate::api::TileLayerApi;
use crate::types::TilePolygon;

/// Corners of tile `(tile_x, tile_y)` on a `layer_width × layer_height` grid.
///
/// The grid is shifted right by `max(layer_width, layer_height) * tile_width / 2`
/// so no tile lands at negative world x. The bottom vertex sits a full
/// `tile_height` below the top.
pub fn tile_corners(
    tile_x: i64,
    tile_y: i64,
    layer_width: u32,
    layer_height: u32,
    tile_width: f64,
    tile_height: f64,
) -> TilePolygon {
    IsoProjection::new(layer_width, layer_height, tile_width, tile_height)
        .tile_corners(tile_x, tile_y)
}

/// The four parameters every isometric placement depends on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IsoProjection {
    pub layer_width: u32,
    pub layer_height: u32,
    pub tile_width: f64,
    pub tile_height: f64,
}

impl IsoProjection {
    pub fn new(layer_width: u32, layer_height: u32, tile_width: f64, tile_height: f64) -> Self {
        Self {
            layer_width,
            layer_height,
            tile_width,
            tile_height,
        }
    }

    pub fn from_layer<L: TileLayerApi + ?Sized>(layer: &L) -> Self {
        Self::new(layer.width(), layer.height(), layer.tile_width(), layer.tile_height())
    }

    pub fn big_axis(&self) -> u32 {
        self.layer_width.max(self.layer_height)
    }

    /// Horizontal shift applied to the whole grid.
    pub fn padding_x(&self) -> f64 {
        self.big_axis() as f64 * self.tile_width * 0.5
    }

    /// True when either tile dimension is zero, negative or not finite.
    pub fn is_degenerate(&self) -> bool {
        let valid = |v: f64| v > 0.0 && v.is_finite();
        !(valid(self.tile_width) && valid(self.tile_height))
    }

    /// Top vertex of the tile's diamond.
    pub fn tile_top(&self, tile_x: i64, tile_y: i64) -> DVec2 {
        let hw = self.tile_width * 0.5;
        let hh = self.tile_height * 0.5;
        let (x, y) = (tile_x as f64, tile_y as f64);
        DVec2::new(self.padding_x() + x * hw - y * hw, y * hh + x * hh)
    }

    pub fn tile_corners(&self, tile_x: i64, tile_y: i64) -> TilePolygon {
        let hw = self.tile_width * 0.5;
        let hh = self.tile_height * 0.5;
        let top = self.tile_top(tile_x, tile_y);
        TilePolygon {
            top,
            right: DVec2::new(top.x + hw, top.y + hh),
            bottom: DVec2::new(top.x, top.y + self.tile_height),
            left: DVec2::new(top.x - hw, top.y + hh),
        }
    }

    /// Axis-aligned `(min, max)` of the tile's diamond, for sprite placement and culling.
    pub fn tile_bounds(&self, tile_x: i64, tile_y: i64) -> (DVec2, DVec2) {
        self.tile_corners(tile_x, tile_y).bounds()
    }

    /// Approximate tile under a world point.
    ///
    /// Seeds neighbourhood searches only; callers must not treat it as the
    /// inverse of [`tile_corners`](Self::tile_corners). Returns `None` for
    /// degenerate tile sizes or a non-finite point. The result may lie
    /// outside the grid.
    ///
    /// The diagonal offset is `k = max(width, height) * tile_height / 2`,
    /// the same big axis that sets [`padding_x`](Self::padding_x). Deriving
    /// `k` from the layer height alone would shift the anchor on layers wider
    /// than they are tall; for square layers the two agree.
    pub fn world_to_tile(&self, world: DVec2) -> Option<(i64, i64)> {
        if self.is_degenerate() {
            return None;
        }
        let ratio = self.tile_height / self.tile_width;
        let k = self.big_axis() as f64 * self.tile_height * 0.5;
        let a = world.x * ratio + world.y - k;
        let b = -world.x * ratio + world.y + k;
        let tx = (a / self.tile_height).floor();
        let ty = (b / self.tile_height).floor();
        if !tx.is_finite() || !ty.is_finite() {
            return None;
        }
        Some((tx as i64, ty as i64))
    }
}
