use glam::DVec2;

use crate::types::*;

/// Read access to a tile grid. Implemented by [`IsoLayer`](crate::IsoLayer);
/// engines with their own layer storage implement it to use the queries.
pub trait TileLayerApi {
    /// Columns.
    fn width(&self) -> u32;
    /// Rows.
    fn height(&self) -> u32;
    /// Tile width in world pixels.
    fn tile_width(&self) -> f64;
    /// Tile height in world pixels.
    fn tile_height(&self) -> f64;
    fn orientation(&self) -> Orientation;
    /// The tile at `(row, col)`, or `None` for an absent cell or out of bounds.
    fn tile(&self, row: u32, col: u32) -> Option<&Tile>;

    /// Padding basis for the projected grid: `max(width, height)`.
    fn big_axis(&self) -> u32 {
        self.width().max(self.height())
    }
}

/// A physics body the resolver can push around. Only the position is written.
pub trait BodyApi {
    /// Top-left corner in world pixels.
    fn position(&self) -> DVec2;
    fn set_position(&mut self, position: DVec2);
    /// Width and height; never changed by separation.
    fn size(&self) -> DVec2;

    fn rect(&self) -> BodyRect {
        BodyRect {
            position: self.position(),
            size: self.size(),
        }
    }
}

impl BodyApi for BodyRect {
    fn position(&self) -> DVec2 {
        self.position
    }

    fn set_position(&mut self, position: DVec2) {
        self.position = position;
    }

    fn size(&self) -> DVec2 {
        self.size
    }
}

/// Primitive intersection tests used by the resolver. Polygons are convex and
/// given as an ordered vertex loop (either winding).
pub trait NarrowphaseApi {
    /// Strictly inside: points within `eps` of an edge are outside.
    fn point_in_convex_polygon(p: DVec2, poly: &[DVec2], eps: f64) -> bool;

    /// Segment `a..b` and polygon overlap by more than `eps` on every separating axis.
    fn segment_polygon_overlap(a: DVec2, b: DVec2, poly: &[DVec2], eps: f64) -> bool;

    /// Min/max boxes overlap by more than `eps` on both axes.
    fn overlap_aabb_aabb(min0: DVec2, max0: DVec2, min1: DVec2, max1: DVec2, eps: f64) -> bool;
}
