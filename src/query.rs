use glam::DVec2;
use tracing::{debug, warn};

use crate::api::TileLayerApi;
use crate::error::IsoError;
use crate::projection::IsoProjection;
use crate::types::*;

/// Tiles that may overlap the world rectangle `(world_x, world_y, width, height)`.
///
/// Seeds an anchor at the rectangle centre and returns every filtered tile in
/// the square neighbourhood of radius [`CANDIDATE_RADIUS`] around it, in
/// row-major order. Over-returns on purpose: the resolver ignores tiles the
/// body does not touch. An anchor far outside the grid yields an empty list.
pub fn tiles_in_rect<L: TileLayerApi + ?Sized>(
    world_x: f64,
    world_y: f64,
    width: f64,
    height: f64,
    filter: QueryFilter,
    layer: &L,
) -> Result<Vec<Tile>, IsoError> {
    let orientation = layer.orientation();
    if orientation != Orientation::Isometric {
        return Err(IsoError::NotIsometric(orientation));
    }
    let projection = IsoProjection::from_layer(layer);
    if projection.is_degenerate() {
        warn!(
            "tile query on degenerate layer ({}x{} px tiles)",
            projection.tile_width, projection.tile_height
        );
        return Ok(Vec::new());
    }
    let center = DVec2::new(world_x + width * 0.5, world_y + height * 0.5);
    let Some(anchor) = projection.world_to_tile(center) else {
        warn!(
            "tile query with non-finite rect ({}, {}, {}, {})",
            world_x, world_y, width, height
        );
        return Ok(Vec::new());
    };

    let out: Vec<Tile> = candidates(layer, anchor)
        .into_iter()
        .filter(|t| filter.accepts(t))
        .collect();
    debug!(
        "tile query at ({:.1}, {:.1}) anchored on {:?}: {} tiles",
        center.x,
        center.y,
        anchor,
        out.len()
    );
    Ok(out)
}

/// Present, non-empty tiles in the clipped neighbourhood of `anchor`.
fn candidates<L: TileLayerApi + ?Sized>(layer: &L, anchor: (i64, i64)) -> Vec<Tile> {
    let (ax, ay) = anchor;
    let (w, h) = (layer.width() as i64, layer.height() as i64);
    let col0 = (ax.saturating_sub(CANDIDATE_RADIUS)).max(0);
    let col1 = (ax.saturating_add(CANDIDATE_RADIUS)).min(w - 1);
    let row0 = (ay.saturating_sub(CANDIDATE_RADIUS)).max(0);
    let row1 = (ay.saturating_add(CANDIDATE_RADIUS)).min(h - 1);

    let mut out = Vec::new();
    for row in row0..=row1 {
        for col in col0..=col1 {
            if let Some(tile) = layer.tile(row as u32, col as u32) {
                if tile.index >= 0 {
                    out.push(*tile);
                }
            }
        }
    }
    out
}
