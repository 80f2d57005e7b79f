use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{BodyApi, TileLayerApi};
use crate::error::IsoError;
use crate::projection::IsoProjection;
use crate::query;
use crate::resolver;
use crate::types::*;

/// Owned tile grid. Cells are stored row-major; a cell may be absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LayerData", into = "LayerData")]
pub struct IsoLayer {
    width: u32,
    height: u32,
    tile_width: f64,
    tile_height: f64,
    orientation: Orientation,
    tiles: Vec<Option<Tile>>,
}

/// Serialized form of [`IsoLayer`]; validated on the way in.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct LayerData {
    width: u32,
    height: u32,
    tile_width: f64,
    tile_height: f64,
    #[serde(default)]
    orientation: Orientation,
    /// Row-major tile indices; `null` for absent cells.
    data: Vec<Option<i32>>,
    /// Row-major per-cell collision flags. Wins over `collision`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    collides: Option<Vec<bool>>,
    /// Row-major per-cell interesting-face flags. Recomputed when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    faces: Option<Vec<bool>>,
    /// Tile indices that collide, for hand-written maps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    collision: Vec<i32>,
}

impl TryFrom<LayerData> for IsoLayer {
    type Error = IsoError;

    fn try_from(raw: LayerData) -> Result<Self, Self::Error> {
        let mut layer = IsoLayer::new(raw.width, raw.height, raw.tile_width, raw.tile_height)?
            .with_orientation(raw.orientation);
        let cells = layer.tiles.len();
        let lengths = [
            Some(raw.data.len()),
            raw.collides.as_ref().map(Vec::len),
            raw.faces.as_ref().map(Vec::len),
        ];
        if let Some(actual) = lengths.into_iter().flatten().find(|&n| n != cells) {
            return Err(IsoError::DataLength { expected: cells, actual });
        }

        for (i, index) in raw.data.iter().enumerate() {
            if let Some(index) = *index {
                let (row, col) = (i as u32 / raw.width, i as u32 % raw.width);
                layer.tiles[i] = Some(Tile::new(col, row, index));
            }
        }
        match &raw.collides {
            Some(flags) => {
                for (tile, &flag) in layer.tiles.iter_mut().zip(flags) {
                    if let Some(tile) = tile {
                        tile.collides = flag;
                    }
                }
                layer.recalculate_faces();
            }
            None => layer.set_collision(&raw.collision),
        }
        if let Some(faces) = &raw.faces {
            for (tile, &face) in layer.tiles.iter_mut().zip(faces) {
                if let Some(tile) = tile {
                    tile.has_interesting_face = face;
                }
            }
        }
        debug!("loaded {}x{} layer", raw.width, raw.height);
        Ok(layer)
    }
}

impl From<IsoLayer> for LayerData {
    fn from(layer: IsoLayer) -> Self {
        let flag = |f: fn(&Tile) -> bool| -> Vec<bool> {
            layer.tiles.iter().map(|t| t.as_ref().is_some_and(f)).collect()
        };
        let collides = flag(|t| t.collides);
        let faces = flag(|t| t.has_interesting_face);
        LayerData {
            width: layer.width,
            height: layer.height,
            tile_width: layer.tile_width,
            tile_height: layer.tile_height,
            orientation: layer.orientation,
            data: layer.tiles.iter().map(|t| t.map(|t| t.index)).collect(),
            collides: Some(collides),
            faces: Some(faces),
            collision: Vec::new(),
        }
    }
}

impl IsoLayer {
    /// Isometric layer with every cell absent.
    pub fn new(
        width: u32,
        height: u32,
        tile_width: f64,
        tile_height: f64,
    ) -> Result<Self, IsoError> {
        let valid = |v: f64| v > 0.0 && v.is_finite();
        if !(valid(tile_width) && valid(tile_height)) {
            return Err(IsoError::DegenerateTile {
                width: tile_width,
                height: tile_height,
            });
        }
        Ok(Self {
            width,
            height,
            tile_width,
            tile_height,
            orientation: Orientation::Isometric,
            tiles: vec![None; width as usize * height as usize],
        })
    }

    /// Layer built from row-major tile indices. Every cell is present, empty
    /// cells carry index `-1`.
    pub fn from_indices(
        width: u32,
        height: u32,
        tile_width: f64,
        tile_height: f64,
        indices: &[i32],
    ) -> Result<Self, IsoError> {
        let mut layer = Self::new(width, height, tile_width, tile_height)?;
        if indices.len() != layer.tiles.len() {
            return Err(IsoError::DataLength {
                expected: layer.tiles.len(),
                actual: indices.len(),
            });
        }
        for (i, &index) in indices.iter().enumerate() {
            let (row, col) = (i as u32 / width, i as u32 % width);
            layer.tiles[i] = Some(Tile::new(col, row, index));
        }
        debug!("built {}x{} layer with {} tiles", width, height, indices.len());
        Ok(layer)
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    fn slot(&self, row: u32, col: u32) -> Option<usize> {
        (row < self.height && col < self.width)
            .then(|| row as usize * self.width as usize + col as usize)
    }

    fn slot_or_err(&self, row: u32, col: u32) -> Result<usize, IsoError> {
        self.slot(row, col).ok_or(IsoError::OutOfBounds { row, col })
    }

    pub fn tile_mut(&mut self, row: u32, col: u32) -> Option<&mut Tile> {
        let i = self.slot(row, col)?;
        self.tiles[i].as_mut()
    }

    /// Place a tile with `index` at `(row, col)`, replacing whatever was there.
    pub fn set_tile(&mut self, row: u32, col: u32, index: i32) -> Result<&mut Tile, IsoError> {
        let i = self.slot_or_err(row, col)?;
        Ok(self.tiles[i].insert(Tile::new(col, row, index)))
    }

    /// Remove the tile at `(row, col)`, returning it.
    pub fn clear_tile(&mut self, row: u32, col: u32) -> Result<Option<Tile>, IsoError> {
        let i = self.slot_or_err(row, col)?;
        Ok(self.tiles[i].take())
    }

    /// Mark every tile whose index is in `indices` as colliding, then
    /// recompute interesting faces.
    pub fn set_collision(&mut self, indices: &[i32]) {
        for tile in self.tiles.iter_mut().flatten() {
            tile.collides = indices.contains(&tile.index);
        }
        self.recalculate_faces();
    }

    /// A colliding tile has an interesting face when at least one of its four
    /// grid neighbours is absent or does not collide.
    pub fn recalculate_faces(&mut self) {
        let solid = |layer: &Self, row: i64, col: i64| -> bool {
            if row < 0 || col < 0 {
                return false;
            }
            layer
                .tile(row as u32, col as u32)
                .is_some_and(|t| t.collides)
        };
        let mut faces = vec![false; self.tiles.len()];
        for (i, tile) in self.tiles.iter().enumerate() {
            let Some(tile) = tile else { continue };
            if !tile.collides {
                continue;
            }
            let (row, col) = (tile.y as i64, tile.x as i64);
            faces[i] = !solid(self, row - 1, col)
                || !solid(self, row + 1, col)
                || !solid(self, row, col - 1)
                || !solid(self, row, col + 1);
        }
        for (tile, face) in self.tiles.iter_mut().zip(faces) {
            if let Some(tile) = tile {
                tile.has_interesting_face = face;
            }
        }
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }

    pub fn projection(&self) -> IsoProjection {
        IsoProjection::from_layer(self)
    }

    pub fn tile_polygon(&self, tile: &Tile) -> TilePolygon {
        self.projection().tile_corners(tile.x as i64, tile.y as i64)
    }

    /// See [`query::tiles_in_rect`].
    pub fn tiles_in_rect(
        &self,
        min: DVec2,
        size: DVec2,
        filter: QueryFilter,
    ) -> Result<Vec<Tile>, IsoError> {
        query::tiles_in_rect(min.x, min.y, size.x, size.y, filter, self)
    }

    /// Shortlist tiles under `body` and separate it from each one in turn.
    ///
    /// Corrections are applied as they are found, so later tiles see the
    /// already-moved body.
    pub fn collide_body<B: BodyApi + ?Sized>(
        &self,
        body: &mut B,
        filter: QueryFilter,
        cfg: &IsoConfig,
    ) -> Result<LayerCollision, IsoError> {
        let rect = body.rect();
        let candidates = self.tiles_in_rect(rect.position, rect.size, filter)?;
        let projection = self.projection();
        let mut out = LayerCollision::default();
        for tile in &candidates {
            let before = body.position();
            if resolver::separate_tile(body, tile, &projection, cfg) {
                out.tiles_hit += 1;
                out.delta += body.position() - before;
            }
        }
        out.collided = out.tiles_hit > 0;
        debug!(
            "body at {:?}: {} candidates, {} hit, moved {:?}",
            rect.position,
            candidates.len(),
            out.tiles_hit,
            out.delta
        );
        Ok(out)
    }
}

impl TileLayerApi for IsoLayer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn tile_width(&self) -> f64 {
        self.tile_width
    }

    fn tile_height(&self) -> f64 {
        self.tile_height
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn tile(&self, row: u32, col: u32) -> Option<&Tile> {
        let i = self.slot(row, col)?;
        self.tiles[i].as_ref()
    }
}
