use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Tile index meaning "no tile here".
pub const EMPTY_INDEX: i32 = -1;

/// Chebyshev radius (in cells) of the candidate neighbourhood around a query anchor.
pub const CANDIDATE_RADIUS: i64 = 3;

/// One cell of a layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Column in the layer grid.
    pub x: u32,
    /// Row in the layer grid.
    pub y: u32,
    /// `-1` = empty, `0` = blank but present, `> 0` = real tile.
    pub index: i32,
    #[serde(default)]
    pub collides: bool,
    /// At least one edge is collidable and exposed (not shared with a colliding neighbour).
    #[serde(default)]
    pub has_interesting_face: bool,
}

impl Tile {
    /// A non-colliding tile at `(x, y)`.
    pub fn new(x: u32, y: u32, index: i32) -> Self {
        Self {
            x,
            y,
            index,
            collides: false,
            has_interesting_face: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.index == EMPTY_INDEX
    }
}

/// Layer projection tag.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Orthogonal,
    #[default]
    Isometric,
}

/// Semantic filters for tile queries. Flags combine with AND; `false` means
/// "no filtering on that dimension".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryFilter {
    /// Drop tiles whose index is `-1`.
    pub exclude_empty: bool,
    /// Only tiles with `collides` set.
    pub colliding_only: bool,
    /// Only tiles with `has_interesting_face` set.
    pub interesting_face_only: bool,
}

impl QueryFilter {
    /// Filter used by the physics step: colliding tiles only.
    pub fn colliding() -> Self {
        Self {
            colliding_only: true,
            ..Default::default()
        }
    }

    /// Whether `tile` survives this filter. Blank (`0`) and empty (`-1`) tiles never do.
    pub fn accepts(self, tile: &Tile) -> bool {
        tile.index > 0
            && (!self.exclude_empty || tile.index != EMPTY_INDEX)
            && (!self.colliding_only || tile.collides)
            && (!self.interesting_face_only || tile.has_interesting_face)
    }
}

/// World-space diamond of one tile, vertices in clockwise screen order
/// (y grows downward).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TilePolygon {
    pub top: DVec2,
    pub right: DVec2,
    pub bottom: DVec2,
    pub left: DVec2,
}

impl TilePolygon {
    /// Vertices as `[top, right, bottom, left]`.
    pub fn points(&self) -> [DVec2; 4] {
        [self.top, self.right, self.bottom, self.left]
    }

    /// Axis-aligned bounds `(min, max)`.
    pub fn bounds(&self) -> (DVec2, DVec2) {
        let min = self.top.min(self.right).min(self.bottom).min(self.left);
        let max = self.top.max(self.right).max(self.bottom).max(self.left);
        (min, max)
    }

    /// True when the diamond has no area (zero tile width or height, or NaN input).
    pub fn is_degenerate(&self) -> bool {
        let (min, max) = self.bounds();
        !(max.x - min.x > 0.0 && max.y - min.y > 0.0)
    }
}

/// Axis-aligned body rectangle (top-left position, read-only size).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyRect {
    pub position: DVec2,
    pub size: DVec2,
}

impl BodyRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            position: DVec2::new(x, y),
            size: DVec2::new(width, height),
        }
    }

    pub fn min(&self) -> DVec2 {
        self.position
    }

    pub fn max(&self) -> DVec2 {
        self.position + self.size
    }

    pub fn center(&self) -> DVec2 {
        self.position + self.size * 0.5
    }

    pub fn corner(&self, corner: Corner) -> DVec2 {
        let (min, max) = (self.min(), self.max());
        match corner {
            Corner::BottomLeft => DVec2::new(min.x, max.y),
            Corner::TopLeft => min,
            Corner::BottomRight => max,
            Corner::TopRight => DVec2::new(max.x, min.y),
        }
    }

    /// Endpoints of one side, each spanning the full extent of the body.
    pub fn side(&self, side: Side) -> (DVec2, DVec2) {
        let (min, max) = (self.min(), self.max());
        match side {
            Side::Left => (min, DVec2::new(min.x, max.y)),
            Side::Right => (DVec2::new(max.x, min.y), max),
            Side::Top => (min, DVec2::new(max.x, min.y)),
            Side::Bottom => (DVec2::new(min.x, max.y), max),
        }
    }
}

/// Body corner, listed in resolver priority order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    BottomLeft,
    TopLeft,
    BottomRight,
    TopRight,
}

impl Corner {
    pub const PRIORITY: [Corner; 4] = [
        Corner::BottomLeft,
        Corner::TopLeft,
        Corner::BottomRight,
        Corner::TopRight,
    ];
}

/// Body side used by the edge-intersection fallback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    fn bit(self) -> u8 {
        match self {
            Side::Left => 1,
            Side::Right => 1 << 1,
            Side::Top => 1 << 2,
            Side::Bottom => 1 << 3,
        }
    }
}

/// Bitmask of body sides that intersected a tile.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SideSet(u8);

impl SideSet {
    pub const EMPTY: SideSet = SideSet(0);

    pub fn insert(&mut self, side: Side) {
        self.0 |= side.bit();
    }

    pub fn contains(self, side: Side) -> bool {
        (self.0 & side.bit()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = Side> {
        Side::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl FromIterator<Side> for SideSet {
    fn from_iter<I: IntoIterator<Item = Side>>(iter: I) -> Self {
        let mut set = SideSet::EMPTY;
        for side in iter {
            set.insert(side);
        }
        set
    }
}

/// Which resolver case fired for a body/tile pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SeparationOutcome {
    /// No penetration.
    None,
    /// A body corner is strictly inside the diamond (cases 1-4).
    Corner(Corner),
    /// No corner inside, but these body sides cross the diamond.
    Edges(SideSet),
}

/// Resolver result: what fired, and the position correction to apply.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Separation {
    pub outcome: SeparationOutcome,
    /// Add to the body's position to resolve the penetration. Zero for `None`.
    pub delta: DVec2,
}

impl Separation {
    pub const NONE: Separation = Separation {
        outcome: SeparationOutcome::None,
        delta: DVec2::ZERO,
    };

    pub fn collided(&self) -> bool {
        !matches!(self.outcome, SeparationOutcome::None)
    }
}

/// Result of separating one body against every candidate tile of a layer.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LayerCollision {
    pub collided: bool,
    /// Number of tiles that produced a correction.
    pub tiles_hit: usize,
    /// Sum of all corrections applied to the body.
    pub delta: DVec2,
}

/// Numeric tuning for the geometry core.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsoConfig {
    /// Contact tolerance in world units. A corner closer than this to a diamond
    /// edge is not "inside", and a side overlapping by less does not "intersect".
    pub contact_eps: f64,
}

impl Default for IsoConfig {
    fn default() -> Self {
        Self { contact_eps: 1e-9 }
    }
}
