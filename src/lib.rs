//! isobonk: isometric tilemap geometry (projection, tile queries, body/tile separation)

pub mod types;
pub mod api;
pub mod error;
pub mod projection;
pub mod narrowphase;
pub mod query;
pub mod resolver;
pub mod layer;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::error::IsoError;
pub use crate::narrowphase::Narrowphase;
pub use crate::projection::{tile_corners, IsoProjection};
pub use crate::query::tiles_in_rect;
pub use crate::resolver::{classify, correction, separate, separate_body, separate_tile};
pub use crate::layer::IsoLayer;
