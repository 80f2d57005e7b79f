use thiserror::Error;

use crate::types::Orientation;

#[derive(Debug, Error, PartialEq)]
pub enum IsoError {
    #[error("layer orientation is {0:?}, expected isometric")]
    NotIsometric(Orientation),
    #[error("tile data has {actual} entries, layer needs {expected}")]
    DataLength { expected: usize, actual: usize },
    #[error("tile size {width}x{height} has no area")]
    DegenerateTile { width: f64, height: f64 },
    #[error("cell ({row}, {col}) is outside the layer")]
    OutOfBounds { row: u32, col: u32 },
}
