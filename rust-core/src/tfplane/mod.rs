//! Time-frequency plane: geometry, tiling, projection and scoring

pub mod plane;
pub mod tiling;
pub mod projector;
pub mod scorer;

pub use plane::{PlaneParams, TfPlane};
pub use tiling::{Tile, Tiles};
pub use projector::Projector;
pub use scorer::compute_excess_power;
