//! Straight-line ray tracing through the concentric shells of a spherical atmosphere.

mod grid;
pub use grid::*;
mod layer;
pub use layer::*;
mod tracer;
pub use tracer::*;
mod viewing_ray;
pub use viewing_ray::*;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RaytracingError {
    #[error("an altitude grid needs at least two points, got {0}")]
    TooFewAltitudes(usize),

    #[error("altitude grid is not strictly increasing at index {index}")]
    NonIncreasingAltitudes { index: usize },

    #[error("observer at {observer_altitude} m cannot see a tangent point at {tangent_altitude} m")]
    ObserverBelowTangent {
        observer_altitude: f64,
        tangent_altitude: f64,
    },

    #[error("look direction has zero length")]
    DegenerateLookDirection,
}
