use glam::DVec3;

use crate::ViewingRay;

/// One end of a layer.
#[derive(Debug, Clone)]
pub struct LayerBoundary {
    pub position: DVec3,
    pub altitude: f64,
    /// Sparse `(grid index, weight)` pairs reconstructing a grid quantity at this point.
    pub interpolation_weights: Vec<(usize, f64)>,
}

/// The part of a ray between two consecutive boundaries.
#[derive(Debug, Clone)]
pub struct SphericalLayer {
    pub entrance: LayerBoundary,
    pub exit: LayerBoundary,
    /// Path length through the layer (m).
    pub layer_distance: f64,
    pub od_quad_start_fraction: f64,
    pub od_quad_end_fraction: f64,
}

/// A line of sight split into layers, ordered from the observer outward.
#[derive(Debug, Clone)]
pub struct TracedRay {
    pub viewing_ray: ViewingRay,
    pub layers: Vec<SphericalLayer>,
    pub ground_is_hit: bool,
}

impl TracedRay {
    pub fn total_distance(&self) -> f64 {
        self.layers.iter().map(|l| l.layer_distance).sum()
    }
}
