use skyglow_atmosphere::Atmosphere;
use skyglow_dual::{Dual, SparseOdDualView};
use skyglow_raytracing::{SphericalLayer, TracedRay};
use thiserror::Error;

pub mod emission;
pub use emission::EmissionSource;

/// Layers shorter than this (m) are rounding leftovers of the ray tracer and contribute nothing.
pub const MINIMUM_SHELL_SIZE_M: f64 = 1e-3;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SourceError {
    #[error("source term used before its geometry was bound")]
    UnboundGeometry,

    #[error("source term used before its atmosphere was bound")]
    UnboundAtmosphere,

    #[error("line of sight {losidx} is out of range, {num_los} rays are bound")]
    LineOfSightOutOfRange { losidx: usize, num_los: usize },
}

/// Compile time check that `N` is a supported number of Stokes components.
pub struct Stokes<const N: usize>;

impl<const N: usize> Stokes<N> {
    pub const VALID: () = assert!(
        N == 1 || N == 3 || N == 4,
        "the number of Stokes components must be 1, 3 or 4"
    );
}

/// A contribution to the radiance along a traced ray.
///
/// Implementations borrow the rays and atmosphere of one batch, bound once before any
/// integration call. Every call only adds into `source`, so terms can be composed in any
/// order over the same accumulator. Thread indices identify the calling worker and may
/// be used to select per-thread scratch storage.
pub trait SourceTerm<'a, const N: usize>: Send + Sync {
    fn bind_geometry(&mut self, los_rays: &'a [TracedRay]);

    fn bind_atmosphere(&mut self, atmosphere: &'a Atmosphere);

    /// Adds the radiance generated inside `layer`, as seen at the layer entrance.
    #[allow(clippy::too_many_arguments)]
    fn integrated_source(
        &self,
        wavelidx: usize,
        losidx: usize,
        layeridx: usize,
        wavel_threadidx: usize,
        threadidx: usize,
        layer: &SphericalLayer,
        shell_od: &SparseOdDualView,
        source: &mut Dual<N>,
    ) -> Result<(), SourceError>;

    /// Adds the radiance leaving the far end of the ray.
    fn end_of_ray_source(
        &self,
        wavelidx: usize,
        losidx: usize,
        wavel_threadidx: usize,
        threadidx: usize,
        source: &mut Dual<N>,
    ) -> Result<(), SourceError>;
}
