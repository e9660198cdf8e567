use skyglow_atmosphere::{Atmosphere, AtmosphereStorage};
use skyglow_dual::{Dual, SparseOdDualView};
use skyglow_raytracing::{SphericalLayer, TracedRay};

use crate::{SourceError, SourceTerm, Stokes, MINIMUM_SHELL_SIZE_M};

/// Thermal and chemiluminescent emission of the atmosphere and the surface.
///
/// Emission is unpolarized, only the intensity component of the accumulator is touched.
#[derive(Debug, Clone, Copy)]
pub struct EmissionSource<'a, const N: usize> {
    los_rays: Option<&'a [TracedRay]>,
    atmosphere: Option<&'a Atmosphere>,
}

impl<const N: usize> Default for EmissionSource<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Single scatter albedo and emission interpolated to one layer boundary.
fn boundary_values(
    storage: &AtmosphereStorage,
    interpolation_weights: &[(usize, f64)],
    wavelidx: usize,
) -> (f64, f64) {
    interpolation_weights
        .iter()
        .fold((0.0, 0.0), |(ssa, emission), &(grid, weight)| {
            (
                ssa + storage.ssa(grid, wavelidx) * weight,
                emission + storage.emission_source(grid, wavelidx) * weight,
            )
        })
}

impl<'a, const N: usize> EmissionSource<'a, N> {
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Stokes::<N>::VALID;

        Self {
            los_rays: None,
            atmosphere: None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.los_rays.is_some() && self.atmosphere.is_some()
    }

    /// Both bindings, geometry checked first.
    fn bindings(&self) -> Result<(&'a [TracedRay], &'a Atmosphere), SourceError> {
        let los_rays = self.los_rays.ok_or(SourceError::UnboundGeometry)?;
        let atmosphere = self.atmosphere.ok_or(SourceError::UnboundAtmosphere)?;
        Ok((los_rays, atmosphere))
    }

    /// Integrates assuming the source is constant in the layer, set by the quadrature
    /// weighted average of the two boundaries.
    fn integrated_source_constant(
        &self,
        atmosphere: &Atmosphere,
        wavelidx: usize,
        layer: &SphericalLayer,
        shell_od: &SparseOdDualView,
        source: &mut Dual<N>,
    ) {
        let storage = atmosphere.storage();
        let entrance = &layer.entrance.interpolation_weights;
        let exit = &layer.exit.interpolation_weights;

        let (ssa_start, emission_start) = boundary_values(storage, entrance, wavelidx);
        let (ssa_end, emission_end) = boundary_values(storage, exit, wavelidx);

        let source_factor = 1.0 - shell_od.exp_minus_od;
        let start = (1.0 - ssa_start) * emission_start * layer.od_quad_start_fraction;
        let end = (1.0 - ssa_end) * emission_end * layer.od_quad_end_fraction;

        source.value[0] += source_factor * (start + end);

        if source.deriv.is_empty() || !atmosphere.calculate_derivatives() {
            return;
        }
        debug_assert_eq!(source.deriv.len(), atmosphere.num_deriv());

        // d(1 - exp(-od)) = exp(-od) dod
        for &(p, d_od) in shell_od.deriv {
            source.deriv[p][0] += shell_od.exp_minus_od * d_od * (start + end);
        }

        let boundaries = [
            (entrance, emission_start, ssa_start, layer.od_quad_start_fraction),
            (exit, emission_end, ssa_end, layer.od_quad_end_fraction),
        ];
        for (weights, emission, ssa, fraction) in boundaries {
            for &(grid, weight) in weights.iter() {
                source.deriv[atmosphere.ssa_deriv_index(grid)][0] -=
                    source_factor * weight * emission * fraction;
                source.deriv[atmosphere.emission_deriv_index(grid)][0] +=
                    source_factor * weight * (1.0 - ssa) * fraction;
            }
        }
    }
}

impl<'a, const N: usize> SourceTerm<'a, N> for EmissionSource<'a, N> {
    fn bind_geometry(&mut self, los_rays: &'a [TracedRay]) {
        log::debug!("Emission source bound to {} lines of sight.", los_rays.len());
        self.los_rays = Some(los_rays);
    }

    fn bind_atmosphere(&mut self, atmosphere: &'a Atmosphere) {
        log::debug!(
            "Emission source bound to an atmosphere with {} wavelengths.",
            atmosphere.num_wavel()
        );
        self.atmosphere = Some(atmosphere);
    }

    fn integrated_source(
        &self,
        wavelidx: usize,
        _losidx: usize,
        layeridx: usize,
        _wavel_threadidx: usize,
        _threadidx: usize,
        layer: &SphericalLayer,
        shell_od: &SparseOdDualView,
        source: &mut Dual<N>,
    ) -> Result<(), SourceError> {
        let (_, atmosphere) = self.bindings()?;

        if layer.layer_distance < MINIMUM_SHELL_SIZE_M {
            log::trace!(
                "Skipping layer {} of length {} m.",
                layeridx,
                layer.layer_distance
            );
            return Ok(());
        }

        self.integrated_source_constant(atmosphere, wavelidx, layer, shell_od, source);
        Ok(())
    }

    fn end_of_ray_source(
        &self,
        wavelidx: usize,
        losidx: usize,
        _wavel_threadidx: usize,
        _threadidx: usize,
        source: &mut Dual<N>,
    ) -> Result<(), SourceError> {
        let (los_rays, atmosphere) = self.bindings()?;

        let ray = los_rays
            .get(losidx)
            .ok_or(SourceError::LineOfSightOutOfRange {
                losidx,
                num_los: los_rays.len(),
            })?;

        if ray.ground_is_hit {
            source.value[0] += atmosphere.surface().emission()[wavelidx];

            if !source.deriv.is_empty() && atmosphere.calculate_derivatives() {
                debug_assert_eq!(source.deriv.len(), atmosphere.num_deriv());
                source.deriv[atmosphere.surface_emission_deriv_index()][0] += 1.0;
            }
        }

        Ok(())
    }
}
