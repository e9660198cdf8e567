use std::time::Instant;

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use skyglow_atmosphere::Atmosphere;
use skyglow_dual::{Dual, ScalarDual, SparseOdDual};
use skyglow_raytracing::{SphericalLayer, TracedRay};
use skyglow_source::{EmissionSource, SourceError, SourceTerm};

use crate::{Config, EmissionSourceType, IntegratorError, Radiance};

type SourceTerms<'a, const N: usize> = Vec<Box<dyn SourceTerm<'a, N> + 'a>>;

/// Integrates the configured source terms along traced rays.
///
/// Layers are walked from the observer outward. Each layer's sources are attenuated by
/// the transmission accumulated between the observer and the layer entrance.
pub struct SourceIntegrator<const N: usize> {
    config: Config,
}

impl<const N: usize> SourceIntegrator<N> {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn source_terms<'a>(&self) -> SourceTerms<'a, N> {
        let mut terms: SourceTerms<'a, N> = Vec::new();

        match self.config.emission_source {
            EmissionSourceType::Standard => terms.push(Box::new(EmissionSource::<N>::new())),
            EmissionSourceType::None => {}
        }

        terms
    }

    fn validate(atmosphere: &Atmosphere, rays: &[TracedRay]) -> Result<(), IntegratorError> {
        let num_geometry = atmosphere.num_geometry();

        for (losidx, ray) in rays.iter().enumerate() {
            let out_of_range = ray
                .layers
                .iter()
                .flat_map(|l| {
                    l.entrance
                        .interpolation_weights
                        .iter()
                        .chain(l.exit.interpolation_weights.iter())
                })
                .find(|(grid, _)| *grid >= num_geometry);

            if let Some(&(grid, _)) = out_of_range {
                return Err(IntegratorError::GridIndexOutOfRange {
                    losidx,
                    grid,
                    num_geometry,
                });
            }
        }

        Ok(())
    }

    /// Radiance at the observer of every ray, for every wavelength of `atmosphere`.
    pub fn integrate<'a>(
        &self,
        atmosphere: &'a Atmosphere,
        rays: &'a [TracedRay],
    ) -> Result<Radiance<N>, IntegratorError> {
        skyglow_profiling::profile_function!();

        let start = Instant::now();
        Self::validate(atmosphere, rays)?;

        let mut terms = self.source_terms();
        for term in terms.iter_mut() {
            term.bind_geometry(rays);
            term.bind_atmosphere(atmosphere);
        }

        let num_deriv = if self.config.calculate_derivatives {
            if !atmosphere.calculate_derivatives() {
                log::warn!("Derivatives requested but the atmosphere does not provide them.");
            }
            atmosphere.num_deriv()
        } else {
            0
        };

        log::debug!(
            "Integrating {} source terms over {} wavelengths and {} lines of sight ({} derivatives).",
            terms.len(),
            atmosphere.num_wavel(),
            rays.len(),
            num_deriv
        );

        let integrate_all = || {
            (0..atmosphere.num_wavel())
                .into_par_iter()
                .map(|wavelidx| {
                    Self::integrate_wavelength(&terms, atmosphere, rays, wavelidx, num_deriv)
                })
                .collect::<Result<Vec<Vec<Dual<N>>>, SourceError>>()
        };

        let per_wavel = if self.config.num_threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.num_threads)
                .build()?
                .install(integrate_all)
        } else {
            integrate_all()
        }?;

        log::info!(
            "Integrated {} rays in {:.3}ms.",
            atmosphere.num_wavel() * rays.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        skyglow_profiling::finish_batch();

        Ok(Radiance::new(
            rays.len(),
            per_wavel.into_iter().flatten().collect(),
        ))
    }

    fn integrate_wavelength<'a>(
        terms: &[Box<dyn SourceTerm<'a, N> + 'a>],
        atmosphere: &Atmosphere,
        rays: &[TracedRay],
        wavelidx: usize,
        num_deriv: usize,
    ) -> Result<Vec<Dual<N>>, SourceError> {
        skyglow_profiling::profile_scope!("integrate_wavelength");

        let threadidx = rayon::current_thread_index().unwrap_or(0);

        let mut transmission = ScalarDual::one(num_deriv);
        let mut layer_source = Dual::<N>::new(num_deriv);
        let mut shell_od = SparseOdDual::new();

        rays.iter()
            .enumerate()
            .map(|(losidx, ray)| -> Result<Dual<N>, SourceError> {
                let mut radiance = Dual::<N>::new(num_deriv);
                transmission.reset_to_one();

                for (layeridx, layer) in ray.layers.iter().enumerate() {
                    layer_optical_depth(
                        atmosphere,
                        wavelidx,
                        layer,
                        num_deriv > 0,
                        &mut shell_od,
                    );
                    let od = shell_od.view();

                    layer_source.set_zero();
                    for term in terms {
                        term.integrated_source(
                            wavelidx,
                            losidx,
                            layeridx,
                            threadidx,
                            threadidx,
                            layer,
                            &od,
                            &mut layer_source,
                        )?;
                    }

                    radiance.add_attenuated(&layer_source, &transmission);
                    transmission.attenuate(&od);
                }

                if ray.ground_is_hit {
                    layer_source.set_zero();
                    for term in terms {
                        term.end_of_ray_source(
                            wavelidx,
                            losidx,
                            threadidx,
                            threadidx,
                            &mut layer_source,
                        )?;
                    }
                    radiance.add_attenuated(&layer_source, &transmission);
                }

                Ok(radiance)
            })
            .collect()
    }
}

/// Optical depth of `layer` from the quadrature weighted boundary extinctions.
fn layer_optical_depth(
    atmosphere: &Atmosphere,
    wavelidx: usize,
    layer: &SphericalLayer,
    calculate_derivatives: bool,
    shell_od: &mut SparseOdDual,
) {
    shell_od.clear();

    let boundaries = [
        (&layer.entrance.interpolation_weights, layer.od_quad_start_fraction),
        (&layer.exit.interpolation_weights, layer.od_quad_end_fraction),
    ];

    for (weights, fraction) in boundaries {
        for &(grid, weight) in weights.iter() {
            let d_od = layer.layer_distance * fraction * weight;
            shell_od.od += atmosphere.storage().extinction(grid, wavelidx) * d_od;

            if calculate_derivatives {
                shell_od
                    .deriv
                    .push((atmosphere.extinction_deriv_index(grid), d_od));
            }
        }
    }
}
