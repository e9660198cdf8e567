use crate::{AtmosphereError, AtmosphereStorage, Surface};

/// The immutable atmospheric state shared by every worker during one batch.
///
/// When derivatives are enabled the parameters are laid out as
/// `[extinction; G] [ssa; G] [emission; G] [surface emission]` for `G` grid points.
#[derive(Debug, Clone)]
pub struct Atmosphere {
    storage: AtmosphereStorage,
    surface: Surface,
    calculate_derivatives: bool,
}

impl Atmosphere {
    pub fn new(storage: AtmosphereStorage, surface: Surface) -> Result<Self, AtmosphereError> {
        if surface.emission().len() != storage.num_wavel() {
            return Err(AtmosphereError::WavelengthMismatch {
                surface: surface.emission().len(),
                atmosphere: storage.num_wavel(),
            });
        }

        let mut result = Ok(());
        storage.for_each(|grid, wavel, extinction, ssa, emission| {
            if result.is_err() {
                return;
            }

            if !(0.0..=1.0).contains(&ssa) {
                result = Err(AtmosphereError::InvalidSsa {
                    grid,
                    wavel,
                    value: ssa,
                });
            } else if !extinction.is_finite() || extinction < 0.0 {
                result = Err(AtmosphereError::InvalidValue {
                    quantity: "extinction",
                    grid,
                    wavel,
                    value: extinction,
                });
            } else if !emission.is_finite() || emission < 0.0 {
                result = Err(AtmosphereError::InvalidValue {
                    quantity: "emission source",
                    grid,
                    wavel,
                    value: emission,
                });
            }
        });
        result?;

        if let Some((wavel, &value)) = surface
            .emission()
            .iter()
            .enumerate()
            .find(|(_, e)| !e.is_finite() || **e < 0.0)
        {
            return Err(AtmosphereError::InvalidSurfaceEmission { wavel, value });
        }

        log::debug!(
            "Atmosphere with {} grid points and {} wavelengths.",
            storage.num_geometry(),
            storage.num_wavel()
        );

        Ok(Self {
            storage,
            surface,
            calculate_derivatives: false,
        })
    }

    pub fn with_derivatives(mut self, calculate_derivatives: bool) -> Self {
        self.calculate_derivatives = calculate_derivatives;
        self
    }

    pub fn storage(&self) -> &AtmosphereStorage {
        &self.storage
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn num_geometry(&self) -> usize {
        self.storage.num_geometry()
    }

    pub fn num_wavel(&self) -> usize {
        self.storage.num_wavel()
    }

    pub fn calculate_derivatives(&self) -> bool {
        self.calculate_derivatives
    }

    /// Length of every derivative block computed against this atmosphere.
    pub fn num_deriv(&self) -> usize {
        if self.calculate_derivatives {
            3 * self.num_geometry() + 1
        } else {
            0
        }
    }

    pub fn extinction_deriv_index(&self, grid: usize) -> usize {
        grid
    }

    pub fn ssa_deriv_index(&self, grid: usize) -> usize {
        self.num_geometry() + grid
    }

    pub fn emission_deriv_index(&self, grid: usize) -> usize {
        2 * self.num_geometry() + grid
    }

    pub fn surface_emission_deriv_index(&self) -> usize {
        3 * self.num_geometry()
    }
}
