mod atmosphere;
pub use atmosphere::*;
mod storage;
pub use storage::*;
mod surface;
pub use surface::*;

use thiserror::Error;

/// Speed of light (m/s)
pub const C: f64 = 299_792_458.0;

/// Planck's constant (J·s)
pub const H: f64 = 6.626_070_15e-34;

/// Boltzmann's constant (J/K)
pub const KB: f64 = 1.380_649e-23;

#[derive(Debug, Error, PartialEq)]
pub enum AtmosphereError {
    #[error("surface has {surface} wavelengths but the atmosphere has {atmosphere}")]
    WavelengthMismatch { surface: usize, atmosphere: usize },

    #[error("single scatter albedo {value} at grid point {grid}, wavelength {wavel} is outside [0, 1]")]
    InvalidSsa { grid: usize, wavel: usize, value: f64 },

    #[error("{quantity} {value} at grid point {grid}, wavelength {wavel} must be finite and non-negative")]
    InvalidValue {
        quantity: &'static str,
        grid: usize,
        wavel: usize,
        value: f64,
    },

    #[error("surface emission {value} at wavelength {wavel} must be finite and non-negative")]
    InvalidSurfaceEmission { wavel: usize, value: f64 },
}

/// Spectral radiance (W / m^2 / sr / m) of a black body at `temperature_k` for a wavelength in nm.
pub fn planck_radiance(wavelength_nm: f64, temperature_k: f64) -> f64 {
    if temperature_k <= 0.0 {
        return 0.0;
    }

    let l = wavelength_nm * 1e-9;
    let exponent = (H * C) / (l * KB * temperature_k);
    (2.0 * H * C * C) / (l.powi(5) * exponent.exp_m1())
}
