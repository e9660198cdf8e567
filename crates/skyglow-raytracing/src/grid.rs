use crate::RaytracingError;

/// Altitudes (m above the planet surface) of the atmosphere grid points.
#[derive(Debug, Clone)]
pub struct AltitudeGrid {
    altitudes: Vec<f64>,
    planet_radius: f64,
}

impl AltitudeGrid {
    pub fn new(altitudes: Vec<f64>, planet_radius: f64) -> Result<Self, RaytracingError> {
        if altitudes.len() < 2 {
            return Err(RaytracingError::TooFewAltitudes(altitudes.len()));
        }

        if let Some(index) = altitudes.windows(2).position(|w| w[1] <= w[0]) {
            return Err(RaytracingError::NonIncreasingAltitudes { index: index + 1 });
        }

        Ok(Self {
            altitudes,
            planet_radius,
        })
    }

    /// Evenly spaced grid from `bottom` to `top` inclusive.
    pub fn uniform(
        bottom: f64,
        top: f64,
        num_points: usize,
        planet_radius: f64,
    ) -> Result<Self, RaytracingError> {
        if num_points < 2 {
            return Err(RaytracingError::TooFewAltitudes(num_points));
        }

        let spacing = (top - bottom) / (num_points - 1) as f64;
        let altitudes = (0..num_points)
            .map(|i| bottom + spacing * i as f64)
            .collect();
        Self::new(altitudes, planet_radius)
    }

    pub fn altitudes(&self) -> &[f64] {
        &self.altitudes
    }

    pub fn len(&self) -> usize {
        self.altitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.altitudes.is_empty()
    }

    pub fn planet_radius(&self) -> f64 {
        self.planet_radius
    }

    pub fn bottom(&self) -> f64 {
        self.altitudes[0]
    }

    pub fn top(&self) -> f64 {
        self.altitudes[self.altitudes.len() - 1]
    }

    /// Distance from the planet centre of grid point `index`.
    pub fn shell_radius(&self, index: usize) -> f64 {
        self.planet_radius + self.altitudes[index]
    }

    /// Linear interpolation weights for `altitude`, clamped to the grid ends.
    pub fn interpolation_weights(&self, altitude: f64) -> Vec<(usize, f64)> {
        let upper = self.altitudes.partition_point(|a| *a <= altitude);

        if upper == 0 {
            return vec![(0, 1.0)];
        }
        if upper == self.altitudes.len() {
            return vec![(self.altitudes.len() - 1, 1.0)];
        }

        let lower = upper - 1;
        let w = (altitude - self.altitudes[lower])
            / (self.altitudes[upper] - self.altitudes[lower]);

        if w == 0.0 {
            vec![(lower, 1.0)]
        } else {
            vec![(lower, 1.0 - w), (upper, w)]
        }
    }
}
