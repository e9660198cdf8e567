/// Which emission source term the integrator composes into each ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmissionSourceType {
    None,
    #[default]
    Standard,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub emission_source: EmissionSourceType,
    /// Propagate derivatives with respect to the atmosphere's parameters.
    pub calculate_derivatives: bool,
    /// Size of a dedicated worker pool, `0` runs on the global rayon pool.
    pub num_threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            emission_source: EmissionSourceType::Standard,
            calculate_derivatives: false,
            num_threads: 0,
        }
    }
}
