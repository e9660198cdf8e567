/// Optical properties on the atmosphere grid.
///
/// Every quantity is stored column-major with the grid index fastest, so one
/// wavelength's profile is contiguous.
#[derive(Debug, Clone)]
pub struct AtmosphereStorage {
    num_geometry: usize,
    num_wavel: usize,

    extinction: Vec<f64>,
    ssa: Vec<f64>,
    emission_source: Vec<f64>,
}

impl AtmosphereStorage {
    pub fn new(num_geometry: usize, num_wavel: usize) -> Self {
        let len = num_geometry * num_wavel;
        Self {
            num_geometry,
            num_wavel,
            extinction: vec![0.0; len],
            ssa: vec![0.0; len],
            emission_source: vec![0.0; len],
        }
    }

    pub fn num_geometry(&self) -> usize {
        self.num_geometry
    }

    pub fn num_wavel(&self) -> usize {
        self.num_wavel
    }

    #[inline(always)]
    fn index(&self, grid: usize, wavel: usize) -> usize {
        debug_assert!(grid < self.num_geometry && wavel < self.num_wavel);
        wavel * self.num_geometry + grid
    }

    /// Extinction coefficient (1/m).
    #[inline]
    pub fn extinction(&self, grid: usize, wavel: usize) -> f64 {
        self.extinction[self.index(grid, wavel)]
    }

    #[inline]
    pub fn ssa(&self, grid: usize, wavel: usize) -> f64 {
        self.ssa[self.index(grid, wavel)]
    }

    /// Volumetric emission source, in radiance units.
    #[inline]
    pub fn emission_source(&self, grid: usize, wavel: usize) -> f64 {
        self.emission_source[self.index(grid, wavel)]
    }

    pub fn set_extinction(&mut self, grid: usize, wavel: usize, value: f64) {
        let i = self.index(grid, wavel);
        self.extinction[i] = value;
    }

    pub fn set_ssa(&mut self, grid: usize, wavel: usize, value: f64) {
        let i = self.index(grid, wavel);
        self.ssa[i] = value;
    }

    pub fn set_emission_source(&mut self, grid: usize, wavel: usize, value: f64) {
        let i = self.index(grid, wavel);
        self.emission_source[i] = value;
    }

    /// Calls `f(grid, wavel, extinction, ssa, emission)` for every entry.
    pub fn for_each<F: FnMut(usize, usize, f64, f64, f64)>(&self, mut f: F) {
        for wavel in 0..self.num_wavel {
            for grid in 0..self.num_geometry {
                let i = self.index(grid, wavel);
                f(
                    grid,
                    wavel,
                    self.extinction[i],
                    self.ssa[i],
                    self.emission_source[i],
                );
            }
        }
    }
}
