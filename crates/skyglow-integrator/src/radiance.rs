use skyglow_dual::Dual;

/// Radiance at the observer for every wavelength and line of sight.
#[derive(Debug, Clone)]
pub struct Radiance<const N: usize> {
    num_los: usize,
    values: Vec<Dual<N>>,
}

impl<const N: usize> Radiance<N> {
    pub(crate) fn new(num_los: usize, values: Vec<Dual<N>>) -> Self {
        debug_assert!(num_los == 0 || values.len() % num_los == 0);
        Self { num_los, values }
    }

    pub fn num_los(&self) -> usize {
        self.num_los
    }

    pub fn num_wavel(&self) -> usize {
        if self.num_los == 0 {
            0
        } else {
            self.values.len() / self.num_los
        }
    }

    pub fn get(&self, wavelidx: usize, losidx: usize) -> &Dual<N> {
        &self.values[wavelidx * self.num_los + losidx]
    }

    /// Iterates `(wavelidx, losidx, radiance)`, line of sight fastest.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Dual<N>)> {
        let num_los = self.num_los.max(1);
        self.values
            .iter()
            .enumerate()
            .map(move |(i, value)| (i / num_los, i % num_los, value))
    }
}
