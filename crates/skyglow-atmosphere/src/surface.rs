/// Lower boundary of the atmosphere.
#[derive(Debug, Clone)]
pub struct Surface {
    emission: Vec<f64>,
}

impl Surface {
    /// `emission` holds the surface's own emitted radiance for every wavelength.
    pub fn new(emission: Vec<f64>) -> Self {
        Self { emission }
    }

    pub fn non_emitting(num_wavel: usize) -> Self {
        Self::new(vec![0.0; num_wavel])
    }

    pub fn emission(&self) -> &[f64] {
        &self.emission
    }
}
