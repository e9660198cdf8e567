/// Optical depth of one layer as seen by a source term.
///
/// `deriv` holds sparse `(parameter index, d od / d parameter)` pairs. Indices may
/// repeat, in which case the contributions add.
#[derive(Debug, Clone, Copy)]
pub struct SparseOdDualView<'a> {
    pub od: f64,
    pub exp_minus_od: f64,
    pub deriv: &'a [(usize, f64)],
}

impl<'a> SparseOdDualView<'a> {
    pub fn new(od: f64, deriv: &'a [(usize, f64)]) -> Self {
        Self {
            od,
            exp_minus_od: (-od).exp(),
            deriv,
        }
    }

    /// A view with a directly specified transmittance, used when `od` is not known.
    pub fn from_exp_minus_od(exp_minus_od: f64, deriv: &'a [(usize, f64)]) -> Self {
        Self {
            od: -exp_minus_od.ln(),
            exp_minus_od,
            deriv,
        }
    }
}

/// Owned storage for a layer's optical depth, reused across layers by the driver.
#[derive(Debug, Clone, Default)]
pub struct SparseOdDual {
    pub od: f64,
    pub deriv: Vec<(usize, f64)>,
}

impl SparseOdDual {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.od = 0.0;
        self.deriv.clear();
    }

    pub fn view(&self) -> SparseOdDualView<'_> {
        SparseOdDualView::new(self.od, &self.deriv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn view_computes_transmittance() {
        let mut od = SparseOdDual::new();
        od.od = 0.5;
        assert_relative_eq!(od.view().exp_minus_od, (-0.5f64).exp());

        od.clear();
        assert_eq!(od.view().exp_minus_od, 1.0);
    }

    #[test]
    fn opaque_view_has_infinite_od() {
        let view = SparseOdDualView::from_exp_minus_od(0.0, &[]);
        assert!(view.od.is_infinite());
        assert_eq!(view.exp_minus_od, 0.0);
    }
}
