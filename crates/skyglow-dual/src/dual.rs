use crate::SparseOdDualView;

/// A Stokes vector of `N` components together with a dense derivative block.
///
/// `deriv[p][s]` is the derivative of Stokes component `s` with respect to
/// atmospheric parameter `p`. An empty block means derivatives are disabled.
#[derive(Debug, Clone, PartialEq)]
pub struct Dual<const N: usize> {
    pub value: [f64; N],
    pub deriv: Vec<[f64; N]>,
}

impl<const N: usize> Dual<N> {
    pub fn new(num_deriv: usize) -> Self {
        Self {
            value: [0.0; N],
            deriv: vec![[0.0; N]; num_deriv],
        }
    }

    pub fn num_deriv(&self) -> usize {
        self.deriv.len()
    }

    pub fn intensity(&self) -> f64 {
        self.value[0]
    }

    /// Derivative of the intensity component with respect to parameter `p`.
    pub fn d_intensity(&self, p: usize) -> f64 {
        self.deriv[p][0]
    }

    pub fn set_zero(&mut self) {
        self.value = [0.0; N];
        self.deriv.fill([0.0; N]);
    }

    /// Adds `transmission * source`, applying the product rule to the derivative blocks.
    pub fn add_attenuated(&mut self, source: &Dual<N>, transmission: &ScalarDual) {
        debug_assert_eq!(self.deriv.len(), source.deriv.len());
        debug_assert_eq!(self.deriv.len(), transmission.deriv.len());

        for s in 0..N {
            self.value[s] += transmission.value * source.value[s];
        }

        for ((d, d_source), d_transmission) in self
            .deriv
            .iter_mut()
            .zip(source.deriv.iter())
            .zip(transmission.deriv.iter())
        {
            for s in 0..N {
                d[s] += transmission.value * d_source[s] + d_transmission * source.value[s];
            }
        }
    }
}

/// A scalar with a dense derivative block, used for the cumulative transmission along a ray.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarDual {
    pub value: f64,
    pub deriv: Vec<f64>,
}

impl ScalarDual {
    /// Full transmission with no sensitivity to any parameter.
    pub fn one(num_deriv: usize) -> Self {
        Self {
            value: 1.0,
            deriv: vec![0.0; num_deriv],
        }
    }

    pub fn reset_to_one(&mut self) {
        self.value = 1.0;
        self.deriv.fill(0.0);
    }

    /// Multiplies by `exp(-od)` of one layer.
    pub fn attenuate(&mut self, shell_od: &SparseOdDualView) {
        let previous = self.value;

        self.value *= shell_od.exp_minus_od;
        for d in self.deriv.iter_mut() {
            *d *= shell_od.exp_minus_od;
        }

        if self.deriv.is_empty() {
            return;
        }

        // d/dp exp(-od) = -exp(-od) * dod/dp
        for &(p, d_od) in shell_od.deriv {
            self.deriv[p] -= previous * shell_od.exp_minus_od * d_od;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SparseOdDual;
    use approx::assert_relative_eq;

    #[test]
    fn new_dual_is_zero() {
        let dual = Dual::<3>::new(5);
        assert_eq!(dual.value, [0.0; 3]);
        assert_eq!(dual.num_deriv(), 5);
        assert!(dual.deriv.iter().all(|d| *d == [0.0; 3]));
    }

    #[test]
    fn add_attenuated_applies_product_rule() {
        let mut radiance = Dual::<1>::new(2);
        let mut source = Dual::<1>::new(2);
        source.value[0] = 3.0;
        source.deriv[0][0] = 1.0;

        let transmission = ScalarDual {
            value: 0.5,
            deriv: vec![0.0, -2.0],
        };

        radiance.add_attenuated(&source, &transmission);

        assert_relative_eq!(radiance.intensity(), 1.5);
        assert_relative_eq!(radiance.d_intensity(0), 0.5);
        assert_relative_eq!(radiance.d_intensity(1), -6.0);
    }

    #[test]
    fn attenuate_matches_finite_difference() {
        let d_od = 0.25;
        let od_at = |param: f64| param * d_od;

        let param = 2.0;
        let mut od = SparseOdDual::new();
        od.od = od_at(param);
        od.deriv.push((0, d_od));

        let mut transmission = ScalarDual::one(1);
        transmission.attenuate(&od.view());
        transmission.attenuate(&od.view());

        let eps = 1e-6;
        let t = |param: f64| (-2.0 * od_at(param)).exp();
        let numerical = (t(param + eps) - t(param - eps)) / (2.0 * eps);

        assert_relative_eq!(transmission.value, t(param), max_relative = 1e-12);
        assert_relative_eq!(transmission.deriv[0], numerical, max_relative = 1e-6);
    }

    #[test]
    fn attenuate_without_derivatives_ignores_sparse_entries() {
        let mut od = SparseOdDual::new();
        od.od = 1.0;
        od.deriv.push((7, 1.0));

        let mut transmission = ScalarDual::one(0);
        transmission.attenuate(&od.view());

        assert_relative_eq!(transmission.value, (-1.0f64).exp());
        assert!(transmission.deriv.is_empty());
    }
}
