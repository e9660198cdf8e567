use approx::assert_relative_eq;
use skyglow_atmosphere::{Atmosphere, AtmosphereStorage, Surface};
use skyglow_integrator::{Config, EmissionSourceType, IntegratorError, SourceIntegrator};
use skyglow_raytracing::{AltitudeGrid, SphericalShellTracer, TracedRay, ViewingRay};

const RADIUS: f64 = 6_371_000.0;
const NUM_GRID: usize = 11;

struct Profile {
    extinction: Vec<f64>,
    ssa: Vec<f64>,
    emission: Vec<f64>,
    surface_emission: f64,
}

impl Profile {
    fn varying() -> Self {
        let altitudes = grid();
        Self {
            extinction: altitudes
                .altitudes()
                .iter()
                .map(|a| 2e-5 * (-a / 8_000.0).exp())
                .collect(),
            ssa: (0..NUM_GRID).map(|i| 0.1 + 0.03 * i as f64).collect(),
            emission: (0..NUM_GRID).map(|i| 10.0 - 0.5 * i as f64).collect(),
            surface_emission: 12.0,
        }
    }

    fn atmosphere(&self, calculate_derivatives: bool) -> Atmosphere {
        let mut storage = AtmosphereStorage::new(NUM_GRID, 1);
        for grid in 0..NUM_GRID {
            storage.set_extinction(grid, 0, self.extinction[grid]);
            storage.set_ssa(grid, 0, self.ssa[grid]);
            storage.set_emission_source(grid, 0, self.emission[grid]);
        }

        Atmosphere::new(storage, Surface::new(vec![self.surface_emission]))
            .unwrap()
            .with_derivatives(calculate_derivatives)
    }
}

fn grid() -> AltitudeGrid {
    AltitudeGrid::uniform(0.0, 50_000.0, NUM_GRID, RADIUS).unwrap()
}

fn rays() -> Vec<TracedRay> {
    let tracer = SphericalShellTracer::new(grid());
    tracer.trace_all(&[
        ViewingRay::from_tangent_altitude(RADIUS, 12_000.0, 600_000.0).unwrap(),
        ViewingRay::from_observer_altitude(RADIUS, 80_000.0, -0.8),
        ViewingRay::from_observer_altitude(RADIUS, 3_000.0, 0.4),
    ])
}

fn intensities(profile: &Profile, rays: &[TracedRay]) -> Vec<f64> {
    let atmosphere = profile.atmosphere(false);
    let radiance = SourceIntegrator::<1>::new(Config::default())
        .integrate(&atmosphere, rays)
        .unwrap();
    radiance.iter().map(|(_, _, r)| r.intensity()).collect()
}

#[test]
fn isothermal_atmosphere_radiates_its_source() {
    let mut profile = Profile::varying();
    profile.ssa = vec![0.0; NUM_GRID];
    profile.emission = vec![7.5; NUM_GRID];
    profile.surface_emission = 7.5;

    let rays = rays();
    let atmosphere = profile.atmosphere(false);
    let radiance = SourceIntegrator::<1>::new(Config::default())
        .integrate(&atmosphere, &rays)
        .unwrap();

    // Ground hitting rays see the uniform source through every layer and the surface
    assert!(rays[1].ground_is_hit);
    assert_relative_eq!(radiance.get(0, 1).intensity(), 7.5, max_relative = 1e-12);

    // Other rays only reach 7.5 * (1 - transmission)
    for losidx in [0, 2] {
        let intensity = radiance.get(0, losidx).intensity();
        assert!(intensity > 0.0 && intensity < 7.5);
    }
}

#[test]
fn transparent_atmosphere_only_shows_the_surface() {
    let mut profile = Profile::varying();
    profile.extinction = vec![0.0; NUM_GRID];

    let rays = rays();
    let intensities = intensities(&profile, &rays);

    assert_eq!(intensities, vec![0.0, profile.surface_emission, 0.0]);
}

#[test]
fn disabled_emission_produces_no_radiance() {
    let rays = rays();
    let atmosphere = Profile::varying().atmosphere(false);

    let config = Config {
        emission_source: EmissionSourceType::None,
        ..Default::default()
    };
    let radiance = SourceIntegrator::<3>::new(config)
        .integrate(&atmosphere, &rays)
        .unwrap();

    assert_eq!(radiance.num_wavel(), 1);
    assert_eq!(radiance.num_los(), 3);
    for (_, _, value) in radiance.iter() {
        assert_eq!(value.value, [0.0; 3]);
    }
}

#[test]
fn polarized_radiance_carries_only_intensity() {
    let rays = rays();
    let atmosphere = Profile::varying().atmosphere(true);

    let config = Config {
        calculate_derivatives: true,
        ..Default::default()
    };
    let scalar = SourceIntegrator::<1>::new(config.clone())
        .integrate(&atmosphere, &rays)
        .unwrap();
    let polarized = SourceIntegrator::<3>::new(config)
        .integrate(&atmosphere, &rays)
        .unwrap();

    for losidx in 0..rays.len() {
        let s = scalar.get(0, losidx);
        let p = polarized.get(0, losidx);

        assert_eq!(p.value[0], s.value[0]);
        assert_eq!(p.value[1..], [0.0, 0.0]);
        for (dp, ds) in p.deriv.iter().zip(s.deriv.iter()) {
            assert_eq!(dp[0], ds[0]);
            assert_eq!(dp[1..], [0.0, 0.0]);
        }
    }
}

#[test]
fn dedicated_pool_matches_global_pool() {
    let rays = rays();
    let atmosphere = Profile::varying().atmosphere(false);

    let global = SourceIntegrator::<1>::new(Config::default())
        .integrate(&atmosphere, &rays)
        .unwrap();
    let pooled = SourceIntegrator::<1>::new(Config {
        num_threads: 2,
        ..Default::default()
    })
    .integrate(&atmosphere, &rays)
    .unwrap();

    for losidx in 0..rays.len() {
        assert_eq!(global.get(0, losidx), pooled.get(0, losidx));
    }
}

#[test]
fn rays_outside_the_grid_are_rejected() {
    let rays = rays();

    let mut storage = AtmosphereStorage::new(4, 1);
    storage.set_extinction(0, 0, 1e-5);
    let atmosphere = Atmosphere::new(storage, Surface::non_emitting(1)).unwrap();

    let result = SourceIntegrator::<1>::new(Config::default()).integrate(&atmosphere, &rays);
    assert!(matches!(
        result,
        Err(IntegratorError::GridIndexOutOfRange {
            num_geometry: 4,
            ..
        })
    ));
}

#[test]
fn derivatives_match_finite_differences() {
    let rays = rays();
    let profile = Profile::varying();
    let atmosphere = profile.atmosphere(true);

    let radiance = SourceIntegrator::<1>::new(Config {
        calculate_derivatives: true,
        ..Default::default()
    })
    .integrate(&atmosphere, &rays)
    .unwrap();

    let central_difference = |perturb: &dyn Fn(&mut Profile, f64), step: f64| -> Vec<f64> {
        let mut plus = Profile::varying();
        perturb(&mut plus, step);
        let mut minus = Profile::varying();
        perturb(&mut minus, -step);

        intensities(&plus, &rays)
            .iter()
            .zip(intensities(&minus, &rays))
            .map(|(p, m)| (p - m) / (2.0 * step))
            .collect()
    };

    let check = |index: usize, numerical: Vec<f64>| {
        for (losidx, numerical) in numerical.into_iter().enumerate() {
            let analytic = radiance.get(0, losidx).d_intensity(index);
            assert_relative_eq!(analytic, numerical, max_relative = 1e-5, epsilon = 1e-9);
        }
    };

    for grid in [0, 2, 5] {
        let step = profile.extinction[grid] * 1e-5;
        check(
            atmosphere.extinction_deriv_index(grid),
            central_difference(&|p: &mut Profile, h: f64| p.extinction[grid] += h, step),
        );
        check(
            atmosphere.ssa_deriv_index(grid),
            central_difference(&|p: &mut Profile, h: f64| p.ssa[grid] += h, 1e-4),
        );
        check(
            atmosphere.emission_deriv_index(grid),
            central_difference(&|p: &mut Profile, h: f64| p.emission[grid] += h, 1e-3),
        );
    }

    check(
        atmosphere.surface_emission_deriv_index(),
        central_difference(&|p: &mut Profile, h: f64| p.surface_emission += h, 1e-3),
    );
}
