use anyhow::{bail, Context, Result};
use clap::Parser;
use skyglow::skyglow_atmosphere::{planck_radiance, Atmosphere, AtmosphereStorage, Surface};
use skyglow::skyglow_integrator::{Config, SourceIntegrator};
use skyglow::skyglow_raytracing::{AltitudeGrid, SphericalShellTracer, ViewingRay};
use skyglow::Skyglow;

const PLANET_RADIUS_M: f64 = 6_371_000.0;
const TOP_OF_ATMOSPHERE_M: f64 = 100_000.0;
const GRID_SPACING_M: f64 = 1_000.0;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of Stokes components to track (1, 3 or 4)
    #[arg(long, default_value_t = 1)]
    stokes: usize,

    /// Wavelengths to compute, in nm
    #[arg(long, value_delimiter = ',', default_values_t = vec![10_000.0, 12_000.0, 15_000.0])]
    wavelengths_nm: Vec<f64>,

    /// Tangent altitudes of the limb lines of sight, in km
    #[arg(long, value_delimiter = ',', default_values_t = vec![5.0, 10.0, 20.0, 30.0, 40.0])]
    tangent_altitudes_km: Vec<f64>,

    /// Altitude of the observer, in km
    #[arg(long, default_value_t = 600.0)]
    observer_altitude_km: f64,

    /// Surface temperature in K, the rest of the profile follows a standard atmosphere
    #[arg(long, default_value_t = 288.15)]
    surface_temperature: f64,

    /// Surface emissivity
    #[arg(long, default_value_t = 0.98)]
    emissivity: f64,

    /// Propagate derivatives with respect to the atmospheric state
    #[arg(long, default_value_t = false)]
    derivatives: bool,

    /// Size of the worker pool, 0 uses every core
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Collect puffin profiling scopes
    #[arg(long, default_value_t = false)]
    profile: bool,
}

/// Piecewise linear temperature (K) of a standard atmosphere shifted to `surface_temperature`.
pub fn standard_temperature(altitude_m: f64, surface_temperature: f64) -> f64 {
    // (base altitude km, lapse rate K/km)
    const LAYERS: [(f64, f64); 7] = [
        (0.0, -6.5),
        (11.0, 0.0),
        (20.0, 1.0),
        (32.0, 2.8),
        (47.0, 0.0),
        (51.0, -2.8),
        (71.0, -2.0),
    ];

    let z = altitude_m / 1000.0;
    let mut temperature = surface_temperature;
    for (i, &(base, lapse)) in LAYERS.iter().enumerate() {
        let top = LAYERS.get(i + 1).map_or(f64::INFINITY, |l| l.0);
        if z <= base {
            break;
        }
        temperature += lapse * (z.min(top) - base);
    }

    temperature
}

/// Absorption coefficient (1/m) of a well mixed gas with a 7 km scale height.
fn absorption(altitude_m: f64, wavelength_nm: f64) -> f64 {
    let band_strength = 2e-5 * (wavelength_nm / 10_000.0).powi(2);
    band_strength * (-altitude_m / 7_000.0).exp()
}

fn build_atmosphere(grid: &AltitudeGrid, args: &Args) -> Result<Atmosphere> {
    let mut storage = AtmosphereStorage::new(grid.len(), args.wavelengths_nm.len());

    for (wavelidx, &wavelength) in args.wavelengths_nm.iter().enumerate() {
        for (grid_index, &altitude) in grid.altitudes().iter().enumerate() {
            let temperature = standard_temperature(altitude, args.surface_temperature);
            storage.set_extinction(grid_index, wavelidx, absorption(altitude, wavelength));
            storage.set_ssa(grid_index, wavelidx, 0.01);
            storage.set_emission_source(
                grid_index,
                wavelidx,
                planck_radiance(wavelength, temperature),
            );
        }
    }

    let surface = Surface::new(
        args.wavelengths_nm
            .iter()
            .map(|&w| args.emissivity * planck_radiance(w, args.surface_temperature))
            .collect(),
    );

    Ok(Atmosphere::new(storage, surface)
        .context("Invalid model atmosphere.")?
        .with_derivatives(args.derivatives))
}

fn viewing_rays(args: &Args) -> Result<Vec<ViewingRay>> {
    let observer_altitude = args.observer_altitude_km * 1000.0;

    let mut rays = args
        .tangent_altitudes_km
        .iter()
        .map(|&t| {
            ViewingRay::from_tangent_altitude(PLANET_RADIUS_M, t * 1000.0, observer_altitude)
        })
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid limb geometry.")?;

    rays.push(ViewingRay::from_observer_altitude(
        PLANET_RADIUS_M,
        observer_altitude,
        -1.0,
    ));

    Ok(rays)
}

fn run<const N: usize>(
    args: &Args,
    atmosphere: &Atmosphere,
    tracer: &SphericalShellTracer,
) -> Result<()> {
    let viewing_rays = viewing_rays(args)?;
    let rays = tracer.trace_all(&viewing_rays);

    let integrator = SourceIntegrator::<N>::new(Config {
        calculate_derivatives: args.derivatives,
        num_threads: args.threads,
        ..Default::default()
    });
    let radiance = integrator.integrate(atmosphere, &rays)?;

    for (wavelidx, losidx, value) in radiance.iter() {
        let description = match args.tangent_altitudes_km.get(losidx) {
            Some(tangent) => format!("tangent {:>5.1} km", tangent),
            None => "nadir".to_owned(),
        };

        if args.derivatives {
            log::info!(
                "{:>8.1} nm {}: {:.6e} W/m^2/sr/m (d/d surface emission {:.4})",
                args.wavelengths_nm[wavelidx],
                description,
                value.intensity(),
                value.d_intensity(atmosphere.surface_emission_deriv_index())
            );
        } else {
            log::info!(
                "{:>8.1} nm {}: {:.6e} W/m^2/sr/m",
                args.wavelengths_nm[wavelidx],
                description,
                value.intensity()
            );
        }
    }

    Ok(())
}

pub fn internal_main() -> Result<()> {
    let args = Args::parse();
    let skyglow = Skyglow::new("Limb Scan");
    skyglow.enable_profiling(args.profile);

    let num_points = (TOP_OF_ATMOSPHERE_M / GRID_SPACING_M) as usize + 1;
    let grid = AltitudeGrid::uniform(0.0, TOP_OF_ATMOSPHERE_M, num_points, PLANET_RADIUS_M)?;
    let atmosphere = build_atmosphere(&grid, &args)?;
    let tracer = SphericalShellTracer::new(grid);

    match args.stokes {
        1 => run::<1>(&args, &atmosphere, &tracer),
        3 => run::<3>(&args, &atmosphere, &tracer),
        4 => run::<4>(&args, &atmosphere, &tracer),
        n => bail!("Unsupported number of Stokes components: {}.", n),
    }
}
