use glam::DVec3;

use crate::RaytracingError;

/// An observer position (planet-centred, m) and a unit look direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewingRay {
    pub observer: DVec3,
    pub look: DVec3,
}

impl ViewingRay {
    pub fn new(observer: DVec3, look: DVec3) -> Result<Self, RaytracingError> {
        let look = look.try_normalize().ok_or(RaytracingError::DegenerateLookDirection)?;
        Ok(Self { observer, look })
    }

    /// Limb view grazing `tangent_altitude`, seen from `observer_altitude`.
    pub fn from_tangent_altitude(
        planet_radius: f64,
        tangent_altitude: f64,
        observer_altitude: f64,
    ) -> Result<Self, RaytracingError> {
        let r_tangent = planet_radius + tangent_altitude;
        let r_observer = planet_radius + observer_altitude;
        if r_observer < r_tangent {
            return Err(RaytracingError::ObserverBelowTangent {
                observer_altitude,
                tangent_altitude,
            });
        }

        let tangent_point = DVec3::new(r_tangent, 0.0, 0.0);
        let look = DVec3::Y;
        let distance_to_tangent = ((r_observer - r_tangent) * (r_observer + r_tangent)).sqrt();

        Ok(Self {
            observer: tangent_point - look * distance_to_tangent,
            look,
        })
    }

    /// Observer at `observer_altitude` looking at the given zenith angle cosine.
    pub fn from_observer_altitude(
        planet_radius: f64,
        observer_altitude: f64,
        cos_zenith: f64,
    ) -> Self {
        let cos_zenith = cos_zenith.clamp(-1.0, 1.0);
        let sin_zenith = (1.0 - cos_zenith * cos_zenith).max(0.0).sqrt();

        Self {
            observer: DVec3::new(0.0, 0.0, planet_radius + observer_altitude),
            look: DVec3::new(sin_zenith, 0.0, cos_zenith),
        }
    }

    pub fn point_at(&self, t: f64) -> DVec3 {
        self.observer + self.look * t
    }
}
