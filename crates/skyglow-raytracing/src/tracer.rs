use crate::{AltitudeGrid, LayerBoundary, SphericalLayer, TracedRay, ViewingRay};

/// Intersections closer than this along the ray (m) are treated as the same boundary.
const MERGE_DISTANCE_M: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct Crossing {
    t: f64,
    shell: Option<usize>,
}

/// Traces straight lines of sight through the shells of an [`AltitudeGrid`].
#[derive(Debug, Clone)]
pub struct SphericalShellTracer {
    grid: AltitudeGrid,
}

impl SphericalShellTracer {
    pub fn new(grid: AltitudeGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &AltitudeGrid {
        &self.grid
    }

    pub fn trace_all(&self, viewing_rays: &[ViewingRay]) -> Vec<TracedRay> {
        viewing_rays.iter().map(|ray| self.trace(ray)).collect()
    }

    pub fn trace(&self, viewing_ray: &ViewingRay) -> TracedRay {
        let b = viewing_ray.observer.dot(viewing_ray.look);
        let observer_radius_sq = viewing_ray.observer.length_squared();

        // Roots of |o + t d|^2 = r^2, nearest first
        let roots = |r: f64| -> Option<(f64, f64)> {
            let disc = b * b - (observer_radius_sq - r * r);
            if disc < 0.0 {
                None
            } else {
                let s = disc.sqrt();
                Some((-b - s, -b + s))
            }
        };

        let mut crossings = Vec::with_capacity(2 * self.grid.len() + 2);
        for shell in 0..self.grid.len() {
            if let Some((near, far)) = roots(self.grid.shell_radius(shell)) {
                for t in [near, far] {
                    if t > MERGE_DISTANCE_M {
                        crossings.push(Crossing {
                            t,
                            shell: Some(shell),
                        });
                    }
                }
            }
        }

        let top_radius = self.grid.planet_radius() + self.grid.top();
        let bottom_radius = self.grid.planet_radius() + self.grid.bottom();
        if observer_radius_sq <= top_radius * top_radius {
            crossings.push(Crossing { t: 0.0, shell: None });
        }

        let t_tangent = -b;
        if t_tangent > 0.0 {
            let r_tangent = viewing_ray.point_at(t_tangent).length();
            if r_tangent > bottom_radius && r_tangent < top_radius {
                crossings.push(Crossing {
                    t: t_tangent,
                    shell: None,
                });
            }
        }

        // An observer standing on the ground and looking down hits it immediately
        let on_ground = observer_radius_sq.sqrt() <= bottom_radius + MERGE_DISTANCE_M;
        let ground_t = if on_ground && b < 0.0 {
            Some(0.0)
        } else {
            roots(bottom_radius)
                .map(|(near, _)| near)
                .filter(|near| *near > MERGE_DISTANCE_M)
        };

        if let Some(ground_t) = ground_t {
            crossings.retain(|c| c.t <= ground_t + MERGE_DISTANCE_M);
        }

        crossings.sort_by(|a, b| a.t.total_cmp(&b.t));
        crossings.dedup_by(|next, kept| {
            if next.t - kept.t < MERGE_DISTANCE_M {
                kept.shell = kept.shell.or(next.shell);
                true
            } else {
                false
            }
        });

        let boundaries: Vec<LayerBoundary> = crossings
            .iter()
            .map(|c| self.boundary(viewing_ray, c))
            .collect();

        let layers: Vec<SphericalLayer> = boundaries
            .windows(2)
            .zip(crossings.windows(2))
            .map(|(b, c)| SphericalLayer {
                entrance: b[0].clone(),
                exit: b[1].clone(),
                layer_distance: c[1].t - c[0].t,
                od_quad_start_fraction: 0.5,
                od_quad_end_fraction: 0.5,
            })
            .collect();

        if layers.is_empty() && ground_t.is_none() {
            log::warn!("Line of sight {:?} misses the atmosphere.", viewing_ray);
        }

        TracedRay {
            viewing_ray: *viewing_ray,
            ground_is_hit: ground_t.is_some(),
            layers,
        }
    }

    fn boundary(&self, viewing_ray: &ViewingRay, crossing: &Crossing) -> LayerBoundary {
        let position = viewing_ray.point_at(crossing.t);

        match crossing.shell {
            Some(shell) => LayerBoundary {
                position,
                altitude: self.grid.altitudes()[shell],
                interpolation_weights: vec![(shell, 1.0)],
            },
            None => {
                let altitude = position.length() - self.grid.planet_radius();
                LayerBoundary {
                    position,
                    altitude,
                    interpolation_weights: self.grid.interpolation_weights(altitude),
                }
            }
        }
    }
}
