use geo::{Coord, MultiPolygon};
use glam::DVec2;

/// Bounds of projected geometry: (min, max)
pub type Bounds = (DVec2, DVec2);

/// Natural Earth I pseudo-cylindrical projection with a longitude rotation.
///
/// Screen coordinates grow right and down: `x = k * λ' + tx`,
/// `y = ty - k * φ'`.
#[derive(Clone, Debug, PartialEq)]
pub struct NaturalEarth {
    /// Rotation added to every longitude, degrees
    pub rotate_lon: f64,
    pub scale: f64,
    pub translate: DVec2,
}

impl Default for NaturalEarth {
    fn default() -> Self {
        // Centre the map on 10°E so Russia is not split at the antimeridian
        Self {
            rotate_lon: -10.0,
            scale: 1.0,
            translate: DVec2::ZERO,
        }
    }
}

impl NaturalEarth {
    /// Unscaled projection of a coordinate in degrees
    fn raw(&self, lon: f64, lat: f64) -> DVec2 {
        let lambda = wrap_lon(lon + self.rotate_lon).to_radians();
        let phi = lat.clamp(-90.0, 90.0).to_radians();
        let phi2 = phi * phi;
        let phi4 = phi2 * phi2;
        DVec2::new(
            lambda
                * (0.8707
                    - 0.131979 * phi2
                    + phi4 * (-0.013791 + phi4 * (0.003971 * phi2 - 0.001529 * phi4))),
            phi * (1.007226
                + phi2 * (0.015085 + phi4 * (-0.044475 + 0.028874 * phi2 - 0.005916 * phi4))),
        )
    }

    /// Project (lon, lat) degrees to screen coordinates
    pub fn project(&self, lon: f64, lat: f64) -> DVec2 {
        let p = self.raw(lon, lat);
        DVec2::new(
            self.translate.x + self.scale * p.x,
            self.translate.y - self.scale * p.y,
        )
    }

    pub fn project_coord(&self, c: Coord<f64>) -> DVec2 {
        self.project(c.x, c.y)
    }

    /// Project every ring of every polygon
    pub fn project_multipolygon(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        use geo::MapCoords;
        geometry.map_coords(|c| {
            let p = self.project(c.x, c.y);
            Coord { x: p.x, y: p.y }
        })
    }

    /// Screen bounds of the given geometries under the current fit
    pub fn bounds<'a>(&self, geometries: impl IntoIterator<Item = &'a MultiPolygon<f64>>) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for geometry in geometries {
            for poly in &geometry.0 {
                for c in &poly.exterior().0 {
                    let p = self.project(c.x, c.y);
                    bounds = Some(match bounds {
                        Some((min, max)) => (min.min(p), max.max(p)),
                        None => (p, p),
                    });
                }
            }
        }
        bounds
    }

    /// Bounds at unit scale and zero translation
    fn unit_bounds<'a>(&self, geometries: impl IntoIterator<Item = &'a MultiPolygon<f64>>) -> Option<Bounds> {
        let unit = Self {
            scale: 1.0,
            translate: DVec2::ZERO,
            ..self.clone()
        };
        unit.bounds(geometries)
    }

    /// Scale so the geometries span `width`, with the top edge at y = 0
    pub fn fit_width<'a>(
        &mut self,
        width: f64,
        geometries: impl IntoIterator<Item = &'a MultiPolygon<f64>>,
    ) {
        let Some((min, max)) = self.unit_bounds(geometries) else {
            return;
        };
        let span = max.x - min.x;
        if span <= 0.0 || width <= 0.0 {
            return;
        }
        let k = width / span;
        self.scale = k;
        self.translate = DVec2::new((width - k * (max.x + min.x)) / 2.0, -k * min.y);
    }

    /// Scale and centre the geometries inside the `[min, max]` extent
    pub fn fit_extent<'a>(
        &mut self,
        extent: Bounds,
        geometries: impl IntoIterator<Item = &'a MultiPolygon<f64>>,
    ) {
        let Some((min, max)) = self.unit_bounds(geometries) else {
            return;
        };
        let size = extent.1 - extent.0;
        let span = max - min;
        if span.x <= 0.0 || span.y <= 0.0 || size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let k = (size.x / span.x).min(size.y / span.y);
        self.scale = k;
        self.translate = extent.0 + (size - k * (max + min)) / 2.0;
    }
}

/// Wrap a longitude into [-180, 180]
fn wrap_lon(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}
