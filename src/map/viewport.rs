use crate::config::{Margin, RADIUS_RANGE_FRACTION};
use crate::map::projection::NaturalEarth;
use crate::map::scale::RadiusScale;
use crate::map::zoom::{Zoom, ZoomTransform};
use geo::MultiPolygon;
use glam::DVec2;

/// Projection, radius scale and zoom state for the visible map area.
///
/// Distances are braille pixels. The canvas is at least as tall as the
/// panel it is drawn into, and taller when the fitted world needs it.
#[derive(Clone, Debug)]
pub struct Viewport {
    pub margin: Margin,
    /// Canvas width (equals the panel width)
    pub width: f64,
    /// Canvas height, never less than the panel height
    pub height: f64,
    /// Panel height as rendered
    pub client_height: f64,
    pub bounded_width: f64,
    pub bounded_height: f64,
    projection: NaturalEarth,
    radius: RadiusScale,
    zoom: Zoom,
}

impl Viewport {
    /// `radius_domain_max` is fixed for the lifetime of the viewport so
    /// filter changes never rescale bubbles
    pub fn new(margin: Margin, radius_domain_max: f64) -> Self {
        Self {
            margin,
            width: 0.0,
            height: 0.0,
            client_height: 0.0,
            bounded_width: 0.0,
            bounded_height: 0.0,
            projection: NaturalEarth::default(),
            radius: RadiusScale::new(radius_domain_max),
            zoom: Zoom::new(),
        }
    }

    /// Refit projection and radius range to a new panel size.
    ///
    /// Returns true when the radius range changed.
    pub fn resize<'a, I>(&mut self, width: f64, client_height: f64, geometries: I) -> bool
    where
        I: IntoIterator<Item = &'a MultiPolygon<f64>> + Clone,
    {
        let m = self.margin;
        self.width = width.max(0.0);
        self.client_height = client_height.max(0.0);
        self.bounded_width = (self.width - m.left - m.right).max(0.0);

        self.projection.fit_width(self.bounded_width, geometries.clone());
        self.bounded_height = self
            .projection
            .bounds(geometries.clone())
            .map(|(min, max)| (max.y - min.y).ceil())
            .unwrap_or(0.0);
        self.height = (self.bounded_height + m.top + m.bottom).max(self.client_height);

        self.projection.fit_extent(
            (
                DVec2::new(m.left, m.top),
                DVec2::new(self.width - m.right, self.height - m.bottom),
            ),
            geometries,
        );

        self.zoom.set_extent(self.width, self.client_height);
        self.zoom.set_translate_extent(self.width, self.height);

        let previous = self.radius.range();
        self.radius
            .set_range((self.bounded_width * RADIUS_RANGE_FRACTION).round());

        log::debug!(
            "viewport {}x{} (canvas height {}, bounded {}x{}), max radius {}",
            self.width,
            self.client_height,
            self.height,
            self.bounded_width,
            self.bounded_height,
            self.radius.range()[1]
        );

        previous != self.radius.range()
    }

    pub fn projection(&self) -> &NaturalEarth {
        &self.projection
    }

    pub fn radius_scale(&self) -> &RadiusScale {
        &self.radius
    }

    pub fn transform(&self) -> ZoomTransform {
        self.zoom.transform()
    }

    /// Radius in map-group units for a base (unzoomed) radius. The group
    /// transform multiplies it back by k, so bubbles keep their on-screen size.
    pub fn compensate(&self, base_radius: f64) -> f64 {
        base_radius / self.zoom.k()
    }

    /// Rendered radius of a bubble for a country total
    pub fn bubble_radius(&self, total: f64) -> f64 {
        self.compensate(self.radius.radius(total))
    }

    pub fn zoom_at(&mut self, factor: f64, px: f64, py: f64) {
        self.zoom.scale_by(factor, DVec2::new(px, py));
    }

    pub fn zoom_centre(&mut self, factor: f64) {
        self.zoom.scale_by_centre(factor);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.zoom.pan(dx, dy);
    }

    pub fn reset_zoom(&mut self) {
        self.zoom.reset();
    }

    /// Screen pixel to map-group coordinates
    pub fn to_local(&self, px: f64, py: f64) -> DVec2 {
        self.zoom.transform().invert(DVec2::new(px, py))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn world() -> Vec<MultiPolygon<f64>> {
        vec![MultiPolygon(vec![polygon![
            (x: -150.0, y: -50.0),
            (x: 160.0, y: -50.0),
            (x: 160.0, y: 75.0),
            (x: -150.0, y: 75.0),
            (x: -150.0, y: -50.0),
        ]])]
    }

    #[test]
    fn test_radius_range_is_eighth_of_bounded_width() {
        let world = world();
        let mut vp = Viewport::new(Margin::default(), 1_000.0);
        vp.resize(408.0, 100.0, &world);
        assert_eq!(vp.bounded_width, 400.0);
        assert_eq!(vp.radius_scale().range(), [0.0, 50.0]);
        assert_eq!(vp.radius_scale().domain(), [0.0, 1_000.0]);
    }

    #[test]
    fn test_height_never_below_panel() {
        let world = world();
        let mut vp = Viewport::new(Margin::default(), 1.0);
        vp.resize(208.0, 500.0, &world);
        assert_eq!(vp.height, 500.0);
        vp.resize(208.0, 10.0, &world);
        assert_eq!(vp.height, vp.bounded_height + 16.0);
    }

    #[test]
    fn test_resize_reports_range_change() {
        let world = world();
        let mut vp = Viewport::new(Margin::default(), 1.0);
        assert!(vp.resize(208.0, 100.0, &world));
        assert!(!vp.resize(208.0, 120.0, &world));
        assert!(vp.resize(408.0, 120.0, &world));
    }

    #[test]
    fn test_zoom_compensation() {
        let world = world();
        let mut vp = Viewport::new(Margin::default(), 10_000.0);
        vp.resize(408.0, 200.0, &world);
        let base = vp.radius_scale().radius(2_500.0);
        for k in [1.0, 2.0, 4.0, 8.0, 16.0, 32.0] {
            vp.reset_zoom();
            vp.zoom_at(k, 204.0, 100.0);
            assert!((vp.bubble_radius(2_500.0) - base / k).abs() < 1e-9);
        }
    }
}
