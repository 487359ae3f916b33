use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_circle, draw_ring, fill_circle};
use crate::map::layers::{BubbleLayer, CountryLayer};
use crate::map::viewport::Viewport;
use geo::{LineString, Polygon};
use glam::DVec2;

/// Rendered map layers with separate canvases for different colors
pub struct MapLayers {
    pub countries: BrailleCanvas,
    /// The hovered country, drawn over its neighbours
    pub active_country: BrailleCanvas,
    pub bubbles: BrailleCanvas,
    pub active_bubble: BrailleCanvas,
}

/// Draws the country and bubble layers through the current zoom transform
pub struct MapRenderer<'a> {
    viewport: &'a Viewport,
}

impl<'a> MapRenderer<'a> {
    pub fn new(viewport: &'a Viewport) -> Self {
        Self { viewport }
    }

    /// Render into canvases of `width` x `height` terminal cells
    pub fn render(&self, width: usize, height: usize, countries: &CountryLayer, bubbles: &BubbleLayer) -> MapLayers {
        let mut layers = MapLayers {
            countries: BrailleCanvas::new(width, height),
            active_country: BrailleCanvas::new(width, height),
            bubbles: BrailleCanvas::new(width, height),
            active_bubble: BrailleCanvas::new(width, height),
        };

        for shape in countries.ordered() {
            let canvas = if shape.active {
                &mut layers.active_country
            } else {
                &mut layers.countries
            };
            for polygon in shape.projected.0.iter() {
                self.draw_polygon(canvas, polygon);
            }
        }

        let t = self.viewport.transform();
        for bubble in bubbles.bubbles() {
            let local_r = self.viewport.compensate(bubble.base_radius.value());
            let r = (local_r * t.k).round() as i32;
            let centre = t.apply(bubble.anchor);
            let (cx, cy) = (centre.x.round() as i32, centre.y.round() as i32);
            if bubble.active {
                fill_circle(&mut layers.active_bubble, cx, cy, r);
            } else {
                draw_circle(&mut layers.bubbles, cx, cy, r);
            }
        }

        layers
    }

    fn draw_polygon(&self, canvas: &mut BrailleCanvas, polygon: &Polygon<f64>) {
        self.draw_ring(canvas, polygon.exterior());
        for interior in polygon.interiors() {
            self.draw_ring(canvas, interior);
        }
    }

    fn draw_ring(&self, canvas: &mut BrailleCanvas, ring: &LineString<f64>) {
        let t = self.viewport.transform();
        let points: Vec<DVec2> = ring.0.iter().map(|c| t.apply(DVec2::new(c.x, c.y))).collect();
        // Anything wider than half the map is a wrap, not a border
        draw_ring(canvas, &points, self.viewport.width / 2.0 * t.k);
    }
}
