//! The two hoverable collections drawn on the map: country shapes keyed by
//! geo id, and bubbles keyed by country code.

use crate::interaction::Highlight;
use crate::map::features::{CountryCode, GeoFeatureIndex};
use crate::map::projection::NaturalEarth;
use crate::map::spatial::FeatureGrid;
use crate::map::transition::Tween;
use geo::{BoundingRect, Contains, MultiPolygon, Point, Rect};
use glam::DVec2;
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

/// Grid cell size for shape hit tests, in map pixels
const HIT_GRID_CELL: f64 = 16.0;

/// A projected country outline in map-group coordinates
pub struct CountryShape {
    pub id: String,
    pub code: CountryCode,
    pub name: String,
    /// Shapes without an indexed code are background only
    pub interactive: bool,
    pub projected: MultiPolygon<f64>,
    bbox: Option<Rect<f64>>,
    pub active: bool,
}

pub struct CountryLayer {
    shapes: Vec<CountryShape>,
    /// Stacking order, last drawn on top
    order: Vec<usize>,
    grid: FeatureGrid,
}

impl CountryLayer {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            order: Vec::new(),
            grid: FeatureGrid::build(std::iter::empty(), HIT_GRID_CELL),
        }
    }

    /// Reproject every feature. Highlight and stacking order survive when
    /// the feature set is unchanged.
    pub fn project(&mut self, index: &GeoFeatureIndex, projection: &NaturalEarth) {
        let previous: HashMap<String, bool> = self
            .shapes
            .iter()
            .map(|s| (s.id.clone(), s.active))
            .collect();

        let shapes: Vec<CountryShape> = index
            .features()
            .par_iter()
            .enumerate()
            .map(|(idx, feature)| {
                let projected = projection.project_multipolygon(&feature.geometry);
                let bbox = projected.bounding_rect();
                CountryShape {
                    id: feature.id.clone(),
                    code: feature.code.clone(),
                    name: feature.name.clone(),
                    interactive: index.is_indexed(idx) && bbox.is_some(),
                    projected,
                    bbox,
                    active: previous.get(&feature.id).copied().unwrap_or(false),
                }
            })
            .collect();

        if self.order.len() != shapes.len() {
            self.order = (0..shapes.len()).collect();
        }
        self.grid = FeatureGrid::build(shapes.iter().map(|s| s.bbox.as_ref()), HIT_GRID_CELL);
        self.shapes = shapes;
    }

    pub fn shapes(&self) -> &[CountryShape] {
        &self.shapes
    }

    /// Shapes in drawing order
    pub fn ordered(&self) -> impl Iterator<Item = &CountryShape> {
        self.order.iter().map(|&i| &self.shapes[i])
    }

    /// Topmost interactive shape containing a map-group point
    pub fn hit(&self, p: DVec2) -> Option<&CountryShape> {
        let candidates = self.grid.query_point(p.x, p.y);
        if candidates.is_empty() {
            return None;
        }
        let point = Point::new(p.x, p.y);
        self.order
            .iter()
            .rev()
            .filter(|&idx| candidates.contains(idx))
            .map(|&idx| &self.shapes[idx])
            .find(|shape| shape.interactive && shape.projected.contains(&point))
    }

    /// Move a shape to the top of the stacking order
    fn raise(&mut self, idx: usize) {
        if let Some(pos) = self.order.iter().position(|&i| i == idx) {
            self.order.remove(pos);
            self.order.push(idx);
        }
    }
}

impl Default for CountryLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlight for CountryLayer {
    fn highlight(&mut self, code: &CountryCode) {
        let mut matched = Vec::new();
        for (idx, shape) in self.shapes.iter_mut().enumerate() {
            shape.active = shape.code == *code;
            if shape.active {
                matched.push(idx);
            }
        }
        for idx in matched {
            self.raise(idx);
        }
    }

    fn clear_highlight(&mut self) {
        for shape in &mut self.shapes {
            shape.active = false;
        }
    }
}

/// Data for one bubble: country, total and anchor in map-group coordinates
pub struct BubbleDatum {
    pub code: CountryCode,
    pub total: f64,
    pub anchor: DVec2,
}

pub struct Bubble {
    pub code: CountryCode,
    pub total: f64,
    pub anchor: DVec2,
    /// Radius before zoom compensation
    pub base_radius: Tween,
    pub active: bool,
}

/// Bubbles in descending total so smaller ones are drawn on top
#[derive(Default)]
pub struct BubbleLayer {
    bubbles: Vec<Bubble>,
}

impl BubbleLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the bubble set keyed by country code. Entering bubbles grow
    /// from zero, updating ones move from their current radius, exits are
    /// dropped. `transition` of `None` snaps to the target.
    pub fn join(
        &mut self,
        data: Vec<BubbleDatum>,
        target: impl Fn(f64) -> f64,
        transition: Option<Duration>,
    ) {
        let mut existing: HashMap<CountryCode, Bubble> = self
            .bubbles
            .drain(..)
            .map(|b| (b.code.clone(), b))
            .collect();

        self.bubbles = data
            .into_iter()
            .map(|datum| {
                let mut bubble = existing.remove(&datum.code).unwrap_or_else(|| Bubble {
                    code: datum.code.clone(),
                    total: 0.0,
                    anchor: datum.anchor,
                    base_radius: Tween::at(0.0),
                    active: false,
                });
                bubble.total = datum.total;
                bubble.anchor = datum.anchor;
                let r = target(datum.total);
                match transition {
                    Some(duration) => bubble.base_radius.retarget(r, duration),
                    None => bubble.base_radius.snap(r),
                }
                bubble
            })
            .collect();
    }

    /// Advance running transitions. Returns true while any is still running.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let mut running = false;
        for bubble in &mut self.bubbles {
            bubble.base_radius.tick(dt);
            running |= bubble.base_radius.is_running();
        }
        running
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn get(&self, code: &str) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.code.as_str() == code)
    }

    /// Topmost bubble containing a map-group point; `k` is the zoom scale
    pub fn hit(&self, p: DVec2, k: f64) -> Option<&Bubble> {
        self.bubbles.iter().rev().find(|b| {
            let r = b.base_radius.value() / k;
            r > 0.0 && b.anchor.distance_squared(p) <= r * r
        })
    }
}

impl Highlight for BubbleLayer {
    fn highlight(&mut self, code: &CountryCode) {
        for bubble in &mut self.bubbles {
            bubble.active = bubble.code == *code;
        }
    }

    fn clear_highlight(&mut self) {
        for bubble in &mut self.bubbles {
            bubble.active = false;
        }
    }
}
