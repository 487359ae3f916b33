use crate::config::{MAX_ZOOM, MIN_ZOOM};
use glam::DVec2;

/// Uniform scale then translate, applied to the whole map group:
/// `screen = local * k + (x, y)`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn apply(&self, p: DVec2) -> DVec2 {
        p * self.k + DVec2::new(self.x, self.y)
    }

    pub fn invert(&self, p: DVec2) -> DVec2 {
        (p - DVec2::new(self.x, self.y)) / self.k
    }

    /// Translate in local (pre-scale) units
    fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + self.k * dx,
            y: self.y + self.k * dy,
            ..self
        }
    }
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Pan/zoom behaviour with a bounded scale and translate extent
#[derive(Clone, Debug)]
pub struct Zoom {
    transform: ZoomTransform,
    /// Visible area in screen pixels
    extent: (DVec2, DVec2),
    /// Area the visible extent may not leave, in local pixels
    translate_extent: (DVec2, DVec2),
}

impl Zoom {
    pub fn new() -> Self {
        Self {
            transform: ZoomTransform::IDENTITY,
            extent: (DVec2::ZERO, DVec2::ZERO),
            translate_extent: (DVec2::ZERO, DVec2::ZERO),
        }
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn k(&self) -> f64 {
        self.transform.k
    }

    pub fn set_extent(&mut self, width: f64, height: f64) {
        self.extent = (DVec2::ZERO, DVec2::new(width, height));
    }

    pub fn set_translate_extent(&mut self, width: f64, height: f64) {
        self.translate_extent = (DVec2::ZERO, DVec2::new(width, height));
    }

    pub fn reset(&mut self) {
        self.transform = ZoomTransform::IDENTITY;
    }

    /// Scale by `factor` keeping the screen point `at` fixed
    pub fn scale_by(&mut self, factor: f64, at: DVec2) {
        let t = self.transform;
        let k = (t.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let local = t.invert(at);
        let next = ZoomTransform {
            k,
            x: at.x - local.x * k,
            y: at.y - local.y * k,
        };
        self.transform = self.constrain(next);
    }

    /// Scale about the centre of the visible extent
    pub fn scale_by_centre(&mut self, factor: f64) {
        let centre = (self.extent.0 + self.extent.1) / 2.0;
        self.scale_by(factor, centre);
    }

    /// Move by a screen-space delta
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let t = self.transform;
        let next = ZoomTransform {
            x: t.x + dx,
            y: t.y + dy,
            ..t
        };
        self.transform = self.constrain(next);
    }

    /// Keep the visible extent within the translate extent, centring when
    /// the visible extent is the larger of the two
    fn constrain(&self, t: ZoomTransform) -> ZoomTransform {
        let (e0, e1) = self.extent;
        let (t0, t1) = self.translate_extent;
        let d0 = t.invert(e0) - t0;
        let d1 = t.invert(e1) - t1;

        let axis = |lo: f64, hi: f64| {
            if hi > lo {
                (lo + hi) / 2.0
            } else if lo < 0.0 {
                lo
            } else if hi > 0.0 {
                hi
            } else {
                0.0
            }
        };
        t.translate(axis(d0.x, d1.x), axis(d0.y, d1.y))
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new()
    }
}
