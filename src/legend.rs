//! Nested-circle size legend for the bubble radius scale.

use crate::braille::BrailleCanvas;
use crate::format::format_si;
use crate::map::geometry::{draw_circle, draw_line};
use crate::map::RadiusScale;

/// Fixed ticks shown below `FIXED_TICK_CEILING`
const FIXED_TICKS: [f64; 3] = [1e6, 5e6, 1e7];
const FIXED_TICK_CEILING: f64 = 5e7;

/// Minimum vertical distance between labels: one text row
const LABEL_GAP: f64 = 4.0;

/// Horizontal length of each leader line segment, in pixels
const LEADER: f64 = 4.0;

pub const LEGEND_TITLE: &str = "Non-Bounce Traffic";

#[derive(Clone, Debug, PartialEq)]
pub struct LegendTick {
    pub value: f64,
    pub circle_r: f64,
    /// Circle centre, relative to the baseline (negative is up)
    pub circle_y: f64,
    pub label_y: f64,
}

/// Braille circles plus the label text positions, in cells
#[derive(Clone)]
pub struct LegendLayout {
    pub canvas: BrailleCanvas,
    pub labels: Vec<(u16, u16, String)>,
}

#[derive(Clone)]
pub struct SizeLegend {
    ticks: Vec<LegendTick>,
    /// Rasterised once per scale change
    layout: Option<LegendLayout>,
    open: bool,
}

impl SizeLegend {
    pub fn new() -> Self {
        Self {
            ticks: Vec::new(),
            layout: None,
            open: true,
        }
    }

    /// Rebuild ticks and their layout for a new scale
    pub fn update_scale(&mut self, scale: &RadiusScale) {
        let mut values = FIXED_TICKS.to_vec();
        values.extend(scale.ticks(5).into_iter().filter(|&v| v >= FIXED_TICK_CEILING));

        let mut ticks: Vec<LegendTick> = values
            .into_iter()
            .map(|value| {
                let r = scale.radius(value);
                LegendTick {
                    value,
                    circle_r: r,
                    circle_y: -r,
                    label_y: -2.0 * r,
                }
            })
            .collect();

        for i in 1..ticks.len() {
            let above = ticks[i - 1].label_y - LABEL_GAP;
            if ticks[i - 1].label_y - ticks[i].label_y < LABEL_GAP {
                ticks[i].label_y = above;
            }
        }
        self.layout = layout(&ticks);
        self.ticks = ticks;
    }

    pub fn ticks(&self) -> &[LegendTick] {
        &self.ticks
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Circles and labels for the current scale, `None` before the first
    pub fn layout(&self) -> Option<&LegendLayout> {
        self.layout.as_ref()
    }
}

/// Lay out circles and labels. Larger circles are drawn first so every
/// ring stays visible.
fn layout(ticks: &[LegendTick]) -> Option<LegendLayout> {
    if ticks.is_empty() {
        return None;
    }
    let max_r = ticks.iter().map(|t| t.circle_r).fold(0.0, f64::max);
    let top = ticks
        .iter()
        .map(|t| t.label_y.min(2.0 * t.circle_y))
        .fold(0.0, f64::min);

    let cx = max_r.ceil() + 1.0;
    let leader_end = cx + max_r + 2.0 * LEADER;
    let baseline = (-top).ceil() + 2.0;
    let label_col = (leader_end / 2.0).ceil() as u16 + 1;
    let label_width = ticks
        .iter()
        .map(|t| format_si(t.value, 6).chars().count())
        .max()
        .unwrap_or(0);

    let cols = label_col as usize + label_width;
    let rows = (baseline / 4.0).ceil() as usize + 1;
    let mut canvas = BrailleCanvas::new(cols, rows);
    let mut labels = Vec::with_capacity(ticks.len());

    let mut ordered: Vec<&LegendTick> = ticks.iter().collect();
    ordered.sort_by(|a, b| b.value.total_cmp(&a.value));
    for tick in ordered {
        let cy = baseline + tick.circle_y;
        let ly = baseline + tick.label_y;
        draw_circle(&mut canvas, cx.round() as i32, cy.round() as i32, tick.circle_r.round() as i32);

        let (x0, y0) = (cx.round() as i32, (baseline + 2.0 * tick.circle_y).round() as i32);
        let (x1, x2) = ((cx + max_r + LEADER).round() as i32, leader_end.round() as i32);
        draw_line(&mut canvas, x0, y0, x1, ly.round() as i32);
        draw_line(&mut canvas, x1, ly.round() as i32, x2, ly.round() as i32);

        let row = (ly / 4.0).floor().max(0.0) as u16;
        labels.push((label_col, row, format_si(tick.value, 6)));
    }

    Some(LegendLayout { canvas, labels })
}

impl Default for SizeLegend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale(domain_max: f64, range: f64) -> RadiusScale {
        let mut scale = RadiusScale::new(domain_max);
        scale.set_range(range);
        scale
    }

    #[test]
    fn test_small_ticks_replaced_by_fixed() {
        let mut legend = SizeLegend::new();
        legend.update_scale(&scale(2e8, 40.0));
        let values: Vec<f64> = legend.ticks().iter().map(|t| t.value).collect();
        assert_eq!(values, vec![1e6, 5e6, 1e7, 5e7, 1e8, 1.5e8, 2e8]);
    }

    #[test]
    fn test_tick_geometry() {
        let mut legend = SizeLegend::new();
        let s = scale(1e8, 40.0);
        legend.update_scale(&s);
        let last = legend.ticks().last().unwrap();
        assert_eq!(last.value, 1e8);
        assert_eq!(last.circle_r, 40.0);
        assert_eq!(last.circle_y, -40.0);
        assert!(last.label_y <= -80.0);
    }

    #[test]
    fn test_labels_kept_apart() {
        let mut legend = SizeLegend::new();
        legend.update_scale(&scale(1e9, 20.0));
        for pair in legend.ticks().windows(2) {
            assert!(pair[0].label_y - pair[1].label_y >= LABEL_GAP - 1e-9);
        }
    }

    #[test]
    fn test_layout_labels() {
        let mut legend = SizeLegend::new();
        legend.update_scale(&scale(1e8, 20.0));
        let layout = legend.layout().unwrap();
        let texts: Vec<&str> = layout.labels.iter().map(|(_, _, t)| t.as_str()).collect();
        assert!(texts.contains(&"100M"));
        assert!(texts.contains(&"1M"));
        assert!(layout.labels.iter().all(|(_, row, _)| (*row as usize) < layout.canvas.height()));
    }

    #[test]
    fn test_layout_follows_scale() {
        let mut legend = SizeLegend::new();
        assert!(legend.layout().is_none());

        legend.update_scale(&scale(1e8, 20.0));
        let small = legend.layout().unwrap().canvas.height();
        assert_eq!(legend.layout().unwrap().labels.len(), legend.ticks().len());

        legend.update_scale(&scale(1e8, 40.0));
        assert!(legend.layout().unwrap().canvas.height() > small);
    }

    #[test]
    fn test_toggle() {
        let mut legend = SizeLegend::new();
        assert!(legend.is_open());
        legend.toggle();
        assert!(!legend.is_open());
    }
}
