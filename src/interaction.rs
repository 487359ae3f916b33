//! Hover state shared by the country and bubble layers, and the tooltip it
//! drives.

use crate::aggregate::{CountryAggregate, CountryAggregates};
use crate::config::TOOLTIP_GAP;
use crate::format::{format_share, format_si};
use crate::map::{CountryCode, GeoFeatureIndex};

/// A visual layer whose elements can be highlighted by country code
pub trait Highlight {
    /// Mark the elements keyed to `code` active and every other one inactive
    fn highlight(&mut self, code: &CountryCode);

    fn clear_highlight(&mut self);
}

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipRow {
    pub rank: String,
    pub brand: String,
    pub traffic: String,
    pub share: String,
    pub share_ratio: f64,
}

/// Width of the proportional share bar, in cells
pub const SHARE_BAR_WIDTH: usize = 10;

/// Column headers of the tooltip table
pub const TOOLTIP_HEADERS: [&str; 4] = ["", "Brand", "Traffic", "Traffic Share"];

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipContent {
    pub country_name: String,
    pub rows: Vec<TooltipRow>,
    pub total: String,
}

impl TooltipContent {
    pub fn new(country_name: &str, aggregate: &CountryAggregate) -> Self {
        let rows = aggregate
            .top_brands
            .iter()
            .map(|row| TooltipRow {
                rank: row.rank.map(|r| r.to_string()).unwrap_or_default(),
                brand: row.brand_name.clone(),
                traffic: format_si(row.traffic, 4),
                share: format_share(row.traffic_share),
                share_ratio: row.traffic_share,
            })
            .collect();
        Self {
            country_name: country_name.to_string(),
            rows,
            total: format_si(aggregate.total, 4),
        }
    }

    /// Widths of the rank, brand, traffic and share columns
    pub fn column_widths(&self) -> [usize; 4] {
        let rows = &self.rows;
        [
            column_width(rows.iter().map(|r| r.rank.as_str()), &[TOOLTIP_HEADERS[0]]),
            column_width(rows.iter().map(|r| r.brand.as_str()), &[TOOLTIP_HEADERS[1], "TOTAL"]),
            column_width(
                rows.iter().map(|r| r.traffic.as_str()),
                &[TOOLTIP_HEADERS[2], self.total.as_str()],
            ),
            column_width(rows.iter().map(|r| r.share.as_str()), &["100%"]),
        ]
    }

    /// Outer size in cells, borders included: (width, height)
    pub fn size(&self) -> (u16, u16) {
        let [rank, brand, traffic, share] = self.column_widths();
        // share column and bar sit under the one "Traffic Share" header
        let share_block = (share + 1 + SHARE_BAR_WIDTH).max(TOOLTIP_HEADERS[3].len());
        let table = rank + 1 + brand + 1 + traffic + 1 + share_block;
        let width = table.max(self.country_name.chars().count()) + 2;
        // border, title, header, rows, footer, border
        let height = self.rows.len() + 5;
        (width as u16, height as u16)
    }
}

fn column_width<'a>(cells: impl Iterator<Item = &'a str>, extra: &[&'a str]) -> usize {
    cells
        .chain(extra.iter().copied())
        .map(|s| s.chars().count())
        .max()
        .unwrap_or(0)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tooltip {
    pub visible: bool,
    pub content: Option<TooltipContent>,
    /// Top-left corner relative to the chart, in cells
    pub position: (i32, i32),
}

/// Tooltip origin for a pointer position: centred horizontally and kept
/// inside the chart width, above the pointer unless there is no room
pub fn place_tooltip(pointer: (i32, i32), size: (u16, u16), chart_width: u16) -> (i32, i32) {
    let (w, h) = (size.0 as i32, size.1 as i32);
    let gap = TOOLTIP_GAP as i32;

    let mut x = pointer.0 - w / 2;
    if x < 0 {
        x = 0;
    } else if x + w > chart_width as i32 {
        x = chart_width as i32 - w;
    }

    let y = if pointer.1 - h - gap < 0 {
        pointer.1 + gap
    } else {
        pointer.1 - (h + gap)
    };
    (x, y)
}

/// Hover state machine: at most one active country at a time
#[derive(Default)]
pub struct InteractionController {
    active: Option<CountryCode>,
    tooltip: Tooltip,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&CountryCode> {
        self.active.as_ref()
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    /// Highlight `code` on every layer and fill the tooltip when the country
    /// has aggregate data
    pub fn pointer_enter(
        &mut self,
        code: &CountryCode,
        layers: &mut [&mut dyn Highlight],
        index: &GeoFeatureIndex,
        aggregates: Option<&CountryAggregates>,
    ) {
        self.active = Some(code.clone());
        for layer in layers.iter_mut() {
            layer.highlight(code);
        }

        let content = aggregates.and_then(|a| a.get(code.as_str())).map(|aggregate| {
            let name = index
                .get(code.as_str())
                .map(|f| f.name.as_str())
                .unwrap_or(code.as_str());
            TooltipContent::new(name, aggregate)
        });
        self.tooltip.visible = content.is_some();
        self.tooltip.content = content;
    }

    /// Reposition the tooltip for a pointer at (col, row) relative to the chart
    pub fn pointer_move(&mut self, pointer: (i32, i32), chart_width: u16) {
        if let Some(content) = &self.tooltip.content {
            self.tooltip.position = place_tooltip(pointer, content.size(), chart_width);
        }
    }

    pub fn pointer_leave(&mut self, layers: &mut [&mut dyn Highlight]) {
        self.active = None;
        for layer in layers.iter_mut() {
            layer.clear_highlight();
        }
        self.tooltip.visible = false;
    }
}
