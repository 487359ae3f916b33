use crate::aggregate::{aggregate, max_country_total, CountryAggregates};
use crate::config::{MapSettings, TRANSITION};
use crate::data::{BrandRecord, Dataset, MasterIndex};
use crate::filter::{FilterChange, FilterControl, FilterKey, FilterState};
use crate::interaction::{InteractionController, Tooltip};
use crate::legend::SizeLegend;
use crate::map::{
    BubbleDatum, BubbleLayer, CountryCode, CountryLayer, GeoFeatureIndex, MapLayers, MapRenderer,
    Viewport,
};
use glam::DVec2;
use std::time::Duration;

/// Wheel and +/- zoom step
const ZOOM_STEP: f64 = std::f64::consts::SQRT_2;

/// Application state
pub struct App {
    index: GeoFeatureIndex,
    brands: Vec<BrandRecord>,
    master: MasterIndex,
    pub filter: FilterState,
    pub filter_control: FilterControl,
    /// Replaced wholesale on every filter change; `None` until first aggregation
    aggregates: Option<CountryAggregates>,
    pub viewport: Viewport,
    countries: CountryLayer,
    bubbles: BubbleLayer,
    interaction: InteractionController,
    pub legend: SizeLegend,
    settings: MapSettings,
    /// Map panel size in cells
    map_cols: usize,
    map_rows: usize,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    pub should_quit: bool,
}

impl App {
    pub fn new(dataset: Dataset, settings: MapSettings, width: usize, height: usize) -> Self {
        let index = GeoFeatureIndex::new(dataset.world);
        let master = MasterIndex::new(dataset.master);
        // Fixed for the session so filter changes never rescale bubbles
        let domain_max = max_country_total(&dataset.brands);
        let filter = FilterState::from_master(&master);
        log::info!(
            "{} countries indexed, {} categories, radius domain [0, {}]",
            index.len(),
            filter.category.options.len() - 1,
            domain_max
        );

        let mut app = Self {
            index,
            brands: dataset.brands,
            master,
            filter,
            filter_control: FilterControl::default(),
            aggregates: None,
            viewport: Viewport::new(settings.margin, domain_max),
            countries: CountryLayer::new(),
            bubbles: BubbleLayer::new(),
            interaction: InteractionController::new(),
            legend: SizeLegend::new(),
            settings,
            map_cols: 0,
            map_rows: 0,
            last_mouse: None,
            should_quit: false,
        };
        app.resize(width, height);
        app.filter_data();
        app
    }

    /// Update projection and scale when the terminal resizes
    pub fn resize(&mut self, width: usize, height: usize) {
        // Account for border (2 chars horizontal, 2 chars vertical plus status bar)
        self.map_cols = width.saturating_sub(2);
        self.map_rows = height.saturating_sub(3);

        let range_changed = self.viewport.resize(
            (self.map_cols * 2) as f64,
            (self.map_rows * 4) as f64,
            self.index.features().iter().map(|f| &f.geometry),
        );
        if range_changed || self.legend.ticks().is_empty() {
            self.legend.update_scale(self.viewport.radius_scale());
        }
        self.countries.project(&self.index, self.viewport.projection());

        if self.aggregates.is_some() {
            self.viewport.reset_zoom();
            self.render();
        }
    }

    /// Recompute aggregates for the current filter, then render
    fn filter_data(&mut self) {
        let aggregates = aggregate(
            &self.brands,
            &self.master,
            &self.index,
            &self.filter,
            self.settings.top_n,
        );
        log::debug!(
            "{} countries with traffic for category {:?}",
            aggregates.len(),
            self.filter.category.selected
        );
        self.aggregates = Some(aggregates);
        self.render();
        self.refresh_hover();
    }

    /// Apply a `{ key, value }` change from the filter control
    pub fn apply_filter_change(&mut self, change: &FilterChange) {
        if self.filter.apply(change) {
            self.filter_data();
        }
    }

    /// Step the category selection and apply the resulting change
    pub fn step_filter(&mut self, step: isize) {
        if let Some(change) = self.filter_control.step(&self.filter, FilterKey::Category, step) {
            self.apply_filter_change(&change);
        }
    }

    /// Join bubbles to the current aggregates. Skipped until data exists.
    fn render(&mut self) {
        let Some(aggregates) = &self.aggregates else {
            return;
        };

        let projection = self.viewport.projection();
        let data: Vec<BubbleDatum> = aggregates
            .by_total_desc()
            .into_iter()
            .filter_map(|(code, value)| {
                let anchor = self.index.anchor(code.as_str())?;
                Some(BubbleDatum {
                    code: code.clone(),
                    total: value.total,
                    anchor: projection.project_coord(anchor),
                })
            })
            .collect();

        let radius = self.viewport.radius_scale();
        let transition = self.settings.animate.then_some(TRANSITION);
        self.bubbles.join(data, |total| radius.radius(total), transition);
    }

    /// Re-apply hover state after the bubble set or aggregates changed
    fn refresh_hover(&mut self) {
        if let Some(code) = self.interaction.active().cloned() {
            self.interaction.pointer_enter(
                &code,
                &mut [&mut self.countries, &mut self.bubbles],
                &self.index,
                self.aggregates.as_ref(),
            );
        }
    }

    /// Advance bubble transitions. Returns true while any are running.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.bubbles.tick(dt)
    }

    /// Pan the view by a number of cells
    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(-(dx as f64) * 2.0, -(dy as f64) * 4.0);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_centre(ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_centre(1.0 / ZOOM_STEP);
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let p = Self::cell_to_pixel(col, row);
        self.viewport.zoom_at(ZOOM_STEP, p.x, p.y);
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let p = Self::cell_to_pixel(col, row);
        self.viewport.zoom_at(1.0 / ZOOM_STEP, p.x, p.y);
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset_zoom();
    }

    /// Handle mouse drag by panning with the pointer
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            self.pan(last_x as i32 - x as i32, last_y as i32 - y as i32);
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    /// Hover handling for a pointer at a terminal cell. Bubbles sit above
    /// countries, so they are hit-tested first.
    pub fn pointer_at(&mut self, col: u16, row: u16) {
        let inside = col >= 1
            && row >= 1
            && (col as usize) <= self.map_cols
            && (row as usize) <= self.map_rows;
        let target = if inside { self.hit_test(col, row) } else { None };

        if target.as_ref() != self.interaction.active() {
            if self.interaction.active().is_some() {
                self.interaction
                    .pointer_leave(&mut [&mut self.countries, &mut self.bubbles]);
            }
            if let Some(code) = &target {
                self.interaction.pointer_enter(
                    code,
                    &mut [&mut self.countries, &mut self.bubbles],
                    &self.index,
                    self.aggregates.as_ref(),
                );
            }
        }
        if target.is_some() {
            let pointer = (col as i32 - 1, row as i32 - 1);
            self.interaction.pointer_move(pointer, self.map_cols as u16);
        }
    }

    pub fn pointer_leave(&mut self) {
        self.interaction
            .pointer_leave(&mut [&mut self.countries, &mut self.bubbles]);
    }

    fn hit_test(&self, col: u16, row: u16) -> Option<CountryCode> {
        let p = Self::cell_to_pixel(col, row);
        let local = self.viewport.to_local(p.x, p.y);
        let k = self.viewport.transform().k;
        if let Some(bubble) = self.bubbles.hit(local, k) {
            return Some(bubble.code.clone());
        }
        self.countries.hit(local).map(|shape| shape.code.clone())
    }

    /// Centre of a terminal cell in map-panel braille pixels. The panel
    /// starts one cell in, after the border.
    fn cell_to_pixel(col: u16, row: u16) -> DVec2 {
        DVec2::new(
            col.saturating_sub(1) as f64 * 2.0 + 1.0,
            row.saturating_sub(1) as f64 * 4.0 + 2.0,
        )
    }

    /// Rasterise the map for a panel of `width` x `height` cells
    pub fn render_layers(&self, width: usize, height: usize) -> MapLayers {
        MapRenderer::new(&self.viewport).render(width, height, &self.countries, &self.bubbles)
    }

    pub fn tooltip(&self) -> &Tooltip {
        self.interaction.tooltip()
    }

    pub fn hovered(&self) -> Option<&CountryCode> {
        self.interaction.active()
    }

    pub fn aggregates(&self) -> Option<&CountryAggregates> {
        self.aggregates.as_ref()
    }

    pub fn bubble_count(&self) -> usize {
        self.bubbles.bubbles().len()
    }

    pub fn toggle_legend(&mut self) {
        self.legend.toggle();
    }

    pub fn toggle_filter(&mut self) {
        self.filter_control.toggle();
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.transform().k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MasterRecord;
    use crate::map::WorldFeature;
    use geo::{polygon, MultiPolygon};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x0, y: y0),
            (x: x1, y: y0),
            (x: x1, y: y1),
            (x: x0, y: y1),
            (x: x0, y: y0),
        ]])
    }

    fn feature(id: &str, iso: &str, name: &str, geometry: MultiPolygon<f64>) -> WorldFeature {
        WorldFeature {
            id: id.into(),
            iso_a2: iso.into(),
            name: name.into(),
            geometry,
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            world: vec![
                feature("840", "US", "United States", rect(-125.0, 25.0, -70.0, 50.0)),
                feature("076", "BR", "Brazil", rect(-70.0, -30.0, -40.0, 0.0)),
                feature("250", "-99", "France", rect(-5.0, 42.0, 8.0, 51.0)),
                feature("010", "AQ", "Antarctica", rect(-180.0, -90.0, 180.0, -60.0)),
                feature("156", "CN", "China", rect(75.0, 20.0, 130.0, 50.0)),
            ],
            brands: vec![
                BrandRecord::new("a", "Acme", "us", "1000", "20%"),
                BrandRecord::new("b", "Globex", "us", "500", "50%"),
                BrandRecord::new("c", "Initech", "fr", "400", "0%"),
                BrandRecord::new("d", "Umbrella", "br", "300", "0%"),
                BrandRecord::new("e", "Hooli", "xx", "9000", "0%"),
            ],
            master: vec![
                MasterRecord::new("a", "Food"),
                MasterRecord::new("b", "Food"),
                MasterRecord::new("c", "Beauty"),
                MasterRecord::new("d", "?"),
            ],
        }
    }

    fn app() -> App {
        let settings = MapSettings {
            animate: false,
            ..MapSettings::default()
        };
        App::new(dataset(), settings, 122, 43)
    }

    /// Terminal cell over a bubble's centre
    fn bubble_cell(app: &App, code: &str) -> (u16, u16) {
        let bubble = app.bubbles.get(code).unwrap();
        let p = app.viewport.transform().apply(bubble.anchor);
        ((p.x / 2.0) as u16 + 1, (p.y / 4.0) as u16 + 1)
    }

    #[test]
    fn test_initial_aggregation() {
        let app = app();
        let aggregates = app.aggregates().unwrap();
        assert_eq!(aggregates.len(), 3);
        assert_eq!(aggregates.get("us").unwrap().total, 1050.0);
        assert!(aggregates.get("xx").is_none());
        assert_eq!(app.bubble_count(), 3);
        assert!(app.index.features().iter().all(|f| f.id != "010"));
    }

    #[test]
    fn test_radius_domain_includes_unindexed_countries() {
        let app = app();
        assert_eq!(app.viewport.radius_scale().domain(), [0.0, 9000.0]);
    }

    #[test]
    fn test_resize_keeps_aggregates() {
        let mut app = app();
        let before = app.aggregates().cloned();
        app.resize(80, 30);
        assert_eq!(app.aggregates().cloned(), before);
        app.resize(200, 60);
        assert_eq!(app.aggregates().cloned(), before);
    }

    #[test]
    fn test_resize_resets_zoom() {
        let mut app = app();
        app.zoom_in();
        assert!(app.viewport.transform().k > 1.0);
        app.resize(100, 40);
        assert_eq!(app.viewport.transform().k, 1.0);
    }

    #[test]
    fn test_filter_change_keeps_domain() {
        let mut app = app();
        let domain = app.viewport.radius_scale().domain();

        app.apply_filter_change(&FilterChange::from_event("category", "Food").unwrap());
        assert_eq!(app.viewport.radius_scale().domain(), domain);
        let aggregates = app.aggregates().unwrap();
        assert_eq!(aggregates.len(), 1);
        assert!(aggregates.contains("us"));
        assert_eq!(app.bubble_count(), 1);

        app.apply_filter_change(&FilterChange::from_event("category", "Other").unwrap());
        assert!(app.aggregates().unwrap().contains("br"));
    }

    #[test]
    fn test_step_filter_wraps() {
        let mut app = app();
        // ALL, Beauty, Food, Other
        app.step_filter(-1);
        assert_eq!(app.filter.category.selected, "Other");
        app.step_filter(1);
        assert_eq!(app.filter.category.selected, "ALL");
    }

    #[test]
    fn test_bubble_radius_compensated_by_zoom() {
        let mut app = app();
        let total = app.aggregates().unwrap().get("us").unwrap().total;
        let expected = app.viewport.radius_scale().radius(total);

        for _ in 0..4 {
            app.zoom_in();
            let k = app.viewport.transform().k;
            let bubble = app.bubbles.get("us").unwrap();
            let local = app.viewport.compensate(bubble.base_radius.value());
            assert!((local - expected / k).abs() < 1e-9);
            assert!((app.viewport.bubble_radius(total) - expected / k).abs() < 1e-9);
        }
    }

    #[test]
    fn test_hover_bubble_shows_tooltip() {
        let mut app = app();
        let (col, row) = bubble_cell(&app, "us");
        app.pointer_at(col, row);

        assert_eq!(app.hovered().map(|c| c.as_str()), Some("us"));
        let tooltip = app.tooltip();
        assert!(tooltip.visible);
        assert_eq!(
            tooltip.content.as_ref().map(|c| c.country_name.as_str()),
            Some("United States")
        );
        assert!(app.bubbles.get("us").unwrap().active);
        assert!(app
            .countries
            .shapes()
            .iter()
            .any(|s| s.code.as_str() == "us" && s.active));

        app.pointer_at(0, 0);
        assert!(app.hovered().is_none());
        assert!(!app.tooltip().visible);
        assert!(app.bubbles.bubbles().iter().all(|b| !b.active));
    }

    #[test]
    fn test_tooltip_stays_in_chart() {
        let mut app = app();
        // Far left of the map, so centring would push the tooltip off the chart
        let (col, row) = bubble_cell(&app, "us");
        app.pointer_at(col, row);
        let tooltip = app.tooltip();
        let (w, _) = tooltip.content.as_ref().unwrap().size();
        assert!(tooltip.position.0 >= 0);
        assert!(tooltip.position.0 + w as i32 <= app.map_cols as i32);
    }

    #[test]
    fn test_filter_change_refreshes_hover() {
        let mut app = app();
        let (col, row) = bubble_cell(&app, "us");
        app.pointer_at(col, row);
        app.apply_filter_change(&FilterChange::from_event("category", "Beauty").unwrap());

        assert_eq!(app.hovered().map(|c| c.as_str()), Some("us"));
        assert!(app.tooltip().content.is_none());
        assert!(!app.tooltip().visible);
    }

    #[test]
    fn test_animated_bubbles_grow_from_zero() {
        let mut app = App::new(dataset(), MapSettings::default(), 122, 43);
        assert_eq!(app.bubbles.get("us").unwrap().base_radius.value(), 0.0);
        while app.tick(Duration::from_millis(16)) {}
        let total = app.aggregates().unwrap().get("us").unwrap().total;
        assert_eq!(
            app.bubbles.get("us").unwrap().base_radius.value(),
            app.viewport.radius_scale().radius(total)
        );
    }
}
