use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Geo id of Antarctica, dropped before indexing
pub const ANTARCTICA_ID: &str = "010";

/// Features whose `iso_a2` is missing in the world dataset, patched by id
pub const CODE_PATCHES: [(&str, &str); 2] = [("250", "FR"), ("578", "NO")];

/// `iso_a2` sentinel for features without a usable country code
pub const INVALID_CODE: &str = "-99";

/// Countries anchored at the centroid of their whole geometry rather than
/// their largest landmass. Tuning parameter: the heuristic only covers Russia.
pub const WHOLE_GEOMETRY_ANCHOR_IDS: &[&str] = &["643"];

/// Filter sentinel that disables category filtering
pub const ALL_CATEGORIES: &str = "ALL";

/// Category assigned to brands with an empty or placeholder category
pub const OTHER_CATEGORY: &str = "Other";

/// Label of the synthetic remainder row in a country breakdown
pub const OTHERS_LABEL: &str = "Others";

/// Number of ranked brands listed per country
pub const DEFAULT_TOP_N: usize = 5;

/// Zoom scale extent
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 32.0;

/// Largest bubble radius as a fraction of the bounded map width
pub const RADIUS_RANGE_FRACTION: f64 = 1.0 / 8.0;

/// Duration of the bubble radius tween
pub const TRANSITION: Duration = Duration::from_millis(250);

/// Gap between the pointer and the tooltip, in terminal cells
pub const TOOLTIP_GAP: u16 = 1;

/// Inner drawing margins in braille pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 8.0,
            right: 4.0,
            bottom: 8.0,
            left: 4.0,
        }
    }
}

/// Command line options
#[derive(Parser, Debug, Clone)]
#[command(name = "brand-bubble-map", version, about)]
pub struct Args {
    /// World polygons as a GeoJSON FeatureCollection (id, iso_a2, name)
    #[arg(long, default_value = "data/world.json")]
    pub world: PathBuf,

    /// Brand traffic CSV (Code/ID, Brand Name, Country, Traffic, Bounce Rate)
    #[arg(long, default_value = "data/brands.csv")]
    pub brands: PathBuf,

    /// Brand master CSV (Brand#, Category)
    #[arg(long, default_value = "data/master.csv")]
    pub master: PathBuf,

    #[arg(long, default_value_t = 8.0)]
    pub margin_top: f64,

    #[arg(long, default_value_t = 4.0)]
    pub margin_right: f64,

    #[arg(long, default_value_t = 8.0)]
    pub margin_bottom: f64,

    #[arg(long, default_value_t = 4.0)]
    pub margin_left: f64,

    /// Ranked brands shown per country before the remainder bucket
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Snap bubbles to their new size instead of tweening
    #[arg(long)]
    pub no_animation: bool,
}

impl Args {
    pub fn margin(&self) -> Margin {
        Margin {
            top: self.margin_top.max(0.0),
            right: self.margin_right.max(0.0),
            bottom: self.margin_bottom.max(0.0),
            left: self.margin_left.max(0.0),
        }
    }
}

/// Settings the app controller needs from the command line
#[derive(Clone, Debug)]
pub struct MapSettings {
    pub margin: Margin,
    pub top_n: usize,
    pub animate: bool,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            margin: Margin::default(),
            top_n: DEFAULT_TOP_N,
            animate: true,
        }
    }
}

impl From<&Args> for MapSettings {
    fn from(args: &Args) -> Self {
        Self {
            margin: args.margin(),
            top_n: args.top_n.max(1),
            animate: !args.no_animation,
        }
    }
}
