mod features;
pub(crate) mod geometry;
mod layers;
mod projection;
mod renderer;
mod scale;
mod spatial;
mod transition;
mod viewport;
mod zoom;

pub use features::{anchor_point, CountryCode, CountryFeature, GeoFeatureIndex, WorldFeature};
pub use layers::{Bubble, BubbleDatum, BubbleLayer, CountryLayer, CountryShape};
pub use projection::NaturalEarth;
pub use renderer::{MapLayers, MapRenderer};
pub use scale::{ticks, RadiusScale};
pub use transition::{ease_cubic_in_out, Tween};
pub use viewport::Viewport;
pub use zoom::{Zoom, ZoomTransform};
