//! Country polygons keyed by ISO code, each with the point its bubble
//! hangs from.

use crate::config::{ANTARCTICA_ID, CODE_PATCHES, INVALID_CODE, WHOLE_GEOMETRY_ANCHOR_IDS};
use geo::{Area, Centroid, Coord, MultiPolygon, Polygon};
use rayon::prelude::*;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// Lower-cased ISO 3166 alpha-2 code, the join key between brand rows,
/// country shapes and bubbles
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CountryCode {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl Borrow<str> for CountryCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A feature as it arrives from the world dataset
#[derive(Clone, Debug)]
pub struct WorldFeature {
    pub id: String,
    pub iso_a2: String,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// A drawable country with its derived anchor (lon, lat)
#[derive(Clone, Debug)]
pub struct CountryFeature {
    pub id: String,
    pub code: CountryCode,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
    /// `None` for degenerate geometry; such a country never gets a bubble
    pub anchor: Option<Coord<f64>>,
}

/// All drawable countries plus a lookup of those that can host a bubble
pub struct GeoFeatureIndex {
    features: Vec<CountryFeature>,
    by_code: HashMap<CountryCode, usize>,
}

impl GeoFeatureIndex {
    pub fn new(raw: Vec<WorldFeature>) -> Self {
        let features: Vec<CountryFeature> = raw
            .into_par_iter()
            .filter(|f| f.id != ANTARCTICA_ID)
            .map(|f| {
                let iso_a2 = CODE_PATCHES
                    .iter()
                    .find(|(id, _)| *id == f.id)
                    .map(|(_, code)| code.to_string())
                    .unwrap_or(f.iso_a2);
                let anchor = anchor_point(&f.id, &f.geometry);
                CountryFeature {
                    code: CountryCode::new(&iso_a2),
                    anchor,
                    id: f.id,
                    name: f.name,
                    geometry: f.geometry,
                }
            })
            .collect();

        let mut by_code = HashMap::with_capacity(features.len());
        for (idx, feature) in features.iter().enumerate() {
            if feature.code.as_str().is_empty() || feature.code.as_str() == INVALID_CODE {
                log::debug!("feature {} ({}) has no country code", feature.id, feature.name);
                continue;
            }
            if feature.anchor.is_none() {
                log::warn!("feature {} ({}) has degenerate geometry", feature.id, feature.name);
            }
            if by_code.contains_key(&feature.code) {
                log::warn!("duplicate country code {}, keeping the first", feature.code);
                continue;
            }
            by_code.insert(feature.code.clone(), idx);
        }

        log::info!(
            "indexed {} of {} country features",
            by_code.len(),
            features.len()
        );

        Self { features, by_code }
    }

    /// Every drawable shape, including ones without a usable code
    pub fn features(&self) -> &[CountryFeature] {
        &self.features
    }

    pub fn get(&self, code: &str) -> Option<&CountryFeature> {
        self.by_code.get(code).map(|&idx| &self.features[idx])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// Whether the shape at `idx` can be looked up by its code
    pub fn is_indexed(&self, idx: usize) -> bool {
        self.features
            .get(idx)
            .and_then(|f| self.by_code.get(&f.code))
            .is_some_and(|&i| i == idx)
    }

    pub fn anchor(&self, code: &str) -> Option<Coord<f64>> {
        self.get(code).and_then(|f| f.anchor)
    }

    /// Number of countries that can host a bubble
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

/// Representative point for a country's bubble.
///
/// Multi-part countries use the center of mass of their largest polygon so
/// the bubble lands on the mainland instead of the ocean between islands.
pub fn anchor_point(id: &str, geometry: &MultiPolygon<f64>) -> Option<Coord<f64>> {
    // Zero-area rings still have a line centroid, so check area first
    if geometry.unsigned_area() <= 0.0 {
        return None;
    }
    if WHOLE_GEOMETRY_ANCHOR_IDS.contains(&id) {
        return vertex_centroid(geometry);
    }

    let (largest, _) = geometry
        .0
        .iter()
        .map(|poly| (poly, poly.unsigned_area()))
        .fold((None::<&Polygon<f64>>, 0.0), |best, (poly, area)| {
            if area > best.1 {
                (Some(poly), area)
            } else {
                best
            }
        });
    largest.and_then(|poly| poly.centroid()).map(|p| p.0)
}

/// Mean of every ring vertex, closing vertices excluded
fn vertex_centroid(geometry: &MultiPolygon<f64>) -> Option<Coord<f64>> {
    let mut sum = Coord { x: 0.0, y: 0.0 };
    let mut count = 0usize;
    for poly in &geometry.0 {
        for ring in std::iter::once(poly.exterior()).chain(poly.interiors()) {
            let coords = &ring.0;
            let open = if coords.len() > 1 && coords.first() == coords.last() {
                &coords[..coords.len() - 1]
            } else {
                &coords[..]
            };
            for c in open {
                sum.x += c.x;
                sum.y += c.y;
                count += 1;
            }
        }
    }
    (count > 0).then(|| Coord {
        x: sum.x / count as f64,
        y: sum.y / count as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ]
    }

    fn feature(id: &str, code: &str, polys: Vec<Polygon<f64>>) -> WorldFeature {
        WorldFeature {
            id: id.to_string(),
            iso_a2: code.to_string(),
            name: format!("Country {id}"),
            geometry: MultiPolygon(polys),
        }
    }

    #[test]
    fn test_antarctica_dropped() {
        let index = GeoFeatureIndex::new(vec![
            feature("010", "AQ", vec![square(0.0, -80.0, 10.0)]),
            feature("840", "US", vec![square(-100.0, 30.0, 10.0)]),
        ]);
        assert!(index.features().iter().all(|f| f.id != "010"));
        assert!(!index.contains("aq"));
        assert!(index.contains("us"));
    }

    #[test]
    fn test_code_patches() {
        let index = GeoFeatureIndex::new(vec![
            feature("250", "-99", vec![square(0.0, 45.0, 5.0)]),
            feature("578", "-99", vec![square(8.0, 60.0, 5.0)]),
        ]);
        assert_eq!(index.get("fr").map(|f| f.id.as_str()), Some("250"));
        assert_eq!(index.get("no").map(|f| f.id.as_str()), Some("578"));
    }

    #[test]
    fn test_invalid_code_drawable_not_indexed() {
        let index = GeoFeatureIndex::new(vec![feature("999", "-99", vec![square(0.0, 0.0, 1.0)])]);
        assert_eq!(index.features().len(), 1);
        assert!(index.is_empty());
        assert!(!index.is_indexed(0));
    }

    #[test]
    fn test_anchor_largest_polygon() {
        let big = square(0.0, 0.0, 10.0);
        let island = square(50.0, 50.0, 1.0);
        let anchor = anchor_point("840", &MultiPolygon(vec![island, big])).unwrap();
        assert!((anchor.x - 5.0).abs() < 1e-9);
        assert!((anchor.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_anchor_whole_geometry() {
        let a = square(0.0, 0.0, 10.0);
        let b = square(100.0, 0.0, 1.0);
        let anchor = anchor_point("643", &MultiPolygon(vec![a, b])).unwrap();
        // Vertex mean of both squares, not the big square's center
        assert!(anchor.x > 10.0);
    }

    #[test]
    fn test_degenerate_geometry_has_no_anchor() {
        let index = GeoFeatureIndex::new(vec![feature("004", "AF", vec![])]);
        assert_eq!(index.features().len(), 1);
        assert!(index.anchor("af").is_none());
    }

    #[test]
    fn test_zero_area_polygon_has_no_anchor() {
        let flat = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0), (x: 2.0, y: 2.0), (x: 0.0, y: 0.0)];
        assert!(anchor_point("100", &MultiPolygon(vec![flat.clone()])).is_none());
        assert!(anchor_point("100", &MultiPolygon(vec![flat.clone(), flat.clone()])).is_none());
        assert!(anchor_point("643", &MultiPolygon(vec![flat.clone()])).is_none());

        let index = GeoFeatureIndex::new(vec![feature("100", "BG", vec![flat])]);
        assert!(index.contains("bg"));
        assert!(index.anchor("bg").is_none());
    }

    #[test]
    fn test_codes_lowercased() {
        assert_eq!(CountryCode::new(" US ").as_str(), "us");
    }
}
