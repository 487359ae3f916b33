mod records;

pub use records::{BrandRecord, MasterIndex, MasterRecord};

use crate::map::WorldFeature;
use geojson::{feature::Id, GeoJson};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] simd_json::Error),
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("world data must be a GeoJSON FeatureCollection")]
    NotFeatureCollection,
}

/// Everything the map needs, already parsed
pub struct Dataset {
    pub world: Vec<WorldFeature>,
    pub brands: Vec<BrandRecord>,
    pub master: Vec<MasterRecord>,
}

/// Load the world polygons and both CSV tables
pub fn load_dataset(world: &Path, brands: &Path, master: &Path) -> Result<Dataset, LoadError> {
    let world = load_world(world)?;
    let brands: Vec<BrandRecord> = load_csv(brands)?;
    let master: Vec<MasterRecord> = load_csv(master)?;
    log::info!(
        "loaded {} world features, {} brand rows, {} master rows",
        world.len(),
        brands.len(),
        master.len()
    );
    Ok(Dataset { world, brands, master })
}

/// Load a GeoJSON FeatureCollection of country polygons
pub fn load_world(path: &Path) -> Result<Vec<WorldFeature>, LoadError> {
    let mut bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_world(&mut bytes)
}

/// Parse GeoJSON bytes. simd-json parses in place, hence `&mut`.
pub fn parse_world(bytes: &mut [u8]) -> Result<Vec<WorldFeature>, LoadError> {
    let value: serde_json::Value = simd_json::serde::from_slice(bytes)?;
    let GeoJson::FeatureCollection(fc) = GeoJson::from_json_value(value)? else {
        return Err(LoadError::NotFeatureCollection);
    };

    let features = fc
        .features
        .into_iter()
        .map(|feature| {
            let id = match &feature.id {
                Some(Id::String(s)) => s.clone(),
                Some(Id::Number(n)) => n
                    .as_u64()
                    .map(|n| format!("{n:03}"))
                    .unwrap_or_else(|| n.to_string()),
                None => String::new(),
            };
            let iso_a2 = feature
                .property("iso_a2")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let name = feature
                .property("name")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown")
                .to_string();

            let geometry = feature
                .geometry
                .and_then(|g| geo::Geometry::<f64>::try_from(g).ok())
                .map(polygons_of)
                .unwrap_or_else(|| geo::MultiPolygon(Vec::new()));
            if geometry.0.is_empty() {
                log::warn!("feature {id} ({name}) has no polygon geometry");
            }

            WorldFeature {
                id,
                iso_a2,
                name,
                geometry,
            }
        })
        .collect();

    Ok(features)
}

/// Keep the polygonal part of a geometry
fn polygons_of(geometry: geo::Geometry<f64>) -> geo::MultiPolygon<f64> {
    match geometry {
        geo::Geometry::Polygon(p) => geo::MultiPolygon(vec![p]),
        geo::Geometry::MultiPolygon(mp) => mp,
        geo::Geometry::GeometryCollection(gc) => geo::MultiPolygon(
            gc.0.into_iter().flat_map(|g| polygons_of(g).0).collect(),
        ),
        _ => geo::MultiPolygon(Vec::new()),
    }
}

/// Load a headed CSV table
pub fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, LoadError> {
    let file = fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_csv(file)
}

/// Parse a headed CSV table. Rows that fail to deserialize are skipped.
pub fn parse_csv<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for row in reader.deserialize::<T>() {
        match row {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                skipped += 1;
                log::debug!("skipping malformed row: {e}");
            }
        }
    }
    if skipped > 0 {
        log::warn!("skipped {skipped} malformed CSV rows");
    }
    Ok(rows)
}
