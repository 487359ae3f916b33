use brand_bubble_map::aggregate::aggregate;
use brand_bubble_map::data::{BrandRecord, MasterIndex, MasterRecord};
use brand_bubble_map::filter::{FilterChange, FilterState};
use brand_bubble_map::map::{anchor_point, GeoFeatureIndex, WorldFeature};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geo::{Coord, LineString, MultiPolygon, Polygon};

const COUNTRIES: usize = 180;
const BRANDS_PER_COUNTRY: usize = 60;
const CATEGORIES: [&str; 6] = ["Food", "Beauty", "Apparel", "Home", "Pets", "?"];

/// A jagged ring of `n` vertices around (cx, cy)
fn ring(cx: f64, cy: f64, radius: f64, n: usize) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = (0..n)
        .map(|i| {
            let a = i as f64 / n as f64 * std::f64::consts::TAU;
            let r = radius * (1.0 + 0.2 * (a * 7.0).sin());
            Coord {
                x: cx + r * a.cos(),
                y: cy + r * a.sin(),
            }
        })
        .collect();
    coords.push(coords[0]);
    LineString(coords)
}

/// Mainland plus a few islands, like most coastal countries
fn country_geometry(i: usize) -> MultiPolygon<f64> {
    let cx = (i % 18) as f64 * 20.0 - 170.0;
    let cy = (i / 18) as f64 * 14.0 - 60.0;
    let mut polygons = vec![Polygon::new(ring(cx, cy, 5.0, 400), vec![])];
    for island in 0..4 {
        let offset = 6.0 + island as f64;
        polygons.push(Polygon::new(ring(cx + offset, cy - offset / 2.0, 0.6, 60), vec![]));
    }
    MultiPolygon(polygons)
}

fn code(i: usize) -> String {
    let a = (b'A' + (i / 26) as u8) as char;
    let b = (b'A' + (i % 26) as u8) as char;
    format!("{a}{b}")
}

fn world() -> Vec<WorldFeature> {
    (0..COUNTRIES)
        .map(|i| WorldFeature {
            id: format!("{:03}", i + 100),
            iso_a2: code(i),
            name: format!("Country {i}"),
            geometry: country_geometry(i),
        })
        .collect()
}

fn brands() -> Vec<BrandRecord> {
    (0..COUNTRIES * BRANDS_PER_COUNTRY)
        .map(|i| {
            let country = code(i % COUNTRIES);
            let traffic = ((i * 7919) % 100_000).to_string();
            let bounce = format!("{}%", (i * 31) % 100);
            BrandRecord::new(&format!("b{}", i % 500), &format!("Brand {i}"), &country, &traffic, &bounce)
        })
        .collect()
}

fn master() -> MasterIndex {
    MasterIndex::new(
        (0..500)
            .map(|i| MasterRecord::new(&format!("b{i}"), CATEGORIES[i % CATEGORIES.len()]))
            .collect(),
    )
}

fn bench_aggregate(c: &mut Criterion) {
    let index = GeoFeatureIndex::new(world());
    let brands = brands();
    let master = master();
    let all = FilterState::from_master(&master);
    let mut food = all.clone();
    if let Some(change) = FilterChange::from_event("category", "Food") {
        food.apply(&change);
    }

    c.bench_function("aggregate_all_categories", |b| {
        b.iter(|| aggregate(black_box(&brands), &master, &index, &all, 5))
    });
    c.bench_function("aggregate_one_category", |b| {
        b.iter(|| aggregate(black_box(&brands), &master, &index, &food, 5))
    });
}

fn bench_anchors(c: &mut Criterion) {
    let geometries: Vec<MultiPolygon<f64>> = (0..COUNTRIES).map(country_geometry).collect();

    c.bench_function("anchor_point_largest_polygon", |b| {
        b.iter(|| {
            for geometry in &geometries {
                black_box(anchor_point("999", geometry));
            }
        })
    });
    c.bench_function("geo_feature_index_build", |b| {
        b.iter_batched(world, GeoFeatureIndex::new, criterion::BatchSize::LargeInput)
    });
}

criterion_group!(benches, bench_aggregate, bench_anchors);
criterion_main!(benches);
