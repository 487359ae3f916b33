//! Per-country traffic totals and top-brand breakdowns.

use crate::config::OTHERS_LABEL;
use crate::data::{BrandRecord, MasterIndex};
use crate::filter::FilterState;
use crate::map::{CountryCode, GeoFeatureIndex};
use std::collections::HashMap;

/// One row of a country breakdown. The remainder row has no rank.
#[derive(Clone, Debug, PartialEq)]
pub struct BrandRow {
    pub rank: Option<usize>,
    pub brand_name: String,
    pub traffic: f64,
    /// Fraction of the country total, in [0, 1]
    pub traffic_share: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CountryAggregate {
    pub total: f64,
    /// Ranked rows by descending traffic, then "Others" when present
    pub top_brands: Vec<BrandRow>,
}

/// Aggregates for every country that survived filtering. Built in one
/// pass and never mutated; a filter change replaces it wholesale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CountryAggregates {
    by_code: HashMap<CountryCode, CountryAggregate>,
}

impl CountryAggregates {
    pub fn get(&self, code: &str) -> Option<&CountryAggregate> {
        self.by_code.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Countries by descending total, ties broken by code for a stable order
    pub fn by_total_desc(&self) -> Vec<(&CountryCode, &CountryAggregate)> {
        let mut entries: Vec<_> = self.by_code.iter().collect();
        entries.sort_by(|a, b| b.1.total.total_cmp(&a.1.total).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

/// Filter brand rows and roll them up per country.
///
/// A row counts when its country is in the geo index, its effective
/// traffic is positive, and its category passes the filter.
pub fn aggregate(
    brands: &[BrandRecord],
    master: &MasterIndex,
    index: &GeoFeatureIndex,
    filter: &FilterState,
    top_n: usize,
) -> CountryAggregates {
    let mut groups: HashMap<CountryCode, Vec<(f64, &BrandRecord)>> = HashMap::new();

    for brand in brands {
        let code = CountryCode::new(&brand.country);
        if !index.contains(code.as_str()) {
            continue;
        }
        let traffic = brand.effective_traffic();
        if traffic <= 0.0 {
            continue;
        }
        if !filter.matches_category(master.category_of(brand)) {
            continue;
        }
        groups.entry(code).or_default().push((traffic, brand));
    }

    let by_code = groups
        .into_iter()
        .map(|(code, members)| (code, summarize(members, top_n)))
        .collect();

    CountryAggregates { by_code }
}

fn summarize(mut members: Vec<(f64, &BrandRecord)>, top_n: usize) -> CountryAggregate {
    let total: f64 = members.iter().map(|(traffic, _)| traffic).sum();
    // Stable: equal traffic keeps input order
    members.sort_by(|a, b| b.0.total_cmp(&a.0));

    let split = members.len().min(top_n);
    let mut top_brands: Vec<BrandRow> = members[..split]
        .iter()
        .enumerate()
        .map(|(i, (traffic, brand))| BrandRow {
            rank: Some(i + 1),
            brand_name: brand.name.clone(),
            traffic: *traffic,
            traffic_share: traffic / total,
        })
        .collect();

    if members.len() > top_n {
        let rest: f64 = members[split..].iter().map(|(traffic, _)| traffic).sum();
        top_brands.push(BrandRow {
            rank: None,
            brand_name: OTHERS_LABEL.to_string(),
            traffic: rest,
            traffic_share: rest / total,
        });
    }

    CountryAggregate { total, top_brands }
}

/// Largest per-country total over every brand row, ignoring filters and the
/// geo index. Per-country sums are rounded.
pub fn max_country_total(brands: &[BrandRecord]) -> f64 {
    let mut totals: HashMap<CountryCode, f64> = HashMap::new();
    for brand in brands {
        *totals.entry(CountryCode::new(&brand.country)).or_default() += brand.effective_traffic();
    }
    totals
        .values()
        .map(|total| total.round())
        .fold(0.0, f64::max)
}
