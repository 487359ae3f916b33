use crate::config::OTHER_CATEGORY;
use serde::Deserialize;
use std::collections::HashMap;

/// One brand's traffic row. All fields are kept as raw text so malformed
/// numbers can be absorbed as zero traffic instead of failing the load.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BrandRecord {
    #[serde(rename = "Code/ID", default)]
    pub id: String,
    #[serde(rename = "Brand Name", default)]
    pub name: String,
    #[serde(rename = "Country", default)]
    pub country: String,
    #[serde(rename = "Traffic", default)]
    pub traffic: String,
    #[serde(rename = "Bounce Rate", default)]
    pub bounce_rate: String,
}

impl BrandRecord {
    pub fn new(id: &str, name: &str, country: &str, traffic: &str, bounce_rate: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            country: country.to_string(),
            traffic: traffic.to_string(),
            bounce_rate: bounce_rate.to_string(),
        }
    }

    /// Raw traffic scaled by the non-bounced fraction.
    ///
    /// Always finite and never negative: unparseable traffic or bounce
    /// rate yields 0.
    pub fn effective_traffic(&self) -> f64 {
        let Some(traffic) = parse_number(&self.traffic) else {
            return 0.0;
        };
        let Some(bounce) = parse_number(self.bounce_rate.trim().trim_end_matches('%')) else {
            return 0.0;
        };

        let value = traffic * (1.0 - bounce / 100.0);
        if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        }
    }
}

/// Parse a numeric cell; blank cells count as zero
fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Brand master row mapping a brand id to its category
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MasterRecord {
    #[serde(rename = "Brand#", default)]
    pub id: String,
    #[serde(rename = "Category", default)]
    pub category: String,
}

impl MasterRecord {
    pub fn new(id: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            category: category.to_string(),
        }
    }

    /// Category with blanks and the "?" placeholder folded into "Other"
    pub fn category(&self) -> &str {
        match self.category.trim() {
            "" | "?" => OTHER_CATEGORY,
            other => other,
        }
    }
}

/// Master rows keyed by brand id
#[derive(Clone, Debug, Default)]
pub struct MasterIndex {
    by_id: HashMap<String, MasterRecord>,
}

impl MasterIndex {
    /// Index master rows by id. The first row wins when ids repeat.
    pub fn new(records: Vec<MasterRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for record in records {
            if by_id.contains_key(&record.id) {
                log::warn!("duplicate master row for brand {:?}, keeping the first", record.id);
                continue;
            }
            by_id.insert(record.id.clone(), record);
        }
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&MasterRecord> {
        self.by_id.get(id)
    }

    /// Category of a brand, "Other" when the brand has no master row
    pub fn category_of(&self, brand: &BrandRecord) -> &str {
        self.get(&brand.id)
            .map(MasterRecord::category)
            .unwrap_or(OTHER_CATEGORY)
    }

    /// Distinct categories in ascending order
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .by_id
            .values()
            .map(|record| record.category().to_string())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
