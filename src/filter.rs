use crate::config::ALL_CATEGORIES;
use crate::data::MasterIndex;

/// Filter dimensions the map understands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKey {
    Category,
}

impl FilterKey {
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "category" => Some(Self::Category),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
        }
    }
}

/// Change event emitted by the filter control: `{ key, value }`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterChange {
    pub key: FilterKey,
    pub value: String,
}

impl FilterChange {
    /// Build from the raw `{ key: "category", value }` event payload
    pub fn from_event(key: &str, value: &str) -> Option<Self> {
        FilterKey::parse(key).map(|key| Self {
            key,
            value: value.to_string(),
        })
    }
}

/// One filter dimension: the options and the selected one
#[derive(Clone, Debug, PartialEq)]
pub struct FilterDimension {
    pub label: &'static str,
    pub selected: String,
    pub options: Vec<String>,
}

impl FilterDimension {
    pub fn selected_index(&self) -> usize {
        self.options
            .iter()
            .position(|o| *o == self.selected)
            .unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FilterState {
    pub category: FilterDimension,
}

impl FilterState {
    /// Categories from the master table, sorted, with "ALL" first and selected
    pub fn from_master(master: &MasterIndex) -> Self {
        let mut options = vec![ALL_CATEGORIES.to_string()];
        options.extend(master.categories());
        Self {
            category: FilterDimension {
                label: "Category",
                selected: ALL_CATEGORIES.to_string(),
                options,
            },
        }
    }

    pub fn dimension(&self, key: FilterKey) -> &FilterDimension {
        match key {
            FilterKey::Category => &self.category,
        }
    }

    /// Apply a change event. Returns true when the selection changed.
    pub fn apply(&mut self, change: &FilterChange) -> bool {
        let dimension = match change.key {
            FilterKey::Category => &mut self.category,
        };
        if !dimension.options.contains(&change.value) {
            log::warn!(
                "ignoring unknown {} filter value {:?}",
                change.key.as_str(),
                change.value
            );
            return false;
        }
        if dimension.selected == change.value {
            return false;
        }
        dimension.selected = change.value.clone();
        true
    }

    /// Whether a brand in `category` passes the category filter
    pub fn matches_category(&self, category: &str) -> bool {
        self.category.selected == ALL_CATEGORIES || self.category.selected == category
    }
}

/// Keyboard-driven selector over one filter dimension
#[derive(Clone, Debug, Default)]
pub struct FilterControl {
    pub open: bool,
}

impl FilterControl {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Change event selecting the option `step` places away, wrapping
    pub fn step(&self, state: &FilterState, key: FilterKey, step: isize) -> Option<FilterChange> {
        let dimension = state.dimension(key);
        let n = dimension.options.len() as isize;
        if n == 0 {
            return None;
        }
        let next = (dimension.selected_index() as isize + step).rem_euclid(n) as usize;
        Some(FilterChange {
            key,
            value: dimension.options[next].clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MasterRecord;

    fn state() -> FilterState {
        FilterState::from_master(&MasterIndex::new(vec![
            MasterRecord::new("1", "Food"),
            MasterRecord::new("2", "Beauty"),
            MasterRecord::new("3", ""),
        ]))
    }

    #[test]
    fn test_options() {
        let s = state();
        assert_eq!(s.category.options, vec!["ALL", "Beauty", "Food", "Other"]);
        assert_eq!(s.category.selected, "ALL");
    }

    #[test]
    fn test_apply_event() {
        let mut s = state();
        let change = FilterChange::from_event("category", "Food").unwrap();
        assert!(s.apply(&change));
        assert!(!s.apply(&change));
        assert!(s.matches_category("Food"));
        assert!(!s.matches_category("Beauty"));
    }

    #[test]
    fn test_unknown_values_ignored() {
        let mut s = state();
        assert!(FilterChange::from_event("region", "EU").is_none());
        assert!(!s.apply(&FilterChange::from_event("category", "Toys").unwrap()));
        assert_eq!(s.category.selected, "ALL");
    }

    #[test]
    fn test_control_wraps() {
        let s = state();
        let control = FilterControl::default();
        let back = control.step(&s, FilterKey::Category, -1).unwrap();
        assert_eq!(back.value, "Other");
        let forward = control.step(&s, FilterKey::Category, 1).unwrap();
        assert_eq!(forward.value, "Beauty");
    }
}
