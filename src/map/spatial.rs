use geo::Rect;
use std::collections::HashMap;

/// Uniform grid over projected shape bounding boxes for pointer hit tests.
///
/// Each shape is inserted into every cell its bbox overlaps, so a lookup
/// never misses a shape but may return ones whose polygon does not contain
/// the point; callers confirm with an exact test.
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    #[inline(always)]
    fn to_cell(&self, x: f64, y: f64) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Build from per-shape bounding boxes; `None` entries are skipped but
    /// still consume an index
    pub fn build<'a>(bboxes: impl Iterator<Item = Option<&'a Rect<f64>>>, cell_size: f64) -> Self {
        let mut grid = Self {
            cells: HashMap::new(),
            cell_size: cell_size.max(1.0),
        };
        for (idx, bbox) in bboxes.enumerate() {
            let Some(bbox) = bbox else { continue };
            let min = grid.to_cell(bbox.min().x, bbox.min().y);
            let max = grid.to_cell(bbox.max().x, bbox.max().y);
            for y in min.1..=max.1 {
                for x in min.0..=max.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Shape indices whose bbox may contain the point
    pub fn query_point(&self, x: f64, y: f64) -> &[usize] {
        self.cells
            .get(&self.to_cell(x, y))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;

    #[test]
    fn test_query_point() {
        let a = Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 30.0, y: 10.0 });
        let b = Rect::new(coord! { x: 25.0, y: 5.0 }, coord! { x: 40.0, y: 40.0 });
        let grid = FeatureGrid::build([Some(&a), None, Some(&b)].into_iter(), 16.0);

        assert_eq!(grid.query_point(5.0, 5.0), &[0]);
        let mut both = grid.query_point(28.0, 8.0).to_vec();
        both.sort();
        assert_eq!(both, vec![0, 2]);
        assert!(grid.query_point(100.0, 100.0).is_empty());
    }
}
