//! Grid layout for machine placement.
//!
//! Maps a catalog position to a floor cell so the grid is centred on the
//! origin for any catalog size. Pure: identical inputs give identical output.

use bevy::prelude::*;

/// Number of grid columns for `total_count` machines. Never zero.
pub fn column_count(total_count: usize) -> usize {
    ((total_count as f64).sqrt().ceil() as usize).max(1)
}

/// Number of grid rows for `total_count` machines.
pub fn row_count(total_count: usize) -> usize {
    total_count.div_ceil(column_count(total_count))
}

/// Grid cell `(column, row)` occupied by `index`.
pub fn cell_of(index: usize, total_count: usize) -> (usize, usize) {
    let columns = column_count(total_count);
    (index % columns, index / columns)
}

/// World position of machine `index` out of `total_count`, `spacing` apart.
/// All machines sit on `y = 0`.
pub fn position_of(index: usize, total_count: usize, spacing: f32) -> Vec3 {
    let columns = column_count(total_count) as f32;
    let rows = row_count(total_count).max(1) as f32;
    let (col, row) = cell_of(index, total_count);

    Vec3::new(
        (col as f32 - (columns - 1.0) / 2.0) * spacing,
        0.0,
        (row as f32 - (rows - 1.0) / 2.0) * spacing,
    )
}

/// Cached positions for the active catalog.
/// Rebuilt only when the machine count changes, never per frame.
#[derive(Resource, Debug, Clone, Default)]
pub struct GridLayout {
    total_count: usize,
    spacing: f32,
    positions: Vec<Vec3>,
}

impl GridLayout {
    pub fn new(total_count: usize, spacing: f32) -> Self {
        let positions = (0..total_count)
            .map(|index| position_of(index, total_count, spacing))
            .collect();
        Self {
            total_count,
            spacing,
            positions,
        }
    }

    /// Recompute when the count (or spacing) differs. Returns whether it did.
    pub fn ensure(&mut self, total_count: usize, spacing: f32) -> bool {
        if self.total_count == total_count
            && self.spacing == spacing
            && self.positions.len() == total_count
        {
            return false;
        }
        *self = Self::new(total_count, spacing);
        true
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.positions.get(index).copied()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const SPACING: f32 = 12.0;

    #[test]
    fn empty_catalog_has_no_positions() {
        let layout = GridLayout::new(0, SPACING);
        assert!(layout.is_empty());
        assert_eq!(column_count(0), 1);
        assert_eq!(row_count(0), 0);
    }

    #[test]
    fn single_machine_is_centred() {
        assert_eq!(position_of(0, 1, SPACING), Vec3::ZERO);
    }

    #[test]
    fn no_two_machines_share_a_cell() {
        for total in 0..=50 {
            let cells: HashSet<_> = (0..total).map(|i| cell_of(i, total)).collect();
            assert_eq!(cells.len(), total, "collision for total {total}");

            let positions: HashSet<_> = (0..total)
                .map(|i| {
                    let p = position_of(i, total, SPACING);
                    (p.x.to_bits(), p.z.to_bits())
                })
                .collect();
            assert_eq!(positions.len(), total);
        }
    }

    #[test]
    fn positions_are_deterministic() {
        for total in 1..=20 {
            for index in 0..total {
                assert_eq!(
                    position_of(index, total, SPACING),
                    position_of(index, total, SPACING)
                );
            }
        }
    }

    #[test]
    fn ten_machines_are_symmetric_about_origin() {
        let total = 10;
        assert_eq!(column_count(total), 4);
        assert_eq!(row_count(total), 3);

        let positions: Vec<_> = (0..total).map(|i| position_of(i, total, SPACING)).collect();
        let min_x = positions.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_x = positions.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let min_z = positions.iter().map(|p| p.z).fold(f32::INFINITY, f32::min);
        let max_z = positions.iter().map(|p| p.z).fold(f32::NEG_INFINITY, f32::max);

        assert_eq!(min_x, -max_x);
        assert_eq!(min_z, -max_z);
        assert_eq!(max_x, 1.5 * SPACING);
        assert_eq!(max_z, SPACING);
        assert!(positions.iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn layout_recomputes_only_on_count_change() {
        let mut layout = GridLayout::new(5, SPACING);
        assert!(!layout.ensure(5, SPACING));
        assert!(layout.ensure(6, SPACING));
        assert_eq!(layout.len(), 6);
        assert_eq!(layout.position(5), Some(position_of(5, 6, SPACING)));
        assert_eq!(layout.position(6), None);
    }
}
