//! Run-length encoding of the active mask region, per row and per color.
//!
//! A [`Run`] addresses `count` consecutive cells of one checkerboard array,
//! starting at the flat cell index `start` (padding row included, so the
//! first image row starts at `sub_width`). Two shapes are always emitted as
//! single-cell runs:
//!
//! - an active cell at raster column 0, which has no left neighbor;
//! - the last cell of a multi-cell run that reaches the final column of its
//!   parity, which may have no right neighbor.
//!
//! Every run with `count > 1` therefore consists of cells that have all four
//! neighbors inside the image row, and the solver only needs boundary tests
//! for single-cell runs.
use super::alloc::{AllocSite, ScratchAllocator};
use super::checkerboard::{sub_width, Color};
use super::error::HealError;
use crate::image::mask::is_active;
use serde::Serialize;

/// Span of consecutive active cells in one checkerboard array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Run {
    pub start: usize,
    pub count: usize,
}

/// Encode the cells of one raster parity (`0` for even columns, `1` for odd
/// ones) of `mask_row`, appending runs to `out`. Returns the number of
/// active cells visited.
///
/// `start_index` is the flat cell index of the row's first cell in the
/// checkerboard array receiving this parity.
pub fn encode_parity_runs(
    mask_row: &[f32],
    start_index: usize,
    parity: usize,
    out: &mut Vec<Run>,
) -> usize {
    let width = mask_row.len();
    let mut active = 0;
    let mut first_col = parity;
    if parity == 0 && width > 0 && is_active(mask_row[0]) {
        out.push(Run {
            start: start_index,
            count: 1,
        });
        active += 1;
        first_col = 2;
    }

    let mut run_start: Option<usize> = None;
    for col in (first_col..width).step_by(2) {
        if is_active(mask_row[col]) {
            active += 1;
            if run_start.is_none() {
                run_start = Some(col);
            }
        } else if let Some(s) = run_start.take() {
            out.push(Run {
                start: start_index + s / 2,
                count: (col - s) / 2,
            });
        }
    }

    if let Some(s) = run_start {
        // the run ends on the last column of this parity
        let start = start_index + s / 2;
        let count = (width - 1 - s) / 2 + 1;
        if count > 1 {
            out.push(Run {
                start,
                count: count - 1,
            });
            out.push(Run {
                start: start + count - 1,
                count: 1,
            });
        } else {
            out.push(Run { start, count: 1 });
        }
    }
    active
}

/// Runs of both parities of a single mask row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowRuns {
    /// Runs over even raster columns.
    pub even: Vec<Run>,
    /// Runs over odd raster columns.
    pub odd: Vec<Run>,
    /// Active cells in the row.
    pub active: usize,
}

/// Encode both parities of one mask row. `start_index` is the flat cell
/// index of the row's first cell, shared by both color arrays.
pub fn encode_row(mask_row: &[f32], start_index: usize) -> RowRuns {
    let mut runs = RowRuns::default();
    runs.active += encode_parity_runs(mask_row, start_index, 0, &mut runs.even);
    runs.active += encode_parity_runs(mask_row, start_index, 1, &mut runs.odd);
    runs
}

/// Runs of one color over the whole padded checkerboard, grouped by row.
#[derive(Clone, Debug)]
pub struct RunList {
    runs: Vec<Run>,
    row_offsets: Vec<usize>,
}

impl RunList {
    fn with_capacity<A: ScratchAllocator>(
        alloc: &A,
        site: AllocSite,
        max_runs: usize,
        padded_rows: usize,
    ) -> Result<Self, HealError> {
        let runs = alloc.try_with_capacity(site, max_runs)?;
        let mut row_offsets = alloc.try_with_capacity(site, padded_rows + 1)?;
        row_offsets.push(0);
        Ok(Self { runs, row_offsets })
    }

    fn close_row(&mut self) {
        self.row_offsets.push(self.runs.len());
    }

    /// All runs in ascending cell order.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Runs of padded row `row` (row 0 is the top padding row).
    pub fn row(&self, row: usize) -> &[Run] {
        match (self.row_offsets.get(row), self.row_offsets.get(row + 1)) {
            (Some(&start), Some(&end)) => &self.runs[start..end],
            _ => &[],
        }
    }

    /// Number of padded rows covered by the list.
    pub fn rows(&self) -> usize {
        self.row_offsets.len().saturating_sub(1)
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Total number of cells covered by the runs.
    pub fn cell_count(&self) -> usize {
        self.runs.iter().map(|r| r.count).sum()
    }
}

/// Red and black run lists of a whole mask.
#[derive(Clone, Debug)]
pub struct EncodedMask {
    pub red: RunList,
    pub black: RunList,
    /// Number of active mask cells.
    pub active: usize,
}

impl EncodedMask {
    pub fn runs(&self, color: Color) -> &RunList {
        match color {
            Color::Red => &self.red,
            Color::Black => &self.black,
        }
    }
}

/// Encode a `width × height` mask into red and black run lists.
///
/// Run arrays are reserved once at their worst-case size (every other cell
/// toggling) so encoding never reallocates.
pub fn encode<A: ScratchAllocator>(
    mask: &[f32],
    width: usize,
    height: usize,
    alloc: &A,
) -> Result<EncodedMask, HealError> {
    let sub = sub_width(width);
    let max_runs = sub * height;
    let padded_rows = height + 2;
    let mut red = RunList::with_capacity(alloc, AllocSite::RedRuns, max_runs, padded_rows)?;
    let mut black = RunList::with_capacity(alloc, AllocSite::BlackRuns, max_runs, padded_rows)?;
    let mut active = 0;

    red.close_row();
    black.close_row();
    if width > 0 {
        for (y, mask_row) in mask.chunks_exact(width).take(height).enumerate() {
            let start_index = (y + 1) * sub;
            let (even, odd) = match Color::first_in_row(y) {
                Color::Black => (&mut black, &mut red),
                Color::Red => (&mut red, &mut black),
            };
            active += encode_parity_runs(mask_row, start_index, 0, &mut even.runs);
            active += encode_parity_runs(mask_row, start_index, 1, &mut odd.runs);
            red.close_row();
            black.close_row();
        }
    } else {
        for _ in 0..height {
            red.close_row();
            black.close_row();
        }
    }
    red.close_row();
    black.close_row();

    Ok(EncodedMask { red, black, active })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heal::alloc::SystemAllocator;

    fn row(bits: &[u8]) -> Vec<f32> {
        bits.iter().map(|&b| b as f32).collect()
    }

    fn lcg_mask(len: usize, seed: u64) -> Vec<f32> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                if (state >> 33) % 3 == 0 {
                    0.0
                } else {
                    0.5
                }
            })
            .collect()
    }

    #[test]
    fn leading_active_cell_is_isolated() {
        let runs = encode_row(&row(&[1, 0, 1, 0, 1, 0, 0, 0]), 10);
        assert_eq!(
            runs.even,
            vec![Run { start: 10, count: 1 }, Run { start: 11, count: 2 }]
        );
        assert!(runs.odd.is_empty());
        assert_eq!(runs.active, 3);
    }

    #[test]
    fn run_reaching_row_end_splits_final_cell() {
        let runs = encode_row(&row(&[1, 1, 1, 1, 1, 1]), 3);
        assert_eq!(
            runs.even,
            vec![
                Run { start: 3, count: 1 },
                Run { start: 4, count: 1 },
                Run { start: 5, count: 1 },
            ]
        );
        assert_eq!(
            runs.odd,
            vec![Run { start: 3, count: 2 }, Run { start: 5, count: 1 }]
        );
        assert_eq!(runs.active, 6);
    }

    #[test]
    fn odd_width_final_even_column_is_split() {
        let runs = encode_row(&row(&[0, 0, 1, 1, 1, 1, 1]), 0);
        assert_eq!(
            runs.even,
            vec![Run { start: 1, count: 2 }, Run { start: 3, count: 1 }]
        );
        assert_eq!(
            runs.odd,
            vec![Run { start: 1, count: 1 }, Run { start: 2, count: 1 }]
        );
    }

    #[test]
    fn interior_run_is_not_split() {
        let runs = encode_row(&row(&[0, 1, 0, 1, 0, 1, 0, 0]), 0);
        assert_eq!(runs.odd, vec![Run { start: 0, count: 3 }]);
    }

    #[test]
    fn single_cell_at_row_end_stays_single() {
        let runs = encode_row(&row(&[0, 0, 0, 1]), 0);
        assert_eq!(runs.odd, vec![Run { start: 1, count: 1 }]);
        assert!(runs.even.is_empty());
    }

    #[test]
    fn run_counts_cover_active_cells_of_each_parity() {
        for width in 1..24 {
            for seed in 0..8u64 {
                let mask = lcg_mask(width, seed * 31 + width as u64);
                let runs = encode_row(&mask, 0);
                for (parity, list) in [(0, &runs.even), (1, &runs.odd)] {
                    let expected = (parity..width)
                        .step_by(2)
                        .filter(|&x| mask[x] != 0.0)
                        .count();
                    let covered: usize = list.iter().map(|r| r.count).sum();
                    assert_eq!(covered, expected, "width={width} seed={seed} parity={parity}");
                    for pair in list.windows(2) {
                        assert!(pair[0].start + pair[0].count <= pair[1].start);
                    }
                    for run in list.iter().filter(|r| r.count > 1) {
                        let first_x = 2 * run.start + parity;
                        let last_x = 2 * (run.start + run.count - 1) + parity;
                        assert!(first_x >= 1 && last_x + 1 < width);
                    }
                }
            }
        }
    }

    #[test]
    fn empty_mask_yields_no_runs() {
        let encoded = encode(&vec![0.0; 6 * 4], 6, 4, &SystemAllocator).unwrap();
        assert!(encoded.red.is_empty());
        assert!(encoded.black.is_empty());
        assert_eq!(encoded.active, 0);
        assert_eq!(encoded.red.rows(), 6);
    }

    #[test]
    fn rows_route_parities_by_row_color() {
        let (width, height) = (4, 2);
        let mask = row(&[0, 0, 1, 0, 0, 0, 1, 0]);
        let encoded = encode(&mask, width, height, &SystemAllocator).unwrap();
        // (2, 0) is black, (2, 1) is red; both sit in cell 1 of their row.
        assert_eq!(encoded.black.row(1), &[Run { start: 3, count: 1 }]);
        assert_eq!(encoded.red.row(2), &[Run { start: 5, count: 1 }]);
        assert!(encoded.red.row(1).is_empty());
        assert!(encoded.black.row(2).is_empty());
        assert_eq!(encoded.active, 2);
        assert_eq!(encoded.red.cell_count() + encoded.black.cell_count(), 2);
    }
}
