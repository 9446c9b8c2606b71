//! Splitting the grid into display segments.

use std::ops::Range;

/// One display region showing `rows` of the full grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<H> {
    pub handle: H,
    pub rows: Range<usize>,
}

/// `ceil(height / rows_per_segment)`; zero when either is zero.
pub fn segment_count(height: usize, rows_per_segment: usize) -> usize {
    if rows_per_segment == 0 {
        return 0;
    }
    height.div_ceil(rows_per_segment)
}

/// Ascending, gap-free, non-overlapping row ranges covering `0..height`.
/// The last range is truncated at `height`.
pub fn partition(height: usize, rows_per_segment: usize) -> Vec<Range<usize>> {
    (0..segment_count(height, rows_per_segment))
        .map(|i| {
            let start = i * rows_per_segment;
            start..(start + rows_per_segment).min(height)
        })
        .collect()
}
