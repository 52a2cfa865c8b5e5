//! Pairwise joint-label map generation.
//!
//! For every pixel and every offset in a pattern, the builder looks up the
//! neighbor at `(row + drow, col + dcol)` and emits the joint label
//! `encode(label, neighbor_label, K)` into the channel matching the offset's
//! position in the pattern. A neighbor outside the map means the pair has no
//! defined label; that cell gets the IGNORE sentinel. Boundaries are never
//! clamped or wrapped, since either would manufacture a spatial relation
//! that does not exist.
//!
//! The builder is a pure function. The surrounding and above-below maps for
//! one image share no state and are built concurrently by the pipeline.

use crate::error::{PrepError, PrepResult};
use crate::grid::{ClassMap, PairwiseMap};
use crate::labels::encoder::encode;
use crate::labels::offsets::OffsetPattern;

/// Builds one joint-label map for `class_map` under `pattern`.
///
/// The output has shape `(rows, cols, pattern.len())`; channel `i`
/// corresponds to offset `i`. Every input label is validated against
/// `[0, num_classes)` up front (fail fast, no partial output), and the
/// sentinel is checked against the joint range so it can never alias a real
/// pair.
///
/// # Errors
///
/// Returns [`PrepError::Precondition`] when `num_classes` is not positive,
/// when a label falls outside `[0, num_classes)`, or when `ignore_sentinel`
/// lies inside `[0, num_classes^2)`.
pub fn generate_pairwise(
    class_map: &ClassMap,
    pattern: &OffsetPattern,
    num_classes: i32,
    ignore_sentinel: i32,
) -> PrepResult<PairwiseMap> {
    class_map.validate_range(num_classes)?;
    let joint_count = i64::from(num_classes) * i64::from(num_classes);
    if (0..joint_count).contains(&i64::from(ignore_sentinel)) {
        return Err(PrepError::Precondition(format!(
            "ignore sentinel {ignore_sentinel} lies inside the joint range [0, {joint_count})"
        )));
    }

    let rows = class_map.rows();
    let cols = class_map.cols();
    let channels = pattern.len();
    let mut data = vec![0i32; rows * cols * channels];

    for row in 0..rows {
        for col in 0..cols {
            let base = (row * cols + col) * channels;
            let label = class_map.get(row, col);
            for (channel, offset) in pattern.offsets().iter().enumerate() {
                let nrow = row as i64 + i64::from(offset.drow);
                let ncol = col as i64 + i64::from(offset.dcol);
                let in_bounds =
                    nrow >= 0 && nrow < rows as i64 && ncol >= 0 && ncol < cols as i64;
                data[base + channel] = if in_bounds {
                    let neighbor = class_map.get(nrow as usize, ncol as usize);
                    encode(label, neighbor, num_classes)
                } else {
                    ignore_sentinel
                };
            }
        }
    }

    PairwiseMap::from_vec(rows, cols, channels, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::offsets::Offset;

    fn three_by_three() -> ClassMap {
        ClassMap::from_vec(3, 3, vec![0, 1, 0, 1, 1, 2, 0, 2, 1]).unwrap()
    }

    #[test]
    fn above_pattern_matches_worked_example() {
        let pattern = OffsetPattern::above_below(vec![Offset::new(-1, 0)]).unwrap();
        let map = generate_pairwise(&three_by_three(), &pattern, 3, -1).unwrap();

        // Top row has no neighbor above.
        for col in 0..3 {
            assert_eq!(map.get(0, col, 0), -1);
        }
        // (1,0)=1 over (0,0)=0 -> 1*3+0; (2,1)=2 over (1,1)=1 -> 2*3+1.
        assert_eq!(map.get(1, 0, 0), 3);
        assert_eq!(map.get(2, 1, 0), 7);
    }

    #[test]
    fn output_shape_tracks_input_and_pattern() {
        let pattern = OffsetPattern::default_surrounding();
        let map = generate_pairwise(&three_by_three(), &pattern, 3, -1).unwrap();
        assert_eq!((map.rows(), map.cols(), map.channels()), (3, 3, 6));
    }

    #[test]
    fn sentinel_appears_exactly_at_boundary_cells() {
        let pattern = OffsetPattern::surrounding(vec![Offset::new(0, 1)]).unwrap();
        let map = generate_pairwise(&three_by_three(), &pattern, 3, -1).unwrap();
        for row in 0..3 {
            for col in 0..3 {
                let cell = map.get(row, col, 0);
                if col == 2 {
                    assert_eq!(cell, -1);
                } else {
                    assert!((0..9).contains(&cell));
                }
            }
        }
    }

    #[test]
    fn rebuild_is_deterministic() {
        let pattern = OffsetPattern::default_surrounding();
        let input = three_by_three();
        let first = generate_pairwise(&input, &pattern, 3, -1).unwrap();
        let second = generate_pairwise(&input, &pattern, 3, -1).unwrap();
        assert_eq!(first.to_le_bytes(), second.to_le_bytes());
    }

    #[test]
    fn out_of_range_label_fails_fast() {
        let bad = ClassMap::from_vec(1, 2, vec![0, 7]).unwrap();
        let pattern = OffsetPattern::default_above_below();
        assert!(generate_pairwise(&bad, &pattern, 3, -1).is_err());
    }

    #[test]
    fn aliasing_sentinel_is_rejected() {
        let pattern = OffsetPattern::default_above_below();
        let err = generate_pairwise(&three_by_three(), &pattern, 3, 5).unwrap_err();
        assert!(err.to_string().contains("joint range"));
        assert!(generate_pairwise(&three_by_three(), &pattern, 3, 9).is_ok());
    }
}
