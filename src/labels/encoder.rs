//! Joint label encoding.
//!
//! A pair of per-pixel class labels is packed into a single joint index so a
//! pairwise potential can be trained as an ordinary K^2-way classification.
//! The mapping is injective over `[0, K) x [0, K)` with range exactly
//! `[0, K^2)`.

/// Packs an ordered label pair into a joint index.
///
/// Inputs outside `[0, num_classes)` are a caller contract violation, not a
/// runtime error; callers guarantee range before encoding.
#[inline]
pub fn encode(label_p: i32, label_q: i32, num_classes: i32) -> i32 {
    debug_assert!(num_classes > 0);
    debug_assert!((0..num_classes).contains(&label_p));
    debug_assert!((0..num_classes).contains(&label_q));
    label_p * num_classes + label_q
}

/// Unpacks a joint index back into its ordered label pair.
///
/// Exact inverse of [`encode`] over the joint range `[0, num_classes^2)`.
#[inline]
pub fn decode(joint: i32, num_classes: i32) -> (i32, i32) {
    debug_assert!(num_classes > 0);
    debug_assert!((0..num_classes * num_classes).contains(&joint));
    (joint / num_classes, joint % num_classes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn round_trips_for_small_class_counts() {
        for k in 1..=8 {
            for p in 0..k {
                for q in 0..k {
                    assert_eq!(decode(encode(p, q, k), k), (p, q));
                }
            }
        }
    }

    #[test]
    fn joint_range_is_exactly_k_squared() {
        let k = 5;
        let joints: HashSet<i32> = (0..k)
            .flat_map(|p| (0..k).map(move |q| encode(p, q, k)))
            .collect();
        assert_eq!(joints.len(), (k * k) as usize);
        assert_eq!(joints.iter().min(), Some(&0));
        assert_eq!(joints.iter().max(), Some(&(k * k - 1)));
    }

    #[test]
    fn ordered_pairs_are_distinct() {
        let k = 3;
        assert_ne!(encode(1, 2, k), encode(2, 1, k));
        assert_eq!(encode(1, 0, k), 3);
        assert_eq!(encode(2, 1, k), 7);
    }
}
