use std::collections::HashSet;

/// The set of triple positions (0-indexed, out of `n` total) whose rand1
/// slot must come from the public-domain subset so the file as a whole
/// meets `minPublicDomainRatio` (spec section 4.2).
///
/// `target = ceil(n * ratio)` positions are spread evenly: `{floor(i*n/k) :
/// 0 <= i < k}`, with the first and last index always included once `k >=
/// 2` so the distribution never clusters away from either end.
pub fn public_domain_positions(n: usize, ratio: f64) -> HashSet<usize> {
    let mut positions = HashSet::new();
    if n == 0 {
        return positions;
    }

    let k = ((n as f64) * ratio).ceil() as usize;
    if k == 0 {
        return positions;
    }

    for i in 0..k {
        positions.insert((i * n) / k);
    }

    if k >= 2 {
        positions.insert(0);
        positions.insert(n - 1);
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_file_has_no_positions() {
        assert!(public_domain_positions(0, 0.3).is_empty());
    }

    #[test]
    fn single_block_file_is_covered_when_ratio_is_positive() {
        let positions = public_domain_positions(1, 0.3);
        assert_eq!(positions, HashSet::from([0]));
    }

    #[test]
    fn includes_first_and_last_for_multi_block_files() {
        let positions = public_domain_positions(10, 0.3);
        assert!(positions.contains(&0));
        assert!(positions.contains(&9));
    }

    #[test]
    fn respects_the_target_count_as_a_lower_bound() {
        let n = 20;
        let ratio = 0.3;
        let positions = public_domain_positions(n, ratio);
        let target = ((n as f64) * ratio).ceil() as usize;
        assert!(positions.len() >= target.min(n));
    }

    #[test]
    fn full_ratio_covers_every_position() {
        let positions = public_domain_positions(5, 1.0);
        assert_eq!(positions.len(), 5);
    }

    proptest::proptest! {
        /// For any file length and ratio, every position is in range and the
        /// target count is always met (spec section 4.2's distribution rule).
        #[test]
        fn positions_are_in_range_and_meet_the_target(
            n in 1usize..500,
            ratio in 0.0f64..1.0,
        ) {
            let positions = public_domain_positions(n, ratio);
            for &p in &positions {
                prop_assert!(p < n);
            }
            let target = ((n as f64) * ratio).ceil() as usize;
            prop_assert!(positions.len() >= target.min(n));
        }
    }
}
