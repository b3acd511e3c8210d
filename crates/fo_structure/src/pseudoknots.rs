//! Pseudoknot removal by maximum non-crossing matching.
//!
//! Given an arbitrary (possibly crossing) pair table, we keep the largest
//! subset of its pairs that is properly nested. The remaining pairs are the
//! pseudoknots. The dynamic programming table only considers pairs that are
//! present in the input, so every cell costs constant time.

use log::debug;
use ndarray::Array2;

use crate::PairTable;

/// `mm[[i, j]]` is the maximum number of mutually non-crossing pairs of the
/// input table that fit into the closed interval `[i, j]`.
pub type MatchingTable = Array2<usize>;

/// Fill the maximum matching table for `pt`.
///
/// Recursion over the leftmost position i of an interval: either i is
/// dropped, or its partner k lies in `(i, j]` and the interval splits into
/// `[i+1, k-1]` and `[k+1, j]`.
pub fn maximum_matching(pt: &PairTable) -> MatchingTable {
    let n = pt.length();
    let mut mm = Array2::<usize>::zeros((n + 2, n + 2));
    for i in (1..=n).rev() {
        let k = pt[i];
        for j in i + 1..=n {
            let mut best = mm[[i + 1, j]];
            if k > i && k <= j {
                best = best.max(1 + mm[[i + 1, k - 1]] + mm[[k + 1, j]]);
            }
            mm[[i, j]] = best;
        }
    }
    mm
}

/// Recover the pairs of one optimal solution from a filled table.
///
/// Whenever keeping the pair at the left end of an interval is optimal, it
/// is kept. This makes the result deterministic: among all maximum
/// solutions, pairs with smaller 5' index win.
pub fn backtrack_maximum_matching(mm: &MatchingTable, old_pt: &PairTable) -> PairTable {
    let n = old_pt.length();
    debug_assert_eq!(mm.dim(), (n + 2, n + 2));
    let mut pt = PairTable::unpaired(n);
    let mut stack = vec![(1, n)];

    while let Some((i, j)) = stack.pop() {
        if i >= j {
            continue;
        }
        let k = old_pt[i];
        if k > i && k <= j && mm[[i, j]] == 1 + mm[[i + 1, k - 1]] + mm[[k + 1, j]] {
            pt[i] = k;
            pt[k] = i;
            stack.push((k + 1, j));
            stack.push((i + 1, k - 1));
        } else {
            stack.push((i + 1, j));
        }
    }
    pt
}

/// Split a pair table into its maximum nested subset and the list of
/// removed (pseudoknotted) pairs `(i, j)` with `i < j`, ordered by `i`.
pub fn split_pseudoknots(pt: &PairTable) -> (PairTable, Vec<(usize, usize)>) {
    let mm = maximum_matching(pt);
    let nested = backtrack_maximum_matching(&mm, pt);
    let removed: Vec<(usize, usize)> = pt.pairs()
        .filter(|&(i, j)| nested[i] != j)
        .collect();
    if !removed.is_empty() {
        debug!("Removed {} pseudoknotted pair(s): {:?}", removed.len(), removed);
    }
    (nested, removed)
}

/// Remove pseudoknots in place, returning the removed pairs.
pub fn remove_pseudoknots(pt: &mut PairTable) -> Vec<(usize, usize)> {
    let (nested, removed) = split_pseudoknots(pt);
    *pt = nested;
    removed
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;

    fn crosses((i, j): (usize, usize), (k, l): (usize, usize)) -> bool {
        (i < k && k < j && j < l) || (k < i && i < l && l < j)
    }

    /// Largest non-crossing subset, by enumerating all subsets.
    fn brute_force_max(pairs: &[(usize, usize)]) -> usize {
        let mut best = 0;
        for mask in 0u32..(1 << pairs.len()) {
            let subset: Vec<_> = pairs.iter().enumerate()
                .filter(|(b, _)| mask & (1 << b) != 0)
                .map(|(_, &p)| p)
                .collect();
            let ok = subset.iter().enumerate()
                .all(|(a, &p)| subset[a + 1..].iter().all(|&q| !crosses(p, q)));
            if ok {
                best = best.max(subset.len());
            }
        }
        best
    }

    /// A random, usually crossing, table of length 2 to `max_n`.
    pub(crate) fn random_table(rng: &mut StdRng, max_n: usize) -> PairTable {
        let n = rng.random_range(2..=max_n);
        let mut positions: Vec<usize> = (1..=n).collect();
        positions.shuffle(rng);
        let num_pairs = rng.random_range(0..=n / 2);
        let pairs: Vec<(usize, usize)> = positions.chunks(2)
            .take(num_pairs)
            .filter(|c| c.len() == 2)
            .map(|c| (c[0].min(c[1]), c[0].max(c[1])))
            .collect();
        PairTable::from_pairs(n, &pairs).unwrap()
    }

    #[test]
    fn test_nested_input_is_untouched() {
        let mut pt = PairTable::try_from(".((..(...)..((...))))..").unwrap();
        let orig = pt.clone();
        let removed = remove_pseudoknots(&mut pt);
        assert!(removed.is_empty());
        assert_eq!(pt, orig);
    }

    #[test]
    fn test_simple_hairpin() {
        let mut pt = PairTable::try_from("(((...)))").unwrap();
        let mm = maximum_matching(&pt);
        assert_eq!(mm[[1, 9]], 3);
        assert_eq!(mm[[2, 8]], 2);
        assert_eq!(mm[[4, 6]], 0);
        assert!(remove_pseudoknots(&mut pt).is_empty());
    }

    #[test]
    fn test_square_brackets_are_removed() {
        let mut pt = PairTable::try_from("((..[[..))..]]").unwrap();
        let removed = remove_pseudoknots(&mut pt);
        assert_eq!(removed, vec![(5, 14), (6, 13)]);
        assert_eq!(pt, PairTable::try_from("((......))....").unwrap());
    }

    #[test]
    fn test_bracket_type_is_irrelevant() {
        // The left-most helix wins a tie, whatever its symbols.
        let mut pt = PairTable::try_from("[[..((..]]..))").unwrap();
        let removed = remove_pseudoknots(&mut pt);
        assert_eq!(removed, vec![(5, 14), (6, 13)]);
        assert_eq!(pt.pairs().collect::<Vec<_>>(), vec![(1, 10), (2, 9)]);
    }

    #[test]
    fn test_single_tie_prefers_left() {
        let mut pt = PairTable::try_from("(.[.).]").unwrap();
        let removed = remove_pseudoknots(&mut pt);
        assert_eq!(removed, vec![(3, 7)]);
        assert_eq!(pt.pairs().collect::<Vec<_>>(), vec![(1, 5)]);
    }

    #[test]
    fn test_larger_helix_wins_over_left() {
        let mut pt = PairTable::try_from("(.[[.).]]").unwrap();
        let removed = remove_pseudoknots(&mut pt);
        assert_eq!(removed, vec![(1, 6)]);
        assert_eq!(pt.pairs().collect::<Vec<_>>(), vec![(3, 9), (4, 8)]);
    }

    #[test]
    fn test_maximum_matching_is_optimal() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let pt = random_table(&mut rng, 12);
            let (nested, removed) = split_pseudoknots(&pt);
            let all: Vec<_> = pt.pairs().collect();

            assert!(nested.check().is_ok());
            assert!(nested.is_nested());
            assert!(nested.pairs().all(|(i, j)| pt[i] == j));
            assert_eq!(nested.num_pairs() + removed.len(), all.len());
            assert_eq!(nested.num_pairs(), brute_force_max(&all), "{}", pt.to_dot_bracket());
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let pt = random_table(&mut rng, 12);
            let first = split_pseudoknots(&pt);
            let second = split_pseudoknots(&pt);
            assert_eq!(first, second);
        }
    }
}
