// ============================================================
// Layer 4 — K-Fold Partitioning
// ============================================================
// Splits the corpus into k folds of near-equal size for
// cross-validation. Fold i is held out as the dev set in
// iteration i; every other fold is training data.
//
// With N items and k folds, q = N / k and r = N % k. The first
// r folds get q + 1 items and the rest get q, so sizes never
// differ by more than one:
//
//   N = 11, k = 3  →  [0..4] [4..8] [8..11]
//
// Partitioning keeps the input order. Shuffle first if the
// corpus is ordered by speaker or recording session.
//
// Reference: rand crate documentation (SliceRandom)

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FoldError {
    #[error("cross-validation needs at least 2 folds, got {0}")]
    TooFewFolds(usize),

    #[error("cannot split {items} documents into {folds} folds")]
    NotEnoughItems { items: usize, folds: usize },
}

/// Shuffle in place. `None` draws from thread entropy, so the
/// order differs run to run; a seed makes it reproducible.
pub fn shuffle<T>(items: &mut [T], seed: Option<u64>) {
    match seed {
        Some(seed) => items.shuffle(&mut StdRng::seed_from_u64(seed)),
        None       => items.shuffle(&mut rand::thread_rng()),
    }
}

/// Bounds of fold `i` for `n` items split `k` ways.
fn fold_range(n: usize, k: usize, i: usize) -> std::ops::Range<usize> {
    let (q, r) = (n / k, n % k);
    let start = i * q + i.min(r);
    let end   = (i + 1) * q + (i + 1).min(r);
    start..end
}

/// Partition `items` into `k` contiguous folds.
pub fn partition<T>(items: Vec<T>, k: usize) -> Result<Vec<Vec<T>>, FoldError> {
    if k < 2 {
        return Err(FoldError::TooFewFolds(k));
    }
    let n = items.len();
    if n < k {
        return Err(FoldError::NotEnoughItems { items: n, folds: k });
    }

    let mut folds = Vec::with_capacity(k);
    let mut rest  = items;
    // Peel folds off the back so each split_off is O(fold size)
    for i in (0..k).rev() {
        let range = fold_range(n, k, i);
        folds.push(rest.split_off(range.start));
    }
    folds.reverse();

    tracing::debug!(
        "Partitioned {} items into {} folds: {:?}",
        n,
        k,
        folds.iter().map(Vec::len).collect::<Vec<_>>()
    );

    Ok(folds)
}

/// Training set for held-out fold `held_out`: every other fold, in order.
pub fn training_set<T: Clone>(folds: &[Vec<T>], held_out: usize) -> Vec<T> {
    folds
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != held_out)
        .flat_map(|(_, fold)| fold.iter().cloned())
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_sizes_differ_by_at_most_one() {
        for n in 2..40 {
            for k in 2..=n.min(10) {
                let folds = partition((0..n).collect::<Vec<_>>(), k).unwrap();
                assert_eq!(folds.len(), k);
                let sizes: Vec<usize> = folds.iter().map(Vec::len).collect();
                let max = *sizes.iter().max().unwrap();
                let min = *sizes.iter().min().unwrap();
                assert!(max - min <= 1, "n={n} k={k} sizes={sizes:?}");
            }
        }
    }

    #[test]
    fn test_union_reconstructs_input_exactly_once() {
        let items: Vec<usize> = (0..23).collect();
        let folds = partition(items.clone(), 5).unwrap();
        let flat: Vec<usize> = folds.into_iter().flatten().collect();
        assert_eq!(flat, items);
    }

    #[test]
    fn test_larger_folds_come_first() {
        let folds = partition((0..11).collect::<Vec<_>>(), 3).unwrap();
        assert_eq!(folds, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9, 10]]);
    }

    #[test]
    fn test_training_set_excludes_held_out_fold() {
        let folds = partition((0..6).collect::<Vec<_>>(), 3).unwrap();
        assert_eq!(training_set(&folds, 1), vec![0, 1, 4, 5]);
        assert_eq!(training_set(&folds, 0).len() + folds[0].len(), 6);
    }

    #[test]
    fn test_invalid_fold_counts() {
        assert_eq!(partition(vec![1, 2, 3], 1), Err(FoldError::TooFewFolds(1)));
        assert_eq!(
            partition(vec![1, 2], 3),
            Err(FoldError::NotEnoughItems { items: 2, folds: 3 })
        );
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let mut a: Vec<usize> = (0..50).collect();
        let mut b = a.clone();
        shuffle(&mut a, Some(7));
        shuffle(&mut b, Some(7));
        assert_eq!(a, b);

        let mut sorted = a.clone();
        sorted.sort();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }
}
