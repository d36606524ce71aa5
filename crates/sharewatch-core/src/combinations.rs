//! K-subset enumeration in lexicographic order.
//!
//! Every K-subset of `0..n` is produced exactly once, as an ascending
//! index vector, starting from `[0, 1, .., k-1]` and ending with
//! `[n-k, .., n-1]`.

/// Binomial coefficient `C(n, k)`; `0` when `k > n`.
///
/// Exact for every input the verifier accepts (`n <= MAX_NODES`).
#[must_use]
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
pub const fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = if k > n - k { n - k } else { k };
    let mut result: u64 = 1;
    let mut i = 0;
    while i < k {
        // result == C(n, i) here, so the division is exact.
        result = result * (n - i) as u64 / (i as u64 + 1);
        i += 1;
    }
    result
}

/// Iterator over every `k`-subset of `0..n` in lexicographic order.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    k: usize,
    current: Option<Vec<usize>>,
}

impl Combinations {
    /// Build the iterator. Yields nothing when `k > n`.
    #[must_use]
    pub fn new(n: usize, k: usize) -> Self {
        let current = (k <= n).then(|| (0..k).collect());
        Self { n, k, current }
    }

    /// Advance `indices` to the next combination in place.
    ///
    /// Returns `false` once `indices` was the last combination.
    #[allow(clippy::arithmetic_side_effects)]
    fn advance(indices: &mut [usize], n: usize, k: usize) -> bool {
        // Rightmost position that can still move right.
        let Some(pivot) = (0..k).rev().find(|&i| indices[i] < n - k + i) else {
            return false;
        };
        indices[pivot] += 1;
        for j in pivot + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
        true
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut current = self.current.take()?;
        let out = current.clone();
        if Self::advance(&mut current, self.n, self.k) {
            self.current = Some(current);
        }
        Some(out)
    }
}

/// Shorthand for [`Combinations::new`].
#[must_use]
pub fn combinations(n: usize, k: usize) -> Combinations {
    Combinations::new(n, k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binomial_known_values() {
        assert_eq!(binomial(4, 3), 4);
        assert_eq!(binomial(5, 2), 10);
        assert_eq!(binomial(8, 4), 70);
        assert_eq!(binomial(16, 8), 12_870);
        assert_eq!(binomial(3, 0), 1);
        assert_eq!(binomial(3, 3), 1);
        assert_eq!(binomial(2, 3), 0);
    }

    #[test]
    fn four_choose_three_is_lexicographic() {
        let all: Vec<Vec<usize>> = combinations(4, 3).collect();
        assert_eq!(
            all,
            vec![vec![0, 1, 2], vec![0, 1, 3], vec![0, 2, 3], vec![1, 2, 3]]
        );
    }

    #[test]
    fn full_subset_yields_single_combination() {
        let all: Vec<Vec<usize>> = combinations(3, 3).collect();
        assert_eq!(all, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn oversized_subset_yields_nothing() {
        assert_eq!(combinations(2, 3).count(), 0);
    }

    #[test]
    fn five_choose_two_first_and_last() {
        let all: Vec<Vec<usize>> = combinations(5, 2).collect();
        assert_eq!(all.first(), Some(&vec![0, 1]));
        assert_eq!(all.last(), Some(&vec![3, 4]));
        assert_eq!(all.len(), 10);
    }
}
