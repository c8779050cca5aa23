//! Local maximum detection over an ordered sequence of keys.

use crate::graph::Weight;

/// Result of [`local_maxima`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMaxima<K> {
    /// Keys in sequence order.
    pub maxima: Vec<K>,
    /// Weight of the first local maximum, 0 when there is none.
    pub score: Weight,
}

/// Strict local maxima under a (previous, current, next) window.
///
/// The first and last keys have no two neighbours and never qualify; equal
/// neighbours do not count as lower.
pub fn local_maxima<K, F>(keys: &[K], weight: F) -> LocalMaxima<K>
where
    K: Copy,
    F: Fn(K) -> Weight,
{
    let maxima: Vec<K> = keys
        .windows(3)
        .filter(|w| {
            let core = weight(w[1]);
            core > weight(w[0]) && core > weight(w[2])
        })
        .map(|w| w[1])
        .collect();

    let score = maxima.first().map(|&k| weight(k)).unwrap_or(0);

    LocalMaxima { maxima, score }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn freq(pairs: &[(char, Weight)]) -> HashMap<char, Weight> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn boundaries_never_qualify() {
        let weights = freq(&[('a', 1), ('b', 2), ('c', 1), ('d', 4), ('e', 1), ('f', 6)]);
        let found = local_maxima(&['a', 'b', 'c', 'd', 'e', 'f'], |k| {
            weights.get(&k).copied().unwrap_or(0)
        });
        assert_eq!(found.maxima, vec!['b', 'd']);
        assert_eq!(found.score, 2);
    }

    #[test]
    fn ties_are_not_maxima() {
        let weights = freq(&[('a', 1), ('b', 3), ('c', 3), ('d', 1)]);
        let found = local_maxima(&['a', 'b', 'c', 'd'], |k| weights[&k]);
        assert!(found.maxima.is_empty());
        assert_eq!(found.score, 0);
    }

    #[test]
    fn short_sequences_have_no_maxima() {
        let found = local_maxima(&['a', 'b'], |_| 5);
        assert!(found.maxima.is_empty());
        assert!(local_maxima::<char, _>(&[], |_| 1).maxima.is_empty());
    }

    #[test]
    fn unknown_keys_default_to_zero() {
        let weights = freq(&[('m', 2)]);
        let found = local_maxima(&['x', 'm', 'y'], |k| weights.get(&k).copied().unwrap_or(0));
        assert_eq!(found.maxima, vec!['m']);
        assert_eq!(found.score, 2);
    }

    #[test]
    fn score_uses_first_maximum_not_largest() {
        let found = local_maxima(&[0usize, 1, 2, 3, 4], |i| [0, 1, 0, 9, 0][i]);
        assert_eq!(found.maxima, vec![1, 3]);
        assert_eq!(found.score, 1);
    }
}
