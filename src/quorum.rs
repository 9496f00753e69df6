//! Canonical enumeration of every size-m quorum out of n participants.
//!
//! Quorums are tracked as a membership pattern over positions `0..n`. Starting
//! from `{1..m}`, each step finds the lowest "in, then out" pair, moves that
//! member one position up, and packs all members below it back to the bottom.

use crate::types::{Combination, ThresholdParams};

/// Iterator over all C(n, m) combinations of 1-based participant ids.
#[derive(Debug, Clone)]
pub struct Quorums {
    membership: Vec<bool>,
    started: bool,
    done: bool,
}

impl Quorums {
    pub fn new(params: &ThresholdParams) -> Self {
        let n = params.n() as usize;
        let m = params.m() as usize;
        let mut membership = vec![false; n];
        membership[..m].iter_mut().for_each(|slot| *slot = true);
        Self {
            membership,
            started: false,
            done: false,
        }
    }

    fn current(&self) -> Combination {
        self.membership
            .iter()
            .enumerate()
            .filter(|(_, &member)| member)
            .map(|(i, _)| i as u32 + 1)
            .collect()
    }

    /// Moves to the next pattern; returns `false` once every quorum has been visited.
    fn advance(&mut self) -> bool {
        let comp = &mut self.membership;
        let n = comp.len();
        let mut q = match (0..n.saturating_sub(1)).find(|&q| comp[q] && !comp[q + 1]) {
            Some(q) => q,
            None => return false,
        };
        comp[q] = false;
        comp[q + 1] = true;

        let mut p = 0;
        while p < q {
            while p < n - 1 && comp[p] {
                p += 1;
            }
            while q > 0 && !comp[q] {
                q -= 1;
            }
            if p < q {
                comp[p] = true;
                comp[q] = false;
            }
        }
        true
    }
}

impl Iterator for Quorums {
    type Item = Combination;

    fn next(&mut self) -> Option<Combination> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.current());
        }
        if self.advance() {
            Some(self.current())
        } else {
            self.done = true;
            None
        }
    }
}

/// Collects every quorum for `params` in canonical order.
pub fn enumerate(params: &ThresholdParams) -> Vec<Combination> {
    Quorums::new(params).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::binomial;
    use std::collections::BTreeSet;

    #[test]
    fn test_four_choose_two_order() {
        let params = ThresholdParams::new(4, 2).unwrap();
        let quorums = enumerate(&params);
        assert_eq!(
            quorums,
            vec![
                vec![1, 2],
                vec![1, 3],
                vec![2, 3],
                vec![1, 4],
                vec![2, 4],
                vec![3, 4],
            ]
        );
    }

    #[test]
    fn test_exhaustive_small_n() {
        for n in 1..=8u32 {
            for m in 1..=n {
                let params = ThresholdParams::new(n, m).unwrap();
                let quorums = enumerate(&params);
                assert_eq!(quorums.len() as u64, binomial(n as u64, m as u64), "n={} m={}", n, m);

                let distinct: BTreeSet<_> = quorums.iter().cloned().collect();
                assert_eq!(distinct.len(), quorums.len(), "duplicate quorum for n={} m={}", n, m);

                // Every m-subset of {1..n}, built independently from bitmasks.
                let expected: BTreeSet<Combination> = (0u32..(1 << n))
                    .filter(|mask| mask.count_ones() == m)
                    .map(|mask| (0..n).filter(|i| mask & (1 << i) != 0).map(|i| i + 1).collect())
                    .collect();
                assert_eq!(distinct, expected, "n={} m={}", n, m);

                for q in &quorums {
                    assert!(q.windows(2).all(|w| w[0] < w[1]));
                }
            }
        }
    }

    #[test]
    fn test_degenerate() {
        let params = ThresholdParams::new(1, 1).unwrap();
        assert_eq!(enumerate(&params), vec![vec![1]]);
        let params = ThresholdParams::new(5, 5).unwrap();
        assert_eq!(enumerate(&params), vec![vec![1, 2, 3, 4, 5]]);
    }

    #[test]
    fn test_fused_after_exhaustion() {
        let params = ThresholdParams::new(3, 1).unwrap();
        let mut quorums = Quorums::new(&params);
        assert_eq!(quorums.by_ref().count(), 3);
        assert!(quorums.next().is_none());
    }
}
