//! Integer Lagrange-at-zero coefficients and their normalisation to a common
//! denominator.
//!
//! For a quorum `X` of 1-based ids, member `x` gets
//! `prod(X) / x  /  prod_{y != x} |x - y|`, with sign `+` when `x` sits at an
//! even position of the ascending quorum. Scaling every coefficient of every
//! quorum by one overall LCM of denominators turns them into exact integers.

use crate::error::{Error, Result};
use crate::types::{Combination, Fraction};

pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// `a * (b / gcd(a, b))`, or `WeightOverflow` if it does not fit.
pub fn lcm(a: u64, b: u64) -> Result<u64> {
    let g = gcd(a, b);
    if g == 0 {
        return Ok(0);
    }
    a.checked_mul(b / g).ok_or(Error::WeightOverflow)
}

/// Pairwise LCM fold; an empty sequence yields `0`.
pub fn lcm_of<I: IntoIterator<Item = u64>>(values: I) -> Result<u64> {
    let mut iter = values.into_iter();
    let first = match iter.next() {
        Some(v) => v,
        None => return Ok(0),
    };
    iter.try_fold(first, lcm)
}

/// Solves the reconstruction coefficients for one quorum.
///
/// Returns `None` for an empty quorum, a zero id, or a repeated id.
pub fn coefficients(combination: &[u32]) -> Option<Vec<Fraction>> {
    if combination.is_empty() {
        return None;
    }
    let mut ids: Combination = combination.to_vec();
    ids.sort_unstable();
    if ids[0] == 0 || ids.windows(2).any(|w| w[0] == w[1]) {
        return None;
    }

    let product = ids
        .iter()
        .try_fold(1u64, |acc, &x| acc.checked_mul(x as u64))?;

    let mut fractions = Vec::with_capacity(ids.len());
    for (i, &x) in ids.iter().enumerate() {
        let numerator = product / x as u64;
        let denominator = ids
            .iter()
            .filter(|&&y| y != x)
            .try_fold(1u64, |acc, &y| acc.checked_mul(x.abs_diff(y) as u64))?;
        let g = gcd(numerator, denominator);
        fractions.push(Fraction {
            numerator: numerator / g,
            denominator: denominator / g,
            sign: i % 2 == 0,
            id: x - 1,
        });
    }
    Some(fractions)
}

/// LCM of one quorum's denominators.
pub fn combination_lcm(fractions: &[Fraction]) -> Result<u64> {
    lcm_of(fractions.iter().map(|f| f.denominator))
}

/// Signed integer weights `numerator * (scale / denominator)` for one quorum.
pub fn integer_weights(fractions: &[Fraction], scale: u64) -> Result<Vec<i64>> {
    fractions.iter().map(|f| f.weight(scale)).collect()
}
