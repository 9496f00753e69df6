//! Per-participant weight vectors.
//!
//! Row `i` holds the successive powers `(i+1)^0 .. (i+1)^(m-1)`: folding a
//! producer's `m` raw shares with row `i` evaluates the producer's implicit
//! degree-(m-1) polynomial at the point `i + 1`.

use crate::error::{Error, Result};
use crate::types::ThresholdParams;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightMatrix {
    rows: Vec<Vec<u64>>,
}

impl WeightMatrix {
    pub fn new(params: &ThresholdParams) -> Result<Self> {
        let n = params.n() as u64;
        let m = params.m() as usize;
        let mut rows = Vec::with_capacity(n as usize);
        for i in 0..n {
            let mut row = Vec::with_capacity(m);
            row.push(1u64);
            for j in 1..m {
                let next = row[j - 1].checked_mul(i + 1).ok_or_else(|| {
                    Error::InvalidParameters(format!("weight ({})^{} overflows 64 bits", i + 1, j))
                })?;
                row.push(next);
            }
            rows.push(row);
        }
        Ok(Self { rows })
    }

    /// Weight vector for the participant at 0-based index `i`.
    pub fn row(&self, i: usize) -> Option<&[u64]> {
        self.rows.get(i).map(Vec::as_slice)
    }

    pub fn rows(&self) -> &[Vec<u64>] {
        &self.rows
    }

    /// Signed copy of row `i` for public-key aggregation.
    pub fn signed_row(&self, i: usize) -> Result<Vec<i64>> {
        self.row(i)
            .ok_or(Error::UnknownParticipant(i))?
            .iter()
            .map(|&w| i64::try_from(w).map_err(|_| Error::WeightOverflow))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
