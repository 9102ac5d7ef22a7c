//! Synthetic contextual bandit environment.
//!
//! A [`PayoutTable`] holds one threshold per `(bandit, arm)`. Pulling an arm draws
//! `z ~ N(0, 1)` and pays `+1` when `z` exceeds the arm's threshold, `-1` otherwise,
//! so the arm with the lowest threshold in a row is the best arm of that bandit.
//!
//! The environment owns its RNG and is seedable, so runs are reproducible.

use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Binary reward returned by [`ContextualBandit::pull`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reward {
    /// The draw exceeded the threshold (`+1`).
    Win,
    /// The draw did not exceed the threshold (`-1`).
    Loss,
}

impl Reward {
    pub fn value(self) -> i64 {
        match self {
            Reward::Win => 1,
            Reward::Loss => -1,
        }
    }

    pub fn as_f64(self) -> f64 {
        self.value() as f64
    }
}

/// Immutable `(n_bandits, n_actions)` table of payout thresholds.
///
/// Serializes as its rows; deserializing goes through [`PayoutTable::new`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")
)]
pub struct PayoutTable {
    n_actions: usize,
    // Row-major, `n_bandits * n_actions`.
    thresholds: Vec<f64>,
}

impl PayoutTable {
    /// Build a table from rows of thresholds.
    ///
    /// Rows must be non-empty, of equal length, and finite.
    pub fn new(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_actions = rows.first().map(Vec::len).unwrap_or(0);
        if n_actions == 0 {
            return Err(Error::EmptyTable);
        }
        let mut thresholds = Vec::with_capacity(rows.len() * n_actions);
        for (state, row) in rows.into_iter().enumerate() {
            if row.len() != n_actions {
                return Err(Error::RaggedTable {
                    row: state,
                    len: row.len(),
                    expected: n_actions,
                });
            }
            for (action, value) in row.into_iter().enumerate() {
                if !value.is_finite() {
                    return Err(Error::NonFiniteThreshold {
                        state,
                        action,
                        value,
                    });
                }
                thresholds.push(value);
            }
        }
        Ok(Self {
            n_actions,
            thresholds,
        })
    }

    pub fn n_bandits(&self) -> usize {
        self.thresholds.len() / self.n_actions
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// Threshold row for one bandit.
    pub fn row(&self, state: usize) -> Result<&[f64]> {
        self.check_state(state)?;
        let start = state * self.n_actions;
        Ok(&self.thresholds[start..start + self.n_actions])
    }

    pub fn threshold(&self, state: usize, action: usize) -> Result<f64> {
        let row = self.row(state)?;
        row.get(action).copied().ok_or(Error::ActionOutOfRange {
            action,
            n_actions: self.n_actions,
        })
    }

    /// The arm with the lowest threshold for `state` (lowest index on ties).
    pub fn optimal_action(&self, state: usize) -> Result<usize> {
        let row = self.row(state)?;
        let mut best = 0;
        for (a, &t) in row.iter().enumerate().skip(1) {
            if t < row[best] {
                best = a;
            }
        }
        Ok(best)
    }

    /// `P(z > threshold)` for `z ~ N(0, 1)`: the chance a pull returns [`Reward::Win`].
    pub fn win_probability(&self, state: usize, action: usize) -> Result<f64> {
        let t = self.threshold(state, action)?;
        Ok(0.5 * libm::erfc(t / std::f64::consts::SQRT_2))
    }

    fn check_state(&self, state: usize) -> Result<()> {
        let n_bandits = self.n_bandits();
        if state >= n_bandits {
            return Err(Error::StateOutOfRange { state, n_bandits });
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<f64>>> for PayoutTable {
    type Error = Error;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<PayoutTable> for Vec<Vec<f64>> {
    fn from(table: PayoutTable) -> Self {
        table
            .thresholds
            .chunks(table.n_actions)
            .map(<[f64]>::to_vec)
            .collect()
    }
}

impl Default for PayoutTable {
    /// Three bandits with four arms each; the best arms are 3, 1 and 0.
    fn default() -> Self {
        Self {
            n_actions: 4,
            thresholds: vec![
                0.2, 0.0, 0.0, -5.0, //
                0.1, -5.0, 1.0, 0.25, //
                -5.0, 5.0, 5.0, 5.0,
            ],
        }
    }
}

/// Parses `"0.2,0,0,-5; 0.1,-5,1,0.25"`: rows split on `;`, arms on `,`.
impl FromStr for PayoutTable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for row in s.split(';') {
            let row = row.trim();
            if row.is_empty() {
                continue;
            }
            let values = row
                .split(',')
                .map(|v| {
                    v.trim()
                        .parse::<f64>()
                        .map_err(|e| Error::Parse(format!("threshold {:?}: {e}", v.trim())))
                })
                .collect::<Result<Vec<f64>>>()?;
            rows.push(values);
        }
        Self::new(rows)
    }
}

impl fmt::Display for PayoutTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.thresholds.chunks(self.n_actions).enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            for (j, t) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{t}")?;
            }
        }
        Ok(())
    }
}

/// Seedable multi-bandit environment over a [`PayoutTable`].
#[derive(Debug, Clone)]
pub struct ContextualBandit {
    table: PayoutTable,
    rng: StdRng,
}

impl ContextualBandit {
    /// Create an environment with a deterministic fixed seed (0).
    pub fn new(table: PayoutTable) -> Self {
        Self::with_seed(table, 0)
    }

    pub fn with_seed(table: PayoutTable, seed: u64) -> Self {
        Self {
            table,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn table(&self) -> &PayoutTable {
        &self.table
    }

    pub fn n_bandits(&self) -> usize {
        self.table.n_bandits()
    }

    pub fn n_actions(&self) -> usize {
        self.table.n_actions()
    }

    /// Uniformly random bandit index in `[0, n_bandits)`.
    pub fn sample_state(&mut self) -> usize {
        self.rng.random_range(0..self.table.n_bandits())
    }

    /// Pull `action` on bandit `state`.
    ///
    /// Consumes exactly one standard-normal draw.
    pub fn pull(&mut self, state: usize, action: usize) -> Result<Reward> {
        let threshold = self.table.threshold(state, action)?;
        let z: f64 = StandardNormal.sample(&mut self.rng);
        Ok(if z > threshold {
            Reward::Win
        } else {
            Reward::Loss
        })
    }
}

impl Default for ContextualBandit {
    fn default() -> Self {
        Self::new(PayoutTable::default())
    }
}
