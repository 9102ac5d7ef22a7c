//! Running score table used for progress reporting.
//!
//! Each cell accumulates the rewards observed for one `(bandit, arm)` pair. The table
//! is not read by the learner.

use crate::{Error, Result, Reward};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoreCell {
    pub wins: u64,
    pub losses: u64,
}

impl ScoreCell {
    /// `wins - losses`.
    pub fn score(&self) -> i64 {
        self.wins as i64 - self.losses as i64
    }

    pub fn visits(&self) -> u64 {
        self.wins + self.losses
    }
}

/// `(n_bandits, n_actions)` reward accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "RawScoreTable", into = "RawScoreTable")
)]
pub struct ScoreTable {
    n_bandits: usize,
    n_actions: usize,
    cells: Vec<ScoreCell>,
}

// Wire shape of `ScoreTable`; the cell count is checked on the way in.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct RawScoreTable {
    n_bandits: usize,
    n_actions: usize,
    cells: Vec<ScoreCell>,
}

impl TryFrom<RawScoreTable> for ScoreTable {
    type Error = Error;

    fn try_from(raw: RawScoreTable) -> Result<Self> {
        let expected = raw.n_bandits.checked_mul(raw.n_actions);
        if expected != Some(raw.cells.len()) {
            return Err(Error::CellCountMismatch {
                len: raw.cells.len(),
                n_bandits: raw.n_bandits,
                n_actions: raw.n_actions,
            });
        }
        Ok(Self {
            n_bandits: raw.n_bandits,
            n_actions: raw.n_actions,
            cells: raw.cells,
        })
    }
}

impl From<ScoreTable> for RawScoreTable {
    fn from(t: ScoreTable) -> Self {
        Self {
            n_bandits: t.n_bandits,
            n_actions: t.n_actions,
            cells: t.cells,
        }
    }
}

impl ScoreTable {
    pub fn new(n_bandits: usize, n_actions: usize) -> Self {
        Self {
            n_bandits,
            n_actions,
            cells: vec![ScoreCell::default(); n_bandits * n_actions],
        }
    }

    pub fn n_bandits(&self) -> usize {
        self.n_bandits
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    pub fn record(&mut self, state: usize, action: usize, reward: Reward) -> Result<()> {
        let i = self.index(state, action)?;
        let c = &mut self.cells[i];
        match reward {
            Reward::Win => c.wins = c.wins.saturating_add(1),
            Reward::Loss => c.losses = c.losses.saturating_add(1),
        }
        Ok(())
    }

    pub fn cell(&self, state: usize, action: usize) -> Result<ScoreCell> {
        Ok(self.cells[self.index(state, action)?])
    }

    /// Summed reward for `(state, action)`.
    pub fn score(&self, state: usize, action: usize) -> Result<i64> {
        Ok(self.cell(state, action)?.score())
    }

    pub fn visits(&self, state: usize, action: usize) -> Result<u64> {
        Ok(self.cell(state, action)?.visits())
    }

    /// Mean of the summed rewards across the arms of one bandit.
    ///
    /// This is the "mean reward per bandit" figure printed during training: the
    /// average over the row, not a per-pull average.
    pub fn row_mean(&self, state: usize) -> Result<f64> {
        let mut sum = 0i64;
        for a in 0..self.n_actions {
            sum += self.score(state, a)?;
        }
        Ok(sum as f64 / self.n_actions as f64)
    }

    /// Row means for every bandit.
    pub fn row_means(&self) -> Vec<f64> {
        self.cells
            .chunks(self.n_actions.max(1))
            .map(|row| {
                let s: i64 = row.iter().map(ScoreCell::score).sum();
                s as f64 / self.n_actions as f64
            })
            .collect()
    }

    pub fn total_visits(&self) -> u64 {
        self.cells.iter().map(ScoreCell::visits).sum()
    }

    pub fn total_score(&self) -> i64 {
        self.cells.iter().map(ScoreCell::score).sum()
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[ScoreCell] {
        &self.cells
    }

    pub fn reset(&mut self) {
        self.cells.fill(ScoreCell::default());
    }

    fn index(&self, state: usize, action: usize) -> Result<usize> {
        if state >= self.n_bandits {
            return Err(Error::StateOutOfRange {
                state,
                n_bandits: self.n_bandits,
            });
        }
        if action >= self.n_actions {
            return Err(Error::ActionOutOfRange {
                action,
                n_actions: self.n_actions,
            });
        }
        Ok(state * self.n_actions + action)
    }
}
