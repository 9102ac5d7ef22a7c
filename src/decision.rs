//! Decision and transition records.
//!
//! A [`Choice`] says which arm was picked and why (explored vs. greedy); a
//! [`Transition`] is the `(state, action, reward)` triple handed to one policy update
//! and then dropped.

use crate::Reward;

/// How an action was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChoiceKind {
    /// Uniformly random action (epsilon branch). May coincide with the greedy one.
    Explore,
    /// Arg-max of the policy's scores, lowest index on ties.
    Greedy,
}

/// A single action choice for one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Choice {
    pub action: usize,
    pub kind: ChoiceKind,
}

impl Choice {
    pub fn explored(&self) -> bool {
        self.kind == ChoiceKind::Explore
    }
}

/// One episode's `(state, action, reward)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transition {
    pub state: usize,
    pub action: usize,
    pub reward: Reward,
}
