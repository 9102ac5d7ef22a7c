//! `ContextualPolicy` trait: the seam between the training loop and a learner.
//!
//! A policy maps a discrete state (bandit index) to per-action scores, picks the
//! arg-max greedily, and learns from one [`Transition`] at a time.
//! [`LinearPolicyAgent`][crate::LinearPolicyAgent] is the implementation shipped
//! here; the trainer is generic so tests can drive it with fixed policies.
//!
//! # Example
//!
//! ```rust
//! use gradbandit::{AgentConfig, ContextualPolicy, LinearPolicyAgent, Reward, Transition};
//!
//! fn reinforce<P: ContextualPolicy>(p: &mut P, state: usize) -> gradbandit::Result<usize> {
//!     let action = p.greedy(state)?;
//!     p.update(Transition { state, action, reward: Reward::Win })?;
//!     Ok(action)
//! }
//!
//! let mut agent = LinearPolicyAgent::new(3, 4, AgentConfig::default()).unwrap();
//! assert_eq!(reinforce(&mut agent, 1).unwrap(), 0);
//! ```

use crate::{Result, Transition};

/// Common interface for tabular contextual policies.
pub trait ContextualPolicy {
    /// Number of states (bandits) the policy covers.
    fn n_states(&self) -> usize;

    /// Number of actions (arms) per state.
    fn n_actions(&self) -> usize;

    /// Per-action scores for `state`.
    fn scores(&self, state: usize) -> Result<Vec<f64>>;

    /// Arg-max action for `state` (lowest index on ties).
    fn greedy(&self, state: usize) -> Result<usize> {
        let s = self.scores(state)?;
        Ok(argmax(&s).unwrap_or(0))
    }

    /// Learn from one transition.
    fn update(&mut self, t: Transition) -> Result<()>;
}

/// Index of the first maximum. NaN entries never win; `None` if `xs` is empty or all NaN.
pub fn argmax(xs: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &x) in xs.iter().enumerate() {
        if x.is_nan() {
            continue;
        }
        match best {
            Some(b) if x <= xs[b] => {}
            _ => best = Some(i),
        }
    }
    best
}
