//! Epsilon-greedy exploration.

use rand::Rng;

use crate::{Choice, ChoiceKind, ContextualPolicy, Error, Result};

/// Choose a uniformly random action with probability `epsilon`, else the greedy one.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpsilonGreedy {
    /// Exploration probability in `[0, 1]`.
    pub epsilon: f64,
}

impl EpsilonGreedy {
    pub fn new(epsilon: f64) -> Result<Self> {
        if !(epsilon.is_finite() && (0.0..=1.0).contains(&epsilon)) {
            return Err(Error::InvalidConfig("epsilon must be in [0, 1]"));
        }
        Ok(Self { epsilon })
    }

    /// Pick an action for `state`.
    ///
    /// With `epsilon == 0` no randomness is consumed and the result depends only on
    /// the policy's current scores.
    pub fn choose<P, R>(&self, rng: &mut R, policy: &P, state: usize) -> Result<Choice>
    where
        P: ContextualPolicy + ?Sized,
        R: Rng,
    {
        if self.epsilon > 0.0 && rng.random::<f64>() < self.epsilon {
            let n_actions = policy.n_actions();
            if n_actions == 0 {
                return Err(Error::ActionOutOfRange {
                    action: 0,
                    n_actions,
                });
            }
            return Ok(Choice {
                action: rng.random_range(0..n_actions),
                kind: ChoiceKind::Explore,
            });
        }
        Ok(Choice {
            action: policy.greedy(state)?,
            kind: ChoiceKind::Greedy,
        })
    }
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self { epsilon: 0.1 }
    }
}
