//! Single-layer linear policy agent.
//!
//! The input is a one-hot encoding of the state, so the layer reduces to a weight
//! table: the scores for state `s` are row `s` of the weights, optionally squashed
//! through a sigmoid. All weights start at `1.0`.
//!
//! Training minimises `-ln(score[s, a]) * reward` for the taken action with plain
//! gradient descent. The gradient is written out by hand:
//!
//! - [`Activation::Identity`]: `score = w`, `dL/dw = -reward / w`.
//! - [`Activation::Sigmoid`]: `score = sigmoid(w)`, `dL/dw = -reward * (1 - sigmoid(w))`.
//!
//! Only the weight of the taken `(state, action)` receives a gradient; a one-hot
//! input zeroes every other entry.

use std::fmt;
use std::str::FromStr;

use crate::{ContextualPolicy, Error, Result, Reward, Transition};

/// Output activation of the linear layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Activation {
    /// Score is the raw weight. `-ln(w)` is undefined once `w <= 0`.
    #[default]
    Identity,
    /// Score is `sigmoid(w)`, always in `(0, 1)`.
    Sigmoid,
}

impl Activation {
    pub fn apply(self, w: f64) -> f64 {
        match self {
            Activation::Identity => w,
            Activation::Sigmoid => sigmoid(w),
        }
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "linear" => Ok(Activation::Identity),
            "sigmoid" => Ok(Activation::Sigmoid),
            other => Err(Error::Parse(format!("unknown activation {other:?}"))),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Activation::Identity => "identity",
            Activation::Sigmoid => "sigmoid",
        })
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Hyperparameters for [`LinearPolicyAgent`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentConfig {
    /// Gradient-descent step size (finite, > 0).
    pub learning_rate: f64,
    pub activation: Activation,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            activation: Activation::Identity,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig("learning_rate must be finite and > 0"));
        }
        Ok(())
    }
}

/// Tabular linear policy trained by a log-likelihood policy gradient.
#[derive(Debug, Clone)]
pub struct LinearPolicyAgent {
    cfg: AgentConfig,
    n_states: usize,
    n_actions: usize,
    // Row-major `n_states * n_actions`; row `s` is the weight vector for state `s`.
    weights: Vec<f64>,
}

impl LinearPolicyAgent {
    pub fn new(n_states: usize, n_actions: usize, cfg: AgentConfig) -> Result<Self> {
        if n_states == 0 || n_actions == 0 {
            return Err(Error::EmptyTable);
        }
        cfg.validate()?;
        Ok(Self {
            cfg,
            n_states,
            n_actions,
            weights: vec![1.0; n_states * n_actions],
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.cfg
    }

    /// All weights, row-major by state.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Weight row for `state`.
    pub fn row(&self, state: usize) -> Result<&[f64]> {
        if state >= self.n_states {
            return Err(Error::StateOutOfRange {
                state,
                n_bandits: self.n_states,
            });
        }
        let start = state * self.n_actions;
        Ok(&self.weights[start..start + self.n_actions])
    }

    pub fn weight(&self, state: usize, action: usize) -> Result<f64> {
        Ok(self.row(state)?[self.check_action(action)?])
    }

    /// Arg-max action for `state`, lowest index on ties.
    pub fn select(&self, state: usize) -> Result<usize> {
        // Both activations are monotone, so the raw weights rank the same as scores.
        Ok(crate::argmax(self.row(state)?).unwrap_or(0))
    }

    /// One gradient-descent step on `-ln(score[state, action]) * reward`.
    ///
    /// Under [`Activation::Identity`] the step is projected onto
    /// `[identity_floor(), inf)`, so a stored weight is always positive and `-ln(w)`
    /// stays defined. Returns the new weight.
    pub fn update(&mut self, state: usize, action: usize, reward: Reward) -> Result<f64> {
        let w = self.weight(state, action)?;
        let r = reward.as_f64();
        let next = match self.cfg.activation {
            Activation::Identity => {
                if !(w > 0.0) {
                    return Err(Error::NonPositiveScore {
                        state,
                        action,
                        score: w,
                    });
                }
                let floor = self.identity_floor();
                let stepped = w + self.cfg.learning_rate * r / w;
                if stepped < floor {
                    tracing::debug!(state, action, weight = stepped, floor, "weight clamped");
                    floor
                } else {
                    stepped
                }
            }
            Activation::Sigmoid => w + self.cfg.learning_rate * r * (1.0 - sigmoid(w)),
        };
        self.weights[state * self.n_actions + action] = next;
        tracing::trace!(state, action, reward = r, weight = next, "policy update");
        Ok(next)
    }

    /// Smallest weight the identity head stores: `min(sqrt(learning_rate), 1)`.
    ///
    /// At the floor one step of size `lr / w` is at most `w`, so a clamped arm cannot
    /// jump past healthy arms on a single lucky win.
    pub fn identity_floor(&self) -> f64 {
        self.cfg.learning_rate.sqrt().min(1.0)
    }

    /// Loss `-ln(score) * reward` at the current weights (for diagnostics).
    pub fn loss(&self, state: usize, action: usize, reward: Reward) -> Result<f64> {
        let score = self.cfg.activation.apply(self.weight(state, action)?);
        if !(score > 0.0) {
            return Err(Error::NonPositiveScore {
                state,
                action,
                score,
            });
        }
        Ok(-score.ln() * reward.as_f64())
    }

    /// Reset all weights to `1.0`.
    pub fn reset(&mut self) {
        self.weights.fill(1.0);
    }

    fn check_action(&self, action: usize) -> Result<usize> {
        if action >= self.n_actions {
            return Err(Error::ActionOutOfRange {
                action,
                n_actions: self.n_actions,
            });
        }
        Ok(action)
    }
}

impl ContextualPolicy for LinearPolicyAgent {
    fn n_states(&self) -> usize {
        self.n_states
    }

    fn n_actions(&self) -> usize {
        self.n_actions
    }

    fn scores(&self, state: usize) -> Result<Vec<f64>> {
        let act = self.cfg.activation;
        Ok(self.row(state)?.iter().map(|&w| act.apply(w)).collect())
    }

    fn greedy(&self, state: usize) -> Result<usize> {
        self.select(state)
    }

    fn update(&mut self, t: Transition) -> Result<()> {
        LinearPolicyAgent::update(self, t.state, t.action, t.reward).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn agent(activation: Activation) -> LinearPolicyAgent {
        LinearPolicyAgent::new(
            3,
            4,
            AgentConfig {
                learning_rate: 0.1,
                activation,
            },
        )
        .unwrap()
    }

    #[test]
    fn weights_start_at_one_and_first_arm_wins_ties() {
        let a = agent(Activation::Identity);
        assert!(a.weights().iter().all(|&w| w == 1.0));
        for s in 0..3 {
            assert_eq!(a.select(s).unwrap(), 0);
        }
    }

    #[test]
    fn identity_step_matches_closed_form() {
        let mut a = agent(Activation::Identity);
        // w = 1, r = +1: w' = 1 + 0.1 * 1 / 1
        let w = a.update(1, 2, Reward::Win).unwrap();
        assert!((w - 1.1).abs() < 1e-12);
        // w = 1.1, r = -1: w' = 1.1 - 0.1 / 1.1
        let w = a.update(1, 2, Reward::Loss).unwrap();
        assert!((w - (1.1 - 0.1 / 1.1)).abs() < 1e-12);
        assert_eq!(a.select(1).unwrap(), 2);
    }

    #[test]
    fn sigmoid_step_matches_closed_form() {
        let mut a = agent(Activation::Sigmoid);
        let s1 = 1.0 / (1.0 + (-1.0f64).exp());
        let w = a.update(0, 0, Reward::Loss).unwrap();
        assert!((w - (1.0 - 0.1 * (1.0 - s1))).abs() < 1e-12);
    }

    #[test]
    fn update_touches_only_the_taken_cell() {
        let mut a = agent(Activation::Identity);
        a.update(2, 3, Reward::Win).unwrap();
        for (i, &w) in a.weights().iter().enumerate() {
            if i == 2 * 4 + 3 {
                assert!(w > 1.0);
            } else {
                assert_eq!(w, 1.0);
            }
        }
    }

    #[test]
    fn identity_weight_is_clamped_at_floor() {
        let mut a = LinearPolicyAgent::new(
            1,
            2,
            AgentConfig {
                learning_rate: 0.01,
                activation: Activation::Identity,
            },
        )
        .unwrap();
        let floor = a.identity_floor();
        assert!((floor - 0.1).abs() < 1e-12);
        // An arm that always loses: w^2 shrinks by ~2 * lr per step, hitting 0 after ~50.
        for _ in 0..500 {
            let w = a.update(0, 1, Reward::Loss).unwrap();
            assert!(w >= floor, "w={w}");
        }
        assert_eq!(a.weight(0, 1).unwrap(), floor);
        assert!(a.loss(0, 1, Reward::Win).unwrap().is_finite());
        // One win from the floor moves by lr / floor = floor, not past healthy arms.
        let w = a.update(0, 1, Reward::Win).unwrap();
        assert!((w - 2.0 * floor).abs() < 1e-12);
        assert_eq!(a.select(0).unwrap(), 0);
    }

    #[test]
    fn gradient_step_lowers_loss_for_wins() {
        let mut a = agent(Activation::Identity);
        let before = a.loss(0, 1, Reward::Win).unwrap();
        a.update(0, 1, Reward::Win).unwrap();
        let after = a.loss(0, 1, Reward::Win).unwrap();
        assert!(after < before);
    }

    #[test]
    fn out_of_range_indices() {
        let mut a = agent(Activation::Identity);
        assert!(matches!(a.select(3), Err(Error::StateOutOfRange { .. })));
        assert!(matches!(
            a.update(0, 4, Reward::Win),
            Err(Error::ActionOutOfRange { .. })
        ));
    }

    #[test]
    fn config_validation() {
        assert!(LinearPolicyAgent::new(0, 1, AgentConfig::default()).is_err());
        let bad = AgentConfig {
            learning_rate: 0.0,
            ..AgentConfig::default()
        };
        assert!(matches!(
            LinearPolicyAgent::new(1, 1, bad),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn activation_parses() {
        assert_eq!("Sigmoid".parse::<Activation>().unwrap(), Activation::Sigmoid);
        assert_eq!("identity".parse::<Activation>().unwrap(), Activation::Identity);
        assert!("relu".parse::<Activation>().is_err());
        assert_eq!(Activation::Sigmoid.to_string(), "sigmoid");
    }

    #[test]
    fn reset_restores_ones() {
        let mut a = agent(Activation::Sigmoid);
        a.update(1, 1, Reward::Win).unwrap();
        a.reset();
        assert!(a.weights().iter().all(|&w| w == 1.0));
    }

    proptest! {
        #[test]
        fn sigmoid_moves_weight_in_reward_direction(
            w_steps in proptest::collection::vec(any::<bool>(), 1..200),
            state in 0usize..3,
            action in 0usize..4,
        ) {
            let mut a = agent(Activation::Sigmoid);
            for win in w_steps {
                let before = a.weight(state, action).unwrap();
                let r = if win { Reward::Win } else { Reward::Loss };
                let after = a.update(state, action, r).unwrap();
                prop_assert!(after.is_finite());
                if win {
                    prop_assert!(after > before);
                } else {
                    prop_assert!(after < before);
                }
            }
        }

        #[test]
        fn identity_weights_never_drop_below_floor(
            lr in 1e-4f64..0.5,
            steps in proptest::collection::vec(any::<bool>(), 1..400),
        ) {
            let mut a = LinearPolicyAgent::new(
                1,
                1,
                AgentConfig { learning_rate: lr, activation: Activation::Identity },
            )
            .unwrap();
            let floor = a.identity_floor();
            for win in steps {
                let r = if win { Reward::Win } else { Reward::Loss };
                let w = a.update(0, 0, r).unwrap();
                prop_assert!(w.is_finite() && w >= floor && w > 0.0);
            }
        }

        #[test]
        fn greedy_is_a_pure_function_of_weights(
            updates in proptest::collection::vec((0usize..3, 0usize..4, any::<bool>()), 0..100),
        ) {
            let mut a = agent(Activation::Sigmoid);
            for (s, act, win) in updates {
                let r = if win { Reward::Win } else { Reward::Loss };
                a.update(s, act, r).unwrap();
            }
            let b = a.clone();
            for s in 0..3 {
                prop_assert_eq!(a.select(s).unwrap(), b.select(s).unwrap());
                prop_assert_eq!(a.select(s).unwrap(), crate::argmax(&a.scores(s).unwrap()).unwrap());
            }
        }
    }
}
