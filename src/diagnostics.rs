//! Policy diagnostics: how strongly the agent prefers one arm per bandit.
//!
//! Each score row is mapped through [`softmax`][crate::softmax] to a distribution
//! over arms. Its KL divergence from uniform is `0` when the agent is indifferent and
//! approaches `ln(n_actions)` as the preference concentrates on a single arm.

use crate::{softmax, ContextualPolicy, PayoutTable, Result};

/// Tolerance for simplex validation in `logp`.
const SIMPLEX_TOL: f64 = 1e-9;

/// Per-bandit preference summary.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BanditDiagnostics {
    pub state: usize,
    /// Softmax over the policy's scores.
    pub preference: Vec<f64>,
    /// `KL(preference || uniform)` in nats.
    pub concentration: f64,
    /// True chance of a `+1` for each arm under the payout table.
    pub win_probability: Vec<f64>,
    /// Expected reward (`2p - 1`) of the arm the greedy policy would play.
    pub greedy_expected_reward: f64,
    /// Expected reward of the optimal arm.
    pub optimal_expected_reward: f64,
}

impl BanditDiagnostics {
    /// Per-pull expected-reward gap between the optimal and the greedy arm.
    pub fn regret(&self) -> f64 {
        self.optimal_expected_reward - self.greedy_expected_reward
    }
}

/// Compute diagnostics for every bandit.
pub fn diagnose<P>(policy: &P, table: &PayoutTable, temperature: f64) -> Result<Vec<BanditDiagnostics>>
where
    P: ContextualPolicy + ?Sized,
{
    let n_actions = table.n_actions();
    let uniform = vec![1.0 / n_actions as f64; n_actions];
    let mut out = Vec::with_capacity(table.n_bandits());
    for state in 0..table.n_bandits() {
        let scores = policy.scores(state)?;
        let preference = softmax(&scores, temperature);
        logp::validate_simplex(&preference, SIMPLEX_TOL)?;
        let concentration = logp::kl_divergence(&preference, &uniform, SIMPLEX_TOL)?;

        let win_probability = (0..n_actions)
            .map(|a| table.win_probability(state, a))
            .collect::<Result<Vec<f64>>>()?;
        let greedy = policy.greedy(state)?;
        let optimal = table.optimal_action(state)?;
        out.push(BanditDiagnostics {
            state,
            preference,
            concentration,
            greedy_expected_reward: 2.0 * win_probability[greedy] - 1.0,
            optimal_expected_reward: 2.0 * win_probability[optimal] - 1.0,
            win_probability,
        });
    }
    Ok(out)
}
