//! Fixed-iteration training loop.
//!
//! Per episode:
//! 1. draw a bandit (`state`) from the environment,
//! 2. choose an arm with [`EpsilonGreedy`],
//! 3. pull it for a `+1`/`-1` reward,
//! 4. apply one policy update with that single [`Transition`].
//!
//! An update the policy rejects with [`Error::NonPositiveScore`] is skipped and
//! counted in [`TrainingReport::skipped_updates`]; the episode still counts toward
//! the score table. Every other error aborts the run.
//!
//! The trainer keeps its own exploration RNG, separate from the environment's, so a
//! fixed `(seed, config)` pair reproduces the whole run.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    diagnose, BanditDiagnostics, ContextualBandit, ContextualPolicy, EpsilonGreedy, Error,
    Result, ScoreTable, Transition,
};

/// Loop hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainerConfig {
    /// Number of episodes (one transition each).
    pub episodes: u64,
    /// Exploration probability in `[0, 1]`.
    pub epsilon: f64,
    /// Snapshot interval in episodes (>= 1). Snapshots are taken at episode 0,
    /// `report_every`, `2 * report_every`, ...
    pub report_every: u64,
    /// Seed for the exploration RNG.
    pub seed: u64,
    /// Softmax temperature for the final diagnostics.
    pub temperature: f64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            episodes: 10_000,
            epsilon: 0.1,
            report_every: 500,
            seed: 0,
            temperature: 1.0,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        EpsilonGreedy::new(self.epsilon)?;
        if self.report_every == 0 {
            return Err(Error::InvalidConfig("report_every must be >= 1"));
        }
        if !(self.temperature.is_finite() && self.temperature > 0.0) {
            return Err(Error::InvalidConfig("temperature must be finite and > 0"));
        }
        Ok(())
    }
}

/// Progress report taken every `report_every` episodes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressSnapshot {
    /// Episode index at which the snapshot was taken (before that episode runs).
    pub episode: u64,
    /// Row mean of the running score table, one entry per bandit.
    pub mean_reward: Vec<f64>,
    /// Mean per-pull reward since the previous snapshot (`None` for the first).
    pub recent_mean_reward: Option<f64>,
}

/// Final per-bandit verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BanditVerdict {
    pub state: usize,
    /// Arm the trained policy plays greedily.
    pub believed_best: usize,
    /// Arm with the lowest payout threshold.
    pub optimal: usize,
}

impl BanditVerdict {
    pub fn correct(&self) -> bool {
        self.believed_best == self.optimal
    }
}

/// Everything a run produces.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainingReport {
    pub episodes: u64,
    pub snapshots: Vec<ProgressSnapshot>,
    pub scores: ScoreTable,
    pub verdicts: Vec<BanditVerdict>,
    /// Episodes that took the epsilon branch.
    pub explored: u64,
    /// Episodes that played the greedy action.
    pub greedy: u64,
    /// Episodes whose policy update was rejected as numerically undefined.
    #[cfg_attr(feature = "serde", serde(default))]
    pub skipped_updates: u64,
    pub diagnostics: Vec<BanditDiagnostics>,
}

impl TrainingReport {
    /// True when every bandit's believed-best arm is its optimal arm.
    pub fn all_correct(&self) -> bool {
        self.verdicts.iter().all(BanditVerdict::correct)
    }
}

/// Outcome of a single [`Trainer::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub transition: Transition,
    /// The action came from the epsilon branch.
    pub explored: bool,
    /// The policy accepted the update.
    pub updated: bool,
}

/// Runs the epsilon-greedy policy-gradient loop.
#[derive(Debug, Clone)]
pub struct Trainer {
    cfg: TrainerConfig,
    explore: EpsilonGreedy,
    rng: StdRng,
}

impl Trainer {
    pub fn new(cfg: TrainerConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            explore: EpsilonGreedy::new(cfg.epsilon)?,
            rng: StdRng::seed_from_u64(cfg.seed),
            cfg,
        })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.cfg
    }

    /// Run one episode.
    pub fn step<P>(&mut self, env: &mut ContextualBandit, policy: &mut P) -> Result<Step>
    where
        P: ContextualPolicy + ?Sized,
    {
        let state = env.sample_state();
        let choice = self.explore.choose(&mut self.rng, &*policy, state)?;
        let reward = env.pull(state, choice.action)?;
        let t = Transition {
            state,
            action: choice.action,
            reward,
        };
        let updated = match policy.update(t) {
            Ok(()) => true,
            Err(Error::NonPositiveScore {
                state,
                action,
                score,
            }) => {
                tracing::warn!(state, action, score, "policy update skipped: non-positive score");
                false
            }
            Err(e) => return Err(e),
        };
        Ok(Step {
            transition: t,
            explored: choice.explored(),
            updated,
        })
    }

    /// Run all configured episodes against `env`, training `policy` in place.
    pub fn run<P>(&mut self, env: &mut ContextualBandit, policy: &mut P) -> Result<TrainingReport>
    where
        P: ContextualPolicy + ?Sized,
    {
        let n_bandits = env.n_bandits();
        let n_actions = env.n_actions();
        if policy.n_states() != n_bandits || policy.n_actions() != n_actions {
            return Err(Error::InvalidConfig(
                "policy shape does not match the payout table",
            ));
        }
        tracing::debug!(
            episodes = self.cfg.episodes,
            epsilon = self.cfg.epsilon,
            report_every = self.cfg.report_every,
            seed = self.cfg.seed,
            n_bandits,
            n_actions,
            "starting training"
        );

        let mut scores = ScoreTable::new(n_bandits, n_actions);
        let mut snapshots = Vec::new();
        let mut explored = 0u64;
        let mut skipped_updates = 0u64;
        let mut interval_sum = 0i64;
        let mut interval_len = 0u64;

        for episode in 0..self.cfg.episodes {
            if episode % self.cfg.report_every == 0 {
                let snap = ProgressSnapshot {
                    episode,
                    mean_reward: scores.row_means(),
                    recent_mean_reward: (interval_len > 0)
                        .then(|| interval_sum as f64 / interval_len as f64),
                };
                tracing::info!(
                    episode,
                    mean_reward = ?snap.mean_reward,
                    recent = ?snap.recent_mean_reward,
                    "progress"
                );
                snapshots.push(snap);
                interval_sum = 0;
                interval_len = 0;
            }

            let step = self.step(env, policy)?;
            let t = step.transition;
            scores.record(t.state, t.action, t.reward)?;
            explored += u64::from(step.explored);
            skipped_updates += u64::from(!step.updated);
            interval_sum += t.reward.value();
            interval_len += 1;
            tracing::trace!(
                episode,
                state = t.state,
                action = t.action,
                reward = t.reward.value(),
                explored = step.explored,
                "episode"
            );
        }

        let table = env.table();
        let mut verdicts = Vec::with_capacity(n_bandits);
        for state in 0..n_bandits {
            let v = BanditVerdict {
                state,
                believed_best: policy.greedy(state)?,
                optimal: table.optimal_action(state)?,
            };
            if v.correct() {
                tracing::info!(state, action = v.believed_best, "best action found");
            } else {
                tracing::warn!(
                    state,
                    believed = v.believed_best,
                    optimal = v.optimal,
                    "best action not found"
                );
            }
            verdicts.push(v);
        }
        let diagnostics = diagnose(&*policy, table, self.cfg.temperature)?;

        Ok(TrainingReport {
            episodes: self.cfg.episodes,
            snapshots,
            scores,
            verdicts,
            explored,
            greedy: self.cfg.episodes - explored,
            skipped_updates,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AgentConfig, LinearPolicyAgent, PayoutTable};

    fn run(cfg: TrainerConfig, env_seed: u64) -> (TrainingReport, LinearPolicyAgent) {
        let mut env = ContextualBandit::with_seed(PayoutTable::default(), env_seed);
        let mut agent = LinearPolicyAgent::new(3, 4, AgentConfig::default()).unwrap();
        let report = Trainer::new(cfg).unwrap().run(&mut env, &mut agent).unwrap();
        (report, agent)
    }

    #[test]
    fn snapshot_schedule() {
        let cfg = TrainerConfig {
            episodes: 1_200,
            report_every: 500,
            ..TrainerConfig::default()
        };
        let (report, _) = run(cfg, 0);
        let eps: Vec<u64> = report.snapshots.iter().map(|s| s.episode).collect();
        assert_eq!(eps, vec![0, 500, 1000]);
        assert_eq!(report.snapshots[0].mean_reward, vec![0.0; 3]);
        assert!(report.snapshots[0].recent_mean_reward.is_none());
        assert!(report.snapshots[1].recent_mean_reward.is_some());
    }

    #[test]
    fn counts_add_up() {
        let cfg = TrainerConfig {
            episodes: 2_000,
            ..TrainerConfig::default()
        };
        let (report, _) = run(cfg, 5);
        assert_eq!(report.scores.total_visits(), 2_000);
        assert_eq!(report.explored + report.greedy, 2_000);
        assert_eq!(report.verdicts.len(), 3);
        assert_eq!(report.diagnostics.len(), 3);
        assert_eq!(report.skipped_updates, 0);
    }

    #[test]
    fn zero_episodes_yields_untrained_report() {
        let cfg = TrainerConfig {
            episodes: 0,
            ..TrainerConfig::default()
        };
        let (report, agent) = run(cfg, 0);
        assert!(report.snapshots.is_empty());
        assert_eq!(report.scores.total_visits(), 0);
        assert!(agent.weights().iter().all(|&w| w == 1.0));
        let believed: Vec<usize> = report.verdicts.iter().map(|v| v.believed_best).collect();
        assert_eq!(believed, vec![0, 0, 0]);
    }

    #[test]
    fn rejects_bad_config() {
        for cfg in [
            TrainerConfig {
                epsilon: 1.5,
                ..TrainerConfig::default()
            },
            TrainerConfig {
                report_every: 0,
                ..TrainerConfig::default()
            },
            TrainerConfig {
                temperature: 0.0,
                ..TrainerConfig::default()
            },
        ] {
            assert!(matches!(Trainer::new(cfg), Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn rejects_mismatched_policy_shape() {
        let mut env = ContextualBandit::default();
        let mut agent = LinearPolicyAgent::new(2, 4, AgentConfig::default()).unwrap();
        let r = Trainer::new(TrainerConfig::default())
            .unwrap()
            .run(&mut env, &mut agent);
        assert!(matches!(r, Err(Error::InvalidConfig(_))));
    }

    /// Policy whose weights already left the domain of `-ln`.
    struct Collapsed;

    impl ContextualPolicy for Collapsed {
        fn n_states(&self) -> usize {
            3
        }
        fn n_actions(&self) -> usize {
            4
        }
        fn scores(&self, _state: usize) -> Result<Vec<f64>> {
            Ok(vec![0.0; 4])
        }
        fn update(&mut self, t: Transition) -> Result<()> {
            Err(Error::NonPositiveScore {
                state: t.state,
                action: t.action,
                score: 0.0,
            })
        }
    }

    #[test]
    fn rejected_updates_are_skipped_not_fatal() {
        let mut env = ContextualBandit::with_seed(PayoutTable::default(), 3);
        let cfg = TrainerConfig {
            episodes: 700,
            ..TrainerConfig::default()
        };
        let report = Trainer::new(cfg).unwrap().run(&mut env, &mut Collapsed).unwrap();
        assert_eq!(report.skipped_updates, 700);
        assert_eq!(report.scores.total_visits(), 700);
        assert_eq!(report.snapshots.len(), 2);
    }

    #[test]
    fn other_update_errors_abort_the_run() {
        struct Broken;
        impl ContextualPolicy for Broken {
            fn n_states(&self) -> usize {
                3
            }
            fn n_actions(&self) -> usize {
                4
            }
            fn scores(&self, _state: usize) -> Result<Vec<f64>> {
                Ok(vec![1.0; 4])
            }
            fn update(&mut self, t: Transition) -> Result<()> {
                Err(Error::ActionOutOfRange {
                    action: t.action,
                    n_actions: 0,
                })
            }
        }
        let mut env = ContextualBandit::default();
        let r = Trainer::new(TrainerConfig::default())
            .unwrap()
            .run(&mut env, &mut Broken);
        assert!(matches!(r, Err(Error::ActionOutOfRange { .. })));
    }

    #[test]
    fn long_default_run_keeps_identity_weights_positive() {
        let cfg = TrainerConfig {
            episodes: 150_000,
            ..TrainerConfig::default()
        };
        let (report, agent) = run(cfg, 0);
        assert_eq!(report.scores.total_visits(), 150_000);
        assert_eq!(report.skipped_updates, 0);
        let floor = agent.identity_floor();
        for &w in agent.weights() {
            assert!(w.is_finite() && w >= floor, "w={w}");
        }
        // Bandit 2's threshold-5 arms never pay out, so exploration drives them to the floor.
        assert!(agent.weight(2, 1).unwrap() < 0.1);
        assert!(report.verdicts[2].correct());
    }

    #[test]
    fn same_seeds_same_report() {
        let cfg = TrainerConfig {
            episodes: 3_000,
            seed: 17,
            ..TrainerConfig::default()
        };
        let (r1, a1) = run(cfg, 99);
        let (r2, a2) = run(cfg, 99);
        assert_eq!(r1, r2);
        assert_eq!(a1.weights(), a2.weights());
    }
}
