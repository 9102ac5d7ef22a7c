//! `gradbandit`: a contextual multi-armed bandit solved by a linear policy gradient.
//!
//! The setting: several bandits, each with several arms. Every episode the
//! environment hands the agent one bandit (the *context* or *state*); the agent picks
//! an arm and receives `+1` or `-1`. The agent must learn, per bandit, which arm pays
//! best.
//!
//! - [`ContextualBandit`] / [`PayoutTable`]: the environment. Pulling arm `a` of bandit
//!   `s` draws `z ~ N(0, 1)` and pays `+1` iff `z > threshold[s][a]`, so the lowest
//!   threshold in a row is the best arm.
//! - [`LinearPolicyAgent`]: a single linear layer over a one-hot state, i.e. one
//!   weight per `(state, action)`, initialised to ones. It plays the arg-max of its
//!   row and learns with a log-likelihood policy-gradient step,
//!   minimising `-ln(score) * reward` for the taken action.
//! - [`EpsilonGreedy`]: with probability `epsilon` a uniformly random arm, otherwise
//!   the greedy one.
//! - [`Trainer`]: the fixed-iteration loop, producing a [`TrainingReport`] with
//!   periodic mean-reward [`ProgressSnapshot`]s, the running [`ScoreTable`], and a
//!   per-bandit [`BanditVerdict`].
//!
//! **Goals:**
//! - **Seedable**: environment and trainer each own a `StdRng`; same seeds and
//!   config reproduce a run exactly.
//! - **No autodiff**: the gradient of `-ln(score) * reward` is written out in closed form.
//! - **Typed rewards**: [`Reward`] is `Win` or `Loss`; no other value is representable.
//!
//! **Non-goals:**
//! - Not a general reinforcement-learning framework (no multi-step episodes, no
//!   value functions, no function approximation beyond a weight table).
//! - No persistence or concurrency.
//!
//! # Example
//!
//! ```rust
//! use gradbandit::{
//!     AgentConfig, ContextualBandit, LinearPolicyAgent, PayoutTable, Trainer, TrainerConfig,
//! };
//!
//! let table = PayoutTable::default();
//! let mut env = ContextualBandit::with_seed(table, 7);
//! let mut agent = LinearPolicyAgent::new(env.n_bandits(), env.n_actions(), AgentConfig::default())?;
//! let mut trainer = Trainer::new(TrainerConfig { episodes: 1_000, ..TrainerConfig::default() })?;
//!
//! let report = trainer.run(&mut env, &mut agent)?;
//! assert_eq!(report.scores.total_visits(), 1_000);
//! # Ok::<(), gradbandit::Error>(())
//! ```

#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod decision;
pub use decision::*;

mod policy;
pub use policy::*;

mod alloc;
pub use alloc::*;

mod env;
pub use env::*;

mod agent;
pub use agent::*;

mod explore;
pub use explore::*;

mod score;
pub use score::*;

mod diagnostics;
pub use diagnostics::*;

mod trainer;
pub use trainer::*;
