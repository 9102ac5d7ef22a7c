//! Error type shared by the environment, agent, and trainer.

/// Errors returned by this crate.
///
/// Every variant describes bad input (a malformed table, an index outside the
/// table, a config out of range) or a numeric domain failure in the policy
/// update. Nothing here is retryable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The payout table has no rows, or a row has no arms.
    #[error("payout table must have at least one bandit and one arm")]
    EmptyTable,

    /// Rows of the payout table differ in length.
    #[error("payout table row {row} has {len} arms, expected {expected}")]
    RaggedTable {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// A payout threshold is NaN or infinite.
    #[error("payout threshold at ({state}, {action}) is not finite: {value}")]
    NonFiniteThreshold {
        state: usize,
        action: usize,
        value: f64,
    },

    /// A score table's cell list does not match its declared shape.
    #[error("score table has {len} cells, expected {n_bandits} x {n_actions}")]
    CellCountMismatch {
        len: usize,
        n_bandits: usize,
        n_actions: usize,
    },

    #[error("state {state} out of range (n_bandits = {n_bandits})")]
    StateOutOfRange { state: usize, n_bandits: usize },

    #[error("action {action} out of range (n_actions = {n_actions})")]
    ActionOutOfRange { action: usize, n_actions: usize },

    /// `-log(score)` is undefined for the chosen action.
    #[error("score at ({state}, {action}) is {score}; log-likelihood needs a positive score")]
    NonPositiveScore {
        state: usize,
        action: usize,
        score: f64,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),

    #[error("parse error: {0}")]
    Parse(String),

    /// Divergence computation on a policy distribution failed.
    #[error(transparent)]
    Divergence(#[from] logp::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
