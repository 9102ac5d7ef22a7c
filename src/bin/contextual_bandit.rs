//! Train a linear policy-gradient agent on a contextual bandit and report the result.
//!
//! Usage:
//! ```text
//! cargo run --features cli --bin contextual-bandit -- --episodes 10000 --epsilon 0.1
//! cargo run --features cli --bin contextual-bandit -- --activation sigmoid --json
//! RUST_LOG=gradbandit=debug cargo run --features cli --bin contextual-bandit
//! ```

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use gradbandit::{
    Activation, AgentConfig, ContextualBandit, LinearPolicyAgent, PayoutTable, Trainer,
    TrainerConfig, TrainingReport,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "contextual-bandit",
    about = "Policy-gradient agent on a synthetic contextual bandit"
)]
struct Cli {
    /// Number of training episodes
    #[arg(long, default_value_t = 10_000)]
    episodes: u64,

    /// Probability of taking a uniformly random action
    #[arg(long, default_value_t = 0.1)]
    epsilon: f64,

    /// Gradient-descent step size
    #[arg(long, default_value_t = 0.001)]
    learning_rate: f64,

    /// Print a progress line every N episodes
    #[arg(long, default_value_t = 500)]
    report_every: u64,

    /// Seed for both the environment and the exploration RNG
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Output activation of the policy layer (identity or sigmoid)
    #[arg(long, default_value = "identity")]
    activation: Activation,

    /// Payout thresholds: rows separated by ';', arms by ','
    #[arg(long, default_value = "0.2,0,0,-5; 0.1,-5,1,0.25; -5,5,5,5")]
    payouts: PayoutTable,

    /// Print the full report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<TrainingReport, gradbandit::Error> {
    let mut env = ContextualBandit::with_seed(cli.payouts.clone(), cli.seed);
    let mut agent = LinearPolicyAgent::new(
        env.n_bandits(),
        env.n_actions(),
        AgentConfig {
            learning_rate: cli.learning_rate,
            activation: cli.activation,
        },
    )?;
    let mut trainer = Trainer::new(TrainerConfig {
        episodes: cli.episodes,
        epsilon: cli.epsilon,
        report_every: cli.report_every,
        // Decorrelate the exploration stream from the environment stream.
        seed: cli.seed ^ 0x5EED_E9B5,
        ..TrainerConfig::default()
    })?;
    trainer.run(&mut env, &mut agent)
}

fn print_text(out: &mut impl Write, report: &TrainingReport) -> io::Result<()> {
    let n = report.verdicts.len();
    for snap in &report.snapshots {
        let means: Vec<String> = snap.mean_reward.iter().map(|m| format!("{m:.2}")).collect();
        writeln!(
            out,
            "Mean reward for each of the {n} bandits: [{}]",
            means.join(", ")
        )?;
    }
    writeln!(out)?;
    for v in &report.verdicts {
        writeln!(
            out,
            "The agent thinks action {} for bandit {} is the most promising....",
            v.believed_best + 1,
            v.state + 1
        )?;
        if v.correct() {
            writeln!(out, "...and it was right!")?;
        } else {
            writeln!(out, "...and it was wrong!")?;
        }
    }
    writeln!(out)?;
    writeln!(
        out,
        "Explored {} of {} episodes ({:.1}%)",
        report.explored,
        report.episodes,
        100.0 * report.explored as f64 / (report.episodes.max(1)) as f64
    )?;
    if report.skipped_updates > 0 {
        writeln!(out, "Skipped {} policy updates", report.skipped_updates)?;
    }
    for d in &report.diagnostics {
        writeln!(
            out,
            "Bandit {}: concentration={:.3} nats, regret/pull={:.3}",
            d.state + 1,
            d.concentration,
            d.regret()
        )?;
    }
    Ok(())
}

fn print_json(out: &mut impl Write, report: &TrainingReport) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let report = match run(&cli) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "training failed");
            return ExitCode::FAILURE;
        }
    };

    let mut out = io::stdout().lock();
    let written = if cli.json {
        print_json(&mut out, &report)
    } else {
        print_text(&mut out, &report)
    };
    if let Err(e) = written.and_then(|()| out.flush()) {
        tracing::error!(error = %e, "writing report failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
