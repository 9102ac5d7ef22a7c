use gradbandit::{
    Activation, AgentConfig, ContextualBandit, LinearPolicyAgent, PayoutTable, Trainer,
    TrainerConfig,
};

fn main() -> Result<(), gradbandit::Error> {
    // Five bandits with a shifted optimum; the sigmoid head never hits log(0).
    let table: PayoutTable = "
        -1, 0, 0.5, 1, 2;
        0, -1, 0.5, 1, 2;
        0.5, 0, -1, 1, 2;
        1, 0.5, 0, -1, 2;
        2, 1, 0.5, 0, -1"
        .parse()?;

    let mut env = ContextualBandit::with_seed(table, 0);
    let mut agent = LinearPolicyAgent::new(
        env.n_bandits(),
        env.n_actions(),
        AgentConfig {
            learning_rate: 0.05,
            activation: Activation::Sigmoid,
        },
    )?;
    let mut trainer = Trainer::new(TrainerConfig {
        episodes: 30_000,
        epsilon: 0.2,
        report_every: 5_000,
        seed: 1,
        ..TrainerConfig::default()
    })?;

    let report = trainer.run(&mut env, &mut agent)?;
    for snap in &report.snapshots {
        println!(
            "t={:5} recent={:?}",
            snap.episode, snap.recent_mean_reward
        );
    }
    for (v, d) in report.verdicts.iter().zip(&report.diagnostics) {
        println!(
            "bandit {} believed={} optimal={} kl={:.3} pref={:?}",
            v.state, v.believed_best, v.optimal, d.concentration, d.preference
        );
    }
    Ok(())
}
