use gradbandit::{
    AgentConfig, ContextualBandit, LinearPolicyAgent, PayoutTable, Trainer, TrainerConfig,
};

fn main() -> Result<(), gradbandit::Error> {
    // Three bandits, four arms each. Lower threshold = more frequent +1.
    let table = PayoutTable::default();
    println!("payout thresholds: {table}");

    // Separate seeds for the environment and the exploration stream.
    let mut env = ContextualBandit::with_seed(table, 123);
    let mut agent = LinearPolicyAgent::new(env.n_bandits(), env.n_actions(), AgentConfig::default())?;
    let mut trainer = Trainer::new(TrainerConfig {
        seed: 7,
        ..TrainerConfig::default()
    })?;

    let report = trainer.run(&mut env, &mut agent)?;
    for snap in &report.snapshots {
        println!("t={:5} mean={:?}", snap.episode, snap.mean_reward);
    }
    for v in &report.verdicts {
        println!(
            "bandit {} believed={} optimal={} correct={}",
            v.state,
            v.believed_best,
            v.optimal,
            v.correct()
        );
    }
    for s in 0..env.n_bandits() {
        println!("weights[{s}] = {:?}", agent.row(s)?);
    }
    Ok(())
}
