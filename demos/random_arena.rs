use burn::backend::{ndarray::NdArrayDevice, NdArray};
use crossout_ai::{
    algo::{DecisionAgent, DecisionAgentConfig},
    gym::RandomArena,
};
use log::info;
use once_cell::sync::Lazy;

static DEVICE: Lazy<NdArrayDevice> = Lazy::new(NdArrayDevice::default);

// Position, speed, health and nearby enemies
const STATE_SIZE: usize = 10;
// Forward, backward, shoot, strafe
const ACTION_SIZE: usize = 4;
const NUM_EPISODES: u16 = 100;
const BATCH_SIZE: usize = 32;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut env = RandomArena::new(STATE_SIZE, ACTION_SIZE);
    let config = DecisionAgentConfig::new(STATE_SIZE, ACTION_SIZE);
    let mut agent = DecisionAgent::<NdArray>::new(config, &*DEVICE);

    for episode in 1..=NUM_EPISODES {
        let report = agent.go(&mut env, BATCH_SIZE)?;
        info!(
            "episode {episode}: {} steps, total reward {:.2}, epsilon {:.3}",
            report.steps, report.total_reward, report.exploration_rate
        );
    }

    if let Some(error) = agent.network().errors().mean() {
        info!(
            "mean update error over the last {} updates: {error:.4}",
            agent.network().errors().len()
        );
    }

    Ok(())
}
