use meshsim::{CommandRegistry, Outcome, Simulation, SimulationConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const METEOR_SHOWER: &str = include_str!("../scripts/meteorshower.txt");
const SEED: u64 = 0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meshsim=info,meteorshower=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Run the script named on the command line, or the bundled meteor shower
    let script = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => METEOR_SHOWER.to_string(),
    };

    let mut sim = Simulation::new(SimulationConfig::seeded(SEED))?;
    let registry = CommandRegistry::new();
    let outcomes = registry.run_script(&mut sim, &script)?;
    tracing::info!(steps = outcomes.len(), "script finished");

    // One row per connectivity measurement
    println!("time,active,connected");
    let measurements = outcomes.iter().filter_map(|outcome| match *outcome {
        Outcome::Connectivity {
            connected,
            disconnected,
        } => Some((connected + disconnected, connected)),
        _ => None,
    });
    for (time, (active, connected)) in measurements.enumerate() {
        println!("{time},{active},{connected}");
    }

    if let Some(reachability) = sim.reachability() {
        println!();
        println!("hops,nodes");
        for (hops, nodes) in reachability.histogram().iter().enumerate() {
            println!("{hops},{nodes}");
        }
    }
    Ok(())
}
