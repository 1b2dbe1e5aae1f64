use qkd_cascade_sim::error::QkdError;
use qkd_cascade_sim::simulation::{run, SimulationConfig};

/// Sweeps the channel noise across the abort threshold.
fn simulate_noise_effect() {
    println!("BB84 Protocol with Noise Simulation");
    println!("{:>7}  {:>10}  {:>9}  outcome", "noise", "error rate", "residual");

    for step in 0..=10 {
        let noise = step as f64 * 0.025;
        let config = SimulationConfig::new(4000, noise).with_seed(2024 + step);
        match run(&config) {
            Ok(outcome) => println!(
                "{:>7.3}  {:>9.2}%  {:>9}  key {}...",
                noise,
                outcome.error_rate * 100.0,
                outcome.remaining_errors,
                &outcome.final_secret.to_hex()[..16]
            ),
            Err(QkdError::ExcessiveErrorRate { error_rate, .. }) => println!(
                "{:>7.3}  {:>9.2}%  {:>9}  aborted",
                noise,
                error_rate * 100.0,
                "-"
            ),
            Err(e) => println!("{:>7.3}  failed: {}", noise, e),
        }
    }
}

fn main() {
    simulate_noise_effect();
}
