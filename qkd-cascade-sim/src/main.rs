//! Command line host for a single key distribution run.
//!
//! ```bash
//! qkd-sim --qubits 1000 --noise 0.05
//! qkd-sim -n 4000 -p 0.02 --seed 7 --strategy bisecting --random-sampling
//! ```

use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::error;

use qkd_cascade_sim::estimation::SamplingStrategy;
use qkd_cascade_sim::simulation::{run, CascadeConfig, CascadeStrategy, SimulationConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    /// Contiguous blocks, first differing bit repaired
    BlockParity,
    /// Parity bisection with shuffled passes
    Bisecting,
}

/// Noisy-channel BB84 key distribution simulator
#[derive(Parser, Debug)]
#[command(name = "qkd-sim")]
#[command(version)]
struct Args {
    /// Number of qubits Alice sends
    #[arg(short = 'n', long, default_value = "1000")]
    qubits: usize,

    /// Bit-flip probability on the channel
    #[arg(short = 'p', long, default_value = "0.05")]
    noise: f64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Share of qubits intercepted and resent by an eavesdropper
    #[arg(long, default_value = "0.0")]
    intercept_rate: f64,

    /// Draw the error-estimation subset at random instead of the prefix
    #[arg(long)]
    random_sampling: bool,

    /// Reconciliation strategy
    #[arg(long, value_enum, default_value = "block-parity")]
    strategy: Strategy,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn config(&self) -> SimulationConfig {
        let strategy = match self.strategy {
            Strategy::BlockParity => CascadeStrategy::BlockParity,
            Strategy::Bisecting => CascadeStrategy::Bisecting {
                shuffle_seed: self.seed.unwrap_or_default(),
            },
        };
        let sampling = if self.random_sampling {
            SamplingStrategy::Random
        } else {
            SamplingStrategy::Prefix
        };

        let mut config = SimulationConfig::new(self.qubits, self.noise)
            .with_intercept_rate(self.intercept_rate)
            .with_sampling(sampling)
            .with_cascade(CascadeConfig {
                strategy,
                ..CascadeConfig::default()
            });
        config.seed = self.seed;
        config
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    match run(&args.config()) {
        Ok(outcome) => {
            let secret = outcome.final_secret.to_hex();
            println!("Final secret key: {}... (length: {})", &secret[..20], secret.len());
            println!("Error rate: {:.2}%", outcome.error_rate * 100.0);
            println!("Remaining errors: {}", outcome.remaining_errors);
            println!(
                "Key establishment successful with final error rate: {:.2}%",
                outcome.residual_error_ratio() * 100.0
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            println!("Key exchange failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
