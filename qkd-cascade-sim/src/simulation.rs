//! End-to-end key distribution run.
//!
//! The pipeline is strictly linear:
//! 1. Alice draws bits and both parties draw bases
//! 2. The qubits cross the noisy channel
//! 3. Bases are compared publicly and mismatches discarded
//! 4. A test share of the sifted key estimates the error rate (abort if high)
//! 5. The remainder is reconciled with a cascade strategy
//! 6. Alice's key is hashed into the final secret
//!
//! All randomness comes from one stream passed in by the caller, consumed in
//! the order the steps above are listed.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::channel::NoisyChannel;
use crate::error::{QkdError, Result};
use crate::error_correction::{
    count_mismatches, BisectingCascade, BlockParityCascade, Reconciler, CASCADE_PASSES,
    INITIAL_BLOCK_SIZE,
};
use crate::estimation::{
    estimate_error_rate, RawKeyPair, SamplingStrategy, MAX_ERROR_RATE, TEST_FRACTION,
};
use crate::privacy_amplification::{amplify, FinalSecret};
use crate::sifting::{sift, MIN_SIFTED_LENGTH};
use crate::source::generate_source;

/// Which built-in reconciliation strategy a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CascadeStrategy {
    #[default]
    BlockParity,
    Bisecting { shuffle_seed: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeConfig {
    pub initial_block_size: usize,
    pub passes: usize,
    pub strategy: CascadeStrategy,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            initial_block_size: INITIAL_BLOCK_SIZE,
            passes: CASCADE_PASSES,
            strategy: CascadeStrategy::BlockParity,
        }
    }
}

impl CascadeConfig {
    pub fn build(&self) -> Box<dyn Reconciler> {
        match self.strategy {
            CascadeStrategy::BlockParity => Box::new(BlockParityCascade::new(
                self.initial_block_size,
                self.passes,
            )),
            CascadeStrategy::Bisecting { shuffle_seed } => Box::new(BisectingCascade::new(
                self.initial_block_size,
                self.passes,
                shuffle_seed,
            )),
        }
    }
}

/// Configuration for a single key distribution run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of qubits Alice sends.
    pub n_qubits: usize,
    /// Bit-flip probability on positions measured in the encoding basis.
    pub noise_level: f64,
    /// Share of qubits passing through an intercept-resend eavesdropper.
    pub intercept_rate: f64,
    /// Fixed seed for a reproducible run; `None` draws one from the OS.
    pub seed: Option<u64>,
    pub min_sifted_length: usize,
    /// Share of the sifted key sacrificed for error estimation.
    pub test_fraction: f64,
    /// Abort when the measured error rate exceeds this.
    pub max_error_rate: f64,
    pub sampling: SamplingStrategy,
    pub cascade: CascadeConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n_qubits: 1000,
            noise_level: 0.05,
            intercept_rate: 0.0,
            seed: None,
            min_sifted_length: MIN_SIFTED_LENGTH,
            test_fraction: TEST_FRACTION,
            max_error_rate: MAX_ERROR_RATE,
            sampling: SamplingStrategy::Prefix,
            cascade: CascadeConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn new(n_qubits: usize, noise_level: f64) -> Self {
        Self {
            n_qubits,
            noise_level,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_intercept_rate(mut self, rate: f64) -> Self {
        self.intercept_rate = rate;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingStrategy) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_cascade(mut self, cascade: CascadeConfig) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.noise_level) {
            return Err(QkdError::InvalidNoiseLevel(self.noise_level));
        }
        if !(0.0..=1.0).contains(&self.intercept_rate) {
            return Err(invalid("intercept_rate", "must be between 0.0 and 1.0"));
        }
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(invalid("test_fraction", "must be in [0.0, 1.0)"));
        }
        if !(0.0..=1.0).contains(&self.max_error_rate) {
            return Err(invalid("max_error_rate", "must be between 0.0 and 1.0"));
        }
        if self.cascade.initial_block_size == 0 {
            return Err(invalid("initial_block_size", "must be at least 1"));
        }
        if self.cascade.passes == 0 {
            return Err(invalid("passes", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(name: &'static str, reason: &str) -> QkdError {
    QkdError::InvalidParameter {
        name,
        reason: reason.to_string(),
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub final_secret: FinalSecret,
    /// Error rate measured on the test subset.
    pub error_rate: f64,
    /// Positions where Bob's reconciled key still differs from Alice's.
    pub remaining_errors: usize,
    pub sifted_length: usize,
    pub raw_key_length: usize,
}

impl SimulationOutcome {
    /// Residual errors relative to the length of the rendered secret.
    pub fn residual_error_ratio(&self) -> f64 {
        self.remaining_errors as f64 / self.final_secret.to_hex().len() as f64
    }
}

/// Runs one session with the default configuration and an OS-seeded stream.
pub fn run_simulation(n_qubits: usize, noise_level: f64) -> Result<SimulationOutcome> {
    run(&SimulationConfig::new(n_qubits, noise_level))
}

/// Runs one session, seeding the stream from `config.seed` when set.
pub fn run(config: &SimulationConfig) -> Result<SimulationOutcome> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    run_with_rng(config, &mut rng)
}

/// Runs one session on the caller's stream. `config.seed` is ignored.
pub fn run_with_rng<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rng: &mut R,
) -> Result<SimulationOutcome> {
    let reconciler = config.cascade.build();
    run_with_reconciler(config, &reconciler, rng)
}

/// Runs one session with a caller-supplied reconciliation strategy.
///
/// `config.cascade` is ignored in favour of `reconciler`.
pub fn run_with_reconciler<C, R>(
    config: &SimulationConfig,
    reconciler: &C,
    rng: &mut R,
) -> Result<SimulationOutcome>
where
    C: Reconciler + ?Sized,
    R: Rng + ?Sized,
{
    config.validate()?;
    let channel = NoisyChannel::new(config.noise_level)?.with_interception(config.intercept_rate)?;

    let source = generate_source(config.n_qubits, rng);
    let bob_bits = channel.transmit_source(&source, rng);

    let sifted = sift(
        &source.alice_bits,
        &bob_bits,
        &source.alice_bases,
        &source.bob_bases,
        config.min_sifted_length,
    )?;
    let sifted_length = sifted.len();

    let estimate = estimate_error_rate(
        sifted,
        config.test_fraction,
        config.max_error_rate,
        config.sampling,
        rng,
    )?;
    let RawKeyPair { alice, bob } = estimate.raw_key;
    debug!(
        "{} bits tested, {} bits enter reconciliation",
        estimate.test_size,
        alice.len()
    );

    let corrected = reconciler.reconcile(&alice, bob);
    let remaining_errors = count_mismatches(&alice, &corrected);
    info!("Remaining errors after correction: {}", remaining_errors);

    Ok(SimulationOutcome {
        final_secret: amplify(&alice),
        error_rate: estimate.error_rate,
        remaining_errors,
        sifted_length,
        raw_key_length: alice.len(),
    })
}
