use crate::bb84_states::BitSequence;
use crate::channel::NoisyChannel;
use crate::error::QkdError;
use crate::error_correction::{count_mismatches, BlockParityCascade, Reconciler};
use crate::estimation::{estimate_error_rate, SamplingStrategy, MAX_ERROR_RATE, TEST_FRACTION};
use crate::privacy_amplification::amplify;
use crate::sifting::{sift, MIN_SIFTED_LENGTH};
use crate::simulation::{
    run, run_simulation, run_with_reconciler, run_with_rng, CascadeConfig, CascadeStrategy,
    SimulationConfig,
};
use crate::source::generate_source;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_noiseless_channel_yields_zero_error_rate() {
    let outcome = run_simulation(1000, 0.0).unwrap();
    assert_eq!(outcome.error_rate, 0.0);
    assert_eq!(outcome.remaining_errors, 0);
    assert_eq!(outcome.final_secret.to_hex().len(), 64);
}

#[test]
fn test_full_noise_aborts_with_unit_error_rate() {
    let err = run_simulation(1000, 1.0).unwrap_err();
    assert_eq!(
        err,
        QkdError::ExcessiveErrorRate {
            error_rate: 1.0,
            threshold: MAX_ERROR_RATE
        }
    );
}

#[test]
fn test_tiny_session_has_insufficient_key_material() {
    match run_simulation(10, 0.05) {
        Err(QkdError::InsufficientKeyMaterial {
            sifted_length,
            minimum,
        }) => {
            assert!(sifted_length <= 10);
            assert_eq!(minimum, MIN_SIFTED_LENGTH);
        }
        other => panic!("expected insufficient key material, got {:?}", other),
    }
}

#[test]
fn test_successful_runs_produce_64_hex_chars() {
    for seed in 0..50 {
        for noise in [0.0, 0.02, 0.08, 0.5] {
            let config = SimulationConfig::new(40 + seed as usize * 7, noise).with_seed(seed);
            if let Ok(outcome) = run(&config) {
                let secret = outcome.final_secret.to_string();
                assert_eq!(secret.len(), 64, "seed {} noise {}", seed, noise);
                assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
                assert!(outcome.error_rate <= MAX_ERROR_RATE);
            }
        }
    }
}

#[test]
fn test_sifted_split_accounts_for_every_bit() {
    let config = SimulationConfig::new(1500, 0.03).with_seed(77);
    let outcome = run(&config).unwrap();
    let test_size = (outcome.sifted_length as f64 * TEST_FRACTION) as usize;
    assert_eq!(outcome.raw_key_length + test_size, outcome.sifted_length);
}

#[test]
fn test_seed_and_explicit_stream_agree() {
    let config = SimulationConfig::new(1200, 0.05).with_seed(99);
    let seeded = run(&config).unwrap();
    let streamed = run_with_rng(&config, &mut StdRng::seed_from_u64(99)).unwrap();
    assert_eq!(seeded, streamed);
}

#[test]
fn test_protocol_robustness_against_eavesdropping() {
    // Intercept-resend on every qubit pushes the error rate towards 25%.
    let config = SimulationConfig::new(4000, 0.0)
        .with_intercept_rate(1.0)
        .with_seed(5);
    match run(&config) {
        Err(QkdError::ExcessiveErrorRate { error_rate, .. }) => {
            assert!(error_rate > 0.18 && error_rate < 0.32, "{}", error_rate);
        }
        other => panic!("eavesdropper went unnoticed: {:?}", other),
    }
}

#[test]
fn test_key_reconciliation_and_privacy_amplification() {
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let source = generate_source(2000, &mut rng);
        let bob_bits = NoisyChannel::new(0.03)
            .unwrap()
            .transmit_source(&source, &mut rng);
        let sifted = sift(
            &source.alice_bits,
            &bob_bits,
            &source.alice_bases,
            &source.bob_bases,
            MIN_SIFTED_LENGTH,
        )
        .unwrap();
        let raw_key = estimate_error_rate(
            sifted,
            TEST_FRACTION,
            MAX_ERROR_RATE,
            SamplingStrategy::Prefix,
            &mut rng,
        )
        .unwrap()
        .raw_key;

        let before = count_mismatches(&raw_key.alice, &raw_key.bob);
        let corrected = BlockParityCascade::default().reconcile(&raw_key.alice, raw_key.bob);
        let after = count_mismatches(&raw_key.alice, &corrected);
        assert!(after <= before, "seed {}: {} -> {}", seed, before, after);

        if after == 0 {
            assert_eq!(
                amplify(&raw_key.alice),
                amplify(&corrected),
                "Final keys are not identical after reconciliation and privacy amplification"
            );
        } else {
            assert_ne!(amplify(&raw_key.alice), amplify(&corrected));
        }
    }
}

#[test]
fn test_random_sampling_and_bisecting_strategy() {
    let config = SimulationConfig::new(2000, 0.0)
        .with_seed(31)
        .with_sampling(SamplingStrategy::Random)
        .with_cascade(CascadeConfig {
            strategy: CascadeStrategy::Bisecting { shuffle_seed: 31 },
            ..CascadeConfig::default()
        });
    let outcome = run(&config).unwrap();
    assert_eq!(outcome.error_rate, 0.0);
    assert_eq!(outcome.remaining_errors, 0);
}

struct CopyAlice;

impl Reconciler for CopyAlice {
    fn reconcile(&self, alice_bits: &[bool], _bob_bits: BitSequence) -> BitSequence {
        alice_bits.to_vec()
    }
}

#[test]
fn test_custom_reconciler_is_used() {
    let config = SimulationConfig::new(3000, 0.1);
    let mut rng = StdRng::seed_from_u64(8);
    let outcome = run_with_reconciler(&config, &CopyAlice, &mut rng).unwrap();
    assert_eq!(outcome.remaining_errors, 0);
}

#[test]
fn test_secret_depends_only_on_alices_key() {
    // Same stream, different reconcilers: the secret must not change.
    let config = SimulationConfig::new(3000, 0.1);
    let with_cascade = run_with_rng(&config, &mut StdRng::seed_from_u64(21)).unwrap();
    let with_copy = run_with_reconciler(&config, &CopyAlice, &mut StdRng::seed_from_u64(21)).unwrap();
    assert_eq!(with_cascade.final_secret, with_copy.final_secret);
    assert_eq!(with_cascade.error_rate, with_copy.error_rate);
}
