//! Error-rate estimation on a sacrificed share of the sifted key.
//!
//! The default [`SamplingStrategy::Prefix`] takes the leading share of the
//! sifted key as the test subset. Noise that is correlated with position can
//! therefore bias the estimate without touching the retained key.
//! [`SamplingStrategy::Random`] draws the subset uniformly instead.

use log::{info, warn};
use rand::seq::index;
use rand::Rng;

use crate::bb84_states::BitSequence;
use crate::error::{QkdError, Result};
use crate::sifting::SiftedKeyPair;

/// Share of the sifted key disclosed for error estimation.
pub const TEST_FRACTION: f64 = 0.3;

/// Highest tolerated test-subset error rate.
pub const MAX_ERROR_RATE: f64 = 0.15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SamplingStrategy {
    /// Leading `floor(fraction * len)` positions.
    #[default]
    Prefix,
    /// Uniform sample without replacement; the complement keeps its order.
    Random,
}

/// Key material surviving estimation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawKeyPair {
    pub alice: BitSequence,
    pub bob: BitSequence,
}

impl RawKeyPair {
    pub fn len(&self) -> usize {
        self.alice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alice.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Estimate {
    pub error_rate: f64,
    /// Number of positions that were compared and discarded.
    pub test_size: usize,
    pub raw_key: RawKeyPair,
}

/// Fraction of positions where `alice` and `bob` differ; 0.0 when empty.
pub fn mismatch_rate(alice: &[bool], bob: &[bool]) -> f64 {
    let compared = alice.len().min(bob.len());
    if compared == 0 {
        return 0.0;
    }
    let mismatches = alice.iter().zip(bob).filter(|(a, b)| a != b).count();
    mismatches as f64 / compared as f64
}

pub fn test_subset_size(sifted_length: usize, fraction: f64) -> usize {
    (sifted_length as f64 * fraction) as usize
}

/// Splits off the test subset, measures it, and aborts above `threshold`.
///
/// Only [`SamplingStrategy::Random`] draws from `rng`.
pub fn estimate_error_rate<R: Rng + ?Sized>(
    sifted: SiftedKeyPair,
    fraction: f64,
    threshold: f64,
    sampling: SamplingStrategy,
    rng: &mut R,
) -> Result<Estimate> {
    let test_size = test_subset_size(sifted.len(), fraction);
    let (alice, bob) = sifted.into_parts();

    let (error_rate, raw_key) = match sampling {
        SamplingStrategy::Prefix => {
            let error_rate = mismatch_rate(&alice[..test_size], &bob[..test_size]);
            let raw_key = RawKeyPair {
                alice: alice[test_size..].to_vec(),
                bob: bob[test_size..].to_vec(),
            };
            (error_rate, raw_key)
        }
        SamplingStrategy::Random => {
            let mut in_test = vec![false; alice.len()];
            for i in index::sample(rng, alice.len(), test_size) {
                in_test[i] = true;
            }
            let mut test_alice = Vec::with_capacity(test_size);
            let mut test_bob = Vec::with_capacity(test_size);
            let mut raw_key = RawKeyPair {
                alice: Vec::with_capacity(alice.len() - test_size),
                bob: Vec::with_capacity(alice.len() - test_size),
            };
            for ((&a, &b), &tested) in alice.iter().zip(&bob).zip(&in_test) {
                if tested {
                    test_alice.push(a);
                    test_bob.push(b);
                } else {
                    raw_key.alice.push(a);
                    raw_key.bob.push(b);
                }
            }
            (mismatch_rate(&test_alice, &test_bob), raw_key)
        }
    };

    if test_size == 0 {
        warn!("empty test subset, error rate reported as 0");
    }
    info!("Initial error rate: {:.2}%", error_rate * 100.0);

    if error_rate > threshold {
        warn!(
            "aborting: error rate {:.4} above threshold {}",
            error_rate, threshold
        );
        return Err(QkdError::ExcessiveErrorRate {
            error_rate,
            threshold,
        });
    }

    Ok(Estimate {
        error_rate,
        test_size,
        raw_key,
    })
}
