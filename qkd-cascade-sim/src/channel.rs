//! Noisy quantum channel between Alice and Bob.
//!
//! No photons are modelled. A qubit in flight is reduced to the pair
//! (encoded bit, encoding basis):
//!
//! - measured in the encoding basis, the bit survives but is flipped with the
//!   channel's noise probability;
//! - measured in the other basis, the outcome is a fair coin, independent of
//!   the encoded bit.
//!
//! An optional intercept-resend eavesdropper measures a fraction of the
//! traffic in a random basis and resends what she saw in that basis.

use log::debug;
use rand::Rng;

use crate::bb84_states::{BitSequence, MeasurementBasis};
use crate::error::{QkdError, Result};
use crate::source::SourceMaterial;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoisyChannel {
    noise_level: f64,
    intercept_rate: f64,
}

impl NoisyChannel {
    pub fn new(noise_level: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&noise_level) {
            return Err(QkdError::InvalidNoiseLevel(noise_level));
        }
        Ok(Self {
            noise_level,
            intercept_rate: 0.0,
        })
    }

    /// Routes `rate` of the traffic through an intercept-resend eavesdropper.
    pub fn with_interception(mut self, rate: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(QkdError::InvalidParameter {
                name: "intercept_rate",
                reason: format!("{} is not a probability", rate),
            });
        }
        self.intercept_rate = rate;
        Ok(self)
    }

    pub fn noise_level(&self) -> f64 {
        self.noise_level
    }

    pub fn intercept_rate(&self) -> f64 {
        self.intercept_rate
    }

    /// Produces Bob's observed bit for every position, in index order.
    ///
    /// Per position the stream is consumed as: interception trial (only when
    /// the intercept rate is non-zero), the eavesdropper's basis and outcome,
    /// then either the noise trial or Bob's coin.
    pub fn transmit<R: Rng + ?Sized>(
        &self,
        alice_bits: &[bool],
        alice_bases: &[MeasurementBasis],
        bob_bases: &[MeasurementBasis],
        rng: &mut R,
    ) -> BitSequence {
        let mut intercepted = 0usize;
        let bob_bits: BitSequence = alice_bits
            .iter()
            .zip(alice_bases)
            .zip(bob_bases)
            .map(|((&bit, &basis), &bob_basis)| {
                let (bit, basis) = if self.intercept_rate > 0.0
                    && rng.gen::<f64>() < self.intercept_rate
                {
                    intercepted += 1;
                    let eve_basis = MeasurementBasis::random(rng);
                    (measure(bit, basis, eve_basis, rng), eve_basis)
                } else {
                    (bit, basis)
                };

                if basis == bob_basis {
                    if rng.gen::<f64>() < self.noise_level {
                        !bit
                    } else {
                        bit
                    }
                } else {
                    rng.gen()
                }
            })
            .collect();

        debug!(
            "channel delivered {} qubits ({} intercepted)",
            bob_bits.len(),
            intercepted
        );
        bob_bits
    }

    pub fn transmit_source<R: Rng + ?Sized>(
        &self,
        source: &SourceMaterial,
        rng: &mut R,
    ) -> BitSequence {
        self.transmit(
            &source.alice_bits,
            &source.alice_bases,
            &source.bob_bases,
            rng,
        )
    }
}

/// Noise-free measurement of a qubit prepared as `bit` in `prepared`.
fn measure<R: Rng + ?Sized>(
    bit: bool,
    prepared: MeasurementBasis,
    basis: MeasurementBasis,
    rng: &mut R,
) -> bool {
    if prepared == basis {
        bit
    } else {
        rng.gen()
    }
}
