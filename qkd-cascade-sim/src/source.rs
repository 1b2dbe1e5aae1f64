//! Alice's preparation: raw bits plus both parties' basis choices.

use rand::Rng;

use crate::bb84_states::{random_bit, BasisSequence, BitSequence, MeasurementBasis};

/// Everything drawn before the first qubit leaves Alice's lab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMaterial {
    pub alice_bits: BitSequence,
    pub alice_bases: BasisSequence,
    pub bob_bases: BasisSequence,
}

impl SourceMaterial {
    pub fn len(&self) -> usize {
        self.alice_bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alice_bits.is_empty()
    }
}

/// Draws `n` sender bits, then `n` sender bases, then `n` receiver bases.
///
/// The three sequences are consumed from `rng` in that order, so a seeded
/// stream always yields the same material.
pub fn generate_source<R: Rng + ?Sized>(n: usize, rng: &mut R) -> SourceMaterial {
    let alice_bits: BitSequence = (0..n).map(|_| random_bit(rng)).collect();
    let alice_bases: BasisSequence = (0..n).map(|_| MeasurementBasis::random(rng)).collect();
    let bob_bases: BasisSequence = (0..n).map(|_| MeasurementBasis::random(rng)).collect();

    SourceMaterial {
        alice_bits,
        alice_bases,
        bob_bases,
    }
}
