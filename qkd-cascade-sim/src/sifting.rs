//! Public basis comparison.

use log::{debug, warn};

use crate::bb84_states::{BitSequence, MeasurementBasis};
use crate::error::{QkdError, Result};

/// Below this many sifted bits, estimation and reconciliation are noise.
pub const MIN_SIFTED_LENGTH: usize = 20;

/// Alice's and Bob's bits restricted to the positions where their bases agree.
///
/// Both halves always have the same length and position `i` of one
/// corresponds to position `i` of the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiftedKeyPair {
    alice: BitSequence,
    bob: BitSequence,
}

impl SiftedKeyPair {
    pub fn alice(&self) -> &[bool] {
        &self.alice
    }

    pub fn bob(&self) -> &[bool] {
        &self.bob
    }

    pub fn len(&self) -> usize {
        self.alice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alice.is_empty()
    }

    pub fn into_parts(self) -> (BitSequence, BitSequence) {
        (self.alice, self.bob)
    }
}

/// Positions where both parties chose the same basis, in ascending order.
pub fn matching_indices(alice_bases: &[MeasurementBasis], bob_bases: &[MeasurementBasis]) -> Vec<usize> {
    alice_bases
        .iter()
        .zip(bob_bases)
        .enumerate()
        .filter_map(|(i, (a, b))| (a == b).then_some(i))
        .collect()
}

/// Projects both bit sequences onto `indices`.
pub fn project(alice_bits: &[bool], bob_bits: &[bool], indices: &[usize]) -> SiftedKeyPair {
    SiftedKeyPair {
        alice: indices.iter().map(|&i| alice_bits[i]).collect(),
        bob: indices.iter().map(|&i| bob_bits[i]).collect(),
    }
}

/// Sifts the raw exchange, refusing keys shorter than `min_length`.
pub fn sift(
    alice_bits: &[bool],
    bob_bits: &[bool],
    alice_bases: &[MeasurementBasis],
    bob_bases: &[MeasurementBasis],
    min_length: usize,
) -> Result<SiftedKeyPair> {
    let indices = matching_indices(alice_bases, bob_bases);
    debug!(
        "sifting kept {} of {} positions",
        indices.len(),
        alice_bases.len()
    );

    if indices.len() < min_length {
        warn!(
            "aborting: {} sifted bits, need at least {}",
            indices.len(),
            min_length
        );
        return Err(QkdError::InsufficientKeyMaterial {
            sifted_length: indices.len(),
            minimum: min_length,
        });
    }

    Ok(project(alice_bits, bob_bits, &indices))
}
