//! Cascade-style reconciliation of Bob's raw key against Alice's.
//!
//! Reconciliation is pluggable through [`Reconciler`]. Two strategies ship:
//!
//! - [`BlockParityCascade`] compares the parity of contiguous blocks, repairs
//!   the first differing bit of every odd block, and doubles the block size
//!   after each pass. It repairs at most one bit per block per pass and never
//!   sees a block holding an even number of errors.
//! - [`BisectingCascade`] locates the error inside an odd block by parity
//!   bisection and shuffles positions between passes, so error pairs hidden
//!   in one block are split apart later on.

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::bb84_states::BitSequence;

pub const INITIAL_BLOCK_SIZE: usize = 4;
pub const CASCADE_PASSES: usize = 4;

/// Corrects Bob's key using Alice's as the authority.
pub trait Reconciler {
    fn reconcile(&self, alice_bits: &[bool], bob_bits: BitSequence) -> BitSequence;
}

impl<T: Reconciler + ?Sized> Reconciler for &T {
    fn reconcile(&self, alice_bits: &[bool], bob_bits: BitSequence) -> BitSequence {
        (**self).reconcile(alice_bits, bob_bits)
    }
}

impl<T: Reconciler + ?Sized> Reconciler for Box<T> {
    fn reconcile(&self, alice_bits: &[bool], bob_bits: BitSequence) -> BitSequence {
        (**self).reconcile(alice_bits, bob_bits)
    }
}

/// Odd parity of `bits`.
pub fn parity(bits: &[bool]) -> bool {
    bits.iter().filter(|&&bit| bit).count() % 2 == 1
}

pub fn count_mismatches(alice_bits: &[bool], bob_bits: &[bool]) -> usize {
    alice_bits
        .iter()
        .zip(bob_bits)
        .filter(|(a, b)| a != b)
        .count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockParityCascade {
    pub initial_block_size: usize,
    pub passes: usize,
}

impl Default for BlockParityCascade {
    fn default() -> Self {
        Self {
            initial_block_size: INITIAL_BLOCK_SIZE,
            passes: CASCADE_PASSES,
        }
    }
}

impl BlockParityCascade {
    pub fn new(initial_block_size: usize, passes: usize) -> Self {
        Self {
            initial_block_size,
            passes,
        }
    }
}

/// One block-parity pass over contiguous blocks. Returns the number of
/// corrected bits.
pub fn cascade_pass(alice_bits: &[bool], bob_bits: &mut [bool], block_size: usize) -> usize {
    let len = alice_bits.len().min(bob_bits.len());
    let mut corrections = 0;

    for start in (0..len).step_by(block_size.max(1)) {
        let end = std::cmp::min(start + block_size, len);
        let alice_block = &alice_bits[start..end];
        let bob_block = &mut bob_bits[start..end];

        if parity(alice_block) != parity(bob_block) {
            if let Some(offset) = first_mismatch(alice_block, bob_block) {
                bob_block[offset] = alice_block[offset];
                corrections += 1;
            }
        }
    }

    corrections
}

fn first_mismatch(alice_block: &[bool], bob_block: &[bool]) -> Option<usize> {
    alice_block
        .iter()
        .zip(bob_block.iter())
        .position(|(a, b)| a != b)
}

impl Reconciler for BlockParityCascade {
    fn reconcile(&self, alice_bits: &[bool], mut bob_bits: BitSequence) -> BitSequence {
        debug_assert_eq!(alice_bits.len(), bob_bits.len());
        let mut block_size = self.initial_block_size;

        for pass in 0..self.passes {
            let corrections = cascade_pass(alice_bits, &mut bob_bits, block_size);
            debug!(
                "cascade pass {} (block size {}): {} corrections",
                pass, block_size, corrections
            );
            block_size = block_size.saturating_mul(2);
        }

        bob_bits
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BisectingCascade {
    pub initial_block_size: usize,
    pub passes: usize,
    /// Seeds the position shuffle of every pass after the first.
    pub shuffle_seed: u64,
}

impl Default for BisectingCascade {
    fn default() -> Self {
        Self {
            initial_block_size: INITIAL_BLOCK_SIZE,
            passes: CASCADE_PASSES,
            shuffle_seed: 0,
        }
    }
}

impl BisectingCascade {
    pub fn new(initial_block_size: usize, passes: usize, shuffle_seed: u64) -> Self {
        Self {
            initial_block_size,
            passes,
            shuffle_seed,
        }
    }

    fn pass_order(&self, pass: usize, len: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        if pass > 0 {
            let mut rng = StdRng::seed_from_u64(self.shuffle_seed.wrapping_add(pass as u64));
            order.shuffle(&mut rng);
        }
        order
    }
}

fn parity_at(bits: &[bool], positions: &[usize]) -> bool {
    positions.iter().filter(|&&i| bits[i]).count() % 2 == 1
}

/// Narrows an odd-parity block down to a single differing position.
fn bisect(alice_bits: &[bool], bob_bits: &[bool], mut positions: &[usize]) -> usize {
    while positions.len() > 1 {
        let (left, right) = positions.split_at(positions.len() / 2);
        positions = if parity_at(alice_bits, left) != parity_at(bob_bits, left) {
            left
        } else {
            right
        };
    }
    positions[0]
}

impl Reconciler for BisectingCascade {
    fn reconcile(&self, alice_bits: &[bool], mut bob_bits: BitSequence) -> BitSequence {
        debug_assert_eq!(alice_bits.len(), bob_bits.len());
        let len = alice_bits.len().min(bob_bits.len());
        let mut block_size = self.initial_block_size.max(1);

        for pass in 0..self.passes {
            let order = self.pass_order(pass, len);
            let mut corrections = 0;

            for block in order.chunks(block_size) {
                if parity_at(alice_bits, block) != parity_at(&bob_bits, block) {
                    let position = bisect(alice_bits, &bob_bits, block);
                    bob_bits[position] = alice_bits[position];
                    corrections += 1;
                }
            }

            debug!(
                "bisecting pass {} (block size {}): {} corrections",
                pass, block_size, corrections
            );
            block_size = block_size.saturating_mul(2);
        }

        bob_bits
    }
}
