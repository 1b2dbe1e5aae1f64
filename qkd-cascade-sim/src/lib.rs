//! # qkd-cascade-sim
//!
//! BB84 key distribution over a noisy channel, simulated classically from
//! raw bits to a shared 256-bit secret.
//!
//! ## Pipeline
//!
//! - **source**: Alice's random bits, Alice's and Bob's random bases
//! - **channel**: bit flips on matching bases, coin flips otherwise
//! - **sifting**: keep the positions where the bases agree
//! - **estimation**: sacrifice 30% to measure the error rate, abort above 15%
//! - **error_correction**: cascade block-parity reconciliation
//! - **privacy_amplification**: SHA-256 over the packed key
//!
//! ## Usage
//!
//! ```no_run
//! use qkd_cascade_sim::prelude::*;
//!
//! let config = SimulationConfig::new(1000, 0.05).with_seed(7);
//! match run(&config) {
//!     Ok(outcome) => println!("secret: {}", outcome.final_secret),
//!     Err(e) => println!("Key exchange failed: {}", e),
//! }
//! ```

pub mod bb84_states;
pub mod channel;
pub mod error;
pub mod error_correction;
pub mod estimation;
pub mod privacy_amplification;
pub mod sifting;
pub mod simulation;
pub mod source;

#[cfg(test)]
mod tests;

pub use error::{QkdError, Result};
pub use simulation::{run_simulation, SimulationConfig, SimulationOutcome};

pub mod prelude {
    pub use crate::bb84_states::*;
    pub use crate::channel::*;
    pub use crate::error::*;
    pub use crate::error_correction::*;
    pub use crate::estimation::*;
    pub use crate::privacy_amplification::*;
    pub use crate::sifting::*;
    pub use crate::simulation::*;
    pub use crate::source::*;
}
