#![deny(missing_docs)]
#![doc = "Shared leaf types for the interactive DP toolkit: structured errors, privacy-loss arithmetic, and deterministic randomness."]

pub mod errors;
pub mod loss;
pub mod rng;

pub use errors::{DpError, ErrorInfo};
pub use loss::PrivacyLoss;
pub use rng::{derive_substream_seed, SeededRng};
