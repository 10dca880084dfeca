#![deny(missing_docs)]
#![doc = "Seeded noise mechanisms packaged as one-shot measurements."]

mod laplace;

pub use laplace::{make_epsilon_laplace, make_laplace, sample_laplace};
