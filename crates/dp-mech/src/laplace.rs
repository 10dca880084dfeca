//! Laplace noise over scalar data.

use std::cell::RefCell;

use dp_core::{DpError, ErrorInfo, PrivacyLoss, SeededRng};
use dp_interactive::Measurement;

/// Draws one Laplace(0, `scale`) variate by inverse transform from a
/// centered uniform.
pub fn sample_laplace(rng: &mut SeededRng, scale: f64) -> f64 {
    let u = rng.centered_uniform();
    -scale * u.signum() * (1.0 - 2.0 * u.abs()).ln()
}

/// A measurement releasing its scalar input plus Laplace(0, `scale`) noise,
/// at a declared privacy loss of `1 / scale` (unit sensitivity).
///
/// Noise is drawn from a dedicated stream seeded with `seed`; repeated
/// invocations advance the stream, and two measurements built from the same
/// seed release identical noise sequences.
pub fn make_laplace(scale: f64, seed: u64) -> Result<Measurement<f64>, DpError> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(DpError::Mechanism(
            ErrorInfo::new("laplace-scale", "scale must be finite and positive")
                .with_context("scale", scale.to_string()),
        ));
    }
    let privacy_loss = PrivacyLoss::new(1.0 / scale)?;
    let rng = RefCell::new(SeededRng::from_seed(seed));
    Ok(Measurement::new(privacy_loss, move |data: &f64| {
        Ok(data + sample_laplace(&mut rng.borrow_mut(), scale))
    }))
}

/// [`make_laplace`] parameterized by the target privacy loss instead of the
/// noise scale.
pub fn make_epsilon_laplace(epsilon: f64, seed: u64) -> Result<Measurement<f64>, DpError> {
    if !epsilon.is_finite() || epsilon <= 0.0 {
        return Err(DpError::Mechanism(
            ErrorInfo::new("laplace-epsilon", "epsilon must be finite and positive")
                .with_context("epsilon", epsilon.to_string()),
        ));
    }
    make_laplace(1.0 / epsilon, seed)
}
