//! Cumulative Trapezoidal Integration
//!
//! Shared numeric helper used for depth-wise section areas, the longitudinal
//! coefficient reduction, and the shear/bending integration passes.
//!
//! ## Contract
//!
//! For abscissas `x` and values `y` of equal length, element 0 of the result
//! is zero and element `i` adds the trapezoid over `[x[i-1], x[i]]` to
//! element `i-1`. The abscissas are not required to be monotonic; each
//! segment simply contributes `0.5 * (y[i] + y[i-1]) * (x[i] - x[i-1])`.
//!
//! ## Example
//!
//! ```rust
//! use strip_core::integrate::cumtrapz;
//!
//! let x = [0.0, 1.0, 2.0];
//! let y = [3.0, 3.0, 3.0];
//! let profile = cumtrapz(&x, &y).unwrap();
//! assert_eq!(profile, vec![0.0, 3.0, 6.0]);
//! ```

use crate::errors::{StripError, StripResult};

/// Cumulative trapezoidal integral of `y` over `x`.
///
/// # Arguments
///
/// * `x` - Abscissas (e.g., station coordinates or time samples)
/// * `y` - Integrand values at each abscissa
///
/// # Returns
///
/// * `Ok(Vec<f64>)` - Running integral, same length as the inputs, starting at 0
/// * `Err(StripError::InvalidInput)` - Input lengths differ
pub fn cumtrapz(x: &[f64], y: &[f64]) -> StripResult<Vec<f64>> {
    if x.len() != y.len() {
        return Err(StripError::invalid_input(
            "y",
            format!("{} values", y.len()),
            format!("length must match the {} abscissas", x.len()),
        ));
    }

    let mut profile = vec![0.0; y.len()];
    for i in 1..x.len() {
        let dx = x[i] - x[i - 1];
        profile[i] = profile[i - 1] + 0.5 * (y[i] + y[i - 1]) * dx;
    }
    Ok(profile)
}
