//! # Frequency-Response Solver
//!
//! Closed-form heave/pitch forced response of the hull treated as two
//! uncoupled single-degree-of-freedom oscillators.
//!
//! ## Formulas
//!
//! ```text
//! omega_z     = sqrt(rho * g * Awl / (M + a33))
//! omega_theta = sqrt(rho * g * M * B_ML / (a55 + I55))
//! r           = omega / omega_n
//! zeta        = b / (2 * inertia * omega_n)
//! G           = 1 / sqrt((1 - r^2)^2 + (2 zeta r)^2)
//! phi         = atan2(2 zeta r, 1 - r^2)
//! x(t)        = (G / c) * cos(omega_n t - phi)
//! ```
//!
//! Velocity and acceleration are the analytic derivatives of the cosine, not
//! finite differences. The stored excitation frequency enters the response
//! ratio as-is; the oscillation itself runs at the natural frequency.
//!
//! The solver is deterministic and stateless. It does not guard against a
//! zero natural frequency or zero stiffness: those degeneracies propagate as
//! NaN/Inf and the caller checks the final field for finiteness.

use serde::{Deserialize, Serialize};

use crate::calculations::coefficients::LumpedCoefficients;
use crate::calculations::{GRAVITY, SEA_WATER_DENSITY};

/// Heave and pitch kinematics over the time grid, plus the response scalars
/// they were built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MotionHistory {
    /// Time samples (s)
    pub times_s: Vec<f64>,

    /// Heave displacement (m)
    pub heave_m: Vec<f64>,

    /// Heave velocity (m/s)
    pub heave_velocity: Vec<f64>,

    /// Heave acceleration (m/s^2)
    pub heave_acceleration: Vec<f64>,

    /// Pitch angle (rad)
    pub pitch_rad: Vec<f64>,

    /// Pitch rate (rad/s)
    pub pitch_rate: Vec<f64>,

    /// Pitch angular acceleration (rad/s^2)
    pub pitch_acceleration: Vec<f64>,

    /// Heave natural frequency omega_z (rad/s)
    pub heave_natural_frequency: f64,

    /// Pitch natural frequency omega_theta (rad/s)
    pub pitch_natural_frequency: f64,

    /// Heave magnification factor
    pub heave_magnification: f64,

    /// Heave phase lag (rad)
    pub heave_phase_rad: f64,

    /// Pitch magnification factor
    pub pitch_magnification: f64,

    /// Pitch phase lag (rad)
    pub pitch_phase_rad: f64,
}

/// Magnification and phase of a single-degree-of-freedom forced response.
fn forced_response(excitation: f64, natural: f64, damping: f64, inertia: f64) -> (f64, f64) {
    let r = excitation / natural;
    let zeta = damping / (2.0 * inertia * natural);
    let magnification =
        1.0 / ((1.0 - r * r).powi(2) + (2.0 * zeta * r).powi(2)).sqrt();
    let phase = (2.0 * zeta * r).atan2(1.0 - r * r);
    (magnification, phase)
}

/// Solve the heave/pitch response over `times`.
///
/// # Arguments
///
/// * `lumped` - Reduced whole-hull coefficients
/// * `displacement_t` - Ship displacement M (t)
/// * `metacentric_radius_m` - Longitudinal metacentric radius B_ML (m)
/// * `times` - Time grid (s); any spacing, any length
pub fn solve(
    lumped: &LumpedCoefficients,
    displacement_t: f64,
    metacentric_radius_m: f64,
    times: &[f64],
) -> MotionHistory {
    let heave_natural_frequency = (SEA_WATER_DENSITY * GRAVITY * lumped.waterplane_area_m2
        / (displacement_t + lumped.heave_added_mass))
        .sqrt();
    let pitch_natural_frequency = (SEA_WATER_DENSITY
        * GRAVITY
        * displacement_t
        * metacentric_radius_m
        / (lumped.pitch_added_inertia + lumped.pitch_mass_inertia))
        .sqrt();

    let (heave_magnification, heave_phase_rad) = forced_response(
        lumped.wave_frequency,
        heave_natural_frequency,
        lumped.heave_damping,
        displacement_t,
    );
    let (pitch_magnification, pitch_phase_rad) = forced_response(
        lumped.wave_frequency,
        pitch_natural_frequency,
        lumped.pitch_damping,
        lumped.pitch_mass_inertia,
    );

    let heave_amplitude = heave_magnification / lumped.heave_stiffness;
    let pitch_amplitude = pitch_magnification / lumped.pitch_stiffness;

    let count = times.len();
    let mut heave_m = Vec::with_capacity(count);
    let mut heave_velocity = Vec::with_capacity(count);
    let mut heave_acceleration = Vec::with_capacity(count);
    let mut pitch_rad = Vec::with_capacity(count);
    let mut pitch_rate = Vec::with_capacity(count);
    let mut pitch_acceleration = Vec::with_capacity(count);

    for &t in times {
        let heave_arg = heave_natural_frequency * t - heave_phase_rad;
        heave_m.push(heave_amplitude * heave_arg.cos());
        heave_velocity.push(-heave_natural_frequency * heave_amplitude * heave_arg.sin());
        heave_acceleration.push(
            -heave_natural_frequency * heave_natural_frequency
                * heave_amplitude
                * heave_arg.cos(),
        );

        let pitch_arg = pitch_natural_frequency * t - pitch_phase_rad;
        pitch_rad.push(pitch_amplitude * pitch_arg.cos());
        pitch_rate.push(-pitch_natural_frequency * pitch_amplitude * pitch_arg.sin());
        pitch_acceleration.push(
            -pitch_natural_frequency * pitch_natural_frequency
                * pitch_amplitude
                * pitch_arg.cos(),
        );
    }

    MotionHistory {
        times_s: times.to_vec(),
        heave_m,
        heave_velocity,
        heave_acceleration,
        pitch_rad,
        pitch_rate,
        pitch_acceleration,
        heave_natural_frequency,
        pitch_natural_frequency,
        heave_magnification,
        heave_phase_rad,
        pitch_magnification,
        pitch_phase_rad,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lumped() -> LumpedCoefficients {
        LumpedCoefficients {
            heave_added_mass: 25.0,
            pitch_added_inertia: 500.0,
            heave_damping: 40.0,
            pitch_damping: 800.0,
            pitch_mass_inertia: 1500.0,
            waterplane_area_m2: 50.0,
            heave_stiffness: 50.0 * SEA_WATER_DENSITY * GRAVITY,
            pitch_stiffness: 2000.0,
            wave_frequency: 1.5,
        }
    }

    #[test]
    fn test_natural_frequencies() {
        let history = solve(&lumped(), 100.0, 20.0, &[0.0]);
        let expected_heave = (SEA_WATER_DENSITY * GRAVITY * 50.0 / 125.0).sqrt();
        let expected_pitch = (SEA_WATER_DENSITY * GRAVITY * 100.0 * 20.0 / 2000.0).sqrt();
        assert!((history.heave_natural_frequency - expected_heave).abs() < 1e-12);
        assert!((history.pitch_natural_frequency - expected_pitch).abs() < 1e-12);
    }

    #[test]
    fn test_static_limit_has_unit_magnification() {
        // Excitation far below the natural frequency: G -> 1, phi -> 0.
        let mut coefficients = lumped();
        coefficients.wave_frequency = 1e-6;
        let history = solve(&coefficients, 100.0, 20.0, &[0.0]);
        assert!((history.heave_magnification - 1.0).abs() < 1e-6);
        assert!(history.heave_phase_rad.abs() < 1e-3);
    }

    #[test]
    fn test_displacement_bounded_by_amplitude() {
        let coefficients = lumped();
        let times: Vec<f64> = (0..200).map(|i| i as f64 * 0.05).collect();
        let history = solve(&coefficients, 100.0, 20.0, &times);
        let amplitude = history.heave_magnification / coefficients.heave_stiffness;
        for z in &history.heave_m {
            assert!(z.abs() <= amplitude + 1e-12);
        }
    }

    #[test]
    fn test_velocity_matches_numeric_derivative() {
        let dt = 1e-4;
        let t = 0.7;
        let history = solve(&lumped(), 100.0, 20.0, &[t - dt, t, t + dt]);
        let numeric = (history.heave_m[2] - history.heave_m[0]) / (2.0 * dt);
        assert!((history.heave_velocity[1] - numeric).abs() < 1e-6);

        let numeric_pitch = (history.pitch_rad[2] - history.pitch_rad[0]) / (2.0 * dt);
        assert!((history.pitch_rate[1] - numeric_pitch).abs() < 1e-6);
    }

    #[test]
    fn test_acceleration_is_negative_omega_sq_times_displacement() {
        let history = solve(&lumped(), 100.0, 20.0, &[0.0, 0.3, 1.1]);
        let w = history.heave_natural_frequency;
        for (z, ddz) in history.heave_m.iter().zip(&history.heave_acceleration) {
            assert!((ddz + w * w * z).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_waterplane_propagates_non_finite() {
        let mut coefficients = lumped();
        coefficients.waterplane_area_m2 = 0.0;
        coefficients.heave_stiffness = 0.0;
        let history = solve(&coefficients, 100.0, 20.0, &[0.0, 1.0]);
        // Degeneracy propagates instead of panicking.
        assert!(history.heave_m.iter().any(|z| !z.is_finite()));
    }
}
