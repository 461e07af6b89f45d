//! # Load/Response Integrator
//!
//! Combines the heave and pitch kinematics into a per-station load intensity
//! and integrates it along the hull, twice, for every time sample:
//!
//! ```text
//! z(x, t)  = z_heave(t) - x * theta(t)
//! q(x, t)  = a'(x) * z_ddot + b'(x) * z_dot + rho * g * z
//! V(x, t)  = integral of q from the aft station     (shear force)
//! M(x, t)  = integral of V from the aft station     (bending moment)
//! ```
//!
//! `a'` and `b'` are the zero-shifted per-station coefficient arrays from the
//! extractor, not the lumped whole-hull values. The pitch lever arm is the
//! raw station coordinate here, while the lumped reduction measures levers
//! from midship; the two origins intentionally differ and are flagged for
//! domain review in DESIGN.md.
//!
//! Both integrations start at zero at the first station, so shear and moment
//! vanish there by construction. Non-finite motion values propagate into the
//! matrices; callers check [`ResponseField::is_finite`] before display.

use serde::{Deserialize, Serialize};

use crate::calculations::coefficients::HullCoefficients;
use crate::calculations::motion::MotionHistory;
use crate::calculations::{GRAVITY, SEA_WATER_DENSITY};
use crate::errors::StripResult;
use crate::integrate::cumtrapz;

/// Shear-force and bending-moment distributions, indexed `[station][time]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseField {
    /// Station coordinates (m)
    pub stations_m: Vec<f64>,

    /// Time samples (s)
    pub times_s: Vec<f64>,

    /// Shear force per station per time sample (kN)
    pub shear_force: Vec<Vec<f64>>,

    /// Bending moment per station per time sample (kN m)
    pub bending_moment: Vec<Vec<f64>>,
}

impl ResponseField {
    /// Shear-force time series at one station.
    pub fn shear_at_station(&self, station_index: usize) -> &[f64] {
        &self.shear_force[station_index]
    }

    /// Shear-force profile along the hull at one time sample.
    pub fn shear_at_time(&self, time_index: usize) -> Vec<f64> {
        self.shear_force.iter().map(|row| row[time_index]).collect()
    }

    /// Bending-moment time series at one station.
    pub fn bending_at_station(&self, station_index: usize) -> &[f64] {
        &self.bending_moment[station_index]
    }

    /// Bending-moment profile along the hull at one time sample.
    pub fn bending_at_time(&self, time_index: usize) -> Vec<f64> {
        self.bending_moment
            .iter()
            .map(|row| row[time_index])
            .collect()
    }

    /// Index of the station closest to `x_m` (first match wins on ties).
    pub fn nearest_station_index(&self, x_m: f64) -> usize {
        nearest_index(&self.stations_m, x_m)
    }

    /// Index of the time sample closest to `t_s` (first match wins on ties).
    pub fn nearest_time_index(&self, t_s: f64) -> usize {
        nearest_index(&self.times_s, t_s)
    }

    /// True when every shear and moment entry is finite. A degenerate
    /// natural frequency upstream shows up here as NaN/Inf.
    pub fn is_finite(&self) -> bool {
        self.shear_force
            .iter()
            .chain(self.bending_moment.iter())
            .all(|row| row.iter().all(|v| v.is_finite()))
    }
}

fn nearest_index(values: &[f64], query: f64) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, value) in values.iter().enumerate() {
        let distance = (query - value).abs();
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best
}

/// Integrate the load distribution into shear force and bending moment for
/// every time sample.
///
/// Each time column is independent: the per-station load intensity is
/// integrated over the station coordinates into shear, and the shear profile
/// is integrated again into bending moment.
pub fn integrate_loads(
    coefficients: &HullCoefficients,
    motion: &MotionHistory,
) -> StripResult<ResponseField> {
    let stations = &coefficients.stations_m;
    let station_count = stations.len();
    let time_count = motion.times_s.len();

    let mut shear_force = vec![vec![0.0; time_count]; station_count];
    let mut bending_moment = vec![vec![0.0; time_count]; station_count];

    let mut load = vec![0.0; station_count];
    for time_index in 0..time_count {
        for (station_index, &x) in stations.iter().enumerate() {
            let z = motion.heave_m[time_index] - x * motion.pitch_rad[time_index];
            let z_dot = motion.heave_velocity[time_index] - x * motion.pitch_rate[time_index];
            let z_ddot =
                motion.heave_acceleration[time_index] - x * motion.pitch_acceleration[time_index];

            load[station_index] = coefficients.station_added_mass[station_index] * z_ddot
                + coefficients.station_damping[station_index] * z_dot
                + SEA_WATER_DENSITY * GRAVITY * z;
        }

        let shear_profile = cumtrapz(stations, &load)?;
        for (station_index, value) in shear_profile.iter().enumerate() {
            shear_force[station_index][time_index] = *value;
        }

        let moment_profile = cumtrapz(stations, &shear_profile)?;
        for (station_index, value) in moment_profile.iter().enumerate() {
            bending_moment[station_index][time_index] = *value;
        }
    }

    Ok(ResponseField {
        stations_m: stations.clone(),
        times_s: motion.times_s.clone(),
        shear_force,
        bending_moment,
    })
}
