//! # Analysis Pipeline
//!
//! Caller-facing input types and the end-to-end run: offset table ->
//! extractor -> motion solver -> load integrator. Each stage depends only on
//! the previous one; an extraction failure aborts the run before any motion
//! or load work happens, and the caller gets the structured error instead of
//! partial results.
//!
//! ## Example
//!
//! ```rust,no_run
//! use strip_core::geometry::HullOffsetTable;
//! use strip_core::pipeline::{run_analysis, ShipParameters, TimeGrid};
//! use strip_core::reference::ReferenceLibrary;
//!
//! let params = ShipParameters {
//!     wave_length_ratio: 1.2,
//!     length_m: 179.5,
//!     draft_m: 10.0,
//!     displacement_t: 42650.0,
//!     metacentric_radius_m: 228.34,
//! };
//! let grid = TimeGrid { start_s: 0.0, end_s: 10.0, samples: 100 };
//! let table = HullOffsetTable::parse("0\t10\n0\t5\n5\t5\n", "in.txt")?;
//! let library = ReferenceLibrary::new("data", "DAMPING");
//!
//! let result = run_analysis(&params, &table, &grid, &library)?;
//! println!("peak shear {:.1} kN", result.peak_shear());
//! # Ok::<(), strip_core::errors::StripError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::coefficients::{self, HullCoefficients};
use crate::calculations::loads::{self, ResponseField};
use crate::calculations::motion::{self, MotionHistory};
use crate::errors::{StripError, StripResult};
use crate::geometry::HullOffsetTable;
use crate::reference::ReferenceLibrary;

/// Principal dimensions and excitation for one run. Immutable input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipParameters {
    /// Wave length to ship length ratio lambda/L
    pub wave_length_ratio: f64,

    /// Length between perpendiculars (m)
    pub length_m: f64,

    /// Design draft (m)
    pub draft_m: f64,

    /// Displacement (t)
    pub displacement_t: f64,

    /// Longitudinal metacentric radius B_ML (m)
    pub metacentric_radius_m: f64,
}

impl ShipParameters {
    /// Validate input parameters.
    pub fn validate(&self) -> StripResult<()> {
        let checks = [
            ("wave_length_ratio", self.wave_length_ratio),
            ("length_m", self.length_m),
            ("draft_m", self.draft_m),
            ("displacement_t", self.displacement_t),
            ("metacentric_radius_m", self.metacentric_radius_m),
        ];
        for (field, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(StripError::invalid_input(
                    field,
                    value.to_string(),
                    "must be finite and positive",
                ));
            }
        }
        Ok(())
    }
}

/// Uniform time grid specification: both endpoints included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeGrid {
    /// First sample (s)
    pub start_s: f64,

    /// Last sample (s)
    pub end_s: f64,

    /// Number of samples, at least 2
    pub samples: usize,
}

impl TimeGrid {
    /// Validate the grid specification.
    pub fn validate(&self) -> StripResult<()> {
        if self.samples < 2 {
            return Err(StripError::invalid_input(
                "samples",
                self.samples.to_string(),
                "need at least 2 time samples",
            ));
        }
        if !(self.end_s > self.start_s) {
            return Err(StripError::invalid_input(
                "end_s",
                self.end_s.to_string(),
                format!("must be greater than start_s ({})", self.start_s),
            ));
        }
        Ok(())
    }

    /// Evenly spaced samples from `start_s` to `end_s` inclusive.
    pub fn sample_times(&self) -> Vec<f64> {
        let step = (self.end_s - self.start_s) / (self.samples - 1) as f64;
        (0..self.samples)
            .map(|i| self.start_s + step * i as f64)
            .collect()
    }
}

/// Everything one run produces, serializable as a report for the
/// presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResult {
    /// Per-section data and lumped coefficients
    pub coefficients: HullCoefficients,

    /// Heave/pitch kinematics over the time grid
    pub motion: MotionHistory,

    /// Shear-force and bending-moment matrices
    pub response: ResponseField,
}

impl AnalysisResult {
    /// Largest absolute shear force in the field (kN).
    pub fn peak_shear(&self) -> f64 {
        peak(&self.response.shear_force)
    }

    /// Largest absolute bending moment in the field (kN m).
    pub fn peak_bending(&self) -> f64 {
        peak(&self.response.bending_moment)
    }
}

fn peak(matrix: &[Vec<f64>]) -> f64 {
    matrix
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()))
}

/// Run the full pipeline for one set of inputs.
///
/// # Returns
///
/// * `Ok(AnalysisResult)` - Coefficients, motion, and response matrices
/// * `Err(StripError)` - Bad parameters/grid, or extraction failure; no
///   partial results are produced
pub fn run_analysis(
    params: &ShipParameters,
    table: &HullOffsetTable,
    grid: &TimeGrid,
    library: &ReferenceLibrary,
) -> StripResult<AnalysisResult> {
    params.validate()?;
    grid.validate()?;

    let coefficients = coefficients::extract(table, params, library)?;
    let times = grid.sample_times();
    let motion = motion::solve(
        &coefficients.lumped,
        params.displacement_t,
        params.metacentric_radius_m,
        &times,
    );
    let response = loads::integrate_loads(&coefficients, &motion)?;

    log::info!(
        "run complete: {} stations x {} time samples, peak shear {:.3}, peak moment {:.3}",
        response.stations_m.len(),
        response.times_s.len(),
        peak(&response.shear_force),
        peak(&response.bending_moment)
    );

    Ok(AnalysisResult {
        coefficients,
        motion,
        response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::fs;
    use std::path::PathBuf;

    fn spec_params() -> ShipParameters {
        ShipParameters {
            wave_length_ratio: 1.2,
            length_m: 20.0,
            draft_m: 5.0,
            displacement_t: 100.0,
            metacentric_radius_m: 20.0,
        }
    }

    fn pair4_row(frequency: f64, coefficient: f64) -> String {
        format!("0\t0\t0\t0\t0\t0\t0\t0\t{frequency}\t{coefficient}")
    }

    fn reference_dirs(name: &str) -> (PathBuf, PathBuf) {
        let root = temp_dir().join(format!("strip_pipe_{}_{}", name, std::process::id()));
        let added = root.join("added_mass");
        let damping = root.join("damping");
        fs::create_dir_all(&added).unwrap();
        fs::create_dir_all(&damping).unwrap();
        fs::write(
            added.join("10.txt"),
            format!("{}\n{}\n", pair4_row(0.5, 0.9), pair4_row(1.5, 0.7)),
        )
        .unwrap();
        fs::write(
            damping.join("10.txt"),
            format!("{}\n{}\n", pair4_row(0.5, 0.2), pair4_row(1.5, 0.4)),
        )
        .unwrap();
        (added, damping)
    }

    fn cleanup(dir: &PathBuf) {
        if let Some(root) = dir.parent() {
            let _ = fs::remove_dir_all(root);
        }
    }

    #[test]
    fn test_sample_times_inclusive_endpoints() {
        let grid = TimeGrid {
            start_s: 0.0,
            end_s: 2.0,
            samples: 3,
        };
        assert_eq!(grid.sample_times(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_grid_validation() {
        let grid = TimeGrid {
            start_s: 0.0,
            end_s: 10.0,
            samples: 1,
        };
        assert!(grid.validate().is_err());
        let grid = TimeGrid {
            start_s: 5.0,
            end_s: 5.0,
            samples: 10,
        };
        assert!(grid.validate().is_err());
    }

    #[test]
    fn test_parameter_validation() {
        let mut params = spec_params();
        assert!(params.validate().is_ok());
        params.draft_m = 0.0;
        assert!(params.validate().is_err());
        params.draft_m = f64::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_two_station_end_to_end() {
        let (added, damping) = reference_dirs("e2e");
        let library = ReferenceLibrary::new(&added, &damping);

        // Uniform rectangular half-breadth 5 m at stations 0 and 10 m.
        let table = HullOffsetTable::parse("0\t10\n0\t5\n5\t5\n", "in.txt").unwrap();
        let grid = TimeGrid {
            start_s: 0.0,
            end_s: 2.0,
            samples: 3,
        };

        let result = run_analysis(&spec_params(), &table, &grid, &library).unwrap();

        // 2 stations x 3 time samples, finite everywhere
        assert_eq!(result.response.shear_force.len(), 2);
        assert_eq!(result.response.shear_force[0].len(), 3);
        assert_eq!(result.response.bending_moment.len(), 2);
        assert_eq!(result.response.bending_moment[1].len(), 3);
        assert!(result.response.is_finite());

        // Cumulative integration pins the first station to zero at all times
        for time_index in 0..3 {
            assert_eq!(result.response.shear_force[0][time_index], 0.0);
            assert_eq!(result.response.bending_moment[0][time_index], 0.0);
        }

        cleanup(&added);
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let (added, damping) = reference_dirs("idem");
        let library = ReferenceLibrary::new(&added, &damping);
        let table = HullOffsetTable::parse("0\t10\n0\t5\n5\t5\n", "in.txt").unwrap();
        let grid = TimeGrid {
            start_s: 0.0,
            end_s: 2.0,
            samples: 3,
        };

        let first = run_analysis(&spec_params(), &table, &grid, &library).unwrap();
        let second = run_analysis(&spec_params(), &table, &grid, &library).unwrap();
        // Bit-identical outputs: no hidden randomness or wall-clock input
        assert_eq!(first, second);

        cleanup(&added);
    }

    #[test]
    fn test_extraction_failure_stops_the_run() {
        let root = temp_dir().join(format!("strip_pipe_empty_{}", std::process::id()));
        let added = root.join("added_mass");
        let damping = root.join("damping");
        fs::create_dir_all(&added).unwrap();
        fs::create_dir_all(&damping).unwrap();

        let library = ReferenceLibrary::new(&added, &damping);
        let table = HullOffsetTable::parse("0\t10\n0\t5\n5\t5\n", "in.txt").unwrap();
        let grid = TimeGrid {
            start_s: 0.0,
            end_s: 2.0,
            samples: 3,
        };

        let err = run_analysis(&spec_params(), &table, &grid, &library).unwrap_err();
        assert!(matches!(err, StripError::LookupMiss { .. }));

        let _ = fs::remove_dir_all(root);
    }
}
