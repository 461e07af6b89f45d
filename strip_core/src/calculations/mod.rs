//! # Hydrodynamic Calculations
//!
//! The numerical stages of the pipeline, each following the pattern:
//!
//! - plain-`f64` input references (table, parameters, coefficients)
//! - a pure function producing a serializable result struct
//! - no hidden state between runs
//!
//! ## Stages
//!
//! - [`coefficients`] - Per-section derivation and longitudinal reduction to
//!   lumped heave/pitch coefficients
//! - [`motion`] - Closed-form heave/pitch forced response over a time grid
//! - [`loads`] - Longitudinal integration of the load distribution into
//!   shear force and bending moment matrices

pub mod coefficients;
pub mod loads;
pub mod motion;

// Re-export commonly used types
pub use coefficients::{HullCoefficients, LumpedCoefficients, SectionData};
pub use loads::ResponseField;
pub use motion::MotionHistory;

/// Sea water density (t/m^3)
pub const SEA_WATER_DENSITY: f64 = 1.025;

/// Gravitational acceleration (m/s^2)
pub const GRAVITY: f64 = 9.81;
