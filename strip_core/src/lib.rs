//! # strip_core - Strip-Theory Hull Load Engine
//!
//! `strip_core` estimates the time-varying shear force and bending moment
//! distribution along a ship's hull under a single-frequency sinusoidal sea
//! state. Hull sections are treated as independent two-dimensional strips
//! whose added-mass and damping coefficients come from tabulated reference
//! data; the coupled heave/pitch response is solved in closed form and the
//! resulting load distribution is integrated longitudinally per time sample.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: pure functions that take inputs and return results;
//!   nothing persists between runs except the read-only reference cache
//! - **JSON-First**: all inputs and outputs implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, not just strings
//! - **Fail Fast, Then Propagate**: extraction failures abort the run with
//!   diagnostics; downstream numeric degeneracies propagate as NaN/Inf for
//!   the caller to check
//!
//! ## Quick Start
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
//! let table = HullOffsetTable::parse("0\t10\n0\t5\n5\t5\n", "in.txt")?;
//! let library = ReferenceLibrary::new("data", "DAMPING");
//! let grid = TimeGrid { start_s: 0.0, end_s: 10.0, samples: 100 };
//!
//! let result = run_analysis(&params, &table, &grid, &library)?;
//! let station = result.response.nearest_station_index(50.0);
//! println!("shear at station: {:?}", result.response.shear_at_station(station));
//! # Ok::<(), strip_core::errors::StripError>(())
//! ```
//!
//! ## Modules
//!
//! - [`pipeline`] - Caller inputs and the end-to-end run
//! - [`calculations`] - Coefficient extraction, motion solve, load integration
//! - [`geometry`] - Hull offset table parsing and validation
//! - [`reference`] - Tabulated 2-D section coefficient files and cache
//! - [`integrate`] - Cumulative trapezoidal integration helper
//! - [`errors`] - Structured error types
//! - [`file_io`] - Geometry staging with atomic writes and locking

pub mod calculations;
pub mod errors;
pub mod file_io;
pub mod geometry;
pub mod integrate;
pub mod pipeline;
pub mod reference;

// Re-export commonly used types at crate root for convenience
pub use errors::{StripError, StripResult};
pub use file_io::{load_geometry, stage_geometry, StagingLock};
pub use geometry::HullOffsetTable;
pub use pipeline::{run_analysis, AnalysisResult, ShipParameters, TimeGrid};
pub use reference::{CoefficientFamily, ReferenceLibrary};
