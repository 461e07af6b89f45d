//! # Hull Coefficient Extractor
//!
//! Converts the hull offset table plus ship parameters into per-section
//! interpolation inputs, then reduces them longitudinally into the lumped
//! whole-hull coefficients the motion solver needs.
//!
//! ## Per-section derivation
//!
//! For each station column the depth-wise trapezoidal rule gives the full
//! sectional area (offsets are half-breadths, so breadth = 2 x offset):
//!
//! ```text
//! area   = sum (offset[j] + offset[j-1]) * (depth[j] - depth[j-1])
//! beta   = area / (2 * b_max * draft)      rounded to 1 decimal, floor 0.5
//! b/T    = 2 * b_max / draft
//! x_freq = omega^2 * b_max / g             omega^2 = g * 2*pi / (L * lambda/L)
//! ```
//!
//! `beta * 10` names the reference file; the beam/draft ratio picks the
//! column pair; the nearest tabulated frequency parameter supplies the
//! added-mass and damping coefficients.
//!
//! ## Reduction
//!
//! Coefficients apply to the hull segment that follows their station, so the
//! per-section arrays get a leading zero before the longitudinal trapezoid.
//! Pitch terms weight each segment by the squared distance of its leading
//! station from midship, `(L/2 - x)^2`.

use serde::{Deserialize, Serialize};

use crate::calculations::{GRAVITY, SEA_WATER_DENSITY};
use crate::errors::{StripError, StripResult};
use crate::geometry::HullOffsetTable;
use crate::pipeline::ShipParameters;
use crate::reference::{ratio_pair_index, CoefficientFamily, ReferenceLibrary};

/// Floor applied to the rounded shape coefficient so very fine sections
/// still resolve to an existing reference file.
pub const MIN_SHAPE_COEFFICIENT: f64 = 0.5;

/// Derived data for one hull station, recomputed each run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionData {
    /// Longitudinal coordinate of the station (m)
    pub station_m: f64,

    /// Full sectional area below the deepest tabulated waterline (m^2)
    pub area_m2: f64,

    /// Section area / bounding rectangle, rounded to 1 decimal and clamped
    /// to [`MIN_SHAPE_COEFFICIENT`]
    pub shape_coefficient: f64,

    /// Beam to draft ratio, 2 * b_max / T
    pub beam_draft_ratio: f64,

    /// Dimensionless frequency parameter omega^2 * b_max / g
    pub frequency_parameter: f64,

    /// Interpolated sectional added-mass coefficient
    pub added_mass_coefficient: f64,

    /// Interpolated sectional damping coefficient
    pub damping_coefficient: f64,
}

/// Whole-hull coefficients from the longitudinal reduction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LumpedCoefficients {
    /// Heave added mass a33 (t)
    pub heave_added_mass: f64,

    /// Pitch added-mass moment a55 (t m^2)
    pub pitch_added_inertia: f64,

    /// Heave damping b33
    pub heave_damping: f64,

    /// Pitch damping moment b55
    pub pitch_damping: f64,

    /// Mass moment of inertia I55 about midship (t m^2)
    pub pitch_mass_inertia: f64,

    /// Waterplane area at the waterline nearest the draft (m^2)
    pub waterplane_area_m2: f64,

    /// Heave restoring stiffness c33 = rho * g * Awl
    pub heave_stiffness: f64,

    /// Pitch restoring stiffness c55 = B_ML * displacement
    pub pitch_stiffness: f64,

    /// Excitation circular frequency from the deep-water dispersion relation
    /// at wavelength lambda = (lambda/L) * L
    pub wave_frequency: f64,
}

/// Full extractor output: per-section data, the zero-shifted per-station
/// coefficient arrays used by the load integrator, and the lumped reduction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HullCoefficients {
    /// Station coordinates (m), one per offset-table column
    pub stations_m: Vec<f64>,

    /// Derived data per station column after the depth header
    pub sections: Vec<SectionData>,

    /// Added-mass coefficient aligned to stations: a leading zero, then one
    /// value per section (the coefficient governs the segment behind it)
    pub station_added_mass: Vec<f64>,

    /// Damping coefficient aligned to stations, shifted the same way
    pub station_damping: Vec<f64>,

    /// Reduced whole-hull coefficients
    pub lumped: LumpedCoefficients,
}

/// Derive section data and lumped coefficients from the offset table.
///
/// Any parse failure, missing reference file, or out-of-range lookup aborts
/// the run; the caller must not proceed to the solver on error.
///
/// # Arguments
///
/// * `table` - Validated hull offset table
/// * `params` - Principal dimensions and wave-length ratio
/// * `library` - Reference coefficient files, cached across sections
pub fn extract(
    table: &HullOffsetTable,
    params: &ShipParameters,
    library: &ReferenceLibrary,
) -> StripResult<HullCoefficients> {
    params.validate()?;

    let stations = table.stations();
    let station_count = stations.len();
    let wave_frequency =
        GRAVITY * 2.0 * std::f64::consts::PI / (params.length_m * params.wave_length_ratio);

    let mut sections = Vec::with_capacity(station_count - 1);
    for column in 1..station_count {
        let section = derive_section(table, params, library, column, wave_frequency)?;
        log::debug!(
            "station {:.2} m: area {:.3} m^2, beta {:.1}, b/T {:.3}, a' {:.4}, b' {:.4}",
            section.station_m,
            section.area_m2,
            section.shape_coefficient,
            section.beam_draft_ratio,
            section.added_mass_coefficient,
            section.damping_coefficient
        );
        sections.push(section);
    }

    // Leading zero: each coefficient governs the segment aft of its station.
    let station_added_mass: Vec<f64> = std::iter::once(0.0)
        .chain(sections.iter().map(|s| s.added_mass_coefficient))
        .collect();
    let station_damping: Vec<f64> = std::iter::once(0.0)
        .chain(sections.iter().map(|s| s.damping_coefficient))
        .collect();

    let half_length = params.length_m / 2.0;
    let mut heave_added_mass = 0.0;
    let mut pitch_added_inertia = 0.0;
    let mut heave_damping = 0.0;
    let mut pitch_damping = 0.0;
    let mut pitch_mass_inertia = 0.0;

    for idx in 0..station_count - 1 {
        let dx = stations[idx + 1] - stations[idx];
        let lever = half_length - stations[idx];
        let lever_sq = lever * lever;
        let strip_mass = sections[idx].area_m2 * SEA_WATER_DENSITY;

        let added = 0.5 * (station_added_mass[idx] + station_added_mass[idx + 1]);
        let damping = 0.5 * (station_damping[idx] + station_damping[idx + 1]);

        heave_added_mass += added * dx * strip_mass;
        pitch_added_inertia += added * dx * strip_mass * lever_sq;
        heave_damping += damping * dx * strip_mass;
        pitch_damping += damping * dx * strip_mass * lever_sq;
        pitch_mass_inertia += dx * strip_mass * lever_sq;
    }

    let waterplane_area_m2 = waterplane_area(table, params.draft_m);

    let lumped = LumpedCoefficients {
        heave_added_mass,
        pitch_added_inertia,
        heave_damping,
        pitch_damping,
        pitch_mass_inertia,
        waterplane_area_m2,
        heave_stiffness: waterplane_area_m2 * SEA_WATER_DENSITY * GRAVITY,
        pitch_stiffness: params.metacentric_radius_m * params.displacement_t,
        wave_frequency,
    };

    log::info!(
        "lumped coefficients: a33 {:.3} t, a55 {:.3} t m^2, b33 {:.4}, b55 {:.3}, I55 {:.3} t m^2, Awl {:.2} m^2",
        lumped.heave_added_mass,
        lumped.pitch_added_inertia,
        lumped.heave_damping,
        lumped.pitch_damping,
        lumped.pitch_mass_inertia,
        lumped.waterplane_area_m2
    );

    Ok(HullCoefficients {
        stations_m: stations.to_vec(),
        sections,
        station_added_mass,
        station_damping,
        lumped,
    })
}

fn derive_section(
    table: &HullOffsetTable,
    params: &ShipParameters,
    library: &ReferenceLibrary,
    column: usize,
    wave_frequency: f64,
) -> StripResult<SectionData> {
    let station_m = table.stations()[column];

    // Depth-wise trapezoid with an implicit (0, 0) starting sample; the
    // (offset + previous) * d_depth form integrates the full breadth.
    let mut area_m2 = 0.0;
    let mut previous_offset = 0.0;
    let mut previous_depth = 0.0;
    let mut half_breadth = 0.0f64;
    for row in 1..=table.depth_row_count() {
        let offset = table.offset(row, column);
        let depth = table.depth(row);
        area_m2 += (offset + previous_offset) * (depth - previous_depth);
        previous_offset = offset;
        previous_depth = depth;
        half_breadth = half_breadth.max(offset);
    }

    if half_breadth <= 0.0 {
        return Err(StripError::invalid_input(
            "offsets",
            format!("station {station_m} m"),
            "station has zero breadth at every waterline",
        ));
    }

    let raw_shape = area_m2 / (2.0 * half_breadth * params.draft_m);
    let mut shape_coefficient = (raw_shape * 10.0).round() / 10.0;
    if shape_coefficient < MIN_SHAPE_COEFFICIENT {
        log::warn!(
            "station {station_m:.2} m: shape coefficient {shape_coefficient:.1} below floor, clamped to {MIN_SHAPE_COEFFICIENT}"
        );
        shape_coefficient = MIN_SHAPE_COEFFICIENT;
    }

    let beam_draft_ratio = 2.0 * half_breadth / params.draft_m;
    let frequency_parameter = wave_frequency * half_breadth / GRAVITY;

    let bucket = (shape_coefficient * 10.0).round() as u32;
    let pair_index = ratio_pair_index(beam_draft_ratio)?;
    let added_mass_coefficient = library.coefficient(
        CoefficientFamily::AddedMass,
        bucket,
        pair_index,
        frequency_parameter,
    )?;
    let damping_coefficient = library.coefficient(
        CoefficientFamily::Damping,
        bucket,
        pair_index,
        frequency_parameter,
    )?;

    Ok(SectionData {
        station_m,
        area_m2,
        shape_coefficient,
        beam_draft_ratio,
        frequency_parameter,
        added_mass_coefficient,
        damping_coefficient,
    })
}

/// Waterplane area from the offset row whose depth is closest to the draft
/// (first row wins on ties), integrated over the full station range with the
/// same implicit leading zero sample as the section areas.
fn waterplane_area(table: &HullOffsetTable, draft_m: f64) -> f64 {
    let mut best_row = 1;
    let mut best_distance = f64::INFINITY;
    for row in 1..=table.depth_row_count() {
        let distance = (table.depth(row) - draft_m).abs();
        if distance < best_distance {
            best_distance = distance;
            best_row = row;
        }
    }

    let stations = table.stations();
    let mut area = 0.0;
    let mut previous_offset = 0.0;
    let mut previous_x = 0.0;
    for column in 1..stations.len() {
        let offset = table.offset(best_row, column);
        area += (offset + previous_offset) * (stations[column] - previous_x);
        previous_offset = offset;
        previous_x = stations[column];
    }
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::fs;
    use std::path::PathBuf;

    fn params(length_m: f64) -> ShipParameters {
        ShipParameters {
            wave_length_ratio: 1.2,
            length_m,
            draft_m: 5.0,
            displacement_t: 100.0,
            metacentric_radius_m: 20.0,
        }
    }

    /// Reference row with (frequency, coefficient) in column pair 4 and
    /// zeros elsewhere.
    fn pair4_row(frequency: f64, coefficient: f64) -> String {
        format!("0\t0\t0\t0\t0\t0\t0\t0\t{frequency}\t{coefficient}")
    }

    struct TestDirs {
        added: PathBuf,
        damping: PathBuf,
    }

    impl TestDirs {
        fn new(name: &str) -> Self {
            let root = temp_dir().join(format!("strip_coeff_{}_{}", name, std::process::id()));
            let added = root.join("added_mass");
            let damping = root.join("damping");
            fs::create_dir_all(&added).unwrap();
            fs::create_dir_all(&damping).unwrap();
            TestDirs { added, damping }
        }

        fn library(&self) -> ReferenceLibrary {
            ReferenceLibrary::new(&self.added, &self.damping)
        }
    }

    impl Drop for TestDirs {
        fn drop(&mut self) {
            if let Some(root) = self.added.parent() {
                let _ = fs::remove_dir_all(root);
            }
        }
    }

    /// Rectangular barge: half-breadth 5 m at depths 0 and 5 m.
    fn barge_table(stations: &str) -> HullOffsetTable {
        let offsets = stations.split('\t').map(|_| "5").collect::<Vec<_>>().join("\t");
        let source = format!("0\t{stations}\n0\t{offsets}\n5\t{offsets}\n");
        HullOffsetTable::parse(&source, "test.txt").unwrap()
    }

    #[test]
    fn test_rectangular_section_derivation() {
        let dirs = TestDirs::new("rect");
        fs::write(
            dirs.added.join("10.txt"),
            format!("{}\n{}\n", pair4_row(1.0, 0.8), pair4_row(2.0, 0.6)),
        )
        .unwrap();
        fs::write(
            dirs.damping.join("10.txt"),
            format!("{}\n{}\n", pair4_row(1.0, 0.3), pair4_row(2.0, 0.5)),
        )
        .unwrap();

        let table = barge_table("10");
        let result = extract(&table, &params(20.0), &dirs.library()).unwrap();

        assert_eq!(result.sections.len(), 1);
        let section = &result.sections[0];
        // (5+0)*(0-0) + (5+5)*(5-0) = 50
        assert!((section.area_m2 - 50.0).abs() < 1e-12);
        // 50 / (2 * 5 * 5) = 1.0, bucket 10
        assert_eq!(section.shape_coefficient, 1.0);
        assert!((section.beam_draft_ratio - 2.0).abs() < 1e-12);
        // x_freq = omega^2 * b / g = 2*pi*5 / (20 * 1.2)
        let expected = 2.0 * std::f64::consts::PI * 5.0 / 24.0;
        assert!((section.frequency_parameter - expected).abs() < 1e-12);
        // nearest tabulated frequency is 1.0
        assert_eq!(section.added_mass_coefficient, 0.8);
        assert_eq!(section.damping_coefficient, 0.3);
    }

    #[test]
    fn test_lumped_reduction_hand_values() {
        let dirs = TestDirs::new("lump");
        fs::write(dirs.added.join("10.txt"), pair4_row(1.0, 0.8)).unwrap();
        fs::write(dirs.damping.join("10.txt"), pair4_row(1.0, 0.3)).unwrap();

        // Stations 0, 10, 20 with L = 20: leading-station levers are 10 and 0.
        let table = barge_table("10\t20");
        let result = extract(&table, &params(20.0), &dirs.library()).unwrap();

        assert_eq!(result.station_added_mass, vec![0.0, 0.8, 0.8]);
        assert_eq!(result.station_damping, vec![0.0, 0.3, 0.3]);

        let strip_mass = 50.0 * SEA_WATER_DENSITY; // 51.25
        let lumped = &result.lumped;
        // segment 0: avg 0.4, lever 10; segment 1: avg 0.8, lever 0
        let a33 = 0.4 * 10.0 * strip_mass + 0.8 * 10.0 * strip_mass;
        assert!((lumped.heave_added_mass - a33).abs() < 1e-9);
        assert!((lumped.pitch_added_inertia - 0.4 * 10.0 * strip_mass * 100.0).abs() < 1e-9);
        let b33 = 0.15 * 10.0 * strip_mass + 0.3 * 10.0 * strip_mass;
        assert!((lumped.heave_damping - b33).abs() < 1e-9);
        assert!((lumped.pitch_damping - 0.15 * 10.0 * strip_mass * 100.0).abs() < 1e-9);
        assert!((lumped.pitch_mass_inertia - 10.0 * strip_mass * 100.0).abs() < 1e-9);

        // waterline at depth 5: (5+0)*10 + (5+5)*10 = 150
        assert!((lumped.waterplane_area_m2 - 150.0).abs() < 1e-9);
        assert!(
            (lumped.heave_stiffness - 150.0 * SEA_WATER_DENSITY * GRAVITY).abs() < 1e-9
        );
        assert!((lumped.pitch_stiffness - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_shape_coefficient_clamped_to_floor() {
        let dirs = TestDirs::new("clamp");
        fs::write(dirs.added.join("5.txt"), pair4_row(1.0, 0.9)).unwrap();
        fs::write(dirs.damping.join("5.txt"), pair4_row(1.0, 0.2)).unwrap();

        // Fine section: offset 0 down to 2.5 m, then 5 m at the keel.
        // area = (0+0)*2.5 + (5+0)*2.5 = 12.5 -> raw shape 0.25
        let source = "0\t10\n0\t0\n2.5\t0\n5\t5\n";
        let table = HullOffsetTable::parse(source, "test.txt").unwrap();
        let result = extract(&table, &params(20.0), &dirs.library()).unwrap();

        assert_eq!(result.sections[0].shape_coefficient, MIN_SHAPE_COEFFICIENT);
        assert_eq!(result.sections[0].added_mass_coefficient, 0.9);
    }

    #[test]
    fn test_missing_reference_file_aborts_extraction() {
        let dirs = TestDirs::new("missing");
        fs::write(dirs.added.join("10.txt"), pair4_row(1.0, 0.8)).unwrap();
        // no damping file

        let table = barge_table("10");
        let err = extract(&table, &params(20.0), &dirs.library()).unwrap_err();
        assert!(matches!(err, StripError::LookupMiss { .. }));
    }

    #[test]
    fn test_waterplane_row_nearest_draft() {
        // Draft 5 sits closest to the 4.0 m waterline (distance 1 < 5).
        let source = "0\t10\t20\n0\t1\t1\n4\t3\t4\n";
        let table = HullOffsetTable::parse(source, "test.txt").unwrap();
        // (3+0)*10 + (4+3)*10 = 100
        assert!((waterplane_area(&table, 5.0) - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_breadth_station_rejected() {
        let dirs = TestDirs::new("zerob");
        let source = "0\t10\n0\t0\n5\t0\n";
        let table = HullOffsetTable::parse(source, "test.txt").unwrap();
        let err = extract(&table, &params(20.0), &dirs.library()).unwrap_err();
        assert!(matches!(err, StripError::InvalidInput { .. }));
    }
}
