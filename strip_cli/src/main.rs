//! # strip_cli
//!
//! Terminal front-end for the strip_core hull load engine. Stands in for the
//! presentation layer: stages the geometry upload, runs the pipeline, prints
//! a summary plus optional station/time slices, and can dump the full result
//! set as JSON for external plotting.
//!
//! ```text
//! strip_cli --geometry hull.txt --added-mass-dir data --damping-dir DAMPING \
//!           --length 179.5 --draft 10 --displacement 42650 --bml 228.34 \
//!           --station 90 --time 2.5 --output report.json
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use strip_core::file_io::{self, StagingLock};
use strip_core::{
    load_geometry, run_analysis, stage_geometry, AnalysisResult, ReferenceLibrary,
    ShipParameters, StripError, StripResult, TimeGrid,
};

#[derive(Parser, Debug)]
#[command(
    name = "strip_cli",
    version,
    about = "Shear force and bending moment along a hull under a regular wave"
)]
struct Args {
    /// Hull offset table: tab-separated stations row plus waterline rows
    #[arg(long)]
    geometry: PathBuf,

    /// Directory of added-mass reference files (<beta x 10>.txt)
    #[arg(long, default_value = "data")]
    added_mass_dir: PathBuf,

    /// Directory of damping reference files (<beta x 10>.txt)
    #[arg(long, default_value = "DAMPING")]
    damping_dir: PathBuf,

    /// Wave length to ship length ratio
    #[arg(long, default_value_t = 1.2)]
    wave_ratio: f64,

    /// Length between perpendiculars (m)
    #[arg(long, default_value_t = 179.5)]
    length: f64,

    /// Design draft (m)
    #[arg(long, default_value_t = 10.0)]
    draft: f64,

    /// Displacement (t)
    #[arg(long, default_value_t = 42650.0)]
    displacement: f64,

    /// Longitudinal metacentric radius (m)
    #[arg(long, default_value_t = 228.34)]
    bml: f64,

    /// First time sample (s)
    #[arg(long, default_value_t = 0.0)]
    t_start: f64,

    /// Last time sample (s)
    #[arg(long, default_value_t = 10.0)]
    t_end: f64,

    /// Number of time samples
    #[arg(long, default_value_t = 100)]
    samples: usize,

    /// Print the time series at the station nearest this coordinate (m)
    #[arg(long)]
    station: Option<f64>,

    /// Print the hull profile at the time sample nearest this instant (s)
    #[arg(long)]
    time: Option<f64>,

    /// Staging directory for the geometry upload
    #[arg(long, default_value = "uploads")]
    staging_dir: PathBuf,

    /// Write the full result set as pretty JSON
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("run failed: {error}");
            eprintln!("error [{}]: {error}", error.error_code());
            eprintln!("no results available");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> StripResult<()> {
    let contents = fs::read_to_string(&args.geometry).map_err(|e| {
        StripError::file_error("read", args.geometry.display().to_string(), e.to_string())
    })?;

    let staged_path = args.staging_dir.join(file_io::STAGED_GEOMETRY_NAME);
    let user = std::env::var("USER").unwrap_or_else(|_| "strip_cli".to_string());
    let _lock = StagingLock::acquire(&staged_path, user)?;
    let staged = stage_geometry(&contents, &args.staging_dir)?;
    let table = load_geometry(&staged)?;

    let params = ShipParameters {
        wave_length_ratio: args.wave_ratio,
        length_m: args.length,
        draft_m: args.draft,
        displacement_t: args.displacement,
        metacentric_radius_m: args.bml,
    };
    let grid = TimeGrid {
        start_s: args.t_start,
        end_s: args.t_end,
        samples: args.samples,
    };
    let library = ReferenceLibrary::new(&args.added_mass_dir, &args.damping_dir);

    let result = run_analysis(&params, &table, &grid, &library)?;
    print_summary(&params, &result);

    if let Some(x) = args.station {
        print_station_series(&result, x);
    }
    if let Some(t) = args.time {
        print_time_profile(&result, t);
    }

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&result).map_err(|e| {
            StripError::Serialization {
                reason: e.to_string(),
            }
        })?;
        fs::write(path, json).map_err(|e| {
            StripError::file_error("write", path.display().to_string(), e.to_string())
        })?;
        println!();
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn print_summary(params: &ShipParameters, result: &AnalysisResult) {
    let lumped = &result.coefficients.lumped;
    let motion = &result.motion;

    println!("═══════════════════════════════════════");
    println!("  HULL GIRDER WAVE LOAD RESULTS");
    println!("═══════════════════════════════════════");
    println!();
    println!("Input:");
    println!("  L = {:.1} m, T = {:.2} m, Δ = {:.0} t", params.length_m, params.draft_m, params.displacement_t);
    println!("  λ/L = {:.2}, B_ML = {:.2} m", params.wave_length_ratio, params.metacentric_radius_m);
    println!("  {} stations, {} time samples", result.response.stations_m.len(), result.response.times_s.len());
    println!();
    println!("Lumped coefficients:");
    println!("  a33 = {:.3} t        a55 = {:.3} t·m²", lumped.heave_added_mass, lumped.pitch_added_inertia);
    println!("  b33 = {:.4}          b55 = {:.3}", lumped.heave_damping, lumped.pitch_damping);
    println!("  I55 = {:.3} t·m²     Awl = {:.2} m²", lumped.pitch_mass_inertia, lumped.waterplane_area_m2);
    println!("  c33 = {:.2}          c55 = {:.2}", lumped.heave_stiffness, lumped.pitch_stiffness);
    println!("  ω   = {:.4} rad/s", lumped.wave_frequency);
    println!();
    println!("Response:");
    println!("  ω_z = {:.4} rad/s (G = {:.3}, φ = {:.3} rad)", motion.heave_natural_frequency, motion.heave_magnification, motion.heave_phase_rad);
    println!("  ω_θ = {:.4} rad/s (G = {:.3}, φ = {:.3} rad)", motion.pitch_natural_frequency, motion.pitch_magnification, motion.pitch_phase_rad);
    println!("  peak |V| = {:.3} kN", result.peak_shear());
    println!("  peak |M| = {:.3} kN·m", result.peak_bending());

    if !result.response.is_finite() {
        println!();
        println!("WARNING: response contains non-finite values (degenerate natural frequency?)");
    }
}

fn print_station_series(result: &AnalysisResult, x_m: f64) {
    let index = result.response.nearest_station_index(x_m);
    let station = result.response.stations_m[index];
    let shear = result.response.shear_at_station(index);
    let moment = result.response.bending_at_station(index);

    println!();
    println!("Time series at station x = {station:.2} m:");
    println!("  {:>8}  {:>14}  {:>16}", "t (s)", "V (kN)", "M (kN·m)");
    for (time_index, t) in result.response.times_s.iter().enumerate() {
        println!(
            "  {:>8.3}  {:>14.4}  {:>16.4}",
            t, shear[time_index], moment[time_index]
        );
    }
}

fn print_time_profile(result: &AnalysisResult, t_s: f64) {
    let index = result.response.nearest_time_index(t_s);
    let time = result.response.times_s[index];
    let shear = result.response.shear_at_time(index);
    let moment = result.response.bending_at_time(index);

    println!();
    println!("Hull profile at t = {time:.3} s:");
    println!("  {:>8}  {:>14}  {:>16}", "x (m)", "V (kN)", "M (kN·m)");
    for (station_index, x) in result.response.stations_m.iter().enumerate() {
        println!(
            "  {:>8.2}  {:>14.4}  {:>16.4}",
            x, shear[station_index], moment[station_index]
        );
    }
}
