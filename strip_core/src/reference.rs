//! # Section Hydrodynamic Reference Tables
//!
//! Two families of tabulated two-dimensional section data drive the strip
//! pipeline: added-mass coefficients and damping coefficients. Each family is
//! a directory of tab-separated files named `<shape coefficient x 10>.txt`
//! (so `7.txt` covers sections with shape coefficient 0.7). Every row of a
//! file holds alternating (frequency parameter, coefficient) pairs, one pair
//! per beam/draft-ratio bin; blank cells denote absent data and parse as 0.
//!
//! Selection is a two-step lookup:
//!
//! 1. the beam/draft ratio picks a column-pair index through the static
//!    bucket map ([`ratio_pair_index`]),
//! 2. within that column pair, the row whose frequency parameter is closest
//!    to the section's computed value supplies the coefficient (first match
//!    wins on ties).
//!
//! Files are read lazily and cached per [`ReferenceLibrary`] instance; the
//! tables are static data, so a cached parse never needs invalidation.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{StripError, StripResult};

/// The two independent reference-data families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoefficientFamily {
    /// Sectional added-mass coefficients
    AddedMass,
    /// Sectional damping coefficients
    Damping,
}

impl CoefficientFamily {
    /// Human-readable label for diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            CoefficientFamily::AddedMass => "added mass",
            CoefficientFamily::Damping => "damping",
        }
    }
}

impl fmt::Display for CoefficientFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final beam/draft bucket -> column-pair index mapping.
///
/// Buckets 1..=7 and 9 follow the `bucket - 1` rule; 8 and 10 share column
/// pair 7 and 11 shares pair 8, because the source tables do not carry
/// dedicated columns for those bins. Note the collision: bucket 9 lands on
/// the same pair as bucket 11.
static RATIO_PAIR_INDEX: Lazy<HashMap<u32, usize>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for bucket in 1..=7u32 {
        map.insert(bucket, (bucket - 1) as usize);
    }
    map.insert(8, 7);
    map.insert(9, 8);
    map.insert(10, 7);
    map.insert(11, 8);
    map
});

/// Column-pair index for a beam/draft ratio.
///
/// The ratio is discretized as `round(ratio * 2.5)` clamped to a minimum
/// bucket of 1; buckets above 11 have no tabulated columns.
///
/// # Example
///
/// ```rust
/// use strip_core::reference::ratio_pair_index;
///
/// assert_eq!(ratio_pair_index(2.0).unwrap(), 4); // bucket 5
/// assert!(ratio_pair_index(9.0).is_err());       // bucket 23, out of range
/// ```
pub fn ratio_pair_index(beam_draft_ratio: f64) -> StripResult<usize> {
    let bucket = (beam_draft_ratio * 2.5).round().max(1.0) as u32;
    RATIO_PAIR_INDEX.get(&bucket).copied().ok_or_else(|| {
        StripError::lookup_miss(
            "ratio bucket index",
            format!("bucket {bucket}"),
            format!("beam/draft ratio {beam_draft_ratio} is beyond the tabulated range"),
        )
    })
}

/// One parsed reference file: rows of alternating (frequency parameter,
/// coefficient) pairs. Blank cells have already been read as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    source: String,
    rows: Vec<Vec<f64>>,
}

impl ReferenceTable {
    /// Parse a tab-separated reference file. Blank cells parse as zero;
    /// blank lines are skipped.
    pub fn parse(source: &str, source_name: &str) -> StripResult<Self> {
        let mut rows = Vec::new();
        for (index, line) in source.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut row = Vec::new();
            for cell in line.split('\t') {
                let trimmed = cell.trim();
                if trimmed.is_empty() {
                    row.push(0.0);
                    continue;
                }
                let value: f64 = trimmed.parse().map_err(|_| {
                    StripError::table_format(
                        source_name,
                        index + 1,
                        format!("non-numeric cell '{trimmed}'"),
                    )
                })?;
                row.push(value);
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(StripError::table_format(source_name, 1, "no data rows"));
        }

        Ok(ReferenceTable {
            source: source_name.to_string(),
            rows,
        })
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Coefficient whose frequency parameter is closest to the query, taken
    /// from column pair `pair_index` (columns `2 * pair_index` and
    /// `2 * pair_index + 1`). Ties keep the first row in file order.
    pub fn nearest_coefficient(
        &self,
        pair_index: usize,
        frequency_parameter: f64,
    ) -> StripResult<f64> {
        let frequency_column = pair_index * 2;
        let mut best: Option<(f64, f64)> = None; // (distance, coefficient)

        for (index, row) in self.rows.iter().enumerate() {
            let tabulated = row.get(frequency_column).copied().ok_or_else(|| {
                StripError::table_format(
                    self.source.clone(),
                    index + 1,
                    format!(
                        "row has {} columns, column pair {pair_index} needs {}",
                        row.len(),
                        frequency_column + 2
                    ),
                )
            })?;
            let coefficient = row.get(frequency_column + 1).copied().ok_or_else(|| {
                StripError::table_format(
                    self.source.clone(),
                    index + 1,
                    format!("column pair {pair_index} is missing its coefficient column"),
                )
            })?;

            let distance = (frequency_parameter - tabulated).abs();
            match best {
                Some((best_distance, _)) if distance >= best_distance => {}
                _ => best = Some((distance, coefficient)),
            }
        }

        // parse() guarantees at least one row
        Ok(best.map(|(_, coefficient)| coefficient).unwrap_or(0.0))
    }
}

/// Read-only, lazily populated library over the two reference directories.
///
/// Cached tables are shared via `Arc`, so repeated sections and repeated runs
/// against the same library never re-read a file.
#[derive(Debug)]
pub struct ReferenceLibrary {
    added_mass_dir: PathBuf,
    damping_dir: PathBuf,
    cache: Mutex<HashMap<(CoefficientFamily, u32), Arc<ReferenceTable>>>,
}

impl ReferenceLibrary {
    /// Create a library over the added-mass and damping directories.
    pub fn new(added_mass_dir: impl Into<PathBuf>, damping_dir: impl Into<PathBuf>) -> Self {
        ReferenceLibrary {
            added_mass_dir: added_mass_dir.into(),
            damping_dir: damping_dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn dir(&self, family: CoefficientFamily) -> &Path {
        match family {
            CoefficientFamily::AddedMass => &self.added_mass_dir,
            CoefficientFamily::Damping => &self.damping_dir,
        }
    }

    /// Table for a shape-coefficient bucket, parsing the backing file on
    /// first use.
    ///
    /// # Returns
    ///
    /// * `Err(StripError::LookupMiss)` - No file exists for the bucket
    /// * `Err(StripError::TableFormat)` - The file exists but is malformed
    pub fn table(
        &self,
        family: CoefficientFamily,
        bucket: u32,
    ) -> StripResult<Arc<ReferenceTable>> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(table) = cache.get(&(family, bucket)) {
            return Ok(Arc::clone(table));
        }

        let path = self.dir(family).join(format!("{bucket}.txt"));
        let source = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StripError::lookup_miss(
                    family.label(),
                    format!("bucket {bucket}"),
                    format!("no reference file at '{}'", path.display()),
                )
            } else {
                StripError::file_error("read", path.display().to_string(), e.to_string())
            }
        })?;

        let table = Arc::new(ReferenceTable::parse(&source, &path.display().to_string())?);
        cache.insert((family, bucket), Arc::clone(&table));
        log::debug!(
            "loaded {} reference table bucket {bucket} ({} rows)",
            family,
            table.row_count()
        );
        Ok(table)
    }

    /// Interpolated coefficient for one section: bucket file, column pair,
    /// nearest frequency parameter.
    pub fn coefficient(
        &self,
        family: CoefficientFamily,
        bucket: u32,
        pair_index: usize,
        frequency_parameter: f64,
    ) -> StripResult<f64> {
        self.table(family, bucket)?
            .nearest_coefficient(pair_index, frequency_parameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn temp_family_dir(name: &str) -> PathBuf {
        let dir = temp_dir().join(format!("strip_ref_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_ratio_pair_index_final_mapping() {
        // Buckets 8, 10, 11 are the remapped entries; everything else is k - 1.
        let cases = [
            (1u32, 0usize),
            (2, 1),
            (3, 2),
            (4, 3),
            (5, 4),
            (6, 5),
            (7, 6),
            (8, 7),
            (9, 8),
            (10, 7),
            (11, 8),
        ];
        for (bucket, expected) in cases {
            // bucket = round(ratio * 2.5) => ratio = bucket / 2.5
            let ratio = bucket as f64 / 2.5;
            assert_eq!(ratio_pair_index(ratio).unwrap(), expected, "bucket {bucket}");
        }
    }

    #[test]
    fn test_ratio_bucket_clamps_to_one() {
        // round(0.04 * 2.5) = 0, clamped up to bucket 1
        assert_eq!(ratio_pair_index(0.04).unwrap(), 0);
    }

    #[test]
    fn test_ratio_bucket_beyond_range_is_lookup_miss() {
        let err = ratio_pair_index(5.0).unwrap_err();
        assert!(matches!(err, StripError::LookupMiss { .. }));
    }

    #[test]
    fn test_blank_cells_parse_as_zero() {
        let table = ReferenceTable::parse("1.0\t\t\t4.0\n", "7.txt").unwrap();
        assert_eq!(table.nearest_coefficient(0, 0.9).unwrap(), 0.0);
        assert_eq!(table.nearest_coefficient(1, 0.1).unwrap(), 4.0);
    }

    #[test]
    fn test_nearest_frequency_parameter_wins() {
        let table =
            ReferenceTable::parse("1.0\t5.0\n2.0\t7.0\n3.0\t9.0\n", "7.txt").unwrap();
        // 2.4 is 0.4 from the 2.0 row and 0.6 from the 3.0 row
        assert_eq!(table.nearest_coefficient(0, 2.4).unwrap(), 7.0);
    }

    #[test]
    fn test_nearest_tie_keeps_first_row() {
        let table =
            ReferenceTable::parse("1.0\t5.0\n3.0\t9.0\n", "7.txt").unwrap();
        // 2.0 is equidistant; the 1.0 row comes first in file order
        assert_eq!(table.nearest_coefficient(0, 2.0).unwrap(), 5.0);
    }

    #[test]
    fn test_short_row_is_table_format_error() {
        let table = ReferenceTable::parse("1.0\t5.0\n", "7.txt").unwrap();
        let err = table.nearest_coefficient(3, 1.0).unwrap_err();
        assert!(matches!(err, StripError::TableFormat { .. }));
    }

    #[test]
    fn test_missing_bucket_file_is_lookup_miss() {
        let added = temp_family_dir("miss_a");
        let damping = temp_family_dir("miss_d");
        let library = ReferenceLibrary::new(&added, &damping);

        let err = library
            .table(CoefficientFamily::AddedMass, 42)
            .unwrap_err();
        assert!(matches!(err, StripError::LookupMiss { .. }));

        let _ = fs::remove_dir_all(added);
        let _ = fs::remove_dir_all(damping);
    }

    #[test]
    fn test_cache_survives_file_removal() {
        let added = temp_family_dir("cache_a");
        let damping = temp_family_dir("cache_d");
        fs::write(added.join("7.txt"), "1.0\t5.0\n2.0\t7.0\n").unwrap();

        let library = ReferenceLibrary::new(&added, &damping);
        let first = library
            .coefficient(CoefficientFamily::AddedMass, 7, 0, 1.9)
            .unwrap();
        assert_eq!(first, 7.0);

        // Once cached, the backing file is never re-read.
        fs::remove_file(added.join("7.txt")).unwrap();
        let second = library
            .coefficient(CoefficientFamily::AddedMass, 7, 0, 1.9)
            .unwrap();
        assert_eq!(second, 7.0);

        let _ = fs::remove_dir_all(added);
        let _ = fs::remove_dir_all(damping);
    }
}
