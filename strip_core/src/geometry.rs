//! # Hull Offset Table
//!
//! Parses and validates the tab-separated hull geometry file.
//!
//! ## File Format
//!
//! Row 0 holds the longitudinal station coordinates in metres, strictly
//! increasing; the first cell doubles as the depth-column header and is 0 by
//! convention. Every following row is one waterline: column 0 is its depth
//! below the design waterline, the remaining columns are half-breadth offsets
//! at each station. All rows must have the same column count and all values
//! must be non-negative.
//!
//! ```text
//! 0       8.975   17.95   ...
//! 0       0.00    1.21    ...
//! 2.5     2.35    4.80    ...
//! 5.0     3.10    5.95    ...
//! ```
//!
//! ## Example
//!
//! ```rust
//! use strip_core::geometry::HullOffsetTable;
//!
//! let table = HullOffsetTable::parse("0\t10\n0\t5\n5\t5\n", "in.txt").unwrap();
//! assert_eq!(table.station_count(), 2);
//! assert_eq!(table.stations(), &[0.0, 10.0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{StripError, StripResult};

/// Rectangular hull offset matrix, immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HullOffsetTable {
    cells: Vec<Vec<f64>>,
}

impl HullOffsetTable {
    /// Parse a tab-separated offset table.
    ///
    /// `source_name` is used in diagnostics only (typically the file path).
    ///
    /// # Returns
    ///
    /// * `Ok(HullOffsetTable)` - Validated table
    /// * `Err(StripError::TableFormat)` - Non-numeric cell, ragged rows,
    ///   negative value, or a station row that is not strictly increasing
    pub fn parse(source: &str, source_name: &str) -> StripResult<Self> {
        let mut cells: Vec<Vec<f64>> = Vec::new();

        for (index, line) in source.trim().lines().enumerate() {
            let line_no = index + 1;
            let mut row = Vec::new();
            for cell in line.split('\t') {
                let trimmed = cell.trim();
                let value: f64 = trimmed.parse().map_err(|_| {
                    StripError::table_format(
                        source_name,
                        line_no,
                        format!("non-numeric cell '{trimmed}'"),
                    )
                })?;
                if !value.is_finite() || value < 0.0 {
                    return Err(StripError::table_format(
                        source_name,
                        line_no,
                        format!("offsets must be finite and non-negative, got {value}"),
                    ));
                }
                row.push(value);
            }
            cells.push(row);
        }

        if cells.len() < 2 {
            return Err(StripError::table_format(
                source_name,
                cells.len(),
                "need a station row and at least one depth row",
            ));
        }

        let width = cells[0].len();
        if width < 2 {
            return Err(StripError::table_format(
                source_name,
                1,
                "need at least one station column besides the depth column",
            ));
        }
        for (index, row) in cells.iter().enumerate() {
            if row.len() != width {
                return Err(StripError::table_format(
                    source_name,
                    index + 1,
                    format!("ragged row: {} columns, expected {width}", row.len()),
                ));
            }
        }

        for pair in cells[0].windows(2) {
            if pair[1] <= pair[0] {
                return Err(StripError::table_format(
                    source_name,
                    1,
                    format!(
                        "station coordinates must be strictly increasing ({} then {})",
                        pair[0], pair[1]
                    ),
                ));
            }
        }

        Ok(HullOffsetTable { cells })
    }

    /// Number of stations, including the coordinate-0 station held by the
    /// depth-column header.
    pub fn station_count(&self) -> usize {
        self.cells[0].len()
    }

    /// Number of waterline rows below the station row.
    pub fn depth_row_count(&self) -> usize {
        self.cells.len() - 1
    }

    /// Station coordinates in metres (row 0).
    pub fn stations(&self) -> &[f64] {
        &self.cells[0]
    }

    /// Depth of waterline `row` in metres. Rows are numbered from 1, matching
    /// the raw file layout; row 0 is the station header.
    pub fn depth(&self, row: usize) -> f64 {
        self.cells[row][0]
    }

    /// Half-breadth offset at waterline `row`, station column `station`.
    pub fn offset(&self, row: usize, station: usize) -> f64 {
        self.cells[row][station]
    }
}
