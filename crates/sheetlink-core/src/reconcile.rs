//! Aligns a fetched value grid with the window the caller asked for.
//!
//! The API may serve a grid anchored earlier than the requested range (it snaps to
//! the used range or sheet bounds), so row 0 of the grid is not assumed to be the
//! first requested row. Positions are always derived from the grid's own origin.

use std::collections::HashMap;

use crate::a1::{column_number_to_name, parse_sheet_range_origin};
use crate::error::AddressError;
use crate::range::{CellRange, GridOrigin};
use crate::wire::ValueRange;

/// Non-blank cells keyed by A1 address ("B2" -> "Hello")
pub type SparseCellMap = HashMap<String, String>;

/// Rows of raw cell text relative to a grid origin. Rows may be shorter than the
/// widest row; missing trailing cells are blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueGrid {
    pub rows: Vec<Vec<String>>,
}

impl ValueGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }
}

impl From<Vec<Vec<String>>> for ValueGrid {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }
}

/// Collect the non-blank cells of `grid` (anchored at `origin`) that fall inside `requested`.
///
/// Cells outside the window and whitespace-only cells are omitted; an empty
/// result is not an error.
pub fn reconcile(
    origin: GridOrigin,
    grid: &ValueGrid,
    requested: &CellRange,
) -> Result<SparseCellMap, AddressError> {
    requested.validate().map_err(|err| match err {
        AddressError::InvalidReference(detail) => AddressError::InvalidRange(detail),
        other => other,
    })?;

    let mut cells = SparseCellMap::new();

    for (i, row) in grid.rows.iter().enumerate() {
        let absolute_row = origin.row as u64 + i as u64;
        if absolute_row < requested.from.row as u64 {
            continue;
        }
        if absolute_row > requested.to.row as u64 {
            break;
        }

        for (j, value) in row.iter().enumerate() {
            let absolute_column = origin.column as u64 + j as u64;
            if absolute_column < requested.from.column as u64 {
                continue;
            }
            if absolute_column > requested.to.column as u64 {
                break;
            }
            if value.trim().is_empty() {
                continue;
            }

            // Bounded by the validated `requested.to.column`.
            let key = format!("{}{}", column_number_to_name(absolute_column as u32), absolute_row);
            cells.insert(key, value.clone());
        }
    }

    tracing::trace!(
        origin = %origin,
        requested = %requested,
        rows = grid.rows.len(),
        cells = cells.len(),
        "reconciled value grid"
    );

    Ok(cells)
}

/// Reconcile a `values.get` response, taking the origin from the range it echoes back.
pub fn reconcile_value_range(
    response: &ValueRange,
    requested: &CellRange,
) -> Result<SparseCellMap, AddressError> {
    let origin = parse_sheet_range_origin(&response.range)?;
    let grid = ValueGrid::new(response.values.clone());
    reconcile(origin, &grid, requested)
}
