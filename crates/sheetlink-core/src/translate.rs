//! Translation of 1-based row/column positions and A1 ranges into the API's
//! 0-based, end-exclusive intervals.
//!
//! Two conventions live here and must not be mixed:
//!
//! * Dimension edits: a single unit at 1-based position `index` is the interval
//!   `[index - 1, index)`. Inserting at `index` puts the new unit *at* `index`,
//!   shifting the old occupant down/right; deleting at `index` removes the unit
//!   at `index`. Insert-then-delete at the same index is therefore a no-op.
//! * Protection ranges: an A1 rectangle `from:to` becomes
//!   `[from.row - 1, to.row) x [from.column - 1, to.column)`.

use serde::{Deserialize, Serialize};

use crate::a1::{parse_cell_reference, try_column_name_to_number, MAX_COLUMN, MAX_ROW};
use crate::error::AddressError;
use crate::range::CellRange;
use crate::wire::{
    AddProtectedRangeRequest, DeleteDimensionRequest, DimensionRange, GridRange,
    InsertDimensionRequest, ProtectedRange, Request,
};

/// Row bound used when protecting a whole sheet or whole columns.
///
/// The API has no "unbounded" sentinel, so this is a fixed policy value
/// matching the default size of a new sheet.
pub const PROTECTION_ROW_BOUND: u32 = 1000;
/// Column bound used when protecting a whole sheet
pub const PROTECTION_COLUMN_BOUND: u32 = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Dimension {
    Rows,
    Columns,
}

impl Dimension {
    fn max_index(self) -> u32 {
        match self {
            Dimension::Rows => MAX_ROW,
            Dimension::Columns => MAX_COLUMN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DimensionEditKind {
    Insert { inherit_from_before: bool },
    Delete,
}

/// Insert or delete one row/column at a 1-based position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionEdit {
    pub dimension: Dimension,
    pub kind: DimensionEditKind,
    pub index: u32,
}

impl DimensionEdit {
    pub fn insert(dimension: Dimension, index: u32, inherit_from_before: bool) -> Self {
        Self {
            dimension,
            kind: DimensionEditKind::Insert { inherit_from_before },
            index,
        }
    }

    pub fn delete(dimension: Dimension, index: u32) -> Self {
        Self {
            dimension,
            kind: DimensionEditKind::Delete,
            index,
        }
    }

    /// Half-open 0-based interval `[index - 1, index)` on `sheet_id`
    pub fn to_range(&self, sheet_id: i32) -> Result<DimensionRange, AddressError> {
        if self.index == 0 || self.index > self.dimension.max_index() {
            return Err(AddressError::InvalidReference(format!(
                "{:?} index {}",
                self.dimension, self.index
            )));
        }

        Ok(DimensionRange {
            sheet_id,
            dimension: self.dimension,
            start_index: self.index - 1,
            end_index: self.index,
        })
    }

    pub fn to_request(&self, sheet_id: i32) -> Result<Request, AddressError> {
        let range = self.to_range(sheet_id)?;
        tracing::debug!(
            sheet_id,
            dimension = ?self.dimension,
            start = range.start_index,
            end = range.end_index,
            "translated dimension edit"
        );

        Ok(match self.kind {
            DimensionEditKind::Insert { inherit_from_before } => {
                Request::InsertDimension(InsertDimensionRequest {
                    range,
                    inherit_from_before,
                })
            }
            DimensionEditKind::Delete => Request::DeleteDimension(DeleteDimensionRequest { range }),
        })
    }
}

/// What a protected range covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtectionTarget {
    WholeSheet,
    /// Whole columns, 1-based and inclusive
    Columns { from: u32, to: u32 },
    Cells(CellRange),
}

impl ProtectionTarget {
    /// Whole columns given as letters ("B", "D")
    pub fn columns(from: &str, to: &str) -> Result<Self, AddressError> {
        let from_number = try_column_name_to_number(from)?;
        let to_number = try_column_name_to_number(to)?;
        if from_number > to_number {
            return Err(AddressError::InvalidRange(format!("{}:{}", from, to)));
        }
        Ok(ProtectionTarget::Columns {
            from: from_number,
            to: to_number,
        })
    }
}

/// Convert a protection target into a sheet-qualified 0-based half-open grid range
pub fn protection_grid_range(
    sheet_id: i32,
    target: &ProtectionTarget,
) -> Result<GridRange, AddressError> {
    match *target {
        ProtectionTarget::WholeSheet => Ok(GridRange {
            sheet_id,
            start_row_index: 0,
            end_row_index: PROTECTION_ROW_BOUND,
            start_column_index: 0,
            end_column_index: PROTECTION_COLUMN_BOUND,
        }),
        ProtectionTarget::Columns { from, to } => {
            if from == 0 || to > MAX_COLUMN || from > to {
                return Err(AddressError::InvalidRange(format!("columns {}..{}", from, to)));
            }
            Ok(GridRange {
                sheet_id,
                start_row_index: 0,
                end_row_index: PROTECTION_ROW_BOUND,
                start_column_index: from - 1,
                end_column_index: to,
            })
        }
        ProtectionTarget::Cells(range) => {
            range.validate()?;
            Ok(GridRange {
                sheet_id,
                start_row_index: range.from.row - 1,
                end_row_index: range.to.row,
                start_column_index: range.from.column - 1,
                end_column_index: range.to.column,
            })
        }
    }
}

/// Grid range for protecting the A1 rectangle `from:to` (e.g. "A1", "C10")
pub fn protect_cells_in_range(sheet_id: i32, from: &str, to: &str) -> Result<GridRange, AddressError> {
    let range = CellRange::new(parse_cell_reference(from)?, parse_cell_reference(to)?)?;
    protection_grid_range(sheet_id, &ProtectionTarget::Cells(range))
}

/// An `addProtectedRange` request before sheet resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectionRequest {
    pub target: ProtectionTarget,
    pub description: String,
    pub warning_only: bool,
}

impl ProtectionRequest {
    pub fn new(target: ProtectionTarget, description: impl Into<String>) -> Self {
        Self {
            target,
            description: description.into(),
            warning_only: false,
        }
    }

    pub fn warning_only(mut self, warning_only: bool) -> Self {
        self.warning_only = warning_only;
        self
    }

    pub fn to_request(&self, sheet_id: i32) -> Result<Request, AddressError> {
        let range = protection_grid_range(sheet_id, &self.target)?;
        Ok(Request::AddProtectedRange(AddProtectedRangeRequest {
            protected_range: ProtectedRange {
                range,
                description: self.description.clone(),
                warning_only: self.warning_only,
            },
        }))
    }
}
