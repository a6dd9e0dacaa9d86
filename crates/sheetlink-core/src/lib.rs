pub mod a1;
pub mod context;
pub mod error;
pub mod range;
pub mod reconcile;
pub mod translate;
pub mod wire;

pub use a1::{
    column_name_to_number, column_number_to_name, is_valid_cell_reference, parse_cell_reference,
    parse_sheet_range_origin, try_column_name_to_number, MAX_COLUMN, MAX_ROW,
};
pub use context::{spreadsheet_id_from_url, SheetContext, SheetDirectory};
pub use error::AddressError;
pub use range::{quote_sheet_title, CellAddress, CellRange, GridOrigin, SheetRange};
pub use reconcile::{reconcile, reconcile_value_range, SparseCellMap, ValueGrid};
pub use translate::{
    protect_cells_in_range, protection_grid_range, Dimension, DimensionEdit, DimensionEditKind,
    ProtectionRequest, ProtectionTarget, PROTECTION_COLUMN_BOUND, PROTECTION_ROW_BOUND,
};
pub use wire::{
    AppendValuesResponse, BatchUpdateSpreadsheetRequest, BatchUpdateSpreadsheetResponse,
    ClearValuesResponse, DimensionRange, DriveFileList, GridRange, Reply, Request, Spreadsheet,
    UpdateValuesResponse, ValueRange,
};
