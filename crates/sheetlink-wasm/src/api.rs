use serde::{Deserialize, Serialize};
use sheetlink_core::{
    AddressError, CellAddress, CellRange, Dimension, DimensionEdit, ProtectionRequest,
    ProtectionTarget, SparseCellMap, ValueRange,
};
use wasm_bindgen::prelude::*;

/// Structured error object for JavaScript
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct JsSheetlinkError {
    code: String,
    message: String,
}

impl From<AddressError> for JsSheetlinkError {
    fn from(err: AddressError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for JsSheetlinkError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            code: "INVALID_JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl JsSheetlinkError {
    fn into_js(self) -> JsValue {
        serde_wasm_bindgen::to_value(&self).unwrap_or(JsValue::NULL)
    }
}

/// Serialize with plain objects for maps, which is what host code expects
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| {
            JsSheetlinkError {
                code: "SERIALIZATION".to_string(),
                message: e.to_string(),
            }
            .into_js()
        })
}

/// Cell address data for JavaScript
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CellAddressData {
    pub column: u32,
    pub row: u32,
    pub a1: String,
}

impl From<CellAddress> for CellAddressData {
    fn from(cell: CellAddress) -> Self {
        Self {
            column: cell.column,
            row: cell.row,
            a1: cell.to_a1(),
        }
    }
}

fn parse_dimension(dimension: &str) -> Result<Dimension, JsSheetlinkError> {
    match dimension.to_ascii_uppercase().as_str() {
        "ROWS" | "ROW" => Ok(Dimension::Rows),
        "COLUMNS" | "COLUMN" => Ok(Dimension::Columns),
        _ => Err(JsSheetlinkError {
            code: "INVALID_DIMENSION".to_string(),
            message: format!("Unknown dimension: {}", dimension),
        }),
    }
}

fn reconcile_json(response_json: &str, from: &str, to: &str) -> Result<SparseCellMap, JsSheetlinkError> {
    let requested = CellRange::from_endpoints(from, to)?;
    let response: ValueRange = serde_json::from_str(response_json)?;
    Ok(sheetlink_core::reconcile_value_range(&response, &requested)?)
}

fn dimension_request_json(
    sheet_id: i32,
    dimension: &str,
    insert: bool,
    index: u32,
    inherit_from_before: bool,
) -> Result<String, JsSheetlinkError> {
    let dimension = parse_dimension(dimension)?;
    let edit = if insert {
        DimensionEdit::insert(dimension, index, inherit_from_before)
    } else {
        DimensionEdit::delete(dimension, index)
    };
    Ok(serde_json::to_string(&edit.to_request(sheet_id)?)?)
}

fn protection_request_json(
    sheet_id: i32,
    from: &str,
    to: &str,
    description: &str,
    warning_only: bool,
) -> Result<String, JsSheetlinkError> {
    let target = ProtectionTarget::Cells(CellRange::from_endpoints(from, to)?);
    let request = ProtectionRequest::new(target, description).warning_only(warning_only);
    Ok(serde_json::to_string(&request.to_request(sheet_id)?)?)
}

#[wasm_bindgen(js_name = isValidCellReference)]
pub fn is_valid_cell_reference(reference: &str) -> bool {
    sheetlink_core::is_valid_cell_reference(reference)
}

/// Returns `{ column, row, a1 }` or throws `{ code, message }`
#[wasm_bindgen(js_name = parseCellReference)]
pub fn parse_cell_reference(reference: &str) -> Result<JsValue, JsValue> {
    let cell = sheetlink_core::parse_cell_reference(reference)
        .map_err(|e| JsSheetlinkError::from(e).into_js())?;
    to_js(&CellAddressData::from(cell))
}

#[wasm_bindgen(js_name = columnNameToNumber)]
pub fn column_name_to_number(letters: &str) -> u32 {
    sheetlink_core::column_name_to_number(letters)
}

#[wasm_bindgen(js_name = columnNumberToName)]
pub fn column_number_to_name(number: u32) -> String {
    sheetlink_core::column_number_to_name(number)
}

#[wasm_bindgen(js_name = parseSheetRangeOrigin)]
pub fn parse_sheet_range_origin(range: &str) -> Result<JsValue, JsValue> {
    let origin = sheetlink_core::parse_sheet_range_origin(range)
        .map_err(|e| JsSheetlinkError::from(e).into_js())?;
    to_js(&CellAddressData::from(origin))
}

/// Reconcile a raw `values.get` response body against `from:to`.
/// Returns a plain object mapping A1 addresses to non-blank values.
#[wasm_bindgen(js_name = reconcileValueRange)]
pub fn reconcile_value_range(response_json: &str, from: &str, to: &str) -> Result<JsValue, JsValue> {
    let cells = reconcile_json(response_json, from, to).map_err(JsSheetlinkError::into_js)?;
    to_js(&cells)
}

/// JSON for one `insertDimension`/`deleteDimension` batch-update entry
#[wasm_bindgen(js_name = dimensionEditRequest)]
pub fn dimension_edit_request(
    sheet_id: i32,
    dimension: &str,
    insert: bool,
    index: u32,
    inherit_from_before: bool,
) -> Result<String, JsValue> {
    dimension_request_json(sheet_id, dimension, insert, index, inherit_from_before)
        .map_err(JsSheetlinkError::into_js)
}

/// JSON for one `addProtectedRange` batch-update entry
#[wasm_bindgen(js_name = protectCellsInRange)]
pub fn protect_cells_in_range(
    sheet_id: i32,
    from: &str,
    to: &str,
    description: &str,
    warning_only: bool,
) -> Result<String, JsValue> {
    protection_request_json(sheet_id, from, to, description, warning_only)
        .map_err(JsSheetlinkError::into_js)
}
