use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde_json::json;
use sheetlink_core::wire::{AddSheetRequest, DeleteSheetRequest, NewSheetProperties};
use sheetlink_core::{
    parse_cell_reference, reconcile_value_range, spreadsheet_id_from_url, try_column_name_to_number,
    AddressError, AppendValuesResponse, BatchUpdateSpreadsheetRequest,
    BatchUpdateSpreadsheetResponse, CellAddress, CellRange, ClearValuesResponse, Dimension,
    DimensionEdit, DriveFileList, ProtectionRequest, ProtectionTarget, Request, SheetContext,
    SheetDirectory, SparseCellMap, Spreadsheet, UpdateValuesResponse, ValueRange, MAX_COLUMN,
    MAX_ROW,
};

use crate::error::ClientError;
use crate::transport::{Api, ApiRequest, Method, Transport};

pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// Values are parsed as if typed into the UI (numbers, dates, formulas)
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

/// Google Sheets operations over a [`Transport`].
///
/// Every call takes the [`SheetContext`] it operates on; the service itself holds
/// no per-spreadsheet state, so independent calls may run concurrently.
pub struct SheetsService<T> {
    transport: T,
}

impl<T: Transport> SheetsService<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ClientError> {
        let value = self.transport.send(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    // =========================================================================
    // Spreadsheet resolution
    // =========================================================================

    /// Fetch spreadsheet metadata (title and sheet properties)
    pub async fn metadata(&self, spreadsheet_id: &str) -> Result<Spreadsheet, ClientError> {
        let request = ApiRequest::new(Method::Get, Api::Sheets, &["spreadsheets", spreadsheet_id])
            .query("fields", "spreadsheetId,properties.title,sheets.properties");
        self.call(request).await
    }

    /// Open a spreadsheet by id, targeting its first sheet
    pub async fn open_by_id(&self, spreadsheet_id: &str) -> Result<SheetContext, ClientError> {
        let spreadsheet = self.metadata(spreadsheet_id).await?;
        let directory = SheetDirectory::from_spreadsheet(&spreadsheet);
        let (title, _) = directory.first().ok_or_else(|| {
            AddressError::SheetNotFound(format!("no sheets in spreadsheet {}", spreadsheet_id))
        })?;

        let ctx = directory.resolve(spreadsheet_id, title)?;
        tracing::info!(
            spreadsheet_id,
            title = %spreadsheet.properties.title,
            sheet = %ctx.sheet_title,
            "opened spreadsheet"
        );
        Ok(ctx)
    }

    /// Open a spreadsheet from its sharing URL (or a bare id)
    pub async fn open_by_url(&self, url: &str) -> Result<SheetContext, ClientError> {
        let spreadsheet_id = spreadsheet_id_from_url(url)
            .ok_or_else(|| ClientError::SpreadsheetNotFound(url.to_string()))?;
        self.open_by_id(&spreadsheet_id).await
    }

    /// Find a spreadsheet by its Drive file name
    pub async fn open_by_name(&self, name: &str) -> Result<SheetContext, ClientError> {
        let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            escaped, SPREADSHEET_MIME_TYPE
        );
        let request = ApiRequest::new(Method::Get, Api::Drive, &["files"])
            .query("q", query)
            .query("fields", "files(id,name)")
            .query("pageSize", "1");

        let list: DriveFileList = self.call(request).await?;
        let file = list
            .files
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::SpreadsheetNotFound(name.to_string()))?;
        self.open_by_id(&file.id).await
    }

    /// Sheet titles in tab order
    pub async fn sheet_titles(&self, ctx: &SheetContext) -> Result<Vec<String>, ClientError> {
        let spreadsheet = self.metadata(&ctx.spreadsheet_id).await?;
        Ok(SheetDirectory::from_spreadsheet(&spreadsheet).titles().to_vec())
    }

    /// Context for another sheet of the same spreadsheet
    pub async fn select_sheet(
        &self,
        ctx: &SheetContext,
        title: &str,
    ) -> Result<SheetContext, ClientError> {
        let spreadsheet = self.metadata(&ctx.spreadsheet_id).await?;
        Ok(SheetDirectory::from_spreadsheet(&spreadsheet).resolve(&ctx.spreadsheet_id, title)?)
    }

    async fn resolve_sheet_id(&self, ctx: &SheetContext) -> Result<i32, ClientError> {
        if let Some(sheet_id) = ctx.sheet_id {
            return Ok(sheet_id);
        }
        let spreadsheet = self.metadata(&ctx.spreadsheet_id).await?;
        Ok(SheetDirectory::from_spreadsheet(&spreadsheet).sheet_id(&ctx.sheet_title)?)
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// Read the non-blank cells of `from:to` (e.g. "A1", "C10")
    pub async fn read_cells(
        &self,
        ctx: &SheetContext,
        from: &str,
        to: &str,
    ) -> Result<SparseCellMap, ClientError> {
        let requested = CellRange::from_endpoints(from, to)?;
        self.read_range(ctx, &requested, &ctx.qualify(&requested)).await
    }

    /// Read a single cell; `None` when it is blank
    pub async fn read_cell(
        &self,
        ctx: &SheetContext,
        cell: &str,
    ) -> Result<Option<String>, ClientError> {
        let requested = CellRange::single(parse_cell_reference(cell)?);
        let mut cells = self.read_range(ctx, &requested, &ctx.qualify(&requested)).await?;
        Ok(cells.remove(&requested.from.to_a1()))
    }

    /// Read every populated cell of the sheet
    pub async fn read_sheet(&self, ctx: &SheetContext) -> Result<SparseCellMap, ClientError> {
        let everything = CellRange::new(
            CellAddress::new(1, 1)?,
            CellAddress::new(MAX_COLUMN, MAX_ROW)?,
        )?;
        self.read_range(ctx, &everything, &ctx.whole_sheet()).await
    }

    /// Read several windows concurrently; results are in input order
    pub async fn read_ranges(
        &self,
        ctx: &SheetContext,
        ranges: &[(&str, &str)],
    ) -> Result<Vec<SparseCellMap>, ClientError> {
        try_join_all(ranges.iter().map(|(from, to)| self.read_cells(ctx, from, to))).await
    }

    async fn read_range(
        &self,
        ctx: &SheetContext,
        requested: &CellRange,
        range: &str,
    ) -> Result<SparseCellMap, ClientError> {
        let request = ApiRequest::new(
            Method::Get,
            Api::Sheets,
            &["spreadsheets", ctx.spreadsheet_id.as_str(), "values", range],
        );
        let response: ValueRange = self.call(request).await?;
        let cells = reconcile_value_range(&response, requested)?;

        tracing::debug!(range, served = %response.range, cells = cells.len(), "read range");
        Ok(cells)
    }

    /// Write a block of rows with its top-left corner at `from`
    pub async fn write_cells(
        &self,
        ctx: &SheetContext,
        from: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<UpdateValuesResponse, ClientError> {
        let start = parse_cell_reference(from)?;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        if width == 0 {
            return Err(AddressError::InvalidRange(format!("{} (no values to write)", from)).into());
        }

        let end = CellAddress::new(start.column + width - 1, start.row + rows.len() as u32 - 1)?;
        let target = ctx.qualify(&CellRange::new(start, end)?);
        let body = serde_json::to_value(ValueRange::rows(target.as_str(), rows))?;

        let request = ApiRequest::new(
            Method::Put,
            Api::Sheets,
            &["spreadsheets", ctx.spreadsheet_id.as_str(), "values", target.as_str()],
        )
        .query("valueInputOption", VALUE_INPUT_OPTION)
        .body(body);

        let response: UpdateValuesResponse = self.call(request).await?;
        tracing::info!(range = %target, cells = response.updated_cells, "wrote values");
        Ok(response)
    }

    pub async fn write_cell(
        &self,
        ctx: &SheetContext,
        cell: &str,
        value: impl Into<String>,
    ) -> Result<UpdateValuesResponse, ClientError> {
        self.write_cells(ctx, cell, vec![vec![value.into()]]).await
    }

    /// Append a row after the last populated row of the sheet
    pub async fn append_row(
        &self,
        ctx: &SheetContext,
        row: Vec<String>,
    ) -> Result<AppendValuesResponse, ClientError> {
        let sheet = ctx.whole_sheet();
        let action = format!("{}:append", sheet);
        let body = serde_json::to_value(ValueRange::rows(sheet.as_str(), vec![row]))?;
        let request = ApiRequest::new(
            Method::Post,
            Api::Sheets,
            &["spreadsheets", ctx.spreadsheet_id.as_str(), "values", action.as_str()],
        )
        .query("valueInputOption", VALUE_INPUT_OPTION)
        .query("insertDataOption", "INSERT_ROWS")
        .body(body);

        self.call(request).await
    }

    pub async fn clear_range(
        &self,
        ctx: &SheetContext,
        from: &str,
        to: &str,
    ) -> Result<ClearValuesResponse, ClientError> {
        let action = format!("{}:clear", ctx.qualify(&CellRange::from_endpoints(from, to)?));
        let request = ApiRequest::new(
            Method::Post,
            Api::Sheets,
            &["spreadsheets", ctx.spreadsheet_id.as_str(), "values", action.as_str()],
        )
        .body(json!({}));

        self.call(request).await
    }

    // =========================================================================
    // Structure
    // =========================================================================

    async fn batch_update(
        &self,
        ctx: &SheetContext,
        requests: Vec<Request>,
    ) -> Result<BatchUpdateSpreadsheetResponse, ClientError> {
        let body = serde_json::to_value(BatchUpdateSpreadsheetRequest { requests })?;
        let action = format!("{}:batchUpdate", ctx.spreadsheet_id);
        let request =
            ApiRequest::new(Method::Post, Api::Sheets, &["spreadsheets", action.as_str()]).body(body);

        self.call(request).await
    }

    /// Add a sheet and return a context targeting it
    pub async fn add_sheet(&self, ctx: &SheetContext, title: &str) -> Result<SheetContext, ClientError> {
        let request = Request::AddSheet(AddSheetRequest {
            properties: NewSheetProperties {
                title: title.to_string(),
            },
        });
        let response = self.batch_update(ctx, vec![request]).await?;

        let added = response
            .replies
            .into_iter()
            .find_map(|reply| reply.add_sheet)
            .ok_or_else(|| AddressError::SheetNotFound(title.to_string()))?;

        tracing::info!(title = %added.properties.title, sheet_id = added.properties.sheet_id, "added sheet");
        Ok(ctx.with_sheet(added.properties.title, added.properties.sheet_id))
    }

    pub async fn delete_sheet(&self, ctx: &SheetContext, title: &str) -> Result<(), ClientError> {
        let spreadsheet = self.metadata(&ctx.spreadsheet_id).await?;
        let sheet_id = SheetDirectory::from_spreadsheet(&spreadsheet).sheet_id(title)?;

        self.batch_update(ctx, vec![Request::DeleteSheet(DeleteSheetRequest { sheet_id })])
            .await?;
        tracing::info!(title, sheet_id, "deleted sheet");
        Ok(())
    }

    /// Insert one row/column so that it becomes the unit at 1-based `index`
    pub async fn insert_dimension(
        &self,
        ctx: &SheetContext,
        dimension: Dimension,
        index: u32,
        inherit_from_before: bool,
    ) -> Result<BatchUpdateSpreadsheetResponse, ClientError> {
        let edit = DimensionEdit::insert(dimension, index, inherit_from_before);
        self.apply_dimension_edit(ctx, edit).await
    }

    /// Delete the row/column at 1-based `index`
    pub async fn delete_dimension(
        &self,
        ctx: &SheetContext,
        dimension: Dimension,
        index: u32,
    ) -> Result<BatchUpdateSpreadsheetResponse, ClientError> {
        self.apply_dimension_edit(ctx, DimensionEdit::delete(dimension, index))
            .await
    }

    pub async fn insert_row(
        &self,
        ctx: &SheetContext,
        row: u32,
    ) -> Result<BatchUpdateSpreadsheetResponse, ClientError> {
        self.insert_dimension(ctx, Dimension::Rows, row, row > 1).await
    }

    pub async fn delete_row(
        &self,
        ctx: &SheetContext,
        row: u32,
    ) -> Result<BatchUpdateSpreadsheetResponse, ClientError> {
        self.delete_dimension(ctx, Dimension::Rows, row).await
    }

    /// Insert a column at the given letters (e.g. "C")
    pub async fn insert_column(
        &self,
        ctx: &SheetContext,
        column: &str,
    ) -> Result<BatchUpdateSpreadsheetResponse, ClientError> {
        let index = try_column_name_to_number(column)?;
        self.insert_dimension(ctx, Dimension::Columns, index, index > 1)
            .await
    }

    pub async fn delete_column(
        &self,
        ctx: &SheetContext,
        column: &str,
    ) -> Result<BatchUpdateSpreadsheetResponse, ClientError> {
        let index = try_column_name_to_number(column)?;
        self.delete_dimension(ctx, Dimension::Columns, index).await
    }

    async fn apply_dimension_edit(
        &self,
        ctx: &SheetContext,
        edit: DimensionEdit,
    ) -> Result<BatchUpdateSpreadsheetResponse, ClientError> {
        // Validate the index before any network round trip.
        edit.to_range(ctx.sheet_id.unwrap_or_default())?;

        let sheet_id = self.resolve_sheet_id(ctx).await?;
        let request = edit.to_request(sheet_id)?;
        self.batch_update(ctx, vec![request]).await
    }

    // =========================================================================
    // Protection
    // =========================================================================

    pub async fn protect_range(
        &self,
        ctx: &SheetContext,
        protection: &ProtectionRequest,
    ) -> Result<BatchUpdateSpreadsheetResponse, ClientError> {
        sheetlink_core::protection_grid_range(ctx.sheet_id.unwrap_or_default(), &protection.target)?;

        let sheet_id = self.resolve_sheet_id(ctx).await?;
        let request = protection.to_request(sheet_id)?;
        let response = self.batch_update(ctx, vec![request]).await?;
        tracing::info!(sheet_id, description = %protection.description, "protected range");
        Ok(response)
    }

    /// Protect the A1 rectangle `from:to` (e.g. "A1", "C10")
    pub async fn protect_cells_in_range(
        &self,
        ctx: &SheetContext,
        from: &str,
        to: &str,
        description: &str,
    ) -> Result<BatchUpdateSpreadsheetResponse, ClientError> {
        let target = ProtectionTarget::Cells(CellRange::from_endpoints(from, to)?);
        self.protect_range(ctx, &ProtectionRequest::new(target, description))
            .await
    }

    pub async fn protect_sheet(
        &self,
        ctx: &SheetContext,
        description: &str,
    ) -> Result<BatchUpdateSpreadsheetResponse, ClientError> {
        self.protect_range(ctx, &ProtectionRequest::new(ProtectionTarget::WholeSheet, description))
            .await
    }

    /// Protect whole columns, e.g. ("B", "D")
    pub async fn protect_columns(
        &self,
        ctx: &SheetContext,
        from: &str,
        to: &str,
        description: &str,
    ) -> Result<BatchUpdateSpreadsheetResponse, ClientError> {
        let target = ProtectionTarget::columns(from, to)?;
        self.protect_range(ctx, &ProtectionRequest::new(target, description))
            .await
    }
}
