use serde_json::{json, Value};
use sheetlink_client::{Api, ApiRequest, ClientError, Method, SheetsService, Transport};
use sheetlink_core::{AddressError, Dimension, SheetContext};
use std::collections::VecDeque;
use std::sync::Mutex;

const ID: &str = "1f5epAPxP_Yd3g1TunEMdtianpVAhKS0RG6BKRDSLtrk";

/// Records every request and replays canned responses in order
#[derive(Default)]
struct MockTransport {
    requests: Mutex<Vec<ApiRequest>>,
    responses: Mutex<VecDeque<Result<Value, ClientError>>>,
}

impl MockTransport {
    fn with(responses: Vec<Value>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into_iter().map(Ok).collect()),
        }
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, ClientError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Transport("no canned response".into())))
    }
}

fn metadata() -> Value {
    json!({
        "spreadsheetId": ID,
        "properties": { "title": "Budget" },
        "sheets": [
            { "properties": { "sheetId": 0, "title": "Summary", "index": 0 } },
            { "properties": { "sheetId": 314, "title": "Team Roster", "index": 1 } }
        ]
    })
}

fn ctx() -> SheetContext {
    SheetContext::new(ID, "Summary").with_sheet("Summary", 0)
}

fn body(request: &ApiRequest) -> &Value {
    request.body.as_ref().expect("request body")
}

#[tokio::test]
async fn test_open_by_url_targets_first_sheet() {
    let service = SheetsService::new(MockTransport::with(vec![metadata()]));
    let url = format!("https://docs.google.com/spreadsheets/d/{}/edit#gid=0", ID);

    let ctx = service.open_by_url(&url).await.unwrap();
    assert_eq!(ctx.spreadsheet_id, ID);
    assert_eq!(ctx.sheet_title, "Summary");
    assert_eq!(ctx.sheet_id, Some(0));

    let requests = service.transport().requests();
    assert_eq!(requests[0].method, Method::Get);
    assert_eq!(requests[0].path, vec!["spreadsheets", ID]);
}

#[tokio::test]
async fn test_open_by_url_rejects_foreign_url() {
    let service = SheetsService::new(MockTransport::default());
    let err = service.open_by_url("https://example.com/x").await.unwrap_err();
    assert!(matches!(err, ClientError::SpreadsheetNotFound(_)));
    assert!(service.transport().requests().is_empty());
}

#[tokio::test]
async fn test_open_by_name_queries_drive() {
    let service = SheetsService::new(MockTransport::with(vec![
        json!({ "files": [{ "id": ID, "name": "Budget" }] }),
        metadata(),
    ]));

    let ctx = service.open_by_name("Budget").await.unwrap();
    assert_eq!(ctx.sheet_id, Some(0));

    let requests = service.transport().requests();
    assert_eq!(requests[0].api, Api::Drive);
    assert_eq!(requests[0].path, vec!["files"]);
    let (_, q) = requests[0].query.iter().find(|(k, _)| k == "q").unwrap();
    assert!(q.contains("name = 'Budget'"));
    assert!(q.contains("application/vnd.google-apps.spreadsheet"));
}

#[tokio::test]
async fn test_open_by_name_not_found() {
    let service = SheetsService::new(MockTransport::with(vec![json!({ "files": [] })]));
    let err = service.open_by_name("Nope").await.unwrap_err();
    assert!(matches!(err, ClientError::SpreadsheetNotFound(name) if name == "Nope"));
}

#[tokio::test]
async fn test_select_sheet() {
    let service = SheetsService::new(MockTransport::with(vec![metadata(), metadata()]));

    let roster = service.select_sheet(&ctx(), "Team Roster").await.unwrap();
    assert_eq!(roster.sheet_id, Some(314));

    let err = service.select_sheet(&ctx(), "Missing").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Address(AddressError::SheetNotFound(title)) if title == "Missing"
    ));
}

#[tokio::test]
async fn test_read_cells_reconciles_served_range() {
    let service = SheetsService::new(MockTransport::with(vec![json!({
        "range": "Summary!A1:B2",
        "majorDimension": "ROWS",
        "values": [["", "Hello"], ["World"]]
    })]));

    let cells = service.read_cells(&ctx(), "A1", "B2").await.unwrap();
    assert_eq!(cells.len(), 2);
    assert_eq!(cells["B1"], "Hello");
    assert_eq!(cells["A2"], "World");

    let requests = service.transport().requests();
    assert_eq!(requests[0].path, vec!["spreadsheets", ID, "values", "Summary!A1:B2"]);
}

#[tokio::test]
async fn test_read_cells_invalid_reference_skips_network() {
    let service = SheetsService::new(MockTransport::default());
    let err = service.read_cells(&ctx(), "A1", "2B").await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Address(AddressError::InvalidReference(s)) if s == "2B"
    ));
    assert!(service.transport().requests().is_empty());
}

#[tokio::test]
async fn test_read_cell_blank_is_none() {
    let service = SheetsService::new(MockTransport::with(vec![
        json!({ "range": "Summary!C3", "majorDimension": "ROWS" }),
        json!({ "range": "Summary!C3", "majorDimension": "ROWS", "values": [["42"]] }),
    ]));

    assert_eq!(service.read_cell(&ctx(), "C3").await.unwrap(), None);
    assert_eq!(service.read_cell(&ctx(), "C3").await.unwrap().as_deref(), Some("42"));
}

#[tokio::test]
async fn test_read_sheet_uses_served_origin() {
    let service = SheetsService::new(MockTransport::with(vec![json!({
        "range": "Summary!B4:C5",
        "values": [["x"], ["", "y"]]
    })]));

    let cells = service.read_sheet(&ctx()).await.unwrap();
    assert_eq!(cells["B4"], "x");
    assert_eq!(cells["C5"], "y");
    assert_eq!(service.transport().requests()[0].path[3], "Summary");
}

#[tokio::test]
async fn test_read_ranges_in_order() {
    let service = SheetsService::new(MockTransport::with(vec![
        json!({ "range": "Summary!A1", "values": [["first"]] }),
        json!({ "range": "Summary!B2", "values": [["second"]] }),
    ]));

    let results = service
        .read_ranges(&ctx(), &[("A1", "A1"), ("B2", "B2")])
        .await
        .unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["A1"], "first");
    assert_eq!(results[1]["B2"], "second");
}

#[tokio::test]
async fn test_write_cells_spans_block() {
    let service = SheetsService::new(MockTransport::with(vec![json!({
        "spreadsheetId": ID,
        "updatedRange": "'Team Roster'!B2:D3",
        "updatedRows": 2,
        "updatedColumns": 3,
        "updatedCells": 5
    })]));
    let roster = SheetContext::new(ID, "Team Roster").with_sheet("Team Roster", 314);

    let rows = vec![
        vec!["a".to_string(), "b".to_string(), "c".to_string()],
        vec!["d".to_string(), "e".to_string()],
    ];
    let response = service.write_cells(&roster, "B2", rows).await.unwrap();
    assert_eq!(response.updated_cells, 5);

    let request = &service.transport().requests()[0];
    assert_eq!(request.method, Method::Put);
    assert_eq!(request.path[3], "'Team Roster'!B2:D3");
    assert!(request
        .query
        .contains(&("valueInputOption".to_string(), "USER_ENTERED".to_string())));
    assert_eq!(body(request)["range"], "'Team Roster'!B2:D3");
    assert_eq!(body(request)["values"][1], json!(["d", "e"]));
}

#[tokio::test]
async fn test_write_cells_rejects_empty_and_overflow() {
    let service = SheetsService::new(MockTransport::default());

    let err = service.write_cells(&ctx(), "A1", vec![]).await.unwrap_err();
    assert!(matches!(err, ClientError::Address(AddressError::InvalidRange(_))));

    let err = service
        .write_cells(&ctx(), "ZZ1", vec![vec!["a".into(), "b".into()]])
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Address(AddressError::InvalidReference(_))));
    assert!(service.transport().requests().is_empty());
}

#[tokio::test]
async fn test_append_and_clear() {
    let service = SheetsService::new(MockTransport::with(vec![
        json!({ "spreadsheetId": ID, "tableRange": "Summary!A1:B3" }),
        json!({ "spreadsheetId": ID, "clearedRange": "Summary!A1:B2" }),
    ]));

    let appended = service
        .append_row(&ctx(), vec!["x".into(), "y".into()])
        .await
        .unwrap();
    assert_eq!(appended.table_range.as_deref(), Some("Summary!A1:B3"));

    let cleared = service.clear_range(&ctx(), "A1", "B2").await.unwrap();
    assert_eq!(cleared.cleared_range, "Summary!A1:B2");

    let requests = service.transport().requests();
    assert_eq!(requests[0].path[3], "Summary:append");
    assert_eq!(requests[1].path[3], "Summary!A1:B2:clear");
    assert_eq!(requests[1].method, Method::Post);
}

#[tokio::test]
async fn test_insert_then_delete_row_use_same_interval() {
    let service = SheetsService::new(MockTransport::with(vec![
        json!({ "spreadsheetId": ID, "replies": [{}] }),
        json!({ "spreadsheetId": ID, "replies": [{}] }),
    ]));

    service.insert_row(&ctx(), 3).await.unwrap();
    service.delete_row(&ctx(), 3).await.unwrap();

    let requests = service.transport().requests();
    assert_eq!(requests[0].path, vec!["spreadsheets".to_string(), format!("{}:batchUpdate", ID)]);
    assert_eq!(
        body(&requests[0])["requests"][0],
        json!({
            "insertDimension": {
                "range": { "sheetId": 0, "dimension": "ROWS", "startIndex": 2, "endIndex": 3 },
                "inheritFromBefore": true
            }
        })
    );
    assert_eq!(
        body(&requests[1])["requests"][0]["deleteDimension"]["range"],
        json!({ "sheetId": 0, "dimension": "ROWS", "startIndex": 2, "endIndex": 3 })
    );
}

#[tokio::test]
async fn test_insert_column_resolves_sheet_id() {
    let service = SheetsService::new(MockTransport::with(vec![
        metadata(),
        json!({ "spreadsheetId": ID, "replies": [{}] }),
    ]));
    let unresolved = SheetContext::new(ID, "Team Roster");

    service.insert_column(&unresolved, "A").await.unwrap();

    let requests = service.transport().requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        body(&requests[1])["requests"][0]["insertDimension"],
        json!({
            "range": { "sheetId": 314, "dimension": "COLUMNS", "startIndex": 0, "endIndex": 1 },
            "inheritFromBefore": false
        })
    );
}

#[tokio::test]
async fn test_dimension_edit_unknown_sheet() {
    let service = SheetsService::new(MockTransport::with(vec![metadata()]));
    let unresolved = SheetContext::new(ID, "Archive");

    let err = service
        .delete_dimension(&unresolved, Dimension::Columns, 2)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Address(AddressError::SheetNotFound(title)) if title == "Archive"
    ));
}

#[tokio::test]
async fn test_dimension_edit_zero_index_fails_fast() {
    let service = SheetsService::new(MockTransport::default());
    let err = service.delete_row(&ctx(), 0).await.unwrap_err();
    assert!(matches!(err, ClientError::Address(AddressError::InvalidReference(_))));
    assert!(service.transport().requests().is_empty());
}

#[tokio::test]
async fn test_protect_cells_in_range() {
    let service = SheetsService::new(MockTransport::with(vec![json!({ "replies": [{}] })]));

    service
        .protect_cells_in_range(&ctx(), "A1", "C10", "Totals")
        .await
        .unwrap();

    let request = &service.transport().requests()[0];
    assert_eq!(
        body(request)["requests"][0],
        json!({
            "addProtectedRange": {
                "protectedRange": {
                    "range": {
                        "sheetId": 0,
                        "startRowIndex": 0,
                        "endRowIndex": 10,
                        "startColumnIndex": 0,
                        "endColumnIndex": 3
                    },
                    "description": "Totals",
                    "warningOnly": false
                }
            }
        })
    );
}

#[tokio::test]
async fn test_protect_sheet_and_columns_use_policy_bounds() {
    let service = SheetsService::new(MockTransport::with(vec![
        json!({ "replies": [{}] }),
        json!({ "replies": [{}] }),
    ]));

    service.protect_sheet(&ctx(), "Locked").await.unwrap();
    service.protect_columns(&ctx(), "B", "C", "Ids").await.unwrap();

    let requests = service.transport().requests();
    let sheet = &body(&requests[0])["requests"][0]["addProtectedRange"]["protectedRange"]["range"];
    assert_eq!(sheet["endRowIndex"], 1000);
    assert_eq!(sheet["endColumnIndex"], 26);

    let columns = &body(&requests[1])["requests"][0]["addProtectedRange"]["protectedRange"]["range"];
    assert_eq!(columns["startColumnIndex"], 1);
    assert_eq!(columns["endColumnIndex"], 3);
    assert_eq!(columns["endRowIndex"], 1000);
}

#[tokio::test]
async fn test_add_and_delete_sheet() {
    let service = SheetsService::new(MockTransport::with(vec![
        json!({
            "spreadsheetId": ID,
            "replies": [{ "addSheet": { "properties": { "sheetId": 77, "title": "Archive", "index": 2 } } }]
        }),
        metadata(),
        json!({ "spreadsheetId": ID, "replies": [{}] }),
    ]));

    let archive = service.add_sheet(&ctx(), "Archive").await.unwrap();
    assert_eq!(archive.sheet_title, "Archive");
    assert_eq!(archive.sheet_id, Some(77));

    service.delete_sheet(&ctx(), "Team Roster").await.unwrap();

    let requests = service.transport().requests();
    assert_eq!(
        body(&requests[0])["requests"][0],
        json!({ "addSheet": { "properties": { "title": "Archive" } } })
    );
    assert_eq!(
        body(&requests[2])["requests"][0],
        json!({ "deleteSheet": { "sheetId": 314 } })
    );
}

#[tokio::test]
async fn test_api_errors_surface() {
    let service = SheetsService::new(MockTransport {
        requests: Mutex::new(Vec::new()),
        responses: Mutex::new(VecDeque::from(vec![Err(ClientError::from_response(
            403,
            r#"{"error":{"code":403,"message":"The caller does not have permission"}}"#,
        ))])),
    });

    let err = service.read_cells(&ctx(), "A1", "A2").await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 403, .. }));
}
