use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::AddressError;
use crate::range::{quote_sheet_title, CellRange};
use crate::wire::Spreadsheet;

/// Shortest string accepted as a bare spreadsheet id (real ids are 44 characters)
const MIN_BARE_ID_LEN: usize = 20;

const SPREADSHEET_URL_PATTERN: &str = r"/spreadsheets/d/([A-Za-z0-9_-]+)";

static URL_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn url_pattern() -> Option<&'static Regex> {
    URL_PATTERN
        .get_or_init(|| match Regex::new(SPREADSHEET_URL_PATTERN) {
            Ok(re) => Some(re),
            Err(err) => {
                tracing::error!("spreadsheet URL pattern failed to compile: {}", err);
                None
            }
        })
        .as_ref()
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Extract the spreadsheet id from a sharing/edit URL, or accept a bare id.
///
/// `https://docs.google.com/spreadsheets/d/<id>/edit#gid=0` -> `<id>`
pub fn spreadsheet_id_from_url(url: &str) -> Option<String> {
    let url = url.trim();
    if let Some(captures) = url_pattern().and_then(|re| re.captures(url)) {
        return captures.get(1).map(|m| m.as_str().to_string());
    }

    if url.len() >= MIN_BARE_ID_LEN && url.chars().all(is_id_char) {
        return Some(url.to_string());
    }
    None
}

/// The spreadsheet and sheet an operation targets.
///
/// Built once and passed explicitly to every call; selecting another sheet
/// produces a new context rather than mutating this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetContext {
    pub spreadsheet_id: String,
    pub sheet_title: String,
    pub sheet_id: Option<i32>,
}

impl SheetContext {
    pub fn new(spreadsheet_id: impl Into<String>, sheet_title: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            sheet_title: sheet_title.into(),
            sheet_id: None,
        }
    }

    pub fn with_sheet(&self, sheet_title: impl Into<String>, sheet_id: i32) -> Self {
        Self {
            spreadsheet_id: self.spreadsheet_id.clone(),
            sheet_title: sheet_title.into(),
            sheet_id: Some(sheet_id),
        }
    }

    /// Sheet-qualified A1 string for value requests (e.g. `'My Sheet'!A1:B2`)
    pub fn qualify(&self, range: &CellRange) -> String {
        format!("{}!{}", quote_sheet_title(&self.sheet_title), range)
    }

    /// Range string covering the whole sheet
    pub fn whole_sheet(&self) -> String {
        quote_sheet_title(&self.sheet_title)
    }

    /// The numeric sheet id, failing when the context was never resolved
    pub fn require_sheet_id(&self) -> Result<i32, AddressError> {
        self.sheet_id
            .ok_or_else(|| AddressError::SheetNotFound(self.sheet_title.clone()))
    }
}

/// Sheet title -> sheet id lookup built from spreadsheet metadata
#[derive(Debug, Clone, Default)]
pub struct SheetDirectory {
    ids: HashMap<String, i32>,
    titles: Vec<String>,
}

impl SheetDirectory {
    pub fn from_spreadsheet(spreadsheet: &Spreadsheet) -> Self {
        let mut sheets: Vec<_> = spreadsheet.sheets.iter().map(|s| &s.properties).collect();
        sheets.sort_by_key(|p| p.index);

        let mut directory = SheetDirectory::default();
        for properties in sheets {
            directory.ids.insert(properties.title.clone(), properties.sheet_id);
            directory.titles.push(properties.title.clone());
        }
        directory
    }

    pub fn sheet_id(&self, title: &str) -> Result<i32, AddressError> {
        self.ids
            .get(title)
            .copied()
            .ok_or_else(|| AddressError::SheetNotFound(title.to_string()))
    }

    /// Sheet titles in tab order
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn first(&self) -> Option<(&str, i32)> {
        let title = self.titles.first()?;
        Some((title.as_str(), *self.ids.get(title)?))
    }

    /// Resolve `title` against this directory into a fully populated context
    pub fn resolve(&self, spreadsheet_id: &str, title: &str) -> Result<SheetContext, AddressError> {
        let sheet_id = self.sheet_id(title)?;
        Ok(SheetContext {
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_title: title.to_string(),
            sheet_id: Some(sheet_id),
        })
    }
}
