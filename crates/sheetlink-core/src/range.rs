use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::char,
    combinator::{all_consuming, map, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded, terminated},
    IResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::a1::{column_number_to_name, is_valid_cell_reference, parse_cell_reference, MAX_COLUMN, MAX_ROW};
use crate::error::AddressError;

/// Cell address (1-based column and row, as written in A1 notation)
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellAddress {
    pub column: u32,
    pub row: u32,
}

/// Top-left absolute address of a value grid returned by the API
pub type GridOrigin = CellAddress;

impl CellAddress {
    /// Create an address, rejecting coordinates outside the sheet bounds
    pub fn new(column: u32, row: u32) -> Result<Self, AddressError> {
        let cell = CellAddress { column, row };
        cell.validate()?;
        Ok(cell)
    }

    /// Check the coordinates against the sheet bounds. Needed for addresses built
    /// from public fields or deserialized from host input.
    pub fn validate(&self) -> Result<(), AddressError> {
        if !(1..=MAX_COLUMN).contains(&self.column) || !(1..=MAX_ROW).contains(&self.row) {
            return Err(AddressError::InvalidReference(format!(
                "column {} row {}",
                self.column, self.row
            )));
        }
        Ok(())
    }

    /// Convert to A1 notation (e.g., (2, 12) -> "B12")
    pub fn to_a1(&self) -> String {
        format!("{}{}", column_number_to_name(self.column), self.row)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

impl FromStr for CellAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cell_reference(s)
    }
}

/// A rectangular range of cells (e.g., A1:C10). `from` is always top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub from: CellAddress,
    pub to: CellAddress,
}

impl CellRange {
    /// Create a range; an inverted range is an error rather than being normalized
    pub fn new(from: CellAddress, to: CellAddress) -> Result<Self, AddressError> {
        let range = CellRange { from, to };
        if !range.is_ordered() {
            return Err(AddressError::InvalidRange(format!("{}:{}", from, to)));
        }
        Ok(range)
    }

    pub fn single(cell: CellAddress) -> Self {
        CellRange { from: cell, to: cell }
    }

    /// Parse "A1:C10" or a single "B2"
    pub fn parse(notation: &str) -> Result<Self, AddressError> {
        match notation.split_once(':') {
            Some((from, to)) => CellRange::new(parse_cell_reference(from)?, parse_cell_reference(to)?),
            None => Ok(CellRange::single(parse_cell_reference(notation)?)),
        }
    }

    /// Parse a pair of endpoint references as given by callers ("A1", "C10")
    pub fn from_endpoints(from: &str, to: &str) -> Result<Self, AddressError> {
        CellRange::new(parse_cell_reference(from)?, parse_cell_reference(to)?)
    }

    /// Both endpoints in bounds (`InvalidReference`) and `from` top-left of `to` (`InvalidRange`)
    pub fn validate(&self) -> Result<(), AddressError> {
        self.from.validate()?;
        self.to.validate()?;
        if !self.is_ordered() {
            return Err(AddressError::InvalidRange(format!("{}:{}", self.from, self.to)));
        }
        Ok(())
    }

    fn is_ordered(&self) -> bool {
        self.from.column <= self.to.column && self.from.row <= self.to.row
    }

    /// Convert to A1:B1 notation
    pub fn to_a1(&self) -> String {
        if self.is_single_cell() {
            self.from.to_a1()
        } else {
            format!("{}:{}", self.from.to_a1(), self.to.to_a1())
        }
    }

    pub fn contains(&self, cell: CellAddress) -> bool {
        cell.row >= self.from.row
            && cell.row <= self.to.row
            && cell.column >= self.from.column
            && cell.column <= self.to.column
    }

    pub fn row_count(&self) -> u32 {
        self.to.row - self.from.row + 1
    }

    pub fn column_count(&self) -> u32 {
        self.to.column - self.from.column + 1
    }

    pub fn is_single_cell(&self) -> bool {
        self.from == self.to
    }

    /// Iterate over all addresses in the range (row by row)
    pub fn iter(&self) -> CellRangeIter {
        CellRangeIter {
            range: *self,
            row: self.from.row,
            column: self.from.column,
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

impl FromStr for CellRange {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellRange::parse(s)
    }
}

impl IntoIterator for CellRange {
    type Item = CellAddress;
    type IntoIter = CellRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over addresses in a range
pub struct CellRangeIter {
    range: CellRange,
    row: u32,
    column: u32,
}

impl Iterator for CellRangeIter {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row > self.range.to.row {
            return None;
        }

        let cell = CellAddress { column: self.column, row: self.row };

        self.column += 1;
        if self.column > self.range.to.column {
            self.column = self.range.from.column;
            self.row += 1;
        }

        Some(cell)
    }
}

/// A range optionally qualified by a sheet title (e.g., `'My Sheet'!A1:B2`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRange {
    pub sheet: Option<String>,
    pub range: CellRange,
}

/// Parse a sheet title (quoted or unquoted).
/// Examples: Sheet1, 'Sheet Name', 'Sheet''s Data'
fn parse_sheet_title(input: &str) -> IResult<&str, String> {
    alt((
        map(
            delimited(
                char('\''),
                recognize(many0(alt((take_while1(|c: char| c != '\''), tag("''"))))),
                char('\''),
            ),
            |s: &str| s.replace("''", "'"),
        ),
        map(
            take_while1(|c: char| c != '!' && c != '\'' && c != ':'),
            |s: &str| s.to_string(),
        ),
    ))(input)
}

fn parse_cell_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric())(input)
}

type SheetRangeParts<'a> = (Option<String>, (&'a str, Option<&'a str>));

fn parse_sheet_range_parts(input: &str) -> IResult<&str, SheetRangeParts<'_>> {
    all_consuming(pair(
        opt(terminated(parse_sheet_title, char('!'))),
        pair(parse_cell_token, opt(preceded(char(':'), parse_cell_token))),
    ))(input)
}

impl SheetRange {
    /// Parse `Sheet1!A1:B2`, `'My Sheet'!C3` or a bare `A1:B2`
    pub fn parse(notation: &str) -> Result<Self, AddressError> {
        let (_, (sheet, (from, to))) = parse_sheet_range_parts(notation.trim())
            .map_err(|_| AddressError::InvalidRange(notation.to_string()))?;

        let from = parse_cell_reference(from)?;
        let range = match to {
            Some(to) => CellRange::new(from, parse_cell_reference(to)?)?,
            None => CellRange::single(from),
        };

        Ok(SheetRange { sheet, range })
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet {
            Some(title) => write!(f, "{}!{}", quote_sheet_title(title), self.range),
            None => write!(f, "{}", self.range),
        }
    }
}

/// Quote a sheet title for use in a range string when it is not a plain identifier
pub fn quote_sheet_title(title: &str) -> String {
    let plain = !title.is_empty()
        && title.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !title.starts_with(|c: char| c.is_ascii_digit())
        && !is_valid_cell_reference(title);

    if plain {
        title.to_string()
    } else {
        format!("'{}'", title.replace('\'', "''"))
    }
}
