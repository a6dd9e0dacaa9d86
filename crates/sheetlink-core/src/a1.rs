//! A1 notation addressing.
//!
//! Columns use bijective base-26 (A=1 … Z=26, AA=27 … ZZ=702); there is no zero digit.
//! Everything here is 1-based; conversion to the API's 0-based indices happens in
//! [`crate::translate`].

use crate::error::AddressError;
use crate::range::{CellAddress, GridOrigin, SheetRange};

/// Highest addressable column ("ZZ")
pub const MAX_COLUMN: u32 = 702;
/// Highest addressable row
pub const MAX_ROW: u32 = 100_000;

/// Split `s` into its leading letter run and trailing digit run.
///
/// Returns `None` unless both runs are non-empty and nothing else follows.
fn split_reference(s: &str) -> Option<(&str, &str)> {
    let split = s.find(|c: char| !c.is_ascii_alphabetic())?;
    let (letters, digits) = s.split_at(split);
    if letters.is_empty() || digits.is_empty() {
        return None;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((letters, digits))
}

/// Decode a letter run, stopping as soon as the value leaves the addressable range.
fn decode_letters(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }

    let mut acc: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        acc = acc * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        if acc > MAX_COLUMN {
            return None;
        }
    }
    Some(acc)
}

/// Parse a row digit run. Leading zeros are rejected so "A01" never aliases "A1".
fn decode_row(digits: &str) -> Option<u32> {
    if digits.starts_with('0') || digits.len() > 6 {
        return None;
    }
    let row: u32 = digits.parse().ok()?;
    (1..=MAX_ROW).contains(&row).then_some(row)
}

/// Check whether `s` is a single A1 cell reference within sheet bounds.
pub fn is_valid_cell_reference(s: &str) -> bool {
    match split_reference(s) {
        Some((letters, digits)) => decode_letters(letters).is_some() && decode_row(digits).is_some(),
        None => false,
    }
}

/// Parse an A1 cell reference (e.g. "B2" -> column 2, row 2).
pub fn parse_cell_reference(s: &str) -> Result<CellAddress, AddressError> {
    let invalid = || AddressError::InvalidReference(s.to_string());

    if !is_valid_cell_reference(s) {
        return Err(invalid());
    }
    let (letters, digits) = split_reference(s).ok_or_else(invalid)?;
    let column = try_column_name_to_number(letters)?;
    let row = digits.parse::<u32>().map_err(|_| invalid())?.clamp(1, MAX_ROW);

    Ok(CellAddress { column, row })
}

/// Convert column letters to a 1-based column number.
///
/// Lenient: empty or non-letter input yields 1 and the result is capped at
/// [`MAX_COLUMN`]. Use [`try_column_name_to_number`] when bad input must fail.
pub fn column_name_to_number(letters: &str) -> u32 {
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return 1;
    }

    let mut acc: u32 = 0;
    for c in letters.chars() {
        acc = acc * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
        if acc > MAX_COLUMN {
            return MAX_COLUMN;
        }
    }
    acc.max(1)
}

/// Strict form of [`column_name_to_number`].
pub fn try_column_name_to_number(letters: &str) -> Result<u32, AddressError> {
    decode_letters(letters).ok_or_else(|| AddressError::InvalidReference(letters.to_string()))
}

/// Convert a 1-based column number to letters (1 -> "A", 27 -> "AA").
///
/// Out-of-range input (0 or above [`MAX_COLUMN`]) yields "A".
pub fn column_number_to_name(n: u32) -> String {
    if n == 0 || n > MAX_COLUMN {
        return "A".to_string();
    }

    let mut label = String::new();
    let mut n = n;
    while n > 0 {
        n -= 1;
        label.insert(0, char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    label
}

/// Extract the top-left cell of a sheet-qualified range string such as
/// `Sheet1!B3:D9` or `'My Sheet'!A1`.
///
/// The API echoes the range it actually served, which may start before the
/// range that was asked for, so this is the authoritative grid origin.
pub fn parse_sheet_range_origin(range: &str) -> Result<GridOrigin, AddressError> {
    match SheetRange::parse(range) {
        Ok(SheetRange { sheet: Some(_), range: cells }) => Ok(cells.from),
        _ => Err(AddressError::InvalidRange(range.to_string())),
    }
}
