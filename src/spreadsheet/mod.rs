//! # Spreadsheet Sources
//!
//! Row sources hand sheets of typed cells to the deserialization engine.
//! Local workbooks (`.xlsx`, `.xlsm`, `.xlam`, `.xlsb`, `.xls`, `.xla`,
//! `.ods`) are decoded by calamine; the remote Google Sheets source lives in
//! [`crate::google`]. Both implement [`RowSource`].
pub mod cell;
pub mod local;
pub(crate) mod reference;
pub mod sheet;

use crate::spreadsheet::sheet::header_names;
use crate::spreadsheet::sheet::Row;
use crate::spreadsheet::sheet::Sheet;
use thiserror::Error;

/// Errors raised while opening or reading a spreadsheet source.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Cannot read spreadsheet file '{0}': {1}")]
    Io(String, #[source] std::io::Error),

    #[error("Cannot detect file format for '{0}'")]
    InvalidFileFormat(String),

    #[error("Invalid spreadsheet file '{0}': {1}")]
    Decode(String, #[source] calamine::Error),

    #[error("No sheet at index {index} in '{source_name}' ({count} sheets)")]
    SheetIndexOutOfRange {
        source_name: String,
        index: usize,
        count: usize,
    },

    #[error("Sheet name '{sheet_name}' appears more than once in '{source_name}'")]
    DuplicateSheetName { source_name: String, sheet_name: String },
}

/// Capability shared by every place rows can come from.
///
/// A source owns its sheets for the duration of a call and is used by one
/// caller at a time.
pub trait RowSource {
    /// Name used in diagnostics: a file path or a remote spreadsheet name.
    fn name(&self) -> String;

    /// Sheet names in spreadsheet order.
    fn sheet_names(&self) -> Vec<String>;

    /// Reads the sheet at `index`, header row first.
    fn read_sheet(&mut self, index: usize) -> Result<Sheet, crate::ParserError>;

    /// Reads only the header row of the sheet at `index`.
    fn read_header(&mut self, index: usize) -> Result<Option<Row>, crate::ParserError> {
        Ok(self.read_sheet(index)?.rows.into_iter().next())
    }

    /// Number of sheets.
    fn sheet_count(&self) -> usize {
        self.sheet_names().len()
    }

    /// Name of the sheet at `index`.
    fn sheet_name_at(&self, index: usize) -> Option<String> {
        self.sheet_names().get(index).map(|name| name.to_owned())
    }
}

/// Header cell texts of the sheet at `sheet_index`, skipping empty cells.
///
/// Intended for discovery; deserialization keeps empty header slots so that
/// columns stay aligned.
pub fn header_row_strings<S>(source: &mut S, sheet_index: usize) -> Result<Vec<String>, crate::ParserError>
where
    S: RowSource + ?Sized,
{
    check_sheet_index(&*source, sheet_index)?;
    let header = source.read_header(sheet_index)?;
    Ok(header_names(header.as_ref())
        .into_iter()
        .filter(|name| !name.is_empty())
        .collect())
}

/// Fails with [`SpreadsheetError::SheetIndexOutOfRange`] unless `index` names a sheet of `source`.
pub(crate) fn check_sheet_index<S>(source: &S, index: usize) -> Result<(), SpreadsheetError>
where
    S: RowSource + ?Sized,
{
    let count = source.sheet_count();
    if index < count {
        Ok(())
    } else {
        Err(SpreadsheetError::SheetIndexOutOfRange {
            source_name: source.name(),
            index,
            count,
        })
    }
}
