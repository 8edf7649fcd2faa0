//! Rows to records: header matching, coercion and per-cell error reporting.
use crate::records::filter::accepts;
use crate::records::filter::FieldFilter;
use crate::records::schema::Member;
use crate::records::schema::Record;
use crate::records::schema::Schema;
use crate::spreadsheet::check_sheet_index;
use crate::spreadsheet::reference::cell_position;
use crate::spreadsheet::sheet::header_names;
use crate::spreadsheet::sheet::Row;
use crate::spreadsheet::RowSource;
use crate::spreadsheet::SpreadsheetError;
use crate::ParserError;
use std::any::type_name;

/// Records of every sheet of a source, keyed by sheet name in sheet order.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetRecords<T> {
    sheets: Vec<(String, Vec<T>)>,
}

impl<T> SheetRecords<T> {
    /// Records of the sheet named `sheet_name`.
    pub fn get(&self, sheet_name: &str) -> Option<&[T]> {
        self.sheets
            .iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, records)| records.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.sheets
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    /// Number of sheets.
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl<T> IntoIterator for SheetRecords<T> {
    type Item = (String, Vec<T>);
    type IntoIter = std::vec::IntoIter<(String, Vec<T>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.sheets.into_iter()
    }
}

/// A header column bound to the member it populates.
struct Column<'a, T> {
    index: usize,
    header: &'a str,
    member: &'a Member<T>,
}

/// Deserializes `rows` into records, using the first row as the header.
///
/// A header that passes `filter` and names a writable member populates that
/// member from its column; other columns are ignored. Blank or missing cells
/// leave the member at its default. A cell that cannot be coerced is logged
/// with `context` and its position, and the record keeps its default for
/// that member.
///
/// # Errors
///
/// Fails only when the record's schema is invalid.
pub fn deserialize_rows<T: Record>(
    context: &str,
    rows: &[Row],
    filter: Option<&FieldFilter>,
) -> Result<Vec<T>, ParserError> {
    let schema = T::schema()?;
    Ok(deserialize_with(&schema, context, rows, filter))
}

/// Deserializes the sheet at `sheet_index` of `source`.
///
/// # Errors
///
/// Fails when the index does not name a sheet, the sheet cannot be read, or
/// the record's schema is invalid.
pub fn deserialize_one<T, S>(
    source: &mut S,
    sheet_index: usize,
    filter: Option<&FieldFilter>,
) -> Result<Vec<T>, ParserError>
where
    T: Record,
    S: RowSource + ?Sized,
{
    check_sheet_index(&*source, sheet_index)?;
    let schema = T::schema()?;
    let sheet = source.read_sheet(sheet_index)?;
    let context = format!("{}:{}", source.name(), sheet.name);
    Ok(deserialize_with(&schema, &context, &sheet.rows, filter))
}

/// Deserializes every sheet of `source`, in sheet order.
///
/// # Errors
///
/// Fails when a sheet cannot be read, two sheets share a name, or the
/// record's schema is invalid. No partial result is returned.
pub fn deserialize_all<T, S>(source: &mut S, filter: Option<&FieldFilter>) -> Result<SheetRecords<T>, ParserError>
where
    T: Record,
    S: RowSource + ?Sized,
{
    let schema = T::schema()?;
    let source_name = source.name();
    let mut sheets: Vec<(String, Vec<T>)> = Vec::with_capacity(source.sheet_count());
    for index in 0..source.sheet_count() {
        let sheet = source.read_sheet(index)?;
        if sheets.iter().any(|(name, _)| *name == sheet.name) {
            Err(SpreadsheetError::DuplicateSheetName {
                source_name: source_name.to_owned(),
                sheet_name: sheet.name.to_owned(),
            })?;
        }
        let context = format!("{}:{}", source_name, sheet.name);
        let records = deserialize_with(&schema, &context, &sheet.rows, filter);
        sheets.push((sheet.name, records));
    }
    Ok(SheetRecords { sheets })
}

fn deserialize_with<T: Record>(schema: &Schema<T>, context: &str, rows: &[Row], filter: Option<&FieldFilter>) -> Vec<T> {
    let Some((header_row, data_rows)) = rows.split_first() else {
        return Vec::new();
    };

    let header = header_names(Some(header_row));
    let columns: Vec<Column<T>> = header
        .iter()
        .enumerate()
        .filter(|(_, name)| accepts(filter, name))
        .filter_map(|(index, name)| {
            schema.resolve(name).map(|member| Column {
                index,
                header: name.as_str(),
                member,
            })
        })
        .collect();
    log::debug!(
        "Deserialize {} row(s) of '{}' into {} using {} of {} column(s)",
        data_rows.len(),
        context,
        type_name::<T>(),
        columns.len(),
        header.len()
    );

    data_rows
        .iter()
        .map(|row| {
            let mut record = T::default();
            for column in &columns {
                let Some(cell) = row.get(column.index).filter(|cell| !cell.is_blank()) else {
                    continue;
                };
                if let Err(error) = column.member.assign(&mut record, cell) {
                    log::error!(
                        "Deserialize '{}' {} (header '{}') into {} failed: {}",
                        context,
                        cell_position(row.index, column.index),
                        column.header,
                        type_name::<T>(),
                        error
                    );
                }
            }
            record
        })
        .collect()
}
