//! Local workbook files decoded with calamine.
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::check_sheet_index;
use crate::spreadsheet::sheet::Row;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::RowSource;
use crate::spreadsheet::SpreadsheetError;
use crate::ParserError;
use calamine::Data;
use calamine::Ods;
use calamine::Range;
use calamine::Reader;
use calamine::Xls;
use calamine::Xlsb;
use calamine::Xlsx;
use std::ffi::OsStr;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Workbook bytes held in memory once the file has been read
type MemoryReader = Cursor<Vec<u8>>;

/// Container formats, each backed by its calamine reader.
enum Workbook {
    /// Excel 2007+ (.xlsx, .xlsm, .xlam)
    Xlsx(Xlsx<MemoryReader>),
    /// Excel binary (.xlsb)
    Xlsb(Xlsb<MemoryReader>),
    /// Legacy Excel (.xls, .xla)
    Xls(Xls<MemoryReader>),
    /// OpenDocument (.ods)
    Ods(Ods<MemoryReader>),
}

/// Reads the value range and the formula range of one worksheet.
/// A failure to read formulas is not fatal: the sheet is read without them.
macro_rules! read_worksheet {
    ($reader:expr, $name:expr) => {{
        let values = $reader.worksheet_range($name).map_err(calamine::Error::from)?;
        let formulas = $reader.worksheet_formula($name).map_err(calamine::Error::from);
        (values, formulas)
    }};
}

impl Workbook {
    fn sheet_names(&self) -> Vec<String> {
        match self {
            Self::Xlsx(xlsx) => xlsx.sheet_names(),
            Self::Xlsb(xlsb) => xlsb.sheet_names(),
            Self::Xls(xls) => xls.sheet_names(),
            Self::Ods(ods) => ods.sheet_names(),
        }
    }

    fn worksheet(
        &mut self,
        name: &str,
    ) -> Result<(Range<Data>, Result<Range<String>, calamine::Error>), calamine::Error> {
        let ranges = match self {
            Self::Xlsx(xlsx) => read_worksheet!(xlsx, name),
            Self::Xlsb(xlsb) => read_worksheet!(xlsb, name),
            Self::Xls(xls) => read_worksheet!(xls, name),
            Self::Ods(ods) => read_worksheet!(ods, name),
        };
        Ok(ranges)
    }
}

/// A spreadsheet file on disk.
///
/// The file is read into memory by [`LocalSpreadsheet::open`] and its handle
/// released before any sheet is decoded.
pub struct LocalSpreadsheet {
    /// File name of the spreadsheet
    name: String,
    workbook: Workbook,
    sheet_names: Vec<String>,
}

impl LocalSpreadsheet {
    /// Opens a spreadsheet file, detecting its format from the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not a supported workbook format,
    /// the file cannot be read, or the container is corrupt.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SpreadsheetError> {
        let path = path.as_ref();
        let name = path.to_string_lossy().to_string();
        let extension = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        let open: fn(MemoryReader) -> Result<Workbook, calamine::Error> = match extension.as_deref() {
            Some("xlsx") | Some("xlsm") | Some("xlam") => |reader| Ok(Workbook::Xlsx(Xlsx::new(reader)?)),
            Some("xlsb") => |reader| Ok(Workbook::Xlsb(Xlsb::new(reader)?)),
            Some("xls") | Some("xla") => |reader| Ok(Workbook::Xls(Xls::new(reader)?)),
            Some("ods") => |reader| Ok(Workbook::Ods(Ods::new(reader)?)),
            _ => return Err(SpreadsheetError::InvalidFileFormat(name)),
        };

        let bytes = fs::read(path).map_err(|error| SpreadsheetError::Io(name.to_owned(), error))?;
        let workbook = open(Cursor::new(bytes)).map_err(|error| SpreadsheetError::Decode(name.to_owned(), error))?;
        let sheet_names = workbook.sheet_names();
        log::debug!("Opened '{}' with {} sheet(s)", name, sheet_names.len());
        Ok(Self {
            name,
            workbook,
            sheet_names,
        })
    }
}

impl RowSource for LocalSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheet_names.to_owned()
    }

    fn read_sheet(&mut self, index: usize) -> Result<Sheet, ParserError> {
        check_sheet_index(&*self, index)?;
        let sheet_name = self.sheet_names[index].to_owned();
        let (values, formulas) = self
            .workbook
            .worksheet(&sheet_name)
            .map_err(|error| SpreadsheetError::Decode(self.name.to_owned(), error))?;
        let formulas = match formulas {
            Ok(formulas) => Some(formulas),
            Err(error) => {
                log::warn!("Read formulas of '{}':'{}' failed: {}", self.name, sheet_name, error);
                None
            }
        };

        let rows = to_rows(&values, formulas.as_ref());
        log::debug!("Read {} row(s) from '{}':'{}'", rows.len(), self.name, sheet_name);
        Ok(Sheet::new(index, &sheet_name, rows))
    }
}

/// Converts a calamine value range into rows addressed by absolute row and column.
/// A range that starts below the first row gets an empty header row.
fn to_rows(values: &Range<Data>, formulas: Option<&Range<String>>) -> Vec<Row> {
    let Some((row_lower_bound, col_lower_bound)) = values.start() else {
        return Vec::new();
    };

    let header = (row_lower_bound > 0).then(|| Row::new(0, Vec::new()));
    let rows = values
        .rows()
        .enumerate()
        .map(|(row_offset, cells)| {
            let row_index = row_lower_bound + row_offset as u32;
            let mut row = Row::new(row_index as usize, Vec::with_capacity(cells.len()));
            for (col_offset, data) in cells.iter().enumerate() {
                let col_index = col_lower_bound + col_offset as u32;
                let value = to_cell_value(data);
                let expression = formulas
                    .and_then(|formulas| formulas.get_value((row_index, col_index)))
                    .filter(|expression| !expression.is_empty());
                let value = match expression {
                    Some(expression) => CellValue::formula(expression.to_owned(), value),
                    None => value,
                };
                if value != CellValue::Blank {
                    row.set(col_index as usize, value);
                }
            }
            row.trim_end();
            row
        });
    header.into_iter().chain(rows).collect()
}

/// Maps a calamine cell onto the native cell kinds. Dates keep their serial number.
fn to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Blank,
        Data::Bool(value) => CellValue::Bool(*value),
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Float(value) => CellValue::Number(*value),
        Data::String(value) => CellValue::Text(value.to_owned()),
        Data::DateTime(value) => CellValue::Number(value.as_f64()),
        Data::DateTimeIso(value) => CellValue::Text(value.to_owned()),
        Data::DurationIso(value) => CellValue::Text(value.to_owned()),
        Data::Error(error) => CellValue::Error(error.to_string()),
    }
}
