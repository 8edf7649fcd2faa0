use crate::spreadsheet::cell::CellValue;

/// One row of a sheet. Cells are indexed by absolute column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    /// Row index in the sheet (0-based)
    pub index: usize,
    /// Cells in column order; columns past the end are missing
    pub cells: Vec<CellValue>,
}

impl Row {
    pub fn new(index: usize, cells: Vec<CellValue>) -> Self {
        Self { index, cells }
    }

    /// Returns the cell at `col`, or None when the row is shorter than that.
    pub fn get(&self, col: usize) -> Option<&CellValue> {
        self.cells.get(col)
    }

    /// Returns true if the row has no cell at all. A cell holding empty text still counts.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| *cell == CellValue::Blank)
    }

    /// Sets the cell at `col`, padding skipped columns with blanks.
    pub(crate) fn set(&mut self, col: usize, value: CellValue) {
        if self.cells.len() <= col {
            self.cells.resize(col + 1, CellValue::Blank);
        }
        self.cells[col] = value;
    }

    /// Drops trailing missing cells so the row length reflects present columns.
    pub(crate) fn trim_end(&mut self) {
        while self.cells.last() == Some(&CellValue::Blank) {
            self.cells.pop();
        }
    }
}

/// A sheet read from a row source. The first row is the header row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sheet {
    /// Sheet index within its spreadsheet
    pub index: usize,
    /// Sheet name
    pub name: String,
    /// Header row first, then the non-blank rows below it in sheet order
    pub rows: Vec<Row>,
}

impl Sheet {
    /// Creates a sheet from its header row and the rows below it.
    /// The header row is always kept; blank rows after it are discarded.
    pub fn new(index: usize, name: &str, rows: Vec<Row>) -> Self {
        let mut rows = rows.into_iter();
        let header = rows.next();
        Self {
            index,
            name: name.to_owned(),
            rows: header.into_iter().chain(rows.filter(|row| !row.is_blank())).collect(),
        }
    }

    /// The header row, if the sheet has any rows.
    pub fn header_row(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Rows after the header.
    pub fn data_rows(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// Header names in column order. Blank header cells keep their slot as an empty name.
    pub fn header(&self) -> Vec<String> {
        header_names(self.header_row())
    }
}

/// Header names of `row` in column order, numbers stringified and blanks empty.
pub(crate) fn header_names(row: Option<&Row>) -> Vec<String> {
    row.map(|row| {
        row.cells
            .iter()
            .map(|cell| cell.text().map(|text| text.into_owned()).unwrap_or_default())
            .collect()
    })
    .unwrap_or_default()
}
