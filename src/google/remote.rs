//! Worksheets of a remote spreadsheet exposed as a row source.
use crate::error::ResultMessage;
use crate::google::RemoteError;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::check_sheet_index;
use crate::spreadsheet::sheet::Row;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::RowSource;
use crate::ParserError;

/// Spreadsheet found on the remote service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpreadsheetInfo {
    pub id: String,
    pub name: String,
    /// Worksheets in spreadsheet order
    pub worksheets: Vec<WorksheetInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorksheetInfo {
    pub title: String,
    pub index: usize,
    /// Rows allocated in the worksheet grid, populated or not
    pub row_count: usize,
}

/// Remote sheet queries. Rows are 1-based and ranges inclusive.
pub trait SheetService {
    /// Finds the spreadsheet titled `name`. The first match wins when several share it.
    fn find_spreadsheet(&self, name: &str) -> Result<SpreadsheetInfo, RemoteError>;

    /// Cells of rows `first_row..=last_row`, one inner vector per row.
    /// Trailing empty rows and cells may be omitted.
    fn query_rows(
        &self,
        spreadsheet_id: &str,
        worksheet: &WorksheetInfo,
        first_row: usize,
        last_row: usize,
    ) -> Result<Vec<Vec<CellValue>>, RemoteError>;
}

/// A remote spreadsheet opened by name through a [`SheetService`].
pub struct RemoteSpreadsheet<S> {
    service: S,
    info: SpreadsheetInfo,
}

impl<S: SheetService> RemoteSpreadsheet<S> {
    /// Looks up the spreadsheet named `name`.
    ///
    /// # Errors
    ///
    /// Fails when the service cannot find it or when it has no worksheets.
    pub fn open(service: S, name: &str) -> Result<Self, ParserError> {
        let info = service.find_spreadsheet(name)?;
        if info.worksheets.is_empty() {
            Err(RemoteError::NoWorksheets(info.name.to_owned()))?;
        }
        log::debug!(
            "Opened remote spreadsheet '{}' ({}) with {} worksheet(s)",
            info.name,
            info.id,
            info.worksheets.len()
        );
        Ok(Self { service, info })
    }

    pub fn info(&self) -> &SpreadsheetInfo {
        &self.info
    }

    fn query(&self, index: usize, first_row: usize, last_row: usize) -> Result<Vec<Row>, ParserError> {
        let worksheet = &self.info.worksheets[index];
        log::debug!(
            "Query rows {}..={} of '{}':'{}'",
            first_row,
            last_row,
            self.info.name,
            worksheet.title
        );
        let rows = self
            .service
            .query_rows(&self.info.id, worksheet, first_row, last_row)
            .map_err(ParserError::from)
            .with_prefix(&format!("Query '{}':'{}'", self.info.name, worksheet.title))?;
        Ok(rows
            .into_iter()
            .enumerate()
            .map(|(offset, cells)| Row::new(first_row - 1 + offset, cells))
            .collect())
    }
}

impl<S: SheetService> RowSource for RemoteSpreadsheet<S> {
    fn name(&self) -> String {
        self.info.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.info
            .worksheets
            .iter()
            .map(|worksheet| worksheet.title.to_owned())
            .collect()
    }

    /// Queries the header row, then every row below it in a second query.
    /// An empty first row stands in for a header the service omits.
    fn read_sheet(&mut self, index: usize) -> Result<Sheet, ParserError> {
        check_sheet_index(&*self, index)?;
        let mut rows = self.query(index, 1, 1)?;
        rows.truncate(1);
        if rows.is_empty() {
            rows.push(Row::new(0, Vec::new()));
        }
        let row_count = self.info.worksheets[index].row_count;
        if row_count >= 2 {
            rows.extend(self.query(index, 2, row_count)?);
        }
        Ok(Sheet::new(index, &self.info.worksheets[index].title, rows))
    }

    fn read_header(&mut self, index: usize) -> Result<Option<Row>, ParserError> {
        check_sheet_index(&*self, index)?;
        let header = self.query(index, 1, 1)?.into_iter().next();
        Ok(header.filter(|row| !row.is_blank()))
    }
}
