//! # Sheet Parser
//!
//! Deserialize spreadsheet rows into typed records. The first row of a sheet
//! is its header; every later row becomes one record whose members are
//! matched to header names and filled from the row's cells.
//!
//! ## Features
//!
//! - **Local workbooks**: Excel (`.xls`, `.xlsx`, `.xlsm`, `.xlsb`, `.xla`, `.xlam`)
//!   and OpenDocument (`.ods`) files
//! - **Google Sheets**: spreadsheets found on Drive by name, authorized with OAuth 2.0
//! - **Cell coercion**: numbers read from text and text from numbers, booleans,
//!   enums by name, optional values
//! - **Delimited arrays**: cells such as `1, 2; 3` read into `Vec<T>`
//! - **Tolerant reads**: a cell that cannot be converted is logged and leaves its
//!   member at the default value
//!
//! ## Example
//!
//! ```no_run
//! use sheet_parser::records::deserialize_one;
//! use sheet_parser::spreadsheet::local::LocalSpreadsheet;
//!
//! #[derive(Debug, Default)]
//! struct Item {
//!     name: String,
//!     damage: i32,
//! }
//!
//! sheet_parser::sheet_record!(Item { "Name" => name, "Damage" => damage });
//!
//! let mut workbook = LocalSpreadsheet::open("items.xlsx")?;
//! let items: Vec<Item> = deserialize_one(&mut workbook, 0, None)?;
//! # Ok::<(), sheet_parser::ParserError>(())
//! ```
mod error;
pub mod google;
pub mod records;
pub mod spreadsheet;

pub use crate::error::ParserError;
pub use crate::records::deserialize_all;
pub use crate::records::deserialize_one;
pub use crate::records::FieldFilter;
pub use crate::records::Record;
pub use crate::spreadsheet::header_row_strings;
pub use crate::spreadsheet::RowSource;
