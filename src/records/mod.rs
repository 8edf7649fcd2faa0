//! # Records
//!
//! Deserialization of sheet rows into typed records. The first row of a sheet
//! names the columns; each later row becomes one record whose members are
//! matched to headers by name and filled from coerced cell values.
pub mod array;
pub mod coerce;
pub mod deserializer;
pub mod filter;
pub mod schema;

pub use array::parse_array;
pub use array::ArrayElement;
pub use coerce::ConversionError;
pub use coerce::FromCell;
pub use deserializer::deserialize_all;
pub use deserializer::deserialize_one;
pub use deserializer::deserialize_rows;
pub use deserializer::SheetRecords;
pub use filter::FieldFilter;
pub use schema::Member;
pub use schema::MemberKind;
pub use schema::Record;
pub use schema::Schema;
pub use schema::SchemaBuilder;
pub use schema::SchemaError;
