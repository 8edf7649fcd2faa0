//! Cell value coercion into record member types.
use crate::records::array::parse_array;
use crate::records::array::ArrayElement;
use crate::records::schema::names_match;
use crate::spreadsheet::cell::CellValue;
use std::any::type_name;
use thiserror::Error;

/// A cell that cannot be read as the requested type.
#[derive(Error, Debug, PartialEq)]
pub enum ConversionError {
    #[error("Cannot convert {kind} cell '{value}' to {target}")]
    UnsupportedKind {
        kind: &'static str,
        value: String,
        target: &'static str,
    },

    #[error("Parse '{value}' to {target} failed")]
    InvalidNumber { value: String, target: &'static str },

    #[error("'{value}' is not a variant of {target}")]
    UnknownVariant { value: String, target: &'static str },

    #[error("Cell holds error value '{0}'")]
    ErrorValue(String),
}

/// Types a cell can be coerced into.
///
/// The set is closed: integers, floats, `String`, `bool`, enums declared
/// with [`sheet_enum!`](crate::sheet_enum), `Option<T>` and `Vec<T>` of
/// array elements. A record member of any other type is rejected when its
/// schema is declared.
pub trait FromCell: Sized {
    fn from_cell(cell: &CellValue) -> Result<Self, ConversionError>;
}

/// Builds the error for a cell whose kind the target type does not accept.
fn unsupported<T>(cell: &CellValue) -> ConversionError {
    match cell {
        CellValue::Error(error) => ConversionError::ErrorValue(error.to_owned()),
        cell => ConversionError::UnsupportedKind {
            kind: cell.kind().as_str(),
            value: cell.to_string(),
            target: type_name::<T>(),
        },
    }
}

/// Numbers are used directly with truncating conversion; text holding a
/// number is parsed; formulas contribute their cached result.
macro_rules! impl_from_cell_for_number {
    ($($t:ty),* $(,)?) => {$(
        impl FromCell for $t {
            fn from_cell(cell: &CellValue) -> Result<Self, ConversionError> {
                match cell.resolved() {
                    CellValue::Number(number) => Ok(*number as $t),
                    CellValue::Text(text) => text.trim().parse::<$t>().map_err(|_| {
                        ConversionError::InvalidNumber {
                            value: text.to_owned(),
                            target: type_name::<$t>(),
                        }
                    }),
                    other => Err(unsupported::<$t>(other)),
                }
            }
        }
    )*};
}

impl_from_cell_for_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl FromCell for String {
    /// Numbers typed into a text column come back as their text (`123` → `"123"`).
    fn from_cell(cell: &CellValue) -> Result<Self, ConversionError> {
        cell.text()
            .map(|text| text.into_owned())
            .ok_or_else(|| unsupported::<String>(cell.resolved()))
    }
}

impl FromCell for bool {
    /// Text is true only when it reads `true` or `1` (any case); other text is false.
    fn from_cell(cell: &CellValue) -> Result<Self, ConversionError> {
        match cell.resolved() {
            CellValue::Bool(value) => Ok(*value),
            CellValue::Blank => Ok(false),
            CellValue::Error(error) => Err(ConversionError::ErrorValue(error.to_owned())),
            other => {
                let text = other.text().unwrap_or_default().trim().to_lowercase();
                Ok(text == "true" || text == "1")
            }
        }
    }
}

impl<T: FromCell> FromCell for Option<T> {
    /// Blank cells and empty text are absent values.
    fn from_cell(cell: &CellValue) -> Result<Self, ConversionError> {
        if cell.resolved().is_blank() {
            Ok(None)
        } else {
            T::from_cell(cell).map(Some)
        }
    }
}

impl<T: ArrayElement> FromCell for Vec<T> {
    fn from_cell(cell: &CellValue) -> Result<Self, ConversionError> {
        let text = String::from_cell(cell)?;
        Ok(parse_array(&text))
    }
}

/// Matches the cell text against declared variant names, ignoring case.
///
/// Used by enums declared with [`sheet_enum!`](crate::sheet_enum).
pub fn parse_variant<E: Clone>(cell: &CellValue, variants: &[(&str, E)]) -> Result<E, ConversionError> {
    let text = cell.text().ok_or_else(|| unsupported::<E>(cell.resolved()))?;
    let name = text.trim();
    variants
        .iter()
        .find(|(variant, _)| names_match(variant, name))
        .map(|(_, value)| value.clone())
        .ok_or_else(|| ConversionError::UnknownVariant {
            value: name.to_owned(),
            target: type_name::<E>(),
        })
}

/// Declares an enum that can be read from cells by variant name.
///
/// ```
/// sheet_parser::sheet_enum! {
///     #[derive(Clone, Copy, Debug, Default, PartialEq)]
///     pub enum Element {
///         #[default]
///         Fire,
///         Water,
///     }
/// }
///
/// use sheet_parser::records::FromCell;
/// use sheet_parser::spreadsheet::cell::CellValue;
/// let cell = CellValue::Text("water".to_owned());
/// assert_eq!(Element::from_cell(&cell), Ok(Element::Water));
/// ```
///
/// The enum must derive `Clone`.
#[macro_export]
macro_rules! sheet_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $($(#[$variant_meta])* $variant),*
        }

        impl $name {
            /// Variant names as they appear in cells
            pub const VARIANTS: &'static [(&'static str, $name)] = &[$((stringify!($variant), $name::$variant)),*];
        }

        impl $crate::records::FromCell for $name {
            fn from_cell(
                cell: &$crate::spreadsheet::cell::CellValue,
            ) -> ::std::result::Result<Self, $crate::records::ConversionError> {
                $crate::records::coerce::parse_variant(cell, Self::VARIANTS)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::sheet_enum! {
        #[derive(Clone, Copy, Debug, Default, PartialEq)]
        enum Color {
            #[default]
            Red,
            Green,
            DarkBlue,
        }
    }

    fn text(value: &str) -> CellValue {
        CellValue::Text(value.to_owned())
    }

    #[test]
    fn number_from_numeric_cell() {
        assert_eq!(i32::from_cell(&CellValue::Number(42.0)), Ok(42));
        assert_eq!(f32::from_cell(&CellValue::Number(0.25)), Ok(0.25));
        assert_eq!(i64::from_cell(&CellValue::Number(-7.9)), Ok(-7));
    }

    #[test]
    fn number_from_text_cell() {
        assert_eq!(i32::from_cell(&text("42")), Ok(42));
        assert_eq!(i16::from_cell(&text(" -3 ")), Ok(-3));
        assert_eq!(f64::from_cell(&text("2.5")), Ok(2.5));
    }

    #[test]
    fn number_from_bad_text_fails() {
        let error = i32::from_cell(&text("forty")).unwrap_err();
        assert_eq!(error, ConversionError::InvalidNumber {
            value: "forty".to_owned(),
            target: "i32",
        });
        assert!(i32::from_cell(&text("4.5")).is_err());
    }

    #[test]
    fn number_from_formula_uses_result() {
        let cell = CellValue::formula("A1+1", CellValue::Number(11.0));
        assert_eq!(u32::from_cell(&cell), Ok(11));
    }

    #[test]
    fn number_from_boolean_or_error_fails() {
        assert!(matches!(
            i32::from_cell(&CellValue::Bool(true)),
            Err(ConversionError::UnsupportedKind { kind: "boolean", .. })
        ));
        assert_eq!(
            f64::from_cell(&CellValue::Error("#DIV/0!".to_owned())),
            Err(ConversionError::ErrorValue("#DIV/0!".to_owned()))
        );
    }

    #[test]
    fn narrowing_saturates() {
        assert_eq!(u8::from_cell(&CellValue::Number(300.0)), Ok(255));
        assert_eq!(i16::from_cell(&CellValue::Number(-1e9)), Ok(i16::MIN));
    }

    #[test]
    fn string_from_numeric_cell() {
        assert_eq!(String::from_cell(&CellValue::Number(42.0)), Ok("42".to_owned()));
        assert_eq!(String::from_cell(&CellValue::Number(1.5)), Ok("1.5".to_owned()));
        assert_eq!(String::from_cell(&text("Sword")), Ok("Sword".to_owned()));
    }

    #[test]
    fn bool_from_cells() {
        assert_eq!(bool::from_cell(&CellValue::Bool(true)), Ok(true));
        assert_eq!(bool::from_cell(&text("TRUE")), Ok(true));
        assert_eq!(bool::from_cell(&text(" 1 ")), Ok(true));
        assert_eq!(bool::from_cell(&text("yes")), Ok(false));
        assert_eq!(bool::from_cell(&CellValue::Number(1.0)), Ok(true));
        assert_eq!(bool::from_cell(&CellValue::Number(0.0)), Ok(false));
    }

    #[test]
    fn enum_ignores_case() {
        assert_eq!(Color::from_cell(&text("red")), Ok(Color::Red));
        assert_eq!(Color::from_cell(&text("DARKBLUE")), Ok(Color::DarkBlue));
        assert_eq!(Color::from_cell(&text(" Green ")), Ok(Color::Green));
    }

    #[test]
    fn enum_folds_non_ascii_case() {
        let variants = [("Élan", 1), ("Straße", 2)];
        assert_eq!(parse_variant(&text("élan"), &variants), Ok(1));
        assert_eq!(parse_variant(&text("STRASSE"), &variants).ok(), None);
        assert_eq!(parse_variant(&text("STRAßE"), &variants), Ok(2));
    }

    #[test]
    fn enum_reads_formatted_text() {
        let cell = CellValue::formatted("Green", CellValue::Number(2.0));
        assert_eq!(Color::from_cell(&cell), Ok(Color::Green));
        assert_eq!(String::from_cell(&cell), Ok("Green".to_owned()));
        assert_eq!(f64::from_cell(&cell), Ok(2.0));
    }

    #[test]
    fn enum_unknown_name_fails() {
        let error = Color::from_cell(&text("Purple")).unwrap_err();
        assert!(matches!(error, ConversionError::UnknownVariant { ref value, .. } if value == "Purple"));
    }

    #[test]
    fn option_of_blank_is_none() {
        assert_eq!(Option::<i32>::from_cell(&CellValue::Blank), Ok(None));
        assert_eq!(Option::<String>::from_cell(&text("")), Ok(None));
        assert_eq!(Option::<i32>::from_cell(&text("5")), Ok(Some(5)));
        assert!(Option::<i32>::from_cell(&text("five")).is_err());
    }

    #[test]
    fn array_from_text_and_number() {
        assert_eq!(Vec::<i32>::from_cell(&text("1, 2,bad,4")), Ok(vec![1, 2, 0, 4]));
        assert_eq!(Vec::<String>::from_cell(&CellValue::Number(7.0)), Ok(vec!["7".to_owned()]));
    }
}
