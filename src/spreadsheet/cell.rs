use std::borrow::Cow;
use std::fmt::Display;

/// Native content category of a cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CellKind {
    #[default]
    Blank,
    Number,
    Text,
    Boolean,
    /// Formula with a cached result
    Formula,
    /// Error values such as `#DIV/0!`
    Error,
}

impl CellKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Number => "number",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Formula => "formula",
            Self::Error => "error",
        }
    }
}

/// Raw content of a single cell, untyped until coerced.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Blank,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Formula cell: the expression text and the value last computed by the authoring application
    Formula {
        expression: String,
        result: Box<CellValue>,
    },
    Error(String),
    /// Value shown with the text its number format renders, such as `50%` for `0.5`
    Formatted {
        text: String,
        value: Box<CellValue>,
    },
}

impl CellValue {
    /// Builds a formula cell from its expression and cached result.
    pub fn formula(expression: impl Into<String>, result: CellValue) -> Self {
        Self::Formula {
            expression: expression.into(),
            result: Box::new(result),
        }
    }

    /// Builds a cell whose displayed text differs from its value.
    pub fn formatted(text: impl Into<String>, value: CellValue) -> Self {
        Self::Formatted {
            text: text.into(),
            value: Box::new(value),
        }
    }

    pub fn kind(&self) -> CellKind {
        match self {
            Self::Blank => CellKind::Blank,
            Self::Number(_) => CellKind::Number,
            Self::Text(_) => CellKind::Text,
            Self::Bool(_) => CellKind::Boolean,
            Self::Formula { .. } => CellKind::Formula,
            Self::Error(_) => CellKind::Error,
            Self::Formatted { value, .. } => value.kind(),
        }
    }

    /// Returns true for blank cells. Empty text counts as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Blank => true,
            Self::Text(text) => text.is_empty(),
            Self::Formatted { text, value } => text.is_empty() && value.is_blank(),
            _ => false,
        }
    }

    /// Follows a formula to its cached result and a formatted cell to its
    /// value; other values are returned as-is.
    pub fn resolved(&self) -> &CellValue {
        match self {
            Self::Formula { result, .. } => result.resolved(),
            Self::Formatted { value, .. } => value.resolved(),
            value => value,
        }
    }

    /// Text content of the cell, with numbers and booleans stringified.
    /// Formatted cells give their displayed text. Returns None for error cells.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Blank => Some(Cow::Borrowed("")),
            Self::Text(text) => Some(Cow::Borrowed(text.as_str())),
            Self::Number(number) => Some(Cow::Owned(format_number(*number))),
            Self::Bool(value) => Some(Cow::Borrowed(if *value { "true" } else { "false" })),
            Self::Formatted { text, .. } => Some(Cow::Borrowed(text.as_str())),
            Self::Formula { result, .. } => result.text(),
            Self::Error(_) => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.text(), self.resolved()) {
            (Some(text), _) => write!(f, "{text}"),
            (None, Self::Error(error)) => write!(f, "{error}"),
            (None, _) => Ok(()),
        }
    }
}

/// Formats a number the way it reads in a sheet: `42.0` becomes `42`.
pub(crate) fn format_number(number: f64) -> String {
    number.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_format_without_trailing_zero() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-3.5), "-3.5");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn text_of_each_kind() {
        assert_eq!(CellValue::Number(123.0).text().as_deref(), Some("123"));
        assert_eq!(CellValue::Text("abc".to_owned()).text().as_deref(), Some("abc"));
        assert_eq!(CellValue::Bool(true).text().as_deref(), Some("true"));
        assert_eq!(CellValue::Blank.text().as_deref(), Some(""));
        assert_eq!(CellValue::Error("#N/A".to_owned()).text(), None);
    }

    #[test]
    fn formula_resolves_to_result() {
        let cell = CellValue::formula("A1*2", CellValue::Number(8.0));
        assert_eq!(cell.kind(), CellKind::Formula);
        assert_eq!(cell.resolved(), &CellValue::Number(8.0));
        assert_eq!(cell.text().as_deref(), Some("8"));
    }

    #[test]
    fn formatted_text_over_value() {
        let cell = CellValue::formatted("50%", CellValue::Number(0.5));
        assert_eq!(cell.kind(), CellKind::Number);
        assert_eq!(cell.resolved(), &CellValue::Number(0.5));
        assert_eq!(cell.text().as_deref(), Some("50%"));
        assert_eq!(cell.to_string(), "50%");
        assert!(!cell.is_blank());
    }

    #[test]
    fn error_displays_its_value() {
        let cell = CellValue::formula("1/0", CellValue::Error("#DIV/0!".to_owned()));
        assert_eq!(cell.text(), None);
        assert_eq!(cell.to_string(), "#DIV/0!");
    }

    #[test]
    fn empty_text_is_blank() {
        assert!(CellValue::Blank.is_blank());
        assert!(CellValue::Text(String::new()).is_blank());
        assert!(!CellValue::Text(" ".to_owned()).is_blank());
        assert!(!CellValue::Number(0.0).is_blank());
    }
}
