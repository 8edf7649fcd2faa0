//! Excel-style cell references used in diagnostics.

/// Converts a 0-based column index to its letters (0 → `A`, 26 → `AA`).
pub(crate) fn column_letters(col: usize) -> String {
    let mut column = col + 1;
    let mut letters = String::new();
    while column > 0 {
        column -= 1;
        letters.insert(0, char::from(b'A' + (column % 26) as u8));
        column /= 26;
    }
    letters
}

/// Converts 0-based row and column indexes to an Excel-style position (`B3`).
pub(crate) fn cell_position(row: usize, col: usize) -> String {
    format!("{}{}", column_letters(col), row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_of_first_cells() {
        assert_eq!(cell_position(0, 0), "A1");
        assert_eq!(cell_position(2, 1), "B3");
        assert_eq!(cell_position(9, 25), "Z10");
    }

    #[test]
    fn position_past_single_letter_columns() {
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }
}
