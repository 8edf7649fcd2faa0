//! Delimited text arrays such as `1, 2; 3`.

/// Characters separating array segments.
const DELIMITERS: &[char] = &[',', ';'];

/// Element types a delimited text cell can be split into.
pub trait ArrayElement: Sized {
    /// Parses one trimmed segment.
    fn parse_segment(segment: &str) -> Option<Self>;

    /// Value substituted for a segment that does not parse.
    fn zero() -> Self;
}

macro_rules! impl_array_element_for_number {
    ($($t:ty),* $(,)?) => {$(
        impl ArrayElement for $t {
            fn parse_segment(segment: &str) -> Option<Self> {
                segment.parse::<$t>().ok()
            }

            fn zero() -> Self {
                <$t>::default()
            }
        }
    )*};
}

impl_array_element_for_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl ArrayElement for String {
    fn parse_segment(segment: &str) -> Option<Self> {
        Some(segment.to_owned())
    }

    fn zero() -> Self {
        String::new()
    }
}

/// Splits `text` on `,` and `;` into typed elements.
///
/// Empty segments are dropped, the rest are trimmed and parsed in order.
/// A segment that fails to parse becomes [`ArrayElement::zero`] instead of
/// failing the whole array.
pub fn parse_array<T: ArrayElement>(text: &str) -> Vec<T> {
    text.split(DELIMITERS)
        .filter(|segment| !segment.is_empty())
        .map(str::trim)
        .map(|segment| T::parse_segment(segment).unwrap_or_else(T::zero))
        .collect()
}
