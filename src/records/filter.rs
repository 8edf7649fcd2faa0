use std::collections::HashSet;

/// Header names a caller wants populated.
///
/// Matching is exact and case-sensitive. An empty filter accepts every
/// header, the same as passing no filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldFilter {
    names: HashSet<String>,
}

impl FieldFilter {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Checks if a header should be deserialized.
    /// Returns true if no names are given or if the header is one of them.
    pub fn accept(&self, header: &str) -> bool {
        self.names.is_empty() || self.names.contains(header)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FieldFilter {
    fn from_iter<I: IntoIterator<Item = S>>(names: I) -> Self {
        Self::new(names)
    }
}

/// Applies an optional filter; an absent filter accepts everything.
pub(crate) fn accepts(filter: Option<&FieldFilter>, header: &str) -> bool {
    filter.map(|filter| filter.accept(header)).unwrap_or(true)
}
