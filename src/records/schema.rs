//! Statically declared record members and header resolution.
use crate::records::coerce::ConversionError;
use crate::records::coerce::FromCell;
use crate::spreadsheet::cell::CellValue;
use std::any::type_name;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SchemaError {
    #[error("Duplicate {kind:?} '{name}' declared on {record}")]
    DuplicateMember {
        record: &'static str,
        kind: MemberKind,
        name: String,
    },

    #[error("Empty member name declared on {record}")]
    EmptyName { record: &'static str },
}

/// A type that rows can be deserialized into.
///
/// Records start from [`Default`] and receive one assignment per populated,
/// matched cell. Implement it with [`sheet_record!`](crate::sheet_record) for
/// plain structs, or by hand through [`Schema::builder`] when members need
/// setters or read-only properties.
pub trait Record: Default + 'static {
    fn schema() -> Result<Schema<Self>, SchemaError>;
}

/// How a member is exposed on the record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemberKind {
    /// Plain data member
    Field,
    /// Value written through a setter
    Property,
    /// Property without a setter; columns naming it are skipped
    ReadOnlyProperty,
}

impl MemberKind {
    fn is_property(&self) -> bool {
        matches!(self, Self::Property | Self::ReadOnlyProperty)
    }
}

type Setter<T> = Box<dyn Fn(&mut T, &CellValue) -> Result<(), ConversionError>>;

pub struct Member<T> {
    name: String,
    kind: MemberKind,
    setter: Option<Setter<T>>,
}

impl<T> Member<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Coerces `cell` into the member's type and stores it on `record`.
    /// Read-only members leave the record untouched.
    pub fn assign(&self, record: &mut T, cell: &CellValue) -> Result<(), ConversionError> {
        match &self.setter {
            Some(setter) => setter(record, cell),
            None => Ok(()),
        }
    }
}

/// The members of a record type, in declaration order.
pub struct Schema<T> {
    members: Vec<Member<T>>,
}

impl<T: 'static> Schema<T> {
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder { members: Vec::new() }
    }

    /// Finds the member a header names, ignoring case.
    ///
    /// Fields are searched before properties. Returns None when nothing
    /// matches or the match is a read-only property.
    pub fn resolve(&self, header: &str) -> Option<&Member<T>> {
        self.find(header, |kind| kind == MemberKind::Field)
            .or_else(|| self.find(header, |kind| kind.is_property()))
            .filter(|member| member.kind != MemberKind::ReadOnlyProperty)
    }

    pub fn members(&self) -> impl Iterator<Item = &Member<T>> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn find<F>(&self, header: &str, kind_matches: F) -> Option<&Member<T>>
    where
        F: Fn(MemberKind) -> bool,
    {
        self.members
            .iter()
            .find(|member| kind_matches(member.kind) && names_match(&member.name, header))
    }
}

pub struct SchemaBuilder<T> {
    members: Vec<Member<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// Declares a data member of type `V`.
    pub fn field<V, F>(self, name: &str, assign: F) -> Self
    where
        V: FromCell + 'static,
        F: Fn(&mut T, V) + 'static,
    {
        self.member(name, MemberKind::Field, assign)
    }

    /// Declares a writable property of type `V`.
    pub fn property<V, F>(self, name: &str, set: F) -> Self
    where
        V: FromCell + 'static,
        F: Fn(&mut T, V) + 'static,
    {
        self.member(name, MemberKind::Property, set)
    }

    /// Declares a property that cannot be assigned.
    pub fn read_only(mut self, name: &str) -> Self {
        self.members.push(Member {
            name: name.to_owned(),
            kind: MemberKind::ReadOnlyProperty,
            setter: None,
        });
        self
    }

    /// Validates the declared members.
    ///
    /// # Errors
    ///
    /// Fails on an empty name, or on two fields (or two properties) whose
    /// names are equal ignoring case.
    pub fn build(self) -> Result<Schema<T>, SchemaError> {
        let record = type_name::<T>();
        for (position, member) in self.members.iter().enumerate() {
            if member.name.is_empty() {
                Err(SchemaError::EmptyName { record })?;
            }
            let duplicate = self.members[..position].iter().any(|earlier| {
                earlier.kind.is_property() == member.kind.is_property()
                    && names_match(&earlier.name, &member.name)
            });
            if duplicate {
                Err(SchemaError::DuplicateMember {
                    record,
                    kind: member.kind,
                    name: member.name.to_owned(),
                })?;
            }
        }
        Ok(Schema { members: self.members })
    }

    fn member<V, F>(mut self, name: &str, kind: MemberKind, assign: F) -> Self
    where
        V: FromCell + 'static,
        F: Fn(&mut T, V) + 'static,
    {
        let setter: Setter<T> = Box::new(move |record: &mut T, cell: &CellValue| {
            assign(record, V::from_cell(cell)?);
            Ok(())
        });

        self.members.push(Member {
            name: name.to_owned(),
            kind,
            setter: Some(setter),
        });
        self
    }
}

/// Compares member, header and variant names ignoring case, Unicode included.
pub(crate) fn names_match(left: &str, right: &str) -> bool {
    left == right || left.to_lowercase() == right.to_lowercase()
}

/// Implements [`Record`](crate::records::Record) for a struct by listing its fields.
///
/// Each listed field is matched against the header of the same name. A
/// header that differs from the field identifier can be given explicitly
/// with `"Header" => field`.
///
/// ```
/// #[derive(Default)]
/// struct Item {
///     name: String,
///     damage: i32,
/// }
///
/// sheet_parser::sheet_record!(Item { name, damage });
///
/// #[derive(Default)]
/// struct Monster {
///     hit_points: u32,
/// }
///
/// sheet_parser::sheet_record!(Monster { "Hit Points" => hit_points });
/// ```
#[macro_export]
macro_rules! sheet_record {
    ($record:ty { $($field:ident),* $(,)? }) => {
        $crate::sheet_record!($record { $(stringify!($field) => $field),* });
    };
    ($record:ty { $($header:expr => $field:ident),* $(,)? }) => {
        impl $crate::records::Record for $record {
            fn schema() -> ::std::result::Result<$crate::records::Schema<Self>, $crate::records::SchemaError> {
                $crate::records::Schema::builder()
                    $(.field($header, |record: &mut Self, value| record.$field = value))*
                    .build()
            }
        }
    };
}
