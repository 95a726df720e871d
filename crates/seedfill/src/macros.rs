//! The `fillable!` macro.

/// Implements [`Fillable`](crate::Fillable) and
/// [`FieldValue`](crate::FieldValue) for a struct.
///
/// List every field that should take part in population, in declared
/// order, optionally followed by `=> "directive"`. The struct must
/// implement [`Default`]; fields left out of the list keep their default.
///
/// ```rust
/// use seedfill::{fillable, Populator};
///
/// #[derive(Debug, Default)]
/// struct Task {
///     id: i64,
///     title: String,
///     status: String,
///     note: String,
/// }
///
/// fillable!(Task {
///     id: i64 => "seq",
///     title: String,
///     status: String => "oneof=open|closed",
///     note: String => "-",
/// });
///
/// let mut tasks = vec![Task::default(), Task::default()];
/// Populator::default().with_seed(7).populate_all(&mut tasks, &[]).unwrap();
/// assert_eq!(tasks[1].id, 1);
/// assert_eq!(tasks[1].status, "closed");
/// assert!(tasks[0].note.is_empty());
/// ```
#[macro_export]
macro_rules! fillable {
    ($record:ident { $($field:ident : $fty:ty $(=> $directive:literal)?),* $(,)? }) => {
        impl $crate::Fillable for $record {
            fn record_type() -> $crate::RecordType {
                $crate::RecordType::new(
                    stringify!($record),
                    || {
                        vec![
                            $(
                                $crate::FieldDef::new(
                                    stringify!($field),
                                    <$fty as $crate::FieldValue>::field_type(),
                                    $crate::__fill_directive!($($directive)?),
                                ),
                            )*
                        ]
                    },
                    || $crate::Fillable::snapshot(&<$record as ::core::default::Default>::default()),
                )
            }

            fn snapshot(&self) -> $crate::Record {
                #[allow(unused_mut)]
                let mut record = $crate::Record::new(stringify!($record));
                $(
                    record.set(stringify!($field), $crate::FieldValue::to_value(&self.$field));
                )*
                record
            }

            fn set_field(&mut self, name: &str, value: $crate::Value) -> $crate::Result<()> {
                $(
                    if name == stringify!($field) {
                        self.$field = <$fty as $crate::FieldValue>::from_value(value)?;
                        return ::core::result::Result::Ok(());
                    }
                )*
                let _ = value;
                ::core::result::Result::Err($crate::Error::UnknownField {
                    record: stringify!($record),
                    field: name.to_string(),
                })
            }
        }

        impl $crate::FieldValue for $record {
            fn field_type() -> $crate::FieldType {
                $crate::FieldType::Record(<$record as $crate::Fillable>::record_type())
            }

            fn to_value(&self) -> $crate::Value {
                $crate::Value::Record($crate::Fillable::snapshot(self))
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                match value {
                    $crate::Value::Record(record) if record.type_name() == stringify!($record) => {
                        let mut out = <$record as ::core::default::Default>::default();
                        for (name, value) in record.into_fields() {
                            $crate::Fillable::set_field(&mut out, &name, value)?;
                        }
                        ::core::result::Result::Ok(out)
                    }
                    other => ::core::result::Result::Err($crate::Error::TypeMismatch {
                        expected: stringify!($record).to_string(),
                        actual: other.type_name(),
                    }),
                }
            }
        }

        impl ::core::convert::From<$record> for $crate::Value {
            fn from(record: $record) -> Self {
                $crate::FieldValue::to_value(&record)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __fill_directive {
    () => {
        ::core::option::Option::None
    };
    ($directive:literal) => {
        ::core::option::Option::Some($directive)
    };
}
