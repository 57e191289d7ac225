use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Shape of the answer a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    FreeText,
    SingleChoice(&'static [&'static str]),
    MultiSelect(&'static [&'static str]),
}

impl FieldKind {
    pub fn options(self) -> &'static [&'static str] {
        match self {
            FieldKind::FreeText => &[],
            FieldKind::SingleChoice(options) | FieldKind::MultiSelect(options) => options,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FieldKind::FreeText => "text",
            FieldKind::SingleChoice(_) => "choice",
            FieldKind::MultiSelect(_) => "multi_select",
        }
    }

    pub(crate) fn default_value(self) -> FieldValue {
        match self {
            FieldKind::MultiSelect(_) => FieldValue::Selections(Vec::new()),
            FieldKind::FreeText | FieldKind::SingleChoice(_) => FieldValue::Text(String::new()),
        }
    }
}

/// Stored answer for one field.
///
/// Text covers both free text and single selections; multi-selects keep their
/// options in catalog order so the same membership always compares equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Selections(Vec<String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn selections<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Selections(values.into_iter().map(Into::into).collect())
    }

    /// Whether the value counts as an answer for a required field.
    pub fn is_answered(&self) -> bool {
        match self {
            FieldValue::Text(text) => !text.trim().is_empty(),
            FieldValue::Selections(selected) => !selected.is_empty(),
        }
    }

    pub(crate) fn shape(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Selections(_) => "selections",
        }
    }
}

/// Closed set of fields owned by one form variant.
///
/// Implementations are generated by [`form_fields!`](crate::form_fields) so that the internal
/// key, the outbound CRM name and the kind of every variant come from a single table.
pub trait FormField: Copy + Ord + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    const ALL: &'static [Self];

    fn key(self) -> &'static str;
    fn external_name(self) -> &'static str;
    fn kind(self) -> FieldKind;

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.key() == key)
    }
}

/// Declares a form's field enum together with its outbound mapping.
///
/// ```ignore
/// form_fields! {
///     pub enum DemoField {
///         FirstName => ("firstName", "firstname", FieldKind::FreeText),
///     }
/// }
/// ```
#[macro_export]
macro_rules! form_fields {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $variant:ident => ($key:literal, $external:literal, $kind:expr) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $( $variant ),+
        }

        impl $crate::forms::FormField for $name {
            const ALL: &'static [Self] = &[ $( $name::$variant ),+ ];

            fn key(self) -> &'static str {
                match self {
                    $( $name::$variant => $key ),+
                }
            }

            fn external_name(self) -> &'static str {
                match self {
                    $( $name::$variant => $external ),+
                }
            }

            fn kind(self) -> $crate::forms::FieldKind {
                match self {
                    $( $name::$variant => $kind ),+
                }
            }
        }
    };
}
