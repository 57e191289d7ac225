use std::collections::BTreeMap;

use super::field::{FieldKind, FieldValue, FormField};
use super::FormError;

/// Answer record for one form session.
///
/// Every field of `F` has an entry from construction onwards, so the outbound payload can
/// always be produced from `F::ALL` without losing anything the applicant entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationAnswers<F: FormField> {
    values: BTreeMap<F, FieldValue>,
}

impl<F: FormField> Default for ApplicationAnswers<F> {
    fn default() -> Self {
        let values = F::ALL
            .iter()
            .map(|field| (*field, field.kind().default_value()))
            .collect();
        Self { values }
    }
}

impl<F: FormField> ApplicationAnswers<F> {
    pub fn get(&self, field: F) -> &FieldValue {
        // Populated for every field in `Default`; the fallback only guards a hand-built `ALL`.
        static EMPTY: FieldValue = FieldValue::Text(String::new());
        self.values.get(&field).unwrap_or(&EMPTY)
    }

    /// Text of a free-text or single-choice field; empty for multi-selects.
    pub fn text(&self, field: F) -> &str {
        match self.get(field) {
            FieldValue::Text(text) => text.as_str(),
            FieldValue::Selections(_) => "",
        }
    }

    pub fn selections(&self, field: F) -> &[String] {
        match self.get(field) {
            FieldValue::Selections(selected) => selected.as_slice(),
            FieldValue::Text(_) => &[],
        }
    }

    pub fn is_answered(&self, field: F) -> bool {
        self.get(field).is_answered()
    }

    pub fn iter(&self) -> impl Iterator<Item = (F, &FieldValue)> {
        self.values.iter().map(|(field, value)| (*field, value))
    }

    /// Replace the stored value. Checks the shape and, for choices, catalog membership.
    pub(crate) fn set(&mut self, field: F, value: FieldValue) -> Result<(), FormError> {
        let value = match (field.kind(), value) {
            (FieldKind::MultiSelect(options), FieldValue::Selections(selected)) => {
                FieldValue::Selections(canonical_selections(field, options, selected)?)
            }
            (FieldKind::SingleChoice(options), FieldValue::Text(text)) => {
                if !text.trim().is_empty() && !options.contains(&text.as_str()) {
                    return Err(FormError::UnknownOption {
                        field: field.key(),
                        option: text,
                    });
                }
                FieldValue::Text(text)
            }
            (FieldKind::FreeText, FieldValue::Text(text)) => FieldValue::Text(text),
            (kind, value) => {
                return Err(FormError::ValueShape {
                    field: field.key(),
                    expected: kind.label(),
                    found: value.shape(),
                })
            }
        };

        self.values.insert(field, value);
        Ok(())
    }

    /// Write a text value from a prefill plan; targets are checked when the form is defined.
    pub(crate) fn seed(&mut self, field: F, value: String) {
        self.values.insert(field, FieldValue::Text(value));
    }

    /// Flip membership of `option` in a multi-select field.
    pub(crate) fn toggle(&mut self, field: F, option: &str) -> Result<(), FormError> {
        let FieldKind::MultiSelect(options) = field.kind() else {
            return Err(FormError::NotMultiSelect { field: field.key() });
        };

        let mut selected = self.selections(field).to_vec();
        match selected.iter().position(|current| current == option) {
            Some(index) => {
                selected.remove(index);
            }
            None => selected.push(option.to_string()),
        }

        let selected = canonical_selections(field, options, selected)?;
        self.values.insert(field, FieldValue::Selections(selected));
        Ok(())
    }
}

fn canonical_selections<F: FormField>(
    field: F,
    options: &'static [&'static str],
    selected: Vec<String>,
) -> Result<Vec<String>, FormError> {
    if let Some(unknown) = selected
        .iter()
        .find(|value| !options.contains(&value.as_str()))
    {
        return Err(FormError::UnknownOption {
            field: field.key(),
            option: unknown.clone(),
        });
    }

    Ok(options
        .iter()
        .filter(|option| selected.iter().any(|value| value == *option))
        .map(|option| option.to_string())
        .collect())
}
