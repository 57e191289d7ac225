use serde::{Deserialize, Serialize};

use crate::forms::{ApplicationAnswers, FieldValue, FormDefinition, FormField};

/// Joins multi-select answers into the single string the CRM stores.
pub const SELECTION_DELIMITER: &str = "; ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionContext {
    pub page_uri: String,
    pub page_name: String,
}

/// Body of a forms-integration submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub fields: Vec<PayloadField>,
    pub context: SubmissionContext,
}

impl SubmissionPayload {
    /// One entry per field of the form, answered or not, followed by the hidden constants.
    pub fn build<F: FormField>(
        definition: &FormDefinition<F>,
        answers: &ApplicationAnswers<F>,
        page_uri: &str,
    ) -> Self {
        let answered = F::ALL.iter().map(|field| PayloadField {
            name: field.external_name().to_string(),
            value: flatten(answers.get(*field)),
        });
        let hidden = definition
            .hidden_fields()
            .iter()
            .map(|(name, value)| PayloadField {
                name: (*name).to_string(),
                value: (*value).to_string(),
            });

        Self {
            fields: answered.chain(hidden).collect(),
            context: SubmissionContext {
                page_uri: page_uri.to_string(),
                page_name: definition.page_name().to_string(),
            },
        }
    }

    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }
}

pub fn flatten(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::Selections(selected) => selected.join(SELECTION_DELIMITER),
    }
}
