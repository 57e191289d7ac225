use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::controller::SubmissionState;
use super::definition::{FormDefinition, FormKind, StepField};
use super::field::{FieldValue, FormField};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionView {
    pub field: &'static str,
    pub equals: &'static str,
}

/// Rendering hints for one field of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub key: &'static str,
    pub external_name: &'static str,
    pub kind: &'static str,
    pub required: bool,
    #[serde(skip_serializing_if = "has_no_options")]
    pub options: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shown_when: Option<ConditionView>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden_after_prefill: bool,
}

impl FieldView {
    pub fn from_step_field<F: FormField>(entry: &StepField<F>) -> Self {
        let kind = entry.field.kind();
        Self {
            key: entry.field.key(),
            external_name: entry.field.external_name(),
            kind: kind.label(),
            required: entry.required,
            options: kind.options(),
            shown_when: entry.shown_when.map(|condition| ConditionView {
                field: condition.field.key(),
                equals: condition.equals,
            }),
            hidden_after_prefill: entry.hidden_after_prefill,
        }
    }
}

fn has_no_options(options: &&'static [&'static str]) -> bool {
    options.is_empty()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutline {
    pub position: usize,
    pub title: &'static str,
    pub fields: Vec<FieldView>,
}

/// Full layout of a form, independent of any session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormOutline {
    pub form: FormKind,
    pub title: &'static str,
    pub page_name: &'static str,
    pub total_steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification_threshold: Option<u32>,
    pub steps: Vec<StepOutline>,
}

impl FormOutline {
    pub fn of<F: FormField>(definition: &FormDefinition<F>) -> Self {
        Self {
            form: definition.kind(),
            title: definition.kind().title(),
            page_name: definition.page_name(),
            total_steps: definition.total_steps(),
            qualification_threshold: definition.prefill_plan().qualification_threshold(),
            steps: definition
                .steps()
                .iter()
                .map(|step| StepOutline {
                    position: step.position,
                    title: step.title,
                    fields: step.fields.iter().map(FieldView::from_step_field).collect(),
                })
                .collect(),
        }
    }
}

/// Landing selector entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSummary {
    pub form: FormKind,
    pub slug: &'static str,
    pub title: &'static str,
    pub audience: &'static str,
    pub best_for: &'static str,
    pub highlights: &'static [&'static str],
    pub total_steps: usize,
}

/// Point-in-time view of a running session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSnapshot {
    pub form: FormKind,
    pub step: usize,
    pub total_steps: usize,
    pub furthest_step: usize,
    pub step_title: &'static str,
    pub step_valid: bool,
    pub visible_fields: Vec<FieldView>,
    pub answers: BTreeMap<&'static str, FieldValue>,
    pub from_assessment: bool,
    pub qualified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment_tier: Option<String>,
    /// Sales stage the assessment flagged as the applicant's weakest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment_blocker: Option<String>,
    pub submission: SubmissionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}
