use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::answers::ApplicationAnswers;
use super::definition::{FormDefinition, FormKind};
use super::field::{FieldValue, FormField};
use super::prefill::PrefillSource;
use super::view::{FieldView, FormSnapshot};
use crate::crm::{CrmError, CrmReceipt, CrmTransport, SubmissionPayload};

/// How a failed CRM delivery is presented. Applied to every form of a deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionFailurePolicy {
    /// Keep the answers and let the applicant submit again.
    #[default]
    Retry,
    /// Log the failure and show the confirmation view anyway.
    Acknowledge,
}

impl SubmissionFailurePolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "retry" => Some(Self::Retry),
            "acknowledge" | "ack" => Some(Self::Acknowledge),
            _ => None,
        }
    }
}

/// Per-session settings supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub page_uri: String,
    pub failure_policy: SubmissionFailurePolicy,
}

impl SessionOptions {
    pub fn new(page_uri: impl Into<String>) -> Self {
        Self {
            page_uri: page_uri.into(),
            failure_policy: SubmissionFailurePolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, policy: SubmissionFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionFailure {
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub detail: String,
}

impl From<&CrmError> for SubmissionFailure {
    fn from(error: &CrmError) -> Self {
        match error {
            CrmError::Rejected { status, .. } => Self {
                kind: FailureKind::Rejected,
                http_status: Some(*status),
                detail: error.to_string(),
            },
            CrmError::Transport(_) | CrmError::Setup(_) => Self {
                kind: FailureKind::Transport,
                http_status: None,
                detail: error.to_string(),
            },
        }
    }
}

/// Lifecycle of the single terminal submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    NotStarted,
    InFlight,
    Succeeded,
    Failed(SubmissionFailure),
}

impl SubmissionState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmissionState::InFlight)
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("unknown field `{key}`")]
    UnknownField { key: String },
    #[error("field `{field}` expects a {expected} value, got {found}")]
    ValueShape {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("field `{field}` is not a multi-select")]
    NotMultiSelect { field: &'static str },
    #[error("`{option}` is not an option of `{field}`")]
    UnknownOption { field: &'static str, option: String },
    #[error("step {step} is incomplete")]
    StepIncomplete { step: usize },
    #[error("step {step} is out of range (form has {total} steps)")]
    StepOutOfRange { step: usize, total: usize },
    #[error("step {step} has not been reached yet (furthest reached is {furthest})")]
    StepLocked { step: usize, furthest: usize },
    #[error("submission is only available on step {total} (currently on step {step})")]
    NotOnFinalStep { step: usize, total: usize },
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("application was already submitted")]
    Closed,
}

/// Everything needed to deliver one submission attempt outside the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    form: FormKind,
    attempt: u32,
    payload: SubmissionPayload,
}

impl SubmissionTicket {
    pub fn form(&self) -> FormKind {
        self.form
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn payload(&self) -> &SubmissionPayload {
        &self.payload
    }
}

/// Drives one applicant through a form definition and its final submission.
#[derive(Debug, Clone)]
pub struct StepFormController<F: FormField> {
    definition: Arc<FormDefinition<F>>,
    options: SessionOptions,
    step: usize,
    furthest: usize,
    answers: ApplicationAnswers<F>,
    prefill: Option<PrefillSource>,
    submission: SubmissionState,
    attempts: u32,
    submitted_at: Option<DateTime<Utc>>,
}

impl<F: FormField> StepFormController<F> {
    pub fn initialize(
        definition: Arc<FormDefinition<F>>,
        prefill: Option<PrefillSource>,
        options: SessionOptions,
    ) -> Self {
        let prefill = prefill
            .map(PrefillSource::normalized)
            .filter(|source| !source.is_empty());

        let mut answers = ApplicationAnswers::default();
        if let Some(source) = &prefill {
            definition.prefill_plan().apply(&mut answers, source);
        }

        Self {
            definition,
            options,
            step: 1,
            furthest: 1,
            answers,
            prefill,
            submission: SubmissionState::NotStarted,
            attempts: 0,
            submitted_at: None,
        }
    }

    pub fn kind(&self) -> FormKind {
        self.definition.kind()
    }

    pub fn definition(&self) -> &FormDefinition<F> {
        &self.definition
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn total_steps(&self) -> usize {
        self.definition.total_steps()
    }

    /// Highest step unlocked by `advance` so far.
    pub fn furthest_step(&self) -> usize {
        self.furthest
    }

    pub fn answers(&self) -> &ApplicationAnswers<F> {
        &self.answers
    }

    pub fn prefill(&self) -> Option<&PrefillSource> {
        self.prefill.as_ref()
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn arrived_from_assessment(&self) -> bool {
        self.prefill
            .as_ref()
            .is_some_and(PrefillSource::from_assessment)
    }

    pub fn is_qualified(&self) -> bool {
        self.definition
            .prefill_plan()
            .is_qualified(self.prefill.as_ref())
    }

    pub fn set_field(&mut self, field: F, value: FieldValue) -> Result<(), FormError> {
        self.ensure_editable()?;
        self.answers.set(field, value)
    }

    pub fn toggle_selection(&mut self, field: F, option: &str) -> Result<(), FormError> {
        self.ensure_editable()?;
        self.answers.toggle(field, option)
    }

    pub fn set_field_by_key(&mut self, key: &str, value: FieldValue) -> Result<(), FormError> {
        let field = Self::field_for(key)?;
        self.set_field(field, value)
    }

    pub fn toggle_by_key(&mut self, key: &str, option: &str) -> Result<(), FormError> {
        let field = Self::field_for(key)?;
        self.toggle_selection(field, option)
    }

    /// Pure check of one step against the current answers. Unknown steps are never valid.
    pub fn is_step_valid(&self, step: usize) -> bool {
        self.definition
            .step(step)
            .is_some_and(|definition| definition.is_satisfied(&self.answers))
    }

    /// Fields of `step` the applicant should currently see.
    pub fn visible_fields(&self, step: usize) -> Vec<F> {
        let prefilled = self.arrived_from_assessment();
        self.definition
            .step(step)
            .map(|definition| {
                definition
                    .fields
                    .iter()
                    .filter(|entry| entry.is_shown(&self.answers, prefilled))
                    .map(|entry| entry.field)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn advance(&mut self) -> Result<usize, FormError> {
        self.ensure_editable()?;
        if !self.is_step_valid(self.step) {
            return Err(FormError::StepIncomplete { step: self.step });
        }
        self.step = (self.step + 1).min(self.total_steps());
        self.furthest = self.furthest.max(self.step);
        Ok(self.step)
    }

    pub fn retreat(&mut self) -> Result<usize, FormError> {
        self.ensure_editable()?;
        self.step = self.step.saturating_sub(1).max(1);
        Ok(self.step)
    }

    /// Jump to any step already unlocked. Steps are only unlocked through `advance`, and
    /// editing an earlier step afterwards does not lock them again.
    pub fn revisit(&mut self, step: usize) -> Result<usize, FormError> {
        self.ensure_editable()?;
        if step == 0 || step > self.total_steps() {
            return Err(FormError::StepOutOfRange {
                step,
                total: self.total_steps(),
            });
        }
        if step > self.furthest {
            return Err(FormError::StepLocked {
                step,
                furthest: self.furthest,
            });
        }
        self.step = step;
        Ok(self.step)
    }

    /// Guard and mark the submission as in flight.
    ///
    /// Returns `None` while another attempt is still outstanding.
    pub fn begin_submission(&mut self) -> Result<Option<SubmissionTicket>, FormError> {
        match self.submission {
            SubmissionState::InFlight => return Ok(None),
            SubmissionState::Succeeded => return Err(FormError::Closed),
            SubmissionState::NotStarted | SubmissionState::Failed(_) => {}
        }

        let total = self.total_steps();
        if self.step != total {
            return Err(FormError::NotOnFinalStep {
                step: self.step,
                total,
            });
        }
        if !self.is_step_valid(total) {
            return Err(FormError::StepIncomplete { step: total });
        }

        self.attempts += 1;
        self.submission = SubmissionState::InFlight;
        let payload =
            SubmissionPayload::build(&self.definition, &self.answers, &self.options.page_uri);

        Ok(Some(SubmissionTicket {
            form: self.kind(),
            attempt: self.attempts,
            payload,
        }))
    }

    /// Record the outcome of a delivery started by `begin_submission`.
    pub fn complete_submission(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<CrmReceipt, CrmError>,
    ) -> SubmissionState {
        if !self.submission.is_in_flight() || ticket.attempt != self.attempts {
            debug!(
                form = self.kind().slug(),
                attempt = ticket.attempt,
                "ignoring stale submission result"
            );
            return self.submission.clone();
        }

        self.submission = match result {
            Ok(receipt) => {
                info!(
                    form = self.kind().slug(),
                    attempt = ticket.attempt,
                    status = receipt.status,
                    "application accepted by CRM"
                );
                self.submitted_at = Some(Utc::now());
                SubmissionState::Succeeded
            }
            Err(error) => match self.options.failure_policy {
                SubmissionFailurePolicy::Retry => {
                    warn!(
                        form = self.kind().slug(),
                        attempt = ticket.attempt,
                        %error,
                        "application submission failed; answers kept for retry"
                    );
                    SubmissionState::Failed(SubmissionFailure::from(&error))
                }
                SubmissionFailurePolicy::Acknowledge => {
                    warn!(
                        form = self.kind().slug(),
                        attempt = ticket.attempt,
                        %error,
                        "application submission failed; acknowledging to applicant"
                    );
                    self.submitted_at = Some(Utc::now());
                    SubmissionState::Succeeded
                }
            },
        };

        self.submission.clone()
    }

    pub async fn submit<T>(&mut self, transport: &T) -> Result<SubmissionState, FormError>
    where
        T: CrmTransport + ?Sized,
    {
        let Some(ticket) = self.begin_submission()? else {
            return Ok(self.submission.clone());
        };
        let result = transport.deliver(ticket.form, &ticket.payload).await;
        Ok(self.complete_submission(ticket, result))
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let prefilled = self.arrived_from_assessment();
        let (step_title, visible_fields) = match self.definition.step(self.step) {
            Some(step) => (
                step.title,
                step.fields
                    .iter()
                    .filter(|entry| entry.is_shown(&self.answers, prefilled))
                    .map(FieldView::from_step_field)
                    .collect(),
            ),
            None => ("", Vec::new()),
        };

        FormSnapshot {
            form: self.kind(),
            step: self.step,
            total_steps: self.total_steps(),
            furthest_step: self.furthest,
            step_title,
            step_valid: self.is_step_valid(self.step),
            visible_fields,
            answers: self
                .answers
                .iter()
                .map(|(field, value)| (field.key(), value.clone()))
                .collect(),
            from_assessment: prefilled,
            qualified: self.is_qualified(),
            assessment_tier: self.prefill.as_ref().and_then(|source| source.tier.clone()),
            assessment_blocker: self
                .prefill
                .as_ref()
                .and_then(|source| source.blocker.clone()),
            submission: self.submission.clone(),
            submitted_at: self.submitted_at,
        }
    }

    fn field_for(key: &str) -> Result<F, FormError> {
        F::from_key(key).ok_or_else(|| FormError::UnknownField {
            key: key.to_string(),
        })
    }

    fn ensure_editable(&self) -> Result<(), FormError> {
        match self.submission {
            SubmissionState::InFlight => Err(FormError::SubmissionInFlight),
            SubmissionState::Succeeded => Err(FormError::Closed),
            SubmissionState::NotStarted | SubmissionState::Failed(_) => Ok(()),
        }
    }
}
