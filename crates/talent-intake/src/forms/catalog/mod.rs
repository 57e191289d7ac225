//! The three intake forms and a type-erased handle over their controllers.

pub mod bench;
pub mod cohort;
pub mod network;

use std::sync::Arc;

use super::{
    FieldValue, FormDefinition, FormError, FormKind, FormOutline, FormSnapshot, FormSummary,
    PrefillSource, SchemaError, SessionOptions, StepFormController, SubmissionState,
    SubmissionTicket,
};
use crate::crm::{CrmError, CrmReceipt};

pub use bench::BenchField;
pub use cohort::CohortField;
pub use network::NetworkField;

pub const INDUSTRIES: &[&str] = &[
    "SaaS / Software",
    "FinTech / Financial Services",
    "Healthcare / HealthTech",
    "E-commerce / Retail",
    "Manufacturing / Industrial",
    "Professional Services",
    "Real Estate",
    "EdTech / Education",
    "MarTech / Advertising",
    "Other",
];

pub const YES_NO: &[&str] = &["Yes", "No"];

pub const ASSESSMENT_STATUS: &[&str] = &["Yes", "No", "Not yet, but I plan to"];

/// Validated definitions for every form, built once at startup.
#[derive(Debug, Clone)]
pub struct FormCatalog {
    cohort: Arc<FormDefinition<CohortField>>,
    network: Arc<FormDefinition<NetworkField>>,
    bench: Arc<FormDefinition<BenchField>>,
}

impl FormCatalog {
    pub fn standard() -> Result<Self, SchemaError> {
        Ok(Self {
            cohort: Arc::new(cohort::definition()?),
            network: Arc::new(network::definition()?),
            bench: Arc::new(bench::definition()?),
        })
    }

    pub fn cohort(&self) -> Arc<FormDefinition<CohortField>> {
        Arc::clone(&self.cohort)
    }

    pub fn network(&self) -> Arc<FormDefinition<NetworkField>> {
        Arc::clone(&self.network)
    }

    pub fn bench(&self) -> Arc<FormDefinition<BenchField>> {
        Arc::clone(&self.bench)
    }

    pub fn open(
        &self,
        kind: FormKind,
        prefill: Option<PrefillSource>,
        options: SessionOptions,
    ) -> IntakeSession {
        match kind {
            FormKind::Cohort => IntakeSession::Cohort(StepFormController::initialize(
                self.cohort(),
                prefill,
                options,
            )),
            FormKind::Network => IntakeSession::Network(StepFormController::initialize(
                self.network(),
                prefill,
                options,
            )),
            FormKind::Bench => IntakeSession::Bench(StepFormController::initialize(
                self.bench(),
                prefill,
                options,
            )),
        }
    }

    pub fn outline(&self, kind: FormKind) -> FormOutline {
        match kind {
            FormKind::Cohort => FormOutline::of(&self.cohort),
            FormKind::Network => FormOutline::of(&self.network),
            FormKind::Bench => FormOutline::of(&self.bench),
        }
    }

    pub fn summaries(&self) -> Vec<FormSummary> {
        FormKind::ALL
            .into_iter()
            .map(|kind| FormSummary {
                form: kind,
                slug: kind.slug(),
                title: kind.title(),
                audience: kind.audience(),
                best_for: kind.best_for(),
                highlights: kind.highlights(),
                total_steps: self.outline(kind).total_steps,
            })
            .collect()
    }
}

/// A running controller for any catalog form, addressed by string field keys.
#[derive(Debug, Clone)]
pub enum IntakeSession {
    Cohort(StepFormController<CohortField>),
    Network(StepFormController<NetworkField>),
    Bench(StepFormController<BenchField>),
}

macro_rules! each_form {
    ($session:expr, $form:ident => $body:expr) => {
        match $session {
            IntakeSession::Cohort($form) => $body,
            IntakeSession::Network($form) => $body,
            IntakeSession::Bench($form) => $body,
        }
    };
}

impl IntakeSession {
    pub fn snapshot(&self) -> FormSnapshot {
        each_form!(self, form => form.snapshot())
    }

    pub fn set_field(&mut self, key: &str, value: FieldValue) -> Result<(), FormError> {
        each_form!(self, form => form.set_field_by_key(key, value))
    }

    pub fn toggle(&mut self, key: &str, option: &str) -> Result<(), FormError> {
        each_form!(self, form => form.toggle_by_key(key, option))
    }

    pub fn advance(&mut self) -> Result<usize, FormError> {
        each_form!(self, form => form.advance())
    }

    pub fn retreat(&mut self) -> Result<usize, FormError> {
        each_form!(self, form => form.retreat())
    }

    pub fn revisit(&mut self, step: usize) -> Result<usize, FormError> {
        each_form!(self, form => form.revisit(step))
    }

    pub fn begin_submission(&mut self) -> Result<Option<SubmissionTicket>, FormError> {
        each_form!(self, form => form.begin_submission())
    }

    pub fn complete_submission(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<CrmReceipt, CrmError>,
    ) -> SubmissionState {
        each_form!(self, form => form.complete_submission(ticket, result))
    }
}
