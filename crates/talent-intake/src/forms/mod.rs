//! Step-by-step application forms.
//!
//! A form is described once as a [`FormDefinition`] (ordered steps, the outbound field
//! mapping and what assessment prefill seeds). [`StepFormController`] walks an applicant
//! through any definition: it owns the answers, gates forward navigation on the current
//! step being complete, and drives the single CRM submission at the end.

mod answers;
pub mod catalog;
mod controller;
mod definition;
mod field;
mod prefill;
mod view;

#[cfg(test)]
mod tests;

pub use answers::ApplicationAnswers;
pub use catalog::{BenchField, CohortField, FormCatalog, IntakeSession, NetworkField};
pub use controller::{
    FailureKind, FormError, SessionOptions, StepFormController, SubmissionFailure,
    SubmissionFailurePolicy, SubmissionState, SubmissionTicket,
};
pub use definition::{
    Condition, FormDefinition, FormKind, SchemaError, StepDefinition, StepField, StepRule,
};
pub use field::{FieldKind, FieldValue, FormField};
pub use prefill::{PrefillError, PrefillPlan, PrefillSource, TAKEN_ASSESSMENT};
pub use view::{ConditionView, FieldView, FormOutline, FormSnapshot, FormSummary, StepOutline};
