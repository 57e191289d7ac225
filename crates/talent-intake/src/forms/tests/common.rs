use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::crm::{CrmError, CrmReceipt, CrmTransport, SubmissionPayload};
use crate::forms::{
    BenchField, CohortField, FieldKind, FieldValue, FormCatalog, FormDefinition, FormKind,
    PrefillPlan, PrefillSource, SessionOptions, StepDefinition, StepField, StepFormController,
    StepRule,
};

pub(super) const LETTERS: &[&str] = &["A", "B", "C"];
pub(super) const YES_NO: &[&str] = &["Yes", "No"];
pub(super) const COHORT_PAGE: &str = "https://apply.example.com/cohort";

crate::form_fields! {
    pub(super) enum DemoField {
        Name => ("name", "full_name", FieldKind::FreeText),
        Email => ("email", "email", FieldKind::FreeText),
        Letters => ("letters", "letters", FieldKind::MultiSelect(LETTERS)),
        Managed => ("managed", "managed", FieldKind::SingleChoice(YES_NO)),
        TeamSize => ("teamSize", "team_size", FieldKind::FreeText),
        Notes => ("notes", "notes", FieldKind::FreeText),
    }
}

pub(super) fn demo_steps() -> Vec<StepDefinition<DemoField>> {
    use DemoField::*;

    vec![
        StepDefinition::new(1, "Contact")
            .required(Name)
            .required(Email)
            .rule(StepRule::Email(Email)),
        StepDefinition::new(2, "Selection")
            .required(Letters)
            .optional(Managed)
            .field(StepField::required(TeamSize).shown_when(Managed, "Yes"))
            .rule(StepRule::MinSelections {
                field: Letters,
                min: 1,
            }),
        StepDefinition::new(3, "Wrap up").optional(Notes),
    ]
}

pub(super) fn demo_definition() -> Arc<FormDefinition<DemoField>> {
    let definition = FormDefinition::new(
        FormKind::Network,
        "Demo Application",
        demo_steps(),
        PrefillPlan::new(),
    )
    .expect("demo definition is valid")
    .with_hidden_field("source", "demo");
    Arc::new(definition)
}

pub(super) fn demo_controller() -> StepFormController<DemoField> {
    StepFormController::initialize(
        demo_definition(),
        None,
        SessionOptions::new("https://apply.example.com/demo"),
    )
}

pub(super) fn fill_demo_contact(controller: &mut StepFormController<DemoField>) {
    controller
        .set_field(DemoField::Name, FieldValue::text("Sam Rivera"))
        .expect("text field");
    controller
        .set_field(DemoField::Email, FieldValue::text("sam@example.com"))
        .expect("text field");
}

pub(super) fn catalog() -> FormCatalog {
    FormCatalog::standard().expect("catalog builds")
}

pub(super) fn cohort_controller(options: SessionOptions) -> StepFormController<CohortField> {
    StepFormController::initialize(catalog().cohort(), None, options)
}

pub(super) fn bench_controller(prefill: Option<PrefillSource>) -> StepFormController<BenchField> {
    StepFormController::initialize(
        catalog().bench(),
        prefill,
        SessionOptions::new("https://apply.example.com/bench"),
    )
}

/// Walks the cohort form to its final step with the answers from the reference scenario.
pub(super) fn fill_cohort(controller: &mut StepFormController<CohortField>) {
    use CohortField::*;

    for (field, value) in [
        (FirstName, "Alex"),
        (LastName, "Johnson"),
        (Email, "alex@uni.edu"),
    ] {
        controller
            .set_field(field, FieldValue::text(value))
            .expect("text field");
    }
    assert_eq!(controller.advance(), Ok(2));

    controller
        .set_field(GraduationYear, FieldValue::text("2026"))
        .expect("choice field");
    controller
        .set_field(WhySales, FieldValue::text("non-empty"))
        .expect("text field");
    assert_eq!(controller.advance(), Ok(3));

    controller
        .set_field(HeardFrom, FieldValue::text("LinkedIn"))
        .expect("choice field");
}

pub(super) fn prefill(query: &str) -> PrefillSource {
    PrefillSource::from_query(query).expect("valid query")
}

pub(super) fn rejection() -> CrmError {
    CrmError::Rejected {
        status: 400,
        message: "Invalid email".to_string(),
        errors: Vec::new(),
    }
}

/// Transport fake that replays scripted outcomes and records every delivery.
#[derive(Default)]
pub(super) struct RecordingTransport {
    outcomes: Mutex<VecDeque<Result<CrmReceipt, CrmError>>>,
    deliveries: Mutex<Vec<(FormKind, SubmissionPayload)>>,
}

impl RecordingTransport {
    pub(super) fn with_outcomes(outcomes: Vec<Result<CrmReceipt, CrmError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            deliveries: Mutex::default(),
        }
    }

    pub(super) fn deliveries(&self) -> Vec<(FormKind, SubmissionPayload)> {
        self.deliveries
            .lock()
            .expect("deliveries mutex poisoned")
            .clone()
    }

    pub(super) fn calls(&self) -> usize {
        self.deliveries().len()
    }
}

#[async_trait]
impl CrmTransport for RecordingTransport {
    async fn deliver(
        &self,
        form: FormKind,
        payload: &SubmissionPayload,
    ) -> Result<CrmReceipt, CrmError> {
        self.deliveries
            .lock()
            .expect("deliveries mutex poisoned")
            .push((form, payload.clone()));
        self.outcomes
            .lock()
            .expect("outcomes mutex poisoned")
            .pop_front()
            .unwrap_or(Ok(CrmReceipt {
                status: 200,
                inline_message: None,
            }))
    }
}
