use super::common::*;

use crate::crm::SubmissionPayload;
use crate::forms::{
    ApplicationAnswers, BenchField, CohortField, FormDefinition, FormField, FormKind,
    FormOutline, NetworkField, PrefillPlan, SchemaError, StepDefinition, StepField, StepRule,
};

fn build(steps: Vec<StepDefinition<DemoField>>) -> Result<FormDefinition<DemoField>, SchemaError> {
    FormDefinition::new(FormKind::Network, "Demo", steps, PrefillPlan::new())
}

#[test]
fn standard_catalog_builds_every_form() {
    let catalog = catalog();
    assert_eq!(catalog.cohort().total_steps(), 3);
    assert_eq!(catalog.network().total_steps(), 4);
    assert_eq!(catalog.bench().total_steps(), 5);
    assert_eq!(catalog.bench().page_name(), "Revfinery Bench Application");
    assert_eq!(
        catalog.bench().prefill_plan().qualification_threshold(),
        Some(75)
    );

    let slugs: Vec<_> = catalog.summaries().iter().map(|s| s.slug).collect();
    assert_eq!(slugs, vec!["network", "bench", "cohort"]);
}

#[test]
fn payload_carries_every_field_exactly_once() {
    let catalog = catalog();

    let cohort = SubmissionPayload::build(
        &catalog.cohort(),
        &ApplicationAnswers::default(),
        "https://apply.example.com/cohort",
    );
    assert_eq!(cohort.fields.len(), CohortField::ALL.len() + 1);

    let network = SubmissionPayload::build(&catalog.network(), &ApplicationAnswers::default(), "");
    let names: Vec<_> = network.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names.len(), NetworkField::ALL.len());
    assert!(names.contains(&"city"));
    assert!(names.contains(&"typical_deal_size"));
    assert_eq!(names.last(), Some(&"message"));

    let bench = SubmissionPayload::build(&catalog.bench(), &ApplicationAnswers::default(), "");
    assert_eq!(bench.fields.len(), BenchField::ALL.len());
}

#[test]
fn external_names_are_unique_per_form() {
    fn unique<F: FormField>() -> bool {
        let mut names: Vec<_> = F::ALL.iter().map(|f| f.external_name()).collect();
        names.sort_unstable();
        names.windows(2).all(|pair| pair[0] != pair[1])
    }

    assert!(unique::<CohortField>());
    assert!(unique::<NetworkField>());
    assert!(unique::<BenchField>());
}

#[test]
fn form_kind_parses_slugs() {
    assert_eq!(FormKind::parse("Bench"), Some(FormKind::Bench));
    assert_eq!(FormKind::parse(" cohort "), Some(FormKind::Cohort));
    assert_eq!(FormKind::parse("alumni"), None);
}

#[test]
fn rejects_empty_forms() {
    assert_eq!(build(Vec::new()).err(), Some(SchemaError::NoSteps));
}

#[test]
fn rejects_out_of_order_steps() {
    let mut steps = demo_steps();
    steps.swap(0, 1);
    assert_eq!(
        build(steps).err(),
        Some(SchemaError::StepOutOfOrder {
            index: 0,
            expected: 1,
            found: 2,
        })
    );
}

#[test]
fn rejects_unplaced_and_duplicate_fields() {
    let mut steps = demo_steps();
    steps.pop();
    assert_eq!(
        build(steps).err(),
        Some(SchemaError::UnplacedField { field: "notes" })
    );

    let mut steps = demo_steps();
    steps[2] = StepDefinition::new(3, "Wrap up")
        .optional(DemoField::Notes)
        .optional(DemoField::Name);
    assert_eq!(
        build(steps).err(),
        Some(SchemaError::DuplicateField { field: "name" })
    );
}

#[test]
fn rejects_rules_on_foreign_fields() {
    let mut steps = demo_steps();
    steps[2] = StepDefinition::new(3, "Wrap up")
        .optional(DemoField::Notes)
        .rule(StepRule::Email(DemoField::Email));
    assert_eq!(
        build(steps).err(),
        Some(SchemaError::ForeignReference {
            step: 3,
            field: "email",
        })
    );
}

#[test]
fn rejects_conditions_on_unknown_options() {
    let mut steps = demo_steps();
    steps[1] = StepDefinition::new(2, "Selection")
        .required(DemoField::Letters)
        .optional(DemoField::Managed)
        .field(StepField::optional(DemoField::TeamSize).shown_when(DemoField::Managed, "Maybe"));
    assert_eq!(
        build(steps).err(),
        Some(SchemaError::UnknownConditionValue {
            field: "managed",
            value: "Maybe",
        })
    );
}

#[test]
fn rejects_prefill_into_multi_select() {
    let plan = PrefillPlan::new().referral(DemoField::Letters, "A");
    let result = FormDefinition::new(FormKind::Network, "Demo", demo_steps(), plan);
    assert_eq!(
        result.err(),
        Some(SchemaError::InvalidPrefillTarget { field: "letters" })
    );

    let plan = PrefillPlan::new().referral(DemoField::Managed, "Sometimes");
    let result = FormDefinition::new(FormKind::Network, "Demo", demo_steps(), plan);
    assert_eq!(
        result.err(),
        Some(SchemaError::InvalidPrefillTarget { field: "managed" })
    );
}

#[test]
fn outline_describes_conditional_fields() {
    let outline = FormOutline::of(&catalog().bench());
    let step = &outline.steps[1];
    let team_size = step
        .fields
        .iter()
        .find(|field| field.key == "teamSize")
        .expect("team size placed on step 2");
    let condition = team_size.shown_when.as_ref().expect("conditional");
    assert_eq!(condition.field, "managedTeam");
    assert_eq!(condition.equals, "Yes");

    let json = serde_json::to_value(&outline).expect("serializable");
    assert_eq!(json["form"], "bench");
    assert_eq!(json["steps"][2]["fields"][0]["kind"], "multi_select");
    assert_eq!(json["steps"][0]["fields"][0].get("options"), None);
}
