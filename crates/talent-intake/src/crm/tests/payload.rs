use serde_json::json;

use crate::crm::{flatten, SubmissionPayload, SELECTION_DELIMITER};
use crate::forms::{
    ApplicationAnswers, BenchField, FieldValue, FormCatalog, SessionOptions, StepFormController,
};

#[test]
fn multi_select_values_join_with_semicolons() {
    assert_eq!(SELECTION_DELIMITER, "; ");
    assert_eq!(
        flatten(&FieldValue::selections(["SaaS / Software", "Real Estate"])),
        "SaaS / Software; Real Estate"
    );
    assert_eq!(flatten(&FieldValue::selections(Vec::<String>::new())), "");
    assert_eq!(flatten(&FieldValue::text("Yes")), "Yes");
}

#[test]
fn payload_serializes_in_forms_api_shape() {
    let catalog = FormCatalog::standard().expect("catalog builds");
    let mut controller = StepFormController::initialize(
        catalog.bench(),
        None,
        SessionOptions::new("https://apply.example.com/bench"),
    );
    for option in ["Training delivery", "Running complex deals"] {
        controller
            .toggle_selection(BenchField::Strengths, option)
            .expect("known option");
    }

    let payload = SubmissionPayload::build(
        controller.definition(),
        controller.answers(),
        "https://apply.example.com/bench",
    );
    let value = serde_json::to_value(&payload).expect("serializable");

    assert_eq!(
        value["context"],
        json!({
            "pageUri": "https://apply.example.com/bench",
            "pageName": "Revfinery Bench Application",
        })
    );
    let strengths = value["fields"]
        .as_array()
        .expect("fields array")
        .iter()
        .find(|field| field["name"] == "strengths")
        .cloned()
        .expect("strengths mapped");
    assert_eq!(
        strengths,
        json!({ "name": "strengths", "value": "Running complex deals; Training delivery" })
    );
}

#[test]
fn unanswered_fields_are_sent_empty() {
    let catalog = FormCatalog::standard().expect("catalog builds");
    let payload =
        SubmissionPayload::build(&catalog.bench(), &ApplicationAnswers::default(), "");
    assert_eq!(payload.value_of("team_size"), Some(""));
    assert_eq!(payload.value_of("industries"), Some(""));
    assert_eq!(payload.value_of("application_type"), None);
}
