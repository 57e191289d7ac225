use super::{ASSESSMENT_STATUS, INDUSTRIES};
use crate::forms::{
    FieldKind, FormDefinition, FormKind, PrefillPlan, SchemaError, StepDefinition, StepField,
    StepRule, TAKEN_ASSESSMENT,
};

pub const YEARS_EXPERIENCE: &[&str] = &["Less than 1 year", "1-3 years", "3-5 years", "5+ years"];

pub const DEAL_SIZES: &[&str] = &[
    "Under $10K",
    "$10K - $50K",
    "$50K - $100K",
    "$100K+",
    "Not applicable",
];

pub const WORK_INTERESTS: &[&str] = &[
    "Prospecting / Outbound",
    "Discovery & Qualification",
    "Running full-cycle deals",
    "Account Management",
];

pub const LOOKING_FOR: &[&str] = &[
    "Part-time / Flexible work",
    "Full-time role",
    "Project-based engagements",
    "Training & skill development",
];

pub const HEARD_FROM: &[&str] = &[
    "LinkedIn",
    "Referral from a friend",
    "Google search",
    "Revfinery website",
    "Social media",
    "Other",
];

crate::form_fields! {
    pub enum NetworkField {
        FirstName => ("firstName", "firstname", FieldKind::FreeText),
        LastName => ("lastName", "lastname", FieldKind::FreeText),
        Email => ("email", "email", FieldKind::FreeText),
        Linkedin => ("linkedin", "linkedin_url", FieldKind::FreeText),
        Location => ("location", "city", FieldKind::FreeText),
        YearsExperience => ("yearsExperience", "years_in_sales", FieldKind::SingleChoice(YEARS_EXPERIENCE)),
        CurrentRole => ("currentRole", "current_role", FieldKind::FreeText),
        Industries => ("industries", "industries", FieldKind::MultiSelect(INDUSTRIES)),
        DealSize => ("dealSize", "typical_deal_size", FieldKind::SingleChoice(DEAL_SIZES)),
        WorkInterests => ("workInterests", "work_interests", FieldKind::MultiSelect(WORK_INTERESTS)),
        LookingFor => ("lookingFor", "looking_for", FieldKind::MultiSelect(LOOKING_FOR)),
        TakenAssessment => ("takenAssessment", "taken_assessment", FieldKind::SingleChoice(ASSESSMENT_STATUS)),
        AssessmentScore => ("assessmentScore", "assessment_score", FieldKind::FreeText),
        HeardFrom => ("heardFrom", "heard_from", FieldKind::SingleChoice(HEARD_FROM)),
        AnythingElse => ("anythingElse", "message", FieldKind::FreeText),
    }
}

pub const PAGE_NAME: &str = "Talent Network Application";

pub fn definition() -> Result<FormDefinition<NetworkField>, SchemaError> {
    use NetworkField::*;

    let steps = vec![
        StepDefinition::new(1, "Let's start with the basics")
            .required(FirstName)
            .required(LastName)
            .required(Email)
            .optional(Linkedin)
            .optional(Location)
            .rule(StepRule::Email(Email)),
        StepDefinition::new(2, "Your experience")
            .required(YearsExperience)
            .required(CurrentRole)
            .optional(Industries)
            .optional(DealSize),
        StepDefinition::new(3, "What interests you?")
            .required(WorkInterests)
            .required(LookingFor),
        StepDefinition::new(4, "Almost done!")
            .field(StepField::optional(TakenAssessment).hidden_after_prefill())
            .field(
                StepField::optional(AssessmentScore)
                    .shown_when(TakenAssessment, TAKEN_ASSESSMENT)
                    .hidden_after_prefill(),
            )
            .optional(HeardFrom)
            .optional(AnythingElse),
    ];

    let prefill = PrefillPlan::new()
        .identity(FirstName, LastName, Email)
        .assessment(AssessmentScore, TakenAssessment);

    FormDefinition::new(FormKind::Network, PAGE_NAME, steps, prefill)
}
