use crate::forms::{
    FieldKind, FormDefinition, FormKind, PrefillPlan, SchemaError, StepDefinition, StepRule,
};

pub const GRADUATION_YEARS: &[&str] = &[
    "2024",
    "2025",
    "2026",
    "2027",
    "2028",
    "Already graduated",
    "N/A - Career changer",
];

pub const HEARD_FROM: &[&str] = &[
    "LinkedIn",
    "University/Professor",
    "Friend/Referral",
    "Google search",
    "Revfinery website",
    "Social media",
    "Other",
];

crate::form_fields! {
    pub enum CohortField {
        FirstName => ("firstName", "firstname", FieldKind::FreeText),
        LastName => ("lastName", "lastname", FieldKind::FreeText),
        Email => ("email", "email", FieldKind::FreeText),
        Linkedin => ("linkedin", "linkedin_url", FieldKind::FreeText),
        City => ("city", "city", FieldKind::FreeText),
        School => ("school", "school", FieldKind::FreeText),
        Major => ("major", "major", FieldKind::FreeText),
        GraduationYear => ("graduationYear", "graduation_year", FieldKind::SingleChoice(GRADUATION_YEARS)),
        WhySales => ("whySales", "why_sales", FieldKind::FreeText),
        WhatHoping => ("whatHoping", "what_hoping", FieldKind::FreeText),
        HeardFrom => ("heardFrom", "heard_from", FieldKind::SingleChoice(HEARD_FROM)),
        Message => ("message", "message", FieldKind::FreeText),
    }
}

pub const PAGE_NAME: &str = "University Cohort Application";

pub fn definition() -> Result<FormDefinition<CohortField>, SchemaError> {
    use CohortField::*;

    let steps = vec![
        StepDefinition::new(1, "Tell us about yourself")
            .required(FirstName)
            .required(LastName)
            .required(Email)
            .optional(Linkedin)
            .optional(City)
            .rule(StepRule::Email(Email)),
        StepDefinition::new(2, "Your background")
            .optional(School)
            .optional(Major)
            .required(GraduationYear)
            .required(WhySales)
            .optional(WhatHoping),
        StepDefinition::new(3, "Almost done!")
            .required(HeardFrom)
            .optional(Message),
    ];

    let prefill = PrefillPlan::new().identity(FirstName, LastName, Email);

    Ok(FormDefinition::new(FormKind::Cohort, PAGE_NAME, steps, prefill)?
        .with_hidden_field("application_type", "University Cohort"))
}
