use super::{ASSESSMENT_STATUS, INDUSTRIES, YES_NO};
use crate::forms::{
    FieldKind, FormDefinition, FormKind, PrefillPlan, SchemaError, StepDefinition, StepField,
    StepRule, TAKEN_ASSESSMENT,
};

pub const YEARS_EXPERIENCE: &[&str] = &["5-7 years", "7-10 years", "10-15 years", "15+ years"];

pub const LARGEST_DEAL: &[&str] = &[
    "$50K - $100K",
    "$100K - $250K",
    "$250K - $500K",
    "$500K - $1M",
    "$1M+",
];

pub const TEAM_SIZES: &[&str] = &["1-3 people", "4-7 people", "8-15 people", "15+ people"];

pub const STRENGTHS: &[&str] = &[
    "Running complex deals",
    "Negotiation & closing",
    "Pipeline management & forecasting",
    "Coaching / developing reps",
    "Building sales processes",
    "Sales strategy & planning",
    "Fractional leadership",
    "Training delivery",
];

pub const ENGAGEMENT_TYPES: &[&str] = &[
    "Fractional Sales Leadership",
    "Deal coaching & strategy",
    "Sales process consulting",
    "Training delivery",
    "Interim / project-based roles",
];

pub const AVAILABILITY: &[&str] = &["Immediately", "2-4 weeks", "1-2 months", "Just exploring"];

pub const HOURS_PER_WEEK: &[&str] = &[
    "5-10 hours",
    "10-20 hours",
    "20-30 hours",
    "30+ hours",
    "Flexible",
];

pub const DESIRED_RATES: &[&str] = &[
    "$75-100/hr",
    "$100-150/hr",
    "$150-200/hr",
    "$200-250/hr",
    "$250+/hr",
];

pub const HEARD_FROM: &[&str] = &[
    "LinkedIn",
    "Referral from a friend",
    "Google search",
    "Revfinery website",
    "Social media",
    "Skills Assessment",
    "Other",
];

pub const ASSESSMENT_REFERRAL: &str = "Skills Assessment";

/// Applicants scoring at or above this are flagged for priority review.
pub const QUALIFICATION_THRESHOLD: u32 = 75;

crate::form_fields! {
    pub enum BenchField {
        FirstName => ("firstName", "firstname", FieldKind::FreeText),
        LastName => ("lastName", "lastname", FieldKind::FreeText),
        Email => ("email", "email", FieldKind::FreeText),
        Linkedin => ("linkedin", "linkedin_url", FieldKind::FreeText),
        Location => ("location", "city", FieldKind::FreeText),
        YearsExperience => ("yearsExperience", "years_in_sales", FieldKind::SingleChoice(YEARS_EXPERIENCE)),
        CurrentRole => ("currentRole", "current_role", FieldKind::FreeText),
        Industries => ("industries", "industries", FieldKind::MultiSelect(INDUSTRIES)),
        LargestDeal => ("largestDeal", "largest_deal_size", FieldKind::SingleChoice(LARGEST_DEAL)),
        ManagedTeam => ("managedTeam", "managed_team", FieldKind::SingleChoice(YES_NO)),
        TeamSize => ("teamSize", "team_size", FieldKind::SingleChoice(TEAM_SIZES)),
        Strengths => ("strengths", "strengths", FieldKind::MultiSelect(STRENGTHS)),
        EngagementTypes => ("engagementTypes", "engagement_types", FieldKind::MultiSelect(ENGAGEMENT_TYPES)),
        Availability => ("availability", "availability", FieldKind::SingleChoice(AVAILABILITY)),
        HoursPerWeek => ("hoursPerWeek", "hours_per_week", FieldKind::SingleChoice(HOURS_PER_WEEK)),
        DesiredRate => ("desiredRate", "desired_rate", FieldKind::SingleChoice(DESIRED_RATES)),
        ProjectPricing => ("projectPricing", "project_pricing", FieldKind::SingleChoice(YES_NO)),
        TakenAssessment => ("takenAssessment", "taken_assessment", FieldKind::SingleChoice(ASSESSMENT_STATUS)),
        AssessmentScore => ("assessmentScore", "assessment_score", FieldKind::FreeText),
        PortfolioLink => ("portfolioLink", "portfolio_link", FieldKind::FreeText),
        HeardFrom => ("heardFrom", "heard_from", FieldKind::SingleChoice(HEARD_FROM)),
        AnythingElse => ("anythingElse", "message", FieldKind::FreeText),
    }
}

pub const PAGE_NAME: &str = "Revfinery Bench Application";

pub fn definition() -> Result<FormDefinition<BenchField>, SchemaError> {
    use BenchField::*;

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
            .optional(LargestDeal)
            .optional(ManagedTeam)
            .field(StepField::optional(TeamSize).shown_when(ManagedTeam, "Yes")),
        StepDefinition::new(3, "Strengths & Interests")
            .required(Strengths)
            .required(EngagementTypes),
        StepDefinition::new(4, "Availability & Rate")
            .required(Availability)
            .optional(HoursPerWeek)
            .required(DesiredRate)
            .optional(ProjectPricing),
        StepDefinition::new(5, "Almost done!")
            .field(StepField::optional(TakenAssessment).hidden_after_prefill())
            .field(
                StepField::optional(AssessmentScore)
                    .shown_when(TakenAssessment, TAKEN_ASSESSMENT)
                    .hidden_after_prefill(),
            )
            .optional(PortfolioLink)
            .field(StepField::optional(HeardFrom).hidden_after_prefill())
            .optional(AnythingElse),
    ];

    let prefill = PrefillPlan::new()
        .identity(FirstName, LastName, Email)
        .assessment(AssessmentScore, TakenAssessment)
        .referral(HeardFrom, ASSESSMENT_REFERRAL)
        .qualifies_at(QUALIFICATION_THRESHOLD);

    FormDefinition::new(FormKind::Bench, PAGE_NAME, steps, prefill)
}
