use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::answers::ApplicationAnswers;
use super::field::{FieldKind, FormField};
use super::prefill::{accepts_text, PrefillPlan};

/// The intake forms offered from the landing selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Cohort,
    Network,
    Bench,
}

impl FormKind {
    pub const ALL: [FormKind; 3] = [FormKind::Network, FormKind::Bench, FormKind::Cohort];

    pub const fn slug(self) -> &'static str {
        match self {
            FormKind::Cohort => "cohort",
            FormKind::Network => "network",
            FormKind::Bench => "bench",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            FormKind::Cohort => "University Cohort",
            FormKind::Network => "Talent Network",
            FormKind::Bench => "Revfinery Bench",
        }
    }

    pub const fn audience(self) -> &'static str {
        match self {
            FormKind::Cohort => {
                "Students and early-career professionals joining an 8-week virtual sales training cohort."
            }
            FormKind::Network => {
                "Sales professionals looking to build skills, get trained, and get matched to opportunities."
            }
            FormKind::Bench => {
                "Experienced sellers and leaders available for fractional, coaching, and project engagements."
            }
        }
    }

    /// Bullet points shown on the landing selector card.
    pub const fn highlights(self) -> &'static [&'static str] {
        match self {
            FormKind::Cohort => &[
                "8-week virtual sales training",
                "Live practice with working sellers",
                "Introductions to hiring partners",
            ],
            FormKind::Network => &[
                "Access training, playbooks, and live practice",
                "Get matched to BDR/SDR roles and projects",
                "Flexible: part-time, full-time, or project-based",
                "Grow within the Revfinery ecosystem",
            ],
            FormKind::Bench => &[
                "Consult on Revfinery client projects",
                "Fractional leadership opportunities",
                "Strategic deal coaching and advisory",
                "Set your own rate and availability",
            ],
        }
    }

    pub const fn best_for(self) -> &'static str {
        match self {
            FormKind::Cohort => "Students, recent graduates, and career changers",
            FormKind::Network => "0-5 years in sales, skill-building focus",
            FormKind::Bench => "5+ years in sales, leadership experience",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug().eq_ignore_ascii_case(raw.trim()))
    }
}

/// Predicate deciding whether a conditional field is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition<F> {
    pub field: F,
    pub equals: &'static str,
}

impl<F: FormField> Condition<F> {
    pub fn holds(&self, answers: &ApplicationAnswers<F>) -> bool {
        answers.text(self.field) == self.equals
    }
}

/// One field's placement within a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepField<F> {
    pub field: F,
    pub required: bool,
    pub shown_when: Option<Condition<F>>,
    pub hidden_after_prefill: bool,
}

impl<F: FormField> StepField<F> {
    pub fn required(field: F) -> Self {
        Self {
            field,
            required: true,
            shown_when: None,
            hidden_after_prefill: false,
        }
    }

    pub fn optional(field: F) -> Self {
        Self {
            required: false,
            ..Self::required(field)
        }
    }

    pub fn shown_when(mut self, field: F, equals: &'static str) -> Self {
        self.shown_when = Some(Condition { field, equals });
        self
    }

    /// Suppress the field when the session arrived with assessment data.
    pub fn hidden_after_prefill(mut self) -> Self {
        self.hidden_after_prefill = true;
        self
    }

    pub fn is_shown(&self, answers: &ApplicationAnswers<F>, prefilled: bool) -> bool {
        if prefilled && self.hidden_after_prefill {
            return false;
        }
        self.shown_when
            .map(|condition| condition.holds(answers))
            .unwrap_or(true)
    }
}

/// Structural checks beyond "required field is answered".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepRule<F> {
    /// A non-empty value must contain `@`.
    Email(F),
    MinSelections { field: F, min: usize },
}

impl<F: FormField> StepRule<F> {
    pub fn field(&self) -> F {
        match self {
            StepRule::Email(field) => *field,
            StepRule::MinSelections { field, .. } => *field,
        }
    }

    pub fn holds(&self, answers: &ApplicationAnswers<F>) -> bool {
        match self {
            StepRule::Email(field) => {
                let value = answers.text(*field).trim();
                value.is_empty() || value.contains('@')
            }
            StepRule::MinSelections { field, min } => answers.selections(*field).len() >= *min,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDefinition<F> {
    pub position: usize,
    pub title: &'static str,
    pub fields: Vec<StepField<F>>,
    pub rules: Vec<StepRule<F>>,
}

impl<F: FormField> StepDefinition<F> {
    pub fn new(position: usize, title: &'static str) -> Self {
        Self {
            position,
            title,
            fields: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn required(self, field: F) -> Self {
        self.field(StepField::required(field))
    }

    pub fn optional(self, field: F) -> Self {
        self.field(StepField::optional(field))
    }

    pub fn field(mut self, field: StepField<F>) -> Self {
        self.fields.push(field);
        self
    }

    pub fn rule(mut self, rule: StepRule<F>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn owns(&self, field: F) -> bool {
        self.fields.iter().any(|entry| entry.field == field)
    }

    /// Completeness of this step, reading only the fields it declares.
    pub fn is_satisfied(&self, answers: &ApplicationAnswers<F>) -> bool {
        let required_met = self
            .fields
            .iter()
            .filter(|entry| entry.required)
            .filter(|entry| entry.shown_when.map_or(true, |c| c.holds(answers)))
            .all(|entry| answers.is_answered(entry.field));

        required_met && self.rules.iter().all(|rule| rule.holds(answers))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("form must declare at least one step")]
    NoSteps,
    #[error("step at index {index} declares position {found}, expected {expected}")]
    StepOutOfOrder {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("field `{field}` is not placed on any step")]
    UnplacedField { field: &'static str },
    #[error("field `{field}` is placed on more than one step")]
    DuplicateField { field: &'static str },
    #[error("step {step} references field `{field}` owned by another step")]
    ForeignReference { step: usize, field: &'static str },
    #[error("condition on `{field}` compares against unknown option `{value}`")]
    UnknownConditionValue {
        field: &'static str,
        value: &'static str,
    },
    #[error("prefill cannot write a text value into `{field}`")]
    InvalidPrefillTarget { field: &'static str },
}

/// Ordered steps plus the outbound metadata for one form variant.
#[derive(Debug, Clone)]
pub struct FormDefinition<F: FormField> {
    kind: FormKind,
    page_name: &'static str,
    steps: Vec<StepDefinition<F>>,
    hidden_fields: Vec<(&'static str, &'static str)>,
    prefill: PrefillPlan<F>,
}

impl<F: FormField> FormDefinition<F> {
    pub fn new(
        kind: FormKind,
        page_name: &'static str,
        steps: Vec<StepDefinition<F>>,
        prefill: PrefillPlan<F>,
    ) -> Result<Self, SchemaError> {
        validate_steps(&steps)?;

        if let Some((field, _)) = prefill
            .targets()
            .into_iter()
            .find(|(field, fixed)| !accepts_text(*field, *fixed))
        {
            return Err(SchemaError::InvalidPrefillTarget { field: field.key() });
        }

        Ok(Self {
            kind,
            page_name,
            steps,
            hidden_fields: Vec::new(),
            prefill,
        })
    }

    /// Constant name/value pair appended to every outbound payload.
    pub fn with_hidden_field(mut self, name: &'static str, value: &'static str) -> Self {
        self.hidden_fields.push((name, value));
        self
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn page_name(&self) -> &'static str {
        self.page_name
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[StepDefinition<F>] {
        &self.steps
    }

    /// Step by 1-based position.
    pub fn step(&self, position: usize) -> Option<&StepDefinition<F>> {
        position
            .checked_sub(1)
            .and_then(|index| self.steps.get(index))
    }

    pub fn hidden_fields(&self) -> &[(&'static str, &'static str)] {
        &self.hidden_fields
    }

    pub fn prefill_plan(&self) -> &PrefillPlan<F> {
        &self.prefill
    }
}

fn validate_steps<F: FormField>(steps: &[StepDefinition<F>]) -> Result<(), SchemaError> {
    if steps.is_empty() {
        return Err(SchemaError::NoSteps);
    }

    let mut placed = BTreeSet::new();
    for (index, step) in steps.iter().enumerate() {
        if step.position != index + 1 {
            return Err(SchemaError::StepOutOfOrder {
                index,
                expected: index + 1,
                found: step.position,
            });
        }

        for entry in &step.fields {
            if !placed.insert(entry.field) {
                return Err(SchemaError::DuplicateField {
                    field: entry.field.key(),
                });
            }
        }

        let rule_fields = step.rules.iter().map(StepRule::field);
        let condition_fields = step
            .fields
            .iter()
            .filter_map(|entry| entry.shown_when.map(|condition| condition.field));
        if let Some(foreign) = rule_fields
            .chain(condition_fields)
            .find(|field| !step.owns(*field))
        {
            return Err(SchemaError::ForeignReference {
                step: step.position,
                field: foreign.key(),
            });
        }

        for condition in step.fields.iter().filter_map(|entry| entry.shown_when) {
            if let FieldKind::SingleChoice(options) = condition.field.kind() {
                if !options.contains(&condition.equals) {
                    return Err(SchemaError::UnknownConditionValue {
                        field: condition.field.key(),
                        value: condition.equals,
                    });
                }
            }
        }
    }

    if let Some(unplaced) = F::ALL.iter().find(|field| !placed.contains(*field)) {
        return Err(SchemaError::UnplacedField {
            field: unplaced.key(),
        });
    }

    Ok(())
}
