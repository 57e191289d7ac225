use axum::extract::Query;
use axum::http::Uri;
use serde::{Deserialize, Serialize};

use super::answers::ApplicationAnswers;
use super::field::{FieldKind, FormField};

/// Referral data handed over by the skills assessment through query parameters.
///
/// Read once when a session is opened; later edits never consult it again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefillSource {
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub blocker: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PrefillError {
    #[error("query string is not a valid URI component: {0}")]
    InvalidQuery(String),
}

impl PrefillSource {
    /// Parse a raw, percent-encoded query string such as `score=82&firstName=Alex`.
    pub fn from_query(raw: &str) -> Result<Self, PrefillError> {
        let raw = raw.trim_start_matches('?');
        let uri: Uri = format!("/?{raw}")
            .parse()
            .map_err(|err: axum::http::uri::InvalidUri| PrefillError::InvalidQuery(err.to_string()))?;
        let Query(source) = Query::<PrefillSource>::try_from_uri(&uri)
            .map_err(|err| PrefillError::InvalidQuery(err.to_string()))?;
        Ok(source.normalized())
    }

    /// Drop blank parameters so they read as absent.
    pub fn normalized(self) -> Self {
        fn present(value: Option<String>) -> Option<String> {
            value
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        }

        Self {
            score: present(self.score),
            tier: present(self.tier),
            blocker: present(self.blocker),
            email: present(self.email),
            first_name: present(self.first_name),
            last_name: present(self.last_name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.score.is_none()
            && self.tier.is_none()
            && self.blocker.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
    }

    pub fn from_assessment(&self) -> bool {
        self.score.is_some()
    }

    /// Leading integer of the score, `0` when it has none (`"82.5"` reads as 82).
    pub fn score_percent(&self) -> Option<u32> {
        self.score.as_deref().map(|raw| {
            let digits: String = raw
                .trim()
                .chars()
                .take_while(|ch| ch.is_ascii_digit())
                .collect();
            digits.parse().unwrap_or(0)
        })
    }

    /// Score in the form the CRM expects, e.g. `82%`.
    pub fn score_label(&self) -> Option<String> {
        self.score
            .as_deref()
            .map(|raw| format!("{}%", raw.trim().trim_end_matches('%')))
    }
}

/// Which answers a form seeds from a [`PrefillSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefillPlan<F> {
    first_name: Option<F>,
    last_name: Option<F>,
    email: Option<F>,
    assessment: Option<(F, F)>,
    referral: Option<(F, &'static str)>,
    qualification_threshold: Option<u32>,
}

impl<F> Default for PrefillPlan<F> {
    fn default() -> Self {
        Self {
            first_name: None,
            last_name: None,
            email: None,
            assessment: None,
            referral: None,
            qualification_threshold: None,
        }
    }
}

pub const TAKEN_ASSESSMENT: &str = "Yes";

impl<F: FormField> PrefillPlan<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(mut self, first_name: F, last_name: F, email: F) -> Self {
        self.first_name = Some(first_name);
        self.last_name = Some(last_name);
        self.email = Some(email);
        self
    }

    /// Seed `score` as a percentage and mark `taken` as answered "Yes".
    pub fn assessment(mut self, score: F, taken: F) -> Self {
        self.assessment = Some((score, taken));
        self
    }

    pub fn referral(mut self, field: F, value: &'static str) -> Self {
        self.referral = Some((field, value));
        self
    }

    pub fn qualifies_at(mut self, threshold: u32) -> Self {
        self.qualification_threshold = Some(threshold);
        self
    }

    pub fn qualification_threshold(&self) -> Option<u32> {
        self.qualification_threshold
    }

    pub fn is_qualified(&self, source: Option<&PrefillSource>) -> bool {
        match (self.qualification_threshold, source.and_then(PrefillSource::score_percent)) {
            (Some(threshold), Some(score)) => score >= threshold,
            _ => false,
        }
    }

    /// Fields this plan writes, paired with whether a fixed value must be a catalog option.
    pub(crate) fn targets(&self) -> Vec<(F, Option<&'static str>)> {
        let mut targets: Vec<(F, Option<&'static str>)> = [self.first_name, self.last_name, self.email]
            .into_iter()
            .flatten()
            .map(|field| (field, None))
            .collect();
        if let Some((score, taken)) = self.assessment {
            targets.push((score, None));
            targets.push((taken, Some(TAKEN_ASSESSMENT)));
        }
        if let Some((field, value)) = self.referral {
            targets.push((field, Some(value)));
        }
        targets
    }

    pub(crate) fn apply(&self, answers: &mut ApplicationAnswers<F>, source: &PrefillSource) {
        let seeds = [
            (self.first_name, source.first_name.clone()),
            (self.last_name, source.last_name.clone()),
            (self.email, source.email.clone()),
        ];
        for (field, value) in seeds {
            if let (Some(field), Some(value)) = (field, value) {
                answers.seed(field, value);
            }
        }

        let Some(score) = source.score_label() else {
            return;
        };
        if let Some((score_field, taken_field)) = self.assessment {
            answers.seed(score_field, score);
            answers.seed(taken_field, TAKEN_ASSESSMENT.to_string());
        }
        if let Some((field, value)) = self.referral {
            answers.seed(field, value.to_string());
        }
    }
}

pub(crate) fn accepts_text(field: impl FormField, fixed: Option<&str>) -> bool {
    match (field.kind(), fixed) {
        (FieldKind::FreeText, _) => true,
        (FieldKind::SingleChoice(_), None) => true,
        (FieldKind::SingleChoice(options), Some(value)) => options.contains(&value),
        (FieldKind::MultiSelect(_), _) => false,
    }
}
