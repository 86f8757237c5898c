use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_ANNUAL_RATE_PERCENT: f64 = 100.0;
pub const MIN_YEARS: u32 = 1;
pub const MAX_YEARS: u32 = 50;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "sommeInitiale")]
    InitialCapital,
    #[serde(rename = "versementMensuel")]
    MonthlyContribution,
    #[serde(rename = "tauxAnnuel")]
    AnnualRate,
    #[serde(rename = "nombreAnnees")]
    Years,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::InitialCapital,
        Field::MonthlyContribution,
        Field::AnnualRate,
        Field::Years,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Field::InitialCapital => "sommeInitiale",
            Field::MonthlyContribution => "versementMensuel",
            Field::AnnualRate => "tauxAnnuel",
            Field::Years => "nombreAnnees",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Field::InitialCapital => "initial capital",
            Field::MonthlyContribution => "monthly contribution",
            Field::AnnualRate => "annual rate",
            Field::Years => "years",
        }
    }

    /// Inclusive bounds; `None` means no upper limit.
    pub fn bounds(self) -> (f64, Option<f64>) {
        match self {
            Field::InitialCapital | Field::MonthlyContribution => (0.0, None),
            Field::AnnualRate => (0.0, Some(MAX_ANNUAL_RATE_PERCENT)),
            Field::Years => (f64::from(MIN_YEARS), Some(f64::from(MAX_YEARS))),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field `{0}`")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.wire_name() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValidationIssue {
    #[error("{field} must be non-negative")]
    Negative { field: Field },
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: Field, min: f64, max: f64 },
    #[error("{field} must be a number")]
    Malformed { field: Field },
}

/// A field value as typed by the user: a JSON number, free text, or anything
/// else the client sent (`null`, booleans, arrays, objects).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawValue {
    /// The numeric reading of the value, before any clamping.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(value) => Some(*value),
            RawValue::Text(text) => text.trim().parse::<f64>().ok(),
            RawValue::Other(_) => None,
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Validated {
    pub value: f64,
    pub issue: Option<ValidationIssue>,
}

impl Validated {
    pub fn message(&self) -> Option<String> {
        self.issue.map(|issue| issue.to_string())
    }
}

pub fn validate(field: Field, raw: &RawValue) -> Validated {
    match raw.as_number() {
        Some(value) => validate_number(field, value),
        None => malformed(field),
    }
}

pub fn validate_number(field: Field, raw: f64) -> Validated {
    if !raw.is_finite() {
        return malformed(field);
    }

    let candidate = match field {
        Field::Years => raw.trunc(),
        _ => raw,
    };
    let (min, max) = field.bounds();
    // `+ 0.0` turns a negative zero into a plain zero.
    let value = candidate.max(min).min(max.unwrap_or(f64::INFINITY)) + 0.0;
    let issue = (value != candidate).then(|| out_of_range_issue(field));

    Validated { value, issue }
}

fn malformed(field: Field) -> Validated {
    Validated {
        value: field.bounds().0,
        issue: Some(ValidationIssue::Malformed { field }),
    }
}

fn out_of_range_issue(field: Field) -> ValidationIssue {
    match field.bounds() {
        (min, Some(max)) => ValidationIssue::OutOfRange { field, min, max },
        (_, None) => ValidationIssue::Negative { field },
    }
}
