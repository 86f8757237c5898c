//! Caller-side assembly of raw form input into simulation parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::{Field, RawValue, SimulationParameters, bracket_for_income, validate};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 1_000.0;
pub const DEFAULT_MONTHLY_CONTRIBUTION: f64 = 100.0;
pub const DEFAULT_ANNUAL_RATE_PERCENT: f64 = 5.0;
pub const DEFAULT_YEARS: u32 = 10;
pub const DEFAULT_BRACKET_ID: &str = "2000-3500";

/// Form values as received from a user; any field may be missing or malformed.
/// A field sent as `null` counts as present and malformed, not as missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawParameters {
    #[serde(rename = "sommeInitiale", deserialize_with = "present")]
    pub initial_capital: Option<RawValue>,
    #[serde(rename = "versementMensuel", deserialize_with = "present")]
    pub monthly_contribution: Option<RawValue>,
    #[serde(rename = "tauxAnnuel", deserialize_with = "present")]
    pub annual_rate_percent: Option<RawValue>,
    #[serde(rename = "nombreAnnees", deserialize_with = "present")]
    pub years: Option<RawValue>,
    #[serde(rename = "trancheRevenu")]
    pub income_bracket_id: Option<String>,
    #[serde(rename = "revenuMensuel", deserialize_with = "present")]
    pub monthly_income: Option<RawValue>,
}

impl RawParameters {
    /// Apply a partial edit: fields set in `edit` replace the current ones.
    pub fn merge(&mut self, edit: RawParameters) {
        if edit.initial_capital.is_some() {
            self.initial_capital = edit.initial_capital;
        }
        if edit.monthly_contribution.is_some() {
            self.monthly_contribution = edit.monthly_contribution;
        }
        if edit.annual_rate_percent.is_some() {
            self.annual_rate_percent = edit.annual_rate_percent;
        }
        if edit.years.is_some() {
            self.years = edit.years;
        }
        if edit.income_bracket_id.is_some() {
            self.income_bracket_id = edit.income_bracket_id;
        }
        if edit.monthly_income.is_some() {
            self.monthly_income = edit.monthly_income;
        }
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<RawValue>, D::Error>
where
    D: Deserializer<'de>,
{
    RawValue::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledParameters {
    pub parameters: SimulationParameters,
    /// Advisory messages keyed by field wire name.
    pub messages: BTreeMap<Field, String>,
}

pub fn assemble(raw: &RawParameters) -> AssembledParameters {
    let mut messages = BTreeMap::new();
    let mut field_value = |field: Field, raw: Option<&RawValue>, default: f64| -> f64 {
        let Some(raw) = raw else {
            return default;
        };
        let validated = validate(field, raw);
        if let Some(message) = validated.message() {
            messages.insert(field, message);
        }
        validated.value
    };

    let initial_capital = field_value(
        Field::InitialCapital,
        raw.initial_capital.as_ref(),
        DEFAULT_INITIAL_CAPITAL,
    );
    let monthly_contribution = field_value(
        Field::MonthlyContribution,
        raw.monthly_contribution.as_ref(),
        DEFAULT_MONTHLY_CONTRIBUTION,
    );
    let annual_rate_percent = field_value(
        Field::AnnualRate,
        raw.annual_rate_percent.as_ref(),
        DEFAULT_ANNUAL_RATE_PERCENT,
    );
    let years = field_value(Field::Years, raw.years.as_ref(), f64::from(DEFAULT_YEARS));

    AssembledParameters {
        parameters: SimulationParameters {
            initial_capital,
            monthly_contribution,
            annual_rate_percent,
            // Validated years are whole numbers within [1, 50].
            years: years as u32,
            income_bracket_id: resolve_bracket_id(raw),
        },
        messages,
    }
}

fn resolve_bracket_id(raw: &RawParameters) -> String {
    if let Some(id) = raw.income_bracket_id.as_deref().map(str::trim)
        && !id.is_empty()
    {
        return id.to_string();
    }

    raw.monthly_income
        .as_ref()
        .and_then(RawValue::as_number)
        .and_then(bracket_for_income)
        .map(|bracket| bracket.id)
        .unwrap_or(DEFAULT_BRACKET_ID)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_json(json: &str) -> AssembledParameters {
        let raw: RawParameters = serde_json::from_str(json).expect("json should parse");
        assemble(&raw)
    }

    #[test]
    fn missing_fields_take_defaults_without_messages() {
        let assembled = from_json("{}");
        assert_eq!(
            assembled.parameters,
            SimulationParameters {
                initial_capital: DEFAULT_INITIAL_CAPITAL,
                monthly_contribution: DEFAULT_MONTHLY_CONTRIBUTION,
                annual_rate_percent: DEFAULT_ANNUAL_RATE_PERCENT,
                years: DEFAULT_YEARS,
                income_bracket_id: DEFAULT_BRACKET_ID.to_string(),
            }
        );
        assert!(assembled.messages.is_empty());
    }

    #[test]
    fn out_of_range_fields_are_clamped_and_reported_per_field() {
        let assembled = from_json(
            r#"{
              "sommeInitiale": -50,
              "versementMensuel": "120",
              "tauxAnnuel": 150,
              "nombreAnnees": 0,
              "trancheRevenu": "moins-2000"
            }"#,
        );
        let params = &assembled.parameters;
        assert_eq!(params.initial_capital, 0.0);
        assert_eq!(params.monthly_contribution, 120.0);
        assert_eq!(params.annual_rate_percent, 100.0);
        assert_eq!(params.years, 1);
        assert_eq!(params.income_bracket_id, "moins-2000");

        assert_eq!(assembled.messages.len(), 3);
        assert!(assembled.messages.contains_key(&Field::InitialCapital));
        assert!(assembled.messages.contains_key(&Field::AnnualRate));
        assert!(assembled.messages.contains_key(&Field::Years));
    }

    #[test]
    fn malformed_years_fall_back_to_one() {
        let assembled = from_json(r#"{ "nombreAnnees": "dix" }"#);
        assert_eq!(assembled.parameters.years, 1);
        assert!(
            assembled.messages[&Field::Years].contains("must be a number"),
            "{:?}",
            assembled.messages
        );
    }

    #[test]
    fn non_numeric_json_fields_are_coerced_not_rejected() {
        let rate = from_json(r#"{ "tauxAnnuel": true }"#);
        assert_eq!(rate.parameters.annual_rate_percent, 0.0);
        assert!(rate.messages[&Field::AnnualRate].contains("must be a number"));

        let years = from_json(r#"{ "nombreAnnees": [5] }"#);
        assert_eq!(years.parameters.years, 1);
        assert!(years.messages[&Field::Years].contains("must be a number"));
    }

    #[test]
    fn explicit_null_is_malformed_not_missing() {
        let assembled = from_json(r#"{ "sommeInitiale": null }"#);
        assert_eq!(assembled.parameters.initial_capital, 0.0);
        assert!(assembled.messages[&Field::InitialCapital].contains("must be a number"));
    }

    #[test]
    fn merge_overrides_only_fields_present_in_edit() {
        let mut current: RawParameters =
            serde_json::from_str(r#"{ "tauxAnnuel": 4, "nombreAnnees": 20 }"#).expect("json");
        let edit: RawParameters =
            serde_json::from_str(r#"{ "nombreAnnees": "25" }"#).expect("json");
        current.merge(edit);

        assert_eq!(current.annual_rate_percent, Some(RawValue::Number(4.0)));
        assert_eq!(current.years, Some(RawValue::Text("25".to_string())));
        assert_eq!(current.initial_capital, None);
    }

    #[test]
    fn non_numeric_monthly_income_falls_back_to_default_bracket() {
        let assembled = from_json(r#"{ "revenuMensuel": "beaucoup" }"#);
        assert_eq!(assembled.parameters.income_bracket_id, DEFAULT_BRACKET_ID);
    }

    #[test]
    fn monthly_income_picks_bracket_when_id_missing() {
        let assembled = from_json(r#"{ "revenuMensuel": 6200 }"#);
        assert_eq!(assembled.parameters.income_bracket_id, "5000-8000");

        let explicit = from_json(r#"{ "revenuMensuel": 6200, "trancheRevenu": "plus-8000" }"#);
        assert_eq!(explicit.parameters.income_bracket_id, "plus-8000");
    }

    #[test]
    fn unknown_bracket_id_is_passed_through_for_the_resolver() {
        let assembled = from_json(r#"{ "trancheRevenu": "inconnue" }"#);
        assert_eq!(assembled.parameters.income_bracket_id, "inconnue");
    }

    #[test]
    fn messages_serialize_with_wire_names() {
        let assembled = from_json(r#"{ "tauxAnnuel": -3 }"#);
        let json = serde_json::to_string(&assembled.messages).expect("serialize");
        assert!(json.contains("\"tauxAnnuel\""), "{json}");
    }
}
