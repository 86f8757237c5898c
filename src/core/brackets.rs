use serde::Serialize;
use thiserror::Error;

use super::types::Recommendation;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeBracket {
    pub id: &'static str,
    pub label: &'static str,
    pub min_income: f64,
    /// Nominal ceiling. The last bracket accepts any income above `min_income`
    /// and only uses this value to compute its midpoint.
    pub max_income: f64,
    pub savings_rate: f64,
}

impl IncomeBracket {
    pub fn midpoint(&self) -> f64 {
        (self.min_income + self.max_income) / 2.0
    }

    pub fn recommendation(&self) -> Recommendation {
        Recommendation {
            recommended_monthly_amount: (self.midpoint() * self.savings_rate).round(),
            percentage_of_income: self.savings_rate * 100.0,
        }
    }
}

/// Monthly net income brackets, ascending and contiguous from zero.
pub static INCOME_BRACKETS: [IncomeBracket; 5] = [
    IncomeBracket {
        id: "moins-2000",
        label: "Moins de 2 000 €",
        min_income: 0.0,
        max_income: 2_000.0,
        savings_rate: 0.05,
    },
    IncomeBracket {
        id: "2000-3500",
        label: "De 2 000 € à 3 500 €",
        min_income: 2_000.0,
        max_income: 3_500.0,
        savings_rate: 0.10,
    },
    IncomeBracket {
        id: "3500-5000",
        label: "De 3 500 € à 5 000 €",
        min_income: 3_500.0,
        max_income: 5_000.0,
        savings_rate: 0.15,
    },
    IncomeBracket {
        id: "5000-8000",
        label: "De 5 000 € à 8 000 €",
        min_income: 5_000.0,
        max_income: 8_000.0,
        savings_rate: 0.20,
    },
    IncomeBracket {
        id: "plus-8000",
        label: "Plus de 8 000 €",
        min_income: 8_000.0,
        max_income: 12_000.0,
        savings_rate: 0.25,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("unknown income bracket `{id}`, recommendation set to zero")]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedBracket {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub recommendation: Recommendation,
    pub notice: Option<UnresolvedBracket>,
}

pub fn brackets() -> &'static [IncomeBracket] {
    &INCOME_BRACKETS
}

pub fn find_bracket(id: &str) -> Option<&'static IncomeBracket> {
    INCOME_BRACKETS.iter().find(|bracket| bracket.id == id)
}

pub fn resolve_recommendation(id: &str) -> Resolution {
    match find_bracket(id) {
        Some(bracket) => Resolution {
            recommendation: bracket.recommendation(),
            notice: None,
        },
        None => {
            let notice = UnresolvedBracket { id: id.to_string() };
            tracing::warn!(bracket_id = %id, "{notice}");
            Resolution {
                recommendation: Recommendation::ZERO,
                notice: Some(notice),
            }
        }
    }
}

/// Ranges are half-open `[min, max)`; a shared boundary belongs to the upper
/// bracket.
pub fn bracket_for_income(monthly_income: f64) -> Option<&'static IncomeBracket> {
    if !monthly_income.is_finite() || monthly_income < 0.0 {
        return None;
    }
    let last = INCOME_BRACKETS.len() - 1;
    INCOME_BRACKETS
        .iter()
        .enumerate()
        .find(|(idx, bracket)| {
            monthly_income >= bracket.min_income
                && (*idx == last || monthly_income < bracket.max_income)
        })
        .map(|(_, bracket)| bracket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn lowest_bracket_recommends_five_percent_of_midpoint() {
        let resolution = resolve_recommendation("moins-2000");
        assert_eq!(resolution.notice, None);
        assert_approx(resolution.recommendation.recommended_monthly_amount, 50.0);
        assert_approx(resolution.recommendation.percentage_of_income, 5.0);
    }

    #[test]
    fn every_bracket_resolves_to_rounded_midpoint_share() {
        let expected = [
            ("moins-2000", 50.0, 5.0),
            ("2000-3500", 275.0, 10.0),
            ("3500-5000", 638.0, 15.0),
            ("5000-8000", 1_300.0, 20.0),
            ("plus-8000", 2_500.0, 25.0),
        ];
        for (id, amount, pct) in expected {
            let resolution = resolve_recommendation(id);
            assert!(resolution.notice.is_none(), "{id} should resolve");
            assert_approx(resolution.recommendation.recommended_monthly_amount, amount);
            assert_approx(resolution.recommendation.percentage_of_income, pct);
        }
    }

    #[test]
    fn unknown_bracket_degrades_to_zero_with_notice() {
        let resolution = resolve_recommendation("millionnaire");
        assert_eq!(resolution.recommendation, Recommendation::ZERO);
        let notice = resolution.notice.expect("notice for unknown id");
        assert_eq!(notice.id, "millionnaire");
        assert!(notice.to_string().contains("millionnaire"));
    }

    #[test]
    fn table_is_contiguous_from_zero() {
        assert_approx(INCOME_BRACKETS[0].min_income, 0.0);
        for pair in INCOME_BRACKETS.windows(2) {
            assert_approx(pair[0].max_income, pair[1].min_income);
        }
        for bracket in brackets() {
            assert!(bracket.savings_rate > 0.0 && bracket.savings_rate <= 1.0);
            assert!(bracket.min_income < bracket.max_income);
        }
    }

    #[test]
    fn shared_boundary_belongs_to_upper_bracket() {
        assert_eq!(bracket_for_income(0.0).map(|b| b.id), Some("moins-2000"));
        assert_eq!(bracket_for_income(1_999.99).map(|b| b.id), Some("moins-2000"));
        assert_eq!(bracket_for_income(2_000.0).map(|b| b.id), Some("2000-3500"));
        assert_eq!(bracket_for_income(8_000.0).map(|b| b.id), Some("plus-8000"));
        assert_eq!(bracket_for_income(250_000.0).map(|b| b.id), Some("plus-8000"));
    }

    #[test]
    fn negative_or_non_finite_income_has_no_bracket() {
        assert!(bracket_for_income(-1.0).is_none());
        assert!(bracket_for_income(f64::NAN).is_none());
        assert!(bracket_for_income(f64::INFINITY).is_none());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_every_non_negative_income_lands_in_exactly_one_bracket(cents in 0u64..5_000_000) {
            let income = cents as f64 / 100.0;
            let bracket = bracket_for_income(income);
            prop_assert!(bracket.is_some());
            let matching = INCOME_BRACKETS
                .iter()
                .enumerate()
                .filter(|(idx, b)| {
                    income >= b.min_income
                        && (*idx == INCOME_BRACKETS.len() - 1 || income < b.max_income)
                })
                .count();
            prop_assert_eq!(matching, 1);
        }
    }
}
