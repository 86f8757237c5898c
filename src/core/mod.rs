mod brackets;
mod engine;
mod types;
mod validate;

pub use brackets::{
    INCOME_BRACKETS, IncomeBracket, Resolution, UnresolvedBracket, bracket_for_income, brackets,
    find_bracket, resolve_recommendation,
};
pub use engine::{round_cents, simulate};
pub use types::{Recommendation, SimulationParameters, SimulationPoint, SimulationResult};
pub use validate::{
    Field, MAX_ANNUAL_RATE_PERCENT, MAX_YEARS, MIN_YEARS, RawValue, UnknownField, Validated,
    ValidationIssue, validate, validate_number,
};
