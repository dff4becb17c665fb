//! Grading of the calculation and answer step.
//!
//! Four facets are checked independently and the attempt passes only when
//! all of them do: the formula (strict whitelist), the substitution line, the
//! numeric result with its unit, and the worded answer.

use crate::defaults::{EFFICIENCY_TOLERANCE_PP, RESULT_TOLERANCE_PERCENT};
use crate::problem::{Problem, Quantity};
use crate::units::{format_watts, parse_decimal, AnswerUnit};
use crate::matches_relative;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static ETA_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^a-zA-Z])eta([^a-zA-Z]|$)").unwrap());
static SUBSTITUTION_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"P₀|P|η|\d+(?:[.,]\d+)?").unwrap());

/// What the learner typed in the calculation step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationInput {
    pub formula: String,
    pub substitution: String,
    pub result: String,
    pub result_unit: AnswerUnit,
    /// The number filled into the answer sentence.
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckError {
    Formula { hint: &'static str },
    Substitution { symbol: &'static str },
    /// Result unit does not fit the quantity (e.g. `%` for a power).
    ResultUnit { expected: Quantity },
    ResultMismatch { expected: String },
    Answer,
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::Formula { hint } => {
                write!(f, "Zapiš správný vzorec (nápověda: {}).", hint)
            }
            CheckError::Substitution { symbol } => write!(
                f,
                "Dosazení začni „{} =“ a dosaď obě známé hodnoty.",
                symbol
            ),
            CheckError::ResultUnit { expected } => match expected {
                Quantity::Efficiency => write!(f, "Účinnost se uvádí v procentech."),
                _ => write!(f, "{} je výkon, zvol jednotku W, kW nebo MW.", expected.symbol()),
            },
            CheckError::ResultMismatch { expected } => {
                write!(f, "Výsledek nesouhlasí. Očekává se přibližně {}.", expected)
            }
            CheckError::Answer => write!(f, "Doplň do odpovědi číselný výsledek."),
        }
    }
}

impl std::error::Error for CheckError {}

/// Outcome of one Check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub errors: Vec<CheckError>,
    /// 0-100 score of the numeric result, when it could be parsed.
    pub accuracy: Option<f64>,
    /// Full answer sentence with the true value, shown after every check.
    pub canonical_answer: String,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_error(&self, pred: impl Fn(&CheckError) -> bool) -> bool {
        self.errors.iter().any(pred)
    }
}

/// Strip whitespace and replace a standalone ASCII `eta` with `η`.
pub fn normalize_formula(input: &str) -> String {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    // Adjacent tokens share a delimiter, so one pass can miss every other one.
    let once = ETA_TOKEN_REGEX.replace_all(&compact, "${1}η${2}");
    ETA_TOKEN_REGEX.replace_all(&once, "${1}η${2}").into_owned()
}

pub fn formula_accepted(unknown: Quantity, formula: &str) -> bool {
    let normalized = normalize_formula(formula);
    unknown
        .accepted_formulas()
        .iter()
        .any(|accepted| *accepted == normalized)
}

/// `<unknown>=` followed by both known quantities, each written as a number
/// or by its symbol. The unknown may not appear on the right-hand side.
pub fn substitution_accepted(unknown: Quantity, substitution: &str) -> bool {
    let normalized = normalize_formula(substitution);
    let prefix = format!("{}=", unknown.symbol());
    let Some(rhs) = normalized.strip_prefix(&prefix) else {
        return false;
    };
    let tokens: Vec<&str> = SUBSTITUTION_TOKEN_REGEX
        .find_iter(rhs)
        .map(|m| m.as_str())
        .collect();
    tokens.len() >= 2 && !tokens.contains(&unknown.symbol())
}

/// Score and verdict for the numeric result.
fn grade_result(problem: &Problem, input: &CalculationInput) -> (Option<f64>, Option<CheckError>) {
    let unknown = problem.unknown;
    let want = problem.true_value(unknown);
    let expected = problem.display_value(unknown);

    let got = match (unknown, input.result_unit) {
        (Quantity::Efficiency, AnswerUnit::Percent) => parse_decimal(&input.result),
        (Quantity::Efficiency, AnswerUnit::Power(_)) | (_, AnswerUnit::Percent) => {
            return (None, Some(CheckError::ResultUnit { expected: unknown }));
        }
        (_, AnswerUnit::Power(unit)) => parse_decimal(&input.result).map(|v| unit.to_watts(v)),
    };
    let Some(got) = got else {
        return (None, Some(CheckError::ResultMismatch { expected }));
    };

    let (accuracy, ok) = if unknown == Quantity::Efficiency {
        let diff = (got - want).abs();
        (
            (100.0 - diff).max(0.0),
            diff <= EFFICIENCY_TOLERANCE_PP,
        )
    } else {
        let deviation_pct = (got - want).abs() / want * 100.0;
        (
            (100.0 - deviation_pct).max(0.0),
            matches_relative(got, want, RESULT_TOLERANCE_PERCENT),
        )
    };

    let error = (!ok).then_some(CheckError::ResultMismatch { expected });
    (Some(accuracy), error)
}

/// Run every facet of the Check action.
pub fn grade(problem: &Problem, input: &CalculationInput) -> CheckReport {
    let unknown = problem.unknown;
    let mut errors = Vec::new();

    if !formula_accepted(unknown, &input.formula) {
        errors.push(CheckError::Formula {
            hint: unknown.formula_hint(),
        });
    }
    if !substitution_accepted(unknown, &input.substitution) {
        errors.push(CheckError::Substitution {
            symbol: unknown.symbol(),
        });
    }

    let (accuracy, result_error) = grade_result(problem, input);
    errors.extend(result_error);

    if parse_decimal(&input.answer).is_none() {
        errors.push(CheckError::Answer);
    }

    debug!(
        "Check for {}: {} failed facets, accuracy {:?}",
        unknown,
        errors.len(),
        accuracy
    );

    CheckReport {
        errors,
        accuracy,
        canonical_answer: problem.canonical_answer(),
    }
}

/// `P = 150 kW` or `η = 60 %`, used in success messages.
pub fn expected_line(problem: &Problem) -> String {
    match problem.unknown {
        Quantity::Efficiency => format!("η = {}", problem.display_value(Quantity::Efficiency)),
        q => format!("{} = {}", q.symbol(), format_watts(problem.true_value(q))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::test_support::*;
    use crate::units::PowerUnit;
    use approx::assert_relative_eq;

    fn input(
        problem: &Problem,
        formula: &str,
        result: &str,
        unit: AnswerUnit,
        answer: &str,
    ) -> CalculationInput {
        CalculationInput {
            formula: formula.to_string(),
            substitution: format!("{} = 1 · 2", problem.unknown.symbol()),
            result: result.to_string(),
            result_unit: unit,
            answer: answer.to_string(),
        }
    }

    #[test]
    fn normalization_rewrites_eta_and_spaces() {
        assert_eq!(normalize_formula(" eta = P / P₀ "), "η=P/P₀");
        assert_eq!(normalize_formula("P=eta*P₀"), "P=η*P₀");
        assert_eq!(normalize_formula("P₀=P:(eta:100)"), "P₀=P:(η:100)");
        assert_eq!(normalize_formula("beta=P"), "beta=P");
        assert_eq!(normalize_formula("eta*eta"), "η*η");
    }

    #[test]
    fn whitelist_is_strict() {
        assert!(formula_accepted(Quantity::Efficiency, "η = P / P₀"));
        assert!(formula_accepted(Quantity::Efficiency, "eta=P:P₀"));
        assert!(formula_accepted(Quantity::OutputPower, "P = (η : 100) · P₀"));
        assert!(formula_accepted(Quantity::InputPower, "P₀ = P / η"));
        assert!(!formula_accepted(Quantity::Efficiency, "η = P₀ / P"));
        assert!(!formula_accepted(Quantity::Efficiency, "P/P₀=η"));
        assert!(!formula_accepted(Quantity::InputPower, "P0 = P / η"));
        assert!(!formula_accepted(Quantity::OutputPower, "η=P/P₀"));
    }

    #[test]
    fn substitution_needs_symbol_and_both_knowns() {
        assert!(!substitution_accepted(Quantity::Efficiency, ""));
        assert!(!substitution_accepted(Quantity::Efficiency, "η ="));
        assert!(substitution_accepted(Quantity::Efficiency, "η = P / P₀"));
        assert!(!substitution_accepted(Quantity::Efficiency, "η = 6 MW"));
        assert!(!substitution_accepted(Quantity::Efficiency, "η = η · 100"));
        assert!(substitution_accepted(Quantity::Efficiency, "η = 6 MW / 10 MW"));
        assert!(substitution_accepted(Quantity::OutputPower, "P = 0,75 · 200 kW"));
        assert!(!substitution_accepted(Quantity::OutputPower, "P₀ = 0,75 · 200 kW"));
        assert!(substitution_accepted(Quantity::InputPower, "P₀ = P / η"));
        assert!(!substitution_accepted(Quantity::InputPower, "P₀ = P₀ / η"));
        assert!(!substitution_accepted(Quantity::Efficiency, "6 / 10"));
    }

    #[test]
    fn turbine_efficiency_passes() {
        let problem = turbine_efficiency_problem();
        let report = grade(&problem, &input(&problem, "η=P/P₀", "60", AnswerUnit::Percent, "60"));
        assert!(report.passed(), "{:?}", report.errors);
        assert_relative_eq!(report.accuracy.unwrap(), 100.0);
        assert_eq!(report.canonical_answer, "Účinnost turbíny je 60 %.");
    }

    #[test]
    fn empty_substitution_fails_the_check() {
        let problem = turbine_efficiency_problem();
        let mut attempt = input(&problem, "η=P/P₀", "60", AnswerUnit::Percent, "60");
        attempt.substitution.clear();
        let report = grade(&problem, &attempt);
        assert!(!report.passed());
        assert_eq!(
            report.errors,
            vec![CheckError::Substitution { symbol: "η" }]
        );
    }

    #[test]
    fn efficiency_uses_absolute_tolerance() {
        let problem = turbine_efficiency_problem();
        let close = grade(&problem, &input(&problem, "η=P/P₀", "60,5", AnswerUnit::Percent, "60,5"));
        assert!(close.passed());
        assert_relative_eq!(close.accuracy.unwrap(), 99.5);
        let far = grade(&problem, &input(&problem, "η=P/P₀", "61", AnswerUnit::Percent, "61"));
        assert!(far.has_error(|e| matches!(e, CheckError::ResultMismatch { .. })));
    }

    #[test]
    fn output_power_within_half_percent() {
        let problem = motor_output_problem();
        let kw = AnswerUnit::Power(PowerUnit::KW);
        assert!(grade(&problem, &input(&problem, "P=η·P₀", "150", kw, "150")).passed());
        assert!(grade(&problem, &input(&problem, "P=η·P₀", "150,7", kw, "150,7")).passed());

        let report = grade(&problem, &input(&problem, "P=η·P₀", "149", kw, "149"));
        assert!(!report.passed());
        assert_eq!(
            report.errors,
            vec![CheckError::ResultMismatch {
                expected: "150 kW".to_string()
            }]
        );
        assert!(report.errors[0].to_string().contains("nesouhlasí"));
        assert_eq!(report.canonical_answer, "Užitečný výkon elektromotoru je 150 kW.");
    }

    #[test]
    fn result_in_other_unit_is_converted() {
        let problem = motor_output_problem();
        let report = grade(
            &problem,
            &input(&problem, "P=η*P₀", "0,15", AnswerUnit::Power(PowerUnit::MW), "0,15"),
        );
        assert!(report.passed());
    }

    #[test]
    fn wrong_unit_kind_is_reported() {
        let problem = motor_output_problem();
        let report = grade(&problem, &input(&problem, "P=η·P₀", "150", AnswerUnit::Percent, "150"));
        assert_eq!(
            report.errors,
            vec![CheckError::ResultUnit {
                expected: Quantity::OutputPower
            }]
        );
        assert_eq!(report.accuracy, None);
    }

    #[test]
    fn missing_answer_and_bad_formula_fail_together() {
        let problem = pump_input_problem();
        let report = grade(
            &problem,
            &input(&problem, "P₀=P·η", "12,5", AnswerUnit::Power(PowerUnit::KW), "  "),
        );
        assert_eq!(report.errors.len(), 2);
        assert!(report.has_error(|e| matches!(e, CheckError::Formula { .. })));
        assert!(report.has_error(|e| matches!(e, CheckError::Answer)));
    }

    #[test]
    fn garbage_result_is_incorrect_not_fatal() {
        let problem = pump_input_problem();
        let report = grade(
            &problem,
            &input(&problem, "P₀=P/η", "dvanáct", AnswerUnit::Power(PowerUnit::KW), "12,5"),
        );
        assert!(report.has_error(|e| matches!(e, CheckError::ResultMismatch { .. })));
        assert_eq!(report.accuracy, None);
    }

    #[test]
    fn expected_line_uses_readable_units() {
        assert_eq!(expected_line(&motor_output_problem()), "P = 150 kW");
        assert_eq!(expected_line(&turbine_efficiency_problem()), "η = 60 %");
    }
}
