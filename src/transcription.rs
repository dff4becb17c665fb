//! Validation of the "Zápis" step: the learner copies the given values with
//! units and marks which quantity is unknown.

use crate::defaults::{EFFICIENCY_FORM_TOLERANCE, WRITE_TOLERANCE_PERCENT};
use crate::problem::{Problem, Quantity};
use crate::units::{format_comma, parse_decimal, Power, PowerUnit};
use crate::matches_relative;
use log::debug;
use std::fmt;

/// Raw form contents for a power quantity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PowerEntry {
    pub value: String,
    pub unit: PowerUnit,
    pub unknown: bool,
}

/// Raw form contents for η, entered both as percent and as a decimal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EfficiencyEntry {
    pub percent: String,
    pub decimal: String,
    pub unknown: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptionInput {
    pub input_power: PowerEntry,
    pub output_power: PowerEntry,
    pub efficiency: EfficiencyEntry,
}

impl TranscriptionInput {
    pub fn marked_unknowns(&self) -> Vec<Quantity> {
        let flags = [
            (Quantity::InputPower, self.input_power.unknown),
            (Quantity::OutputPower, self.output_power.unknown),
            (Quantity::Efficiency, self.efficiency.unknown),
        ];
        flags
            .into_iter()
            .filter_map(|(q, marked)| marked.then_some(q))
            .collect()
    }
}

/// One transcribed quantity, frozen after a successful check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recorded {
    Power(Power),
    /// Efficiency in percent.
    Efficiency(f64),
    /// The quantity to compute; powers keep the unit the learner chose.
    Unknown(Option<PowerUnit>),
}

impl Recorded {
    fn describe(&self, quantity: Quantity) -> String {
        match self {
            Recorded::Power(p) => format!("{} = {}", quantity.symbol(), p),
            Recorded::Efficiency(pct) => {
                format!("{} = {} %", quantity.symbol(), format_comma(*pct, 3))
            }
            Recorded::Unknown(Some(unit)) => format!("{} = ? {}", quantity.symbol(), unit),
            Recorded::Unknown(None) => format!("{} = ?", quantity.symbol()),
        }
    }
}

/// Snapshot of a transcription that matched the problem.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteState {
    pub input_power: Recorded,
    pub output_power: Recorded,
    pub efficiency: Recorded,
}

impl WriteState {
    /// `P₀ = 10 MW • P = 6 MW • η = ?`
    pub fn summary(&self) -> String {
        [
            self.input_power.describe(Quantity::InputPower),
            self.output_power.describe(Quantity::OutputPower),
            self.efficiency.describe(Quantity::Efficiency),
        ]
        .join(" • ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionError {
    /// Zero or several quantities were marked unknown.
    UnknownCount(usize),
    /// The marked quantity is given in the statement.
    WrongUnknown(Quantity),
    ValueMismatch(Quantity),
    /// Percent and decimal forms of η disagree.
    EfficiencyForms,
    EfficiencyMismatch,
}

impl TranscriptionError {
    /// Structural errors make the value checks meaningless.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TranscriptionError::UnknownCount(_) | TranscriptionError::WrongUnknown(_)
        )
    }
}

impl fmt::Display for TranscriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptionError::UnknownCount(_) => {
                write!(f, "Označ právě jednu neznámou veličinu.")
            }
            TranscriptionError::WrongUnknown(q) => write!(
                f,
                "{} je v zadání dána, neznámá je jiná veličina.",
                q.symbol()
            ),
            TranscriptionError::ValueMismatch(q) => {
                write!(f, "{} neodpovídá zadání (zkontroluj hodnotu i jednotku).", q.symbol())
            }
            TranscriptionError::EfficiencyForms => write!(
                f,
                "η v procentech a v desetinném tvaru si neodpovídají."
            ),
            TranscriptionError::EfficiencyMismatch => write!(f, "η neodpovídá zadání."),
        }
    }
}

impl std::error::Error for TranscriptionError {}

/// Every problem found in one transcription attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionReport {
    pub errors: Vec<TranscriptionError>,
}

impl TranscriptionReport {
    pub fn contains(&self, error: &TranscriptionError) -> bool {
        self.errors.contains(error)
    }
}

impl fmt::Display for TranscriptionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join(" "))
    }
}

impl std::error::Error for TranscriptionReport {}

impl From<TranscriptionError> for TranscriptionReport {
    fn from(error: TranscriptionError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

/// A transcribed value may match either the exact value or the rounded one
/// the statement prints.
fn matches_given(value: f64, problem: &Problem, quantity: Quantity) -> bool {
    matches_relative(value, problem.true_value(quantity), WRITE_TOLERANCE_PERCENT)
        || matches_relative(value, problem.shown_value(quantity), WRITE_TOLERANCE_PERCENT)
}

fn check_power(
    problem: &Problem,
    quantity: Quantity,
    entry: &PowerEntry,
    errors: &mut Vec<TranscriptionError>,
) -> Recorded {
    if quantity == problem.unknown {
        return Recorded::Unknown(Some(entry.unit));
    }
    let value = parse_decimal(&entry.value);
    let watts = value.map(|v| entry.unit.to_watts(v)).unwrap_or(f64::NAN);
    if !matches_given(watts, problem, quantity) {
        errors.push(TranscriptionError::ValueMismatch(quantity));
    }
    Recorded::Power(Power {
        value: value.unwrap_or(f64::NAN),
        unit: entry.unit,
    })
}

fn check_efficiency(
    problem: &Problem,
    entry: &EfficiencyEntry,
    errors: &mut Vec<TranscriptionError>,
) -> Recorded {
    if problem.unknown == Quantity::Efficiency {
        return Recorded::Unknown(None);
    }
    let percent = parse_decimal(&entry.percent);
    let decimal = parse_decimal(&entry.decimal);

    match (percent, decimal) {
        (Some(pct), Some(dec)) if (dec - pct / 100.0).abs() <= EFFICIENCY_FORM_TOLERANCE => {}
        _ => errors.push(TranscriptionError::EfficiencyForms),
    }
    let pct = percent.unwrap_or(f64::NAN);
    if !matches_given(pct, problem, Quantity::Efficiency) {
        errors.push(TranscriptionError::EfficiencyMismatch);
    }
    Recorded::Efficiency(pct)
}

/// Check a transcription against the problem.
///
/// Pure: the same input always yields the same result.
pub fn validate_transcription(
    problem: &Problem,
    input: &TranscriptionInput,
) -> Result<WriteState, TranscriptionReport> {
    let marked = input.marked_unknowns();
    if marked.len() != 1 {
        debug!("Transcription rejected: {} unknowns marked", marked.len());
        return Err(TranscriptionError::UnknownCount(marked.len()).into());
    }
    if marked[0] != problem.unknown {
        debug!(
            "Transcription rejected: marked {} but {} is unknown",
            marked[0], problem.unknown
        );
        return Err(TranscriptionError::WrongUnknown(marked[0]).into());
    }

    let mut errors = Vec::new();
    let input_power = check_power(problem, Quantity::InputPower, &input.input_power, &mut errors);
    let output_power = check_power(
        problem,
        Quantity::OutputPower,
        &input.output_power,
        &mut errors,
    );
    let efficiency = check_efficiency(problem, &input.efficiency, &mut errors);

    if !errors.is_empty() {
        debug!("Transcription rejected with {} value errors", errors.len());
        return Err(TranscriptionReport { errors });
    }

    Ok(WriteState {
        input_power,
        output_power,
        efficiency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::test_support::*;

    fn power(value: &str, unit: PowerUnit) -> PowerEntry {
        PowerEntry {
            value: value.to_string(),
            unit,
            unknown: false,
        }
    }

    fn unknown_power(unit: PowerUnit) -> PowerEntry {
        PowerEntry {
            value: String::new(),
            unit,
            unknown: true,
        }
    }

    fn efficiency(percent: &str, decimal: &str) -> EfficiencyEntry {
        EfficiencyEntry {
            percent: percent.to_string(),
            decimal: decimal.to_string(),
            unknown: false,
        }
    }

    fn unknown_efficiency() -> EfficiencyEntry {
        EfficiencyEntry {
            unknown: true,
            ..Default::default()
        }
    }

    #[test]
    fn accepts_correct_transcription_in_other_units() {
        let problem = turbine_efficiency_problem();
        let input = TranscriptionInput {
            input_power: power("10 000", PowerUnit::KW),
            output_power: power("6", PowerUnit::MW),
            efficiency: unknown_efficiency(),
        };
        let state = validate_transcription(&problem, &input).unwrap();
        assert_eq!(state.efficiency, Recorded::Unknown(None));
        assert_eq!(state.summary(), "P₀ = 10000 kW • P = 6 MW • η = ?");
    }

    #[test]
    fn two_unknowns_are_always_rejected() {
        let problem = turbine_efficiency_problem();
        let input = TranscriptionInput {
            input_power: unknown_power(PowerUnit::MW),
            output_power: power("6", PowerUnit::MW),
            efficiency: unknown_efficiency(),
        };
        let report = validate_transcription(&problem, &input).unwrap_err();
        assert_eq!(report.errors, vec![TranscriptionError::UnknownCount(2)]);
        assert!(report.errors[0].is_structural());
    }

    #[test]
    fn no_unknown_is_rejected() {
        let problem = motor_output_problem();
        let input = TranscriptionInput {
            input_power: power("200", PowerUnit::KW),
            output_power: power("150", PowerUnit::KW),
            efficiency: efficiency("75", "0,75"),
        };
        let report = validate_transcription(&problem, &input).unwrap_err();
        assert!(report.contains(&TranscriptionError::UnknownCount(0)));
    }

    #[test]
    fn wrong_unknown_is_rejected() {
        let problem = motor_output_problem();
        let input = TranscriptionInput {
            input_power: unknown_power(PowerUnit::KW),
            output_power: power("150", PowerUnit::KW),
            efficiency: efficiency("75", "0.75"),
        };
        let report = validate_transcription(&problem, &input).unwrap_err();
        assert_eq!(
            report.errors,
            vec![TranscriptionError::WrongUnknown(Quantity::InputPower)]
        );
    }

    #[test]
    fn unit_mistake_is_a_value_mismatch() {
        let problem = motor_output_problem();
        let input = TranscriptionInput {
            input_power: power("200", PowerUnit::W),
            output_power: unknown_power(PowerUnit::KW),
            efficiency: efficiency("75", "0,75"),
        };
        let report = validate_transcription(&problem, &input).unwrap_err();
        assert_eq!(
            report.errors,
            vec![TranscriptionError::ValueMismatch(Quantity::InputPower)]
        );
    }

    #[test]
    fn efficiency_forms_must_agree() {
        let problem = motor_output_problem();
        let input = TranscriptionInput {
            input_power: power("200", PowerUnit::KW),
            output_power: unknown_power(PowerUnit::KW),
            efficiency: efficiency("75", "7,5"),
        };
        let report = validate_transcription(&problem, &input).unwrap_err();
        assert_eq!(report.errors, vec![TranscriptionError::EfficiencyForms]);
    }

    #[test]
    fn efficiency_must_match_problem() {
        let problem = pump_input_problem();
        let input = TranscriptionInput {
            input_power: unknown_power(PowerUnit::KW),
            output_power: power("8", PowerUnit::KW),
            efficiency: efficiency("46", "0,46"),
        };
        let report = validate_transcription(&problem, &input).unwrap_err();
        assert_eq!(report.errors, vec![TranscriptionError::EfficiencyMismatch]);
    }

    #[test]
    fn unknown_value_text_is_ignored() {
        let problem = pump_input_problem();
        let mut p0 = unknown_power(PowerUnit::KW);
        p0.value = "garbage".to_string();
        let input = TranscriptionInput {
            input_power: p0,
            output_power: power("8", PowerUnit::KW),
            efficiency: efficiency("64", "0,64"),
        };
        let state = validate_transcription(&problem, &input).unwrap();
        assert_eq!(state.input_power, Recorded::Unknown(Some(PowerUnit::KW)));
    }

    #[test]
    fn validation_is_idempotent() {
        let problem = motor_output_problem();
        let good = TranscriptionInput {
            input_power: power("0,2", PowerUnit::MW),
            output_power: unknown_power(PowerUnit::KW),
            efficiency: efficiency("75", "0,75"),
        };
        let bad = TranscriptionInput {
            input_power: power("abc", PowerUnit::MW),
            ..good.clone()
        };
        assert_eq!(
            validate_transcription(&problem, &good),
            validate_transcription(&problem, &good)
        );
        assert_eq!(
            validate_transcription(&problem, &bad),
            validate_transcription(&problem, &bad)
        );
        assert!(validate_transcription(&problem, &bad).is_err());
    }

    #[test]
    fn report_collects_every_value_error() {
        let problem = motor_output_problem();
        let input = TranscriptionInput {
            input_power: power("2", PowerUnit::KW),
            output_power: unknown_power(PowerUnit::KW),
            efficiency: efficiency("", ""),
        };
        let report = validate_transcription(&problem, &input).unwrap_err();
        assert_eq!(report.errors.len(), 3);
        assert!(report.to_string().contains("P₀ neodpovídá"));
    }

    #[test]
    fn tiny_output_power_copied_from_statement_is_accepted() {
        let problem =
            Problem::from_efficiency(device("zarovka"), Quantity::InputPower, 5.01, 5.0).unwrap();
        assert!(problem.statement.contains("P = 0,2505 W"));
        let input = TranscriptionInput {
            input_power: unknown_power(PowerUnit::W),
            output_power: power("0,2505", PowerUnit::W),
            efficiency: efficiency("5", "0,05"),
        };
        assert!(validate_transcription(&problem, &input).is_ok());
    }

    #[test]
    fn rounded_statement_value_counts_as_given() {
        let problem =
            Problem::from_powers(device("zarovka"), Quantity::Efficiency, 1.0, 0.01234).unwrap();
        assert_eq!(problem.display_value(Quantity::OutputPower), "0,0123 W");
        let input = TranscriptionInput {
            input_power: power("1", PowerUnit::W),
            output_power: power("0,0123", PowerUnit::W),
            efficiency: unknown_efficiency(),
        };
        assert!(validate_transcription(&problem, &input).is_ok());
    }
}
