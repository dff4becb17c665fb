//! Word-problem generator and step validator for power efficiency exercises
//! (η = P / P₀).
//!
//! Everything in the library is plain Rust so it can be exercised natively;
//! the Yew front end in `main.rs` only binds it to the DOM.

pub mod catalog;
pub mod grading;
pub mod problem;
pub mod session;
pub mod transcription;
pub mod units;

pub use catalog::{CatalogError, Device, DeviceCatalog};
pub use grading::{grade, normalize_formula, CalculationInput, CheckError, CheckReport};
pub use problem::{generate, Difficulty, GenerationError, Problem, Quantity};
pub use session::{Gates, NavigationError, Session, SessionError, Stats, Step};
pub use transcription::{
    validate_transcription, EfficiencyEntry, PowerEntry, Recorded, TranscriptionError,
    TranscriptionInput, TranscriptionReport, WriteState,
};
pub use units::{format_comma, format_watts, parse_decimal, unitize, AnswerUnit, Power, PowerUnit};

/// Default validation parameters
pub mod defaults {
    /// Relative tolerance (percent) when comparing transcribed values.
    pub const WRITE_TOLERANCE_PERCENT: f64 = 0.1;
    /// Relative tolerance (percent) when comparing a computed result.
    pub const RESULT_TOLERANCE_PERCENT: f64 = 0.5;
    /// Absolute tolerance in percentage points for an efficiency result.
    pub const EFFICIENCY_TOLERANCE_PP: f64 = 0.6;
    /// Allowed gap between the percent and decimal forms of η.
    pub const EFFICIENCY_FORM_TOLERANCE: f64 = 0.001;
}

/// Return `value / target` as a percentage (e.g. 100.0 means perfect hit).
#[inline]
pub(crate) fn accuracy_percent(value: f64, target: f64) -> f64 {
    value / target * 100.0
}

/// Check whether a percentage is inside ±`tolerance_percent`.
#[inline]
pub(crate) fn within_tolerance(value_pct: f64, tolerance_percent: f64) -> bool {
    let lower = 100.0 - tolerance_percent;
    let upper = 100.0 + tolerance_percent;
    (lower..=upper).contains(&value_pct)
}

/// Relative comparison of `value` against a strictly positive `target`.
///
/// Non-finite input never matches.
pub(crate) fn matches_relative(value: f64, target: f64, tolerance_percent: f64) -> bool {
    if !value.is_finite() || !target.is_finite() || target <= 0.0 {
        return false;
    }
    within_tolerance(accuracy_percent(value, target), tolerance_percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_band_is_inclusive() {
        assert!(within_tolerance(100.5, 0.5));
        assert!(within_tolerance(99.5, 0.5));
        assert!(!within_tolerance(99.4, 0.5));
    }

    #[test]
    fn relative_match_rejects_nan_and_zero_targets() {
        assert!(matches_relative(150_000.0, 150_000.0, 0.1));
        assert!(!matches_relative(f64::NAN, 150_000.0, 0.1));
        assert!(!matches_relative(1.0, 0.0, 0.1));
        assert!(!matches_relative(149_000.0, 150_000.0, 0.5));
    }
}
