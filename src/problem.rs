//! Problem generation.
//!
//! A problem picks a device, hides one of η, P and P₀, and draws the other
//! values so that η = P / P₀ holds exactly.

use crate::catalog::{Device, DeviceCatalog};
use crate::units::{format_comma, round_to, unitize, AnswerUnit, Power};
use log::{info, warn};
use rand::seq::IndexedRandom;
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use std::fmt;
use std::str::FromStr;

/// The three quantities of the efficiency relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantity {
    Efficiency,
    OutputPower,
    InputPower,
}

impl Quantity {
    pub const ALL: [Quantity; 3] = [
        Quantity::Efficiency,
        Quantity::OutputPower,
        Quantity::InputPower,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Quantity::Efficiency => "η",
            Quantity::OutputPower => "P",
            Quantity::InputPower => "P₀",
        }
    }

    /// Czech name shown next to the symbol.
    pub fn label(self) -> &'static str {
        match self {
            Quantity::Efficiency => "účinnost",
            Quantity::OutputPower => "užitečný výkon",
            Quantity::InputPower => "příkon",
        }
    }

    /// Accepted spellings of the formula solving for this quantity, after
    /// normalization.
    pub fn accepted_formulas(self) -> &'static [&'static str] {
        match self {
            Quantity::Efficiency => &["η=P/P₀", "η=P:P₀"],
            Quantity::OutputPower => &["P=η·P₀", "P=(η:100)·P₀", "P=η*P₀"],
            Quantity::InputPower => &["P₀=P/η", "P₀=P:(η:100)"],
        }
    }

    pub fn formula_hint(self) -> &'static str {
        match self {
            Quantity::Efficiency => "η = P / P₀ (lze i η = P : P₀)",
            Quantity::OutputPower => {
                "P = η · P₀ (η jako desetinné číslo, např. 0,75) nebo P = (η : 100) · P₀"
            }
            Quantity::InputPower => "P₀ = P / η (η jako desetinné číslo) nebo P₀ = P : (η : 100)",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Difficulty tier: numeric ranges and rounding of the drawn input power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn code(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Lehká",
            Difficulty::Normal => "Střední",
            Difficulty::Hard => "Těžká",
        }
    }

    pub fn input_power_range(self) -> (f64, f64) {
        match self {
            Difficulty::Easy => (1.0, 100_000.0),
            Difficulty::Normal => (1.0, 10_000_000.0),
            Difficulty::Hard => (1.0, 100_000_000.0),
        }
    }

    pub fn efficiency_range(self) -> (u32, u32) {
        match self {
            Difficulty::Easy => (10, 90),
            Difficulty::Normal => (5, 95),
            Difficulty::Hard => (1, 99),
        }
    }

    /// Decimal places kept on P₀ in its display unit.
    pub fn decimals(self) -> i32 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Normal => 1,
            Difficulty::Hard => 2,
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.code() == s.trim())
            .ok_or_else(|| format!("Unknown difficulty '{}'", s))
    }
}

#[derive(Debug)]
pub enum GenerationError {
    DegenerateRange {
        device: String,
        what: &'static str,
        min: f64,
        max: f64,
    },
    InvalidValues(&'static str),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::DegenerateRange {
                device,
                what,
                min,
                max,
            } => write!(
                f,
                "Cannot draw {} for '{}': empty range [{} to {}]",
                what, device, min, max
            ),
            GenerationError::InvalidValues(reason) => {
                write!(f, "Invalid problem values: {}", reason)
            }
        }
    }
}

impl std::error::Error for GenerationError {}

/// One generated exercise. Powers are stored in watts, efficiency in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub device: Device,
    pub unknown: Quantity,
    pub input_power_w: f64,
    pub output_power_w: f64,
    pub efficiency_pct: f64,
    pub statement: String,
    pub question: String,
}

impl Problem {
    /// Build a problem from P₀ and η; P is derived.
    pub fn from_efficiency(
        device: Device,
        unknown: Quantity,
        input_power_w: f64,
        efficiency_pct: f64,
    ) -> Result<Self, GenerationError> {
        if !(input_power_w.is_finite() && input_power_w > 0.0) {
            return Err(GenerationError::InvalidValues("input power must be positive"));
        }
        if !(efficiency_pct.is_finite() && efficiency_pct > 0.0) {
            return Err(GenerationError::InvalidValues("efficiency must be positive"));
        }
        let output_power_w = input_power_w * efficiency_pct / 100.0;
        Ok(Self::assemble(
            device,
            unknown,
            input_power_w,
            output_power_w,
            efficiency_pct,
        ))
    }

    /// Build a problem from P₀ and P; η is derived.
    pub fn from_powers(
        device: Device,
        unknown: Quantity,
        input_power_w: f64,
        output_power_w: f64,
    ) -> Result<Self, GenerationError> {
        if !(input_power_w.is_finite() && input_power_w > 0.0) {
            return Err(GenerationError::InvalidValues("input power must be positive"));
        }
        if !(output_power_w.is_finite() && output_power_w > 0.0) {
            return Err(GenerationError::InvalidValues("output power must be positive"));
        }
        let efficiency_pct = output_power_w * 100.0 / input_power_w;
        Ok(Self::assemble(
            device,
            unknown,
            input_power_w,
            output_power_w,
            efficiency_pct,
        ))
    }

    fn assemble(
        device: Device,
        unknown: Quantity,
        input_power_w: f64,
        output_power_w: f64,
        efficiency_pct: f64,
    ) -> Self {
        let p0 = unitize(input_power_w);
        let p = unitize(output_power_w);
        let eta = format_comma(efficiency_pct, 3);
        let (statement, question) = match unknown {
            Quantity::Efficiency => (
                format!(
                    "{} odebírá ze sítě příkon P₀ = {}. Jeho užitečný výkon je P = {}. Jaká je účinnost zařízení?",
                    device.name, p0, p
                ),
                "Vypočítej účinnost η v procentech.".to_string(),
            ),
            Quantity::OutputPower => (
                format!(
                    "{} pracuje s účinností η = {} % a odebírá příkon P₀ = {}. Jaký je jeho užitečný výkon?",
                    device.name, eta, p0
                ),
                "Vypočítej užitečný výkon P.".to_string(),
            ),
            Quantity::InputPower => (
                format!(
                    "{} s účinností η = {} % dodává užitečný výkon P = {}. Jaký příkon odebírá?",
                    device.name, eta, p
                ),
                "Vypočítej celkový příkon P₀.".to_string(),
            ),
        };

        Self {
            device,
            unknown,
            input_power_w,
            output_power_w,
            efficiency_pct,
            statement,
            question,
        }
    }

    pub fn input_power(&self) -> Power {
        unitize(self.input_power_w)
    }

    pub fn output_power(&self) -> Power {
        unitize(self.output_power_w)
    }

    /// True value of a quantity: watts for powers, percent for η.
    pub fn true_value(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Efficiency => self.efficiency_pct,
            Quantity::OutputPower => self.output_power_w,
            Quantity::InputPower => self.input_power_w,
        }
    }

    /// `P₀ = 10 MW • P = ? • η = 60 %` with the unknown replaced by `?`.
    pub fn known_summary(&self) -> String {
        Quantity::ALL
            .iter()
            .rev()
            .map(|&q| {
                if q == self.unknown {
                    format!("{} = ?", q.symbol())
                } else {
                    format!("{} = {}", q.symbol(), self.display_value(q))
                }
            })
            .collect::<Vec<_>>()
            .join(" • ")
    }

    /// Number the statement shows for a quantity, read back as watts or percent.
    pub fn shown_value(&self, quantity: Quantity) -> f64 {
        match quantity {
            Quantity::Efficiency => round_to(self.efficiency_pct, 3),
            Quantity::OutputPower => self.output_power().as_displayed().watts(),
            Quantity::InputPower => self.input_power().as_displayed().watts(),
        }
    }

    /// Value of a quantity as the statement prints it.
    pub fn display_value(&self, quantity: Quantity) -> String {
        match quantity {
            Quantity::Efficiency => format!("{} %", format_comma(self.efficiency_pct, 3)),
            Quantity::OutputPower => self.output_power().to_string(),
            Quantity::InputPower => self.input_power().to_string(),
        }
    }

    /// Unit preselected for the result: `%` for η, otherwise the unknown
    /// power's readable unit.
    pub fn suggested_result_unit(&self) -> AnswerUnit {
        match self.unknown {
            Quantity::Efficiency => AnswerUnit::Percent,
            q => AnswerUnit::Power(unitize(self.true_value(q)).unit),
        }
    }

    /// Answer template with `__` where the learner's number goes.
    pub fn answer_template(&self) -> String {
        match self.unknown {
            Quantity::Efficiency => format!("Účinnost {} je __ %.", self.device.genitive),
            Quantity::OutputPower => format!("Užitečný výkon {} je __", self.device.genitive),
            Quantity::InputPower => format!("Příkon {} je __", self.device.genitive),
        }
    }

    /// The complete answer sentence with the true value.
    pub fn canonical_answer(&self) -> String {
        let value = self.display_value(self.unknown);
        match self.unknown {
            Quantity::Efficiency => format!("Účinnost {} je {}.", self.device.genitive, value),
            Quantity::OutputPower => {
                format!("Užitečný výkon {} je {}.", self.device.genitive, value)
            }
            Quantity::InputPower => format!("Příkon {} je {}.", self.device.genitive, value),
        }
    }
}

/// Intersect two inclusive ranges, clamping the minimum to at least `floor`.
fn intersect<T: PartialOrd + Copy>(a: (T, T), b: (T, T), floor: T) -> Option<(T, T)> {
    let mut lo = if a.0 > b.0 { a.0 } else { b.0 };
    let hi = if a.1 < b.1 { a.1 } else { b.1 };
    if lo < floor {
        lo = floor;
    }
    (lo <= hi).then_some((lo, hi))
}

fn tier_ranges(device: &Device, difficulty: Difficulty) -> Option<((f64, f64), (u32, u32))> {
    let power = intersect(
        device.input_power_range(),
        difficulty.input_power_range(),
        1.0,
    )?;
    let eta = intersect(device.efficiency_range(), difficulty.efficiency_range(), 1)?;
    Some((power, eta))
}

/// Round to `decimals` places in the display unit, never below 1 in that unit.
fn round_in_display_unit(watts: f64, decimals: i32) -> f64 {
    let power = unitize(watts);
    let scale = 10f64.powi(decimals);
    let rounded = ((power.value * scale).round() / scale).max(1.0);
    power.unit.to_watts(rounded)
}

/// Draw a fresh problem for the given difficulty.
pub fn generate<R: Rng>(
    catalog: &DeviceCatalog,
    difficulty: Difficulty,
    rng: &mut R,
) -> Result<Problem, GenerationError> {
    let eligible: Vec<(&Device, (f64, f64), (u32, u32))> = catalog
        .devices()
        .iter()
        .filter_map(|d| tier_ranges(d, difficulty).map(|(p, e)| (d, p, e)))
        .collect();

    let (device, power_range, eta_range) = match eligible.choose(rng) {
        Some(&picked) => picked,
        None => {
            warn!(
                "No device fits the '{}' tier, falling back to device ranges",
                difficulty.code()
            );
            let device = catalog
                .devices()
                .choose(rng)
                .ok_or(GenerationError::InvalidValues("catalog is empty"))?;
            let (p_min, p_max) = device.input_power_range();
            let (e_min, e_max) = device.efficiency_range();
            (device, (p_min.max(1.0), p_max), (e_min.max(1), e_max))
        }
    };

    let unknown = *Quantity::ALL
        .choose(rng)
        .ok_or(GenerationError::InvalidValues("no quantity to hide"))?;

    let degenerate = |what, min: f64, max: f64| GenerationError::DegenerateRange {
        device: device.id.clone(),
        what,
        min,
        max,
    };
    let power_dist = Uniform::new_inclusive(power_range.0, power_range.1)
        .map_err(|_| degenerate("input power", power_range.0, power_range.1))?;
    if eta_range.0 > eta_range.1 {
        return Err(degenerate(
            "efficiency",
            eta_range.0 as f64,
            eta_range.1 as f64,
        ));
    }

    let input_power_w = round_in_display_unit(power_dist.sample(rng), difficulty.decimals());
    let efficiency_pct = rng.random_range(eta_range.0..=eta_range.1) as f64;

    let problem = Problem::from_efficiency(device.clone(), unknown, input_power_w, efficiency_pct)?;
    info!(
        "Generated problem: device={}, unknown={}, P0={} W, eta={} %",
        problem.device.id, problem.unknown, problem.input_power_w, problem.efficiency_pct
    );
    Ok(problem)
}
