//! Power units, number parsing and decimal-comma formatting.

use std::fmt;
use std::str::FromStr;

/// The three power units a learner can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PowerUnit {
    #[default]
    W,
    KW,
    MW,
}

impl PowerUnit {
    pub const ALL: [PowerUnit; 3] = [PowerUnit::W, PowerUnit::KW, PowerUnit::MW];

    /// Multiplier to watts.
    pub fn factor(self) -> f64 {
        match self {
            PowerUnit::W => 1.0,
            PowerUnit::KW => 1_000.0,
            PowerUnit::MW => 1_000_000.0,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            PowerUnit::W => "W",
            PowerUnit::KW => "kW",
            PowerUnit::MW => "MW",
        }
    }

    pub fn to_watts(self, value: f64) -> f64 {
        value * self.factor()
    }
}

impl fmt::Display for PowerUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for PowerUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "W" => Ok(PowerUnit::W),
            "kW" => Ok(PowerUnit::KW),
            "MW" => Ok(PowerUnit::MW),
            other => Err(format!("Unknown power unit '{}'", other)),
        }
    }
}

/// Unit chosen for a computed result: percent for η, a power unit otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerUnit {
    Percent,
    Power(PowerUnit),
}

impl AnswerUnit {
    pub const ALL: [AnswerUnit; 4] = [
        AnswerUnit::Percent,
        AnswerUnit::Power(PowerUnit::W),
        AnswerUnit::Power(PowerUnit::KW),
        AnswerUnit::Power(PowerUnit::MW),
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            AnswerUnit::Percent => "%",
            AnswerUnit::Power(unit) => unit.symbol(),
        }
    }
}

impl Default for AnswerUnit {
    fn default() -> Self {
        AnswerUnit::Power(PowerUnit::W)
    }
}

impl FromStr for AnswerUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "%" {
            return Ok(AnswerUnit::Percent);
        }
        s.parse().map(AnswerUnit::Power)
    }
}

/// A value expressed in a display unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Power {
    pub value: f64,
    pub unit: PowerUnit,
}

/// Decimals a power value is printed with.
pub const POWER_DECIMALS: usize = 4;

impl Power {
    pub fn watts(&self) -> f64 {
        self.unit.to_watts(self.value)
    }

    /// The value exactly as `Display` prints it.
    pub fn as_displayed(&self) -> Power {
        Power {
            value: round_to(self.value, POWER_DECIMALS),
            unit: self.unit,
        }
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_comma(self.value, POWER_DECIMALS), self.unit)
    }
}

/// Express watts in the most readable unit (≥ 1 MW → MW, ≥ 1 kW → kW).
pub fn unitize(watts: f64) -> Power {
    let unit = if watts >= 1_000_000.0 {
        PowerUnit::MW
    } else if watts >= 1_000.0 {
        PowerUnit::KW
    } else {
        PowerUnit::W
    };
    Power {
        value: watts / unit.factor(),
        unit,
    }
}

/// Round half away from zero to `digits` decimals.
pub fn round_to(num: f64, digits: usize) -> f64 {
    let scale = 10f64.powi(digits as i32);
    (num * scale).round() / scale
}

/// Format with at most `digits` decimals, trailing zeros dropped and a
/// decimal comma.
pub fn format_comma(num: f64, digits: usize) -> String {
    let mut s = format!("{:.*}", digits, num);
    if s.contains('.') {
        s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s.replace('.', ",")
}

/// Format a watt value in its readable unit, e.g. `1,5 MW`.
pub fn format_watts(watts: f64) -> String {
    unitize(watts).to_string()
}

/// Parse learner input. Accepts a decimal comma or dot and ignores
/// whitespace (thousand separators). Returns `None` for anything that is not
/// a finite number.
pub fn parse_decimal(input: &str) -> Option<f64> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    compact
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
