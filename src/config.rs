//! Application-level configuration constants.

use efficiency_tutor::Difficulty;

// UI Behavior
pub const DEBOUNCE_MS: u32 = 250;
pub const DEFAULT_DIFFICULTY: Difficulty = Difficulty::Normal;

// Formula helper buttons: (label, inserted text)
pub const FORMULA_SYMBOLS: &[(&str, &str)] = &[
    ("η", "η"),
    ("P", "P"),
    ("P₀", "P₀"),
    ("·", " · "),
    ("/", " / "),
    (":", " : "),
    ("=", " = "),
    ("(", "("),
    (")", ")"),
];

// Copy
pub const APP_TITLE: &str = "Účinnost: příkon, výkon a η";
pub const FOOTER_TEXT: &str = "Učební aplikace: účinnost (W / kW / MW)";
