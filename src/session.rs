//! Session state: the current problem, the step gates and running stats.
//!
//! The session is the only mutable object of the widget. Validators are pure
//! functions; the session stores what they return and decides which step
//! transitions are allowed.

use crate::catalog::{CatalogError, DeviceCatalog};
use crate::grading::{grade, CalculationInput, CheckReport};
use crate::problem::{generate, Difficulty, GenerationError, Problem};
use crate::transcription::{validate_transcription, TranscriptionInput, TranscriptionReport, WriteState};
use log::{debug, info};
use rand::rngs::ThreadRng;
use rand::Rng;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Step {
    /// Zápis: copy the given values.
    #[default]
    Transcription,
    /// Výpočet and Odpověď: formula, result and answer sentence.
    CalculationAndAnswer,
}

impl Step {
    pub fn number(self) -> usize {
        match self {
            Step::Transcription => 1,
            Step::CalculationAndAnswer => 2,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Transcription => "Zápis",
            Step::CalculationAndAnswer => "Výpočet a odpověď",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gates {
    pub write_ok: bool,
    pub calc_ok: bool,
}

/// Running counters, kept across problems until an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    pub successes: u32,
    pub failures: u32,
    pub accuracy_sum: f64,
    pub accuracy_count: u32,
}

impl Stats {
    pub fn record_success(&mut self, accuracy: f64) {
        self.successes += 1;
        self.accuracy_sum += accuracy;
        self.accuracy_count += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Mean accuracy of successful checks, `None` before the first one.
    pub fn average_accuracy(&self) -> Option<f64> {
        (self.accuracy_count > 0).then(|| self.accuracy_sum / self.accuracy_count as f64)
    }

    pub fn reset(&mut self) {
        *self = Stats::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationError {
    /// Next pressed before the transcription matched the problem.
    TranscriptionPending,
    AtLastStep,
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::TranscriptionPending => {
                write!(f, "Nejdřív správně vyplň zápis.")
            }
            NavigationError::AtLastStep => write!(f, "Toto je poslední krok."),
        }
    }
}

impl std::error::Error for NavigationError {}

#[derive(Debug)]
pub enum SessionError {
    Catalog(CatalogError),
    Generation(GenerationError),
    /// An action that belongs to another step.
    WrongStep { expected: Step, actual: Step },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Catalog(e) => write!(f, "Device catalog error: {}", e),
            SessionError::Generation(e) => write!(f, "Problem generation failed: {}", e),
            SessionError::WrongStep { expected, actual } => write!(
                f,
                "Action belongs to step {} but the session is at step {}",
                expected.number(),
                actual.number()
            ),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Catalog(e) => Some(e),
            SessionError::Generation(e) => Some(e),
            SessionError::WrongStep { .. } => None,
        }
    }
}

impl From<CatalogError> for SessionError {
    fn from(e: CatalogError) -> Self {
        SessionError::Catalog(e)
    }
}

impl From<GenerationError> for SessionError {
    fn from(e: GenerationError) -> Self {
        SessionError::Generation(e)
    }
}

pub struct Session<R: Rng = ThreadRng> {
    catalog: DeviceCatalog,
    difficulty: Difficulty,
    problem: Problem,
    step: Step,
    write_state: Option<WriteState>,
    gates: Gates,
    stats: Stats,
    last_report: Option<CheckReport>,
    /// Bumped on every new problem so views can reset their fields.
    round: u64,
    rng: R,
}

impl Session<ThreadRng> {
    /// Session over the built-in catalog and the thread RNG.
    pub fn new(difficulty: Difficulty) -> Result<Self, SessionError> {
        Session::with_rng(DeviceCatalog::builtin()?, difficulty, rand::rng())
    }
}

impl<R: Rng> Session<R> {
    pub fn with_rng(
        catalog: DeviceCatalog,
        difficulty: Difficulty,
        mut rng: R,
    ) -> Result<Self, SessionError> {
        let problem = generate(&catalog, difficulty, &mut rng)?;
        Ok(Self::with_problem(catalog, difficulty, problem, rng))
    }

    /// Start from a known problem instead of a random one.
    pub fn with_problem(catalog: DeviceCatalog, difficulty: Difficulty, problem: Problem, rng: R) -> Self {
        Self {
            catalog,
            difficulty,
            problem,
            step: Step::Transcription,
            write_state: None,
            gates: Gates::default(),
            stats: Stats::default(),
            last_report: None,
            round: 0,
            rng,
        }
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn gates(&self) -> Gates {
        self.gates
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn write_state(&self) -> Option<&WriteState> {
        self.write_state.as_ref()
    }

    pub fn last_report(&self) -> Option<&CheckReport> {
        self.last_report.as_ref()
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn can_go_next(&self) -> bool {
        self.step == Step::Transcription && self.gates.write_ok
    }

    pub fn can_go_back(&self) -> bool {
        self.step != Step::Transcription
    }

    /// Replace the problem with a fresh one and return to step 1.
    pub fn new_problem(&mut self) -> Result<(), SessionError> {
        let problem = generate(&self.catalog, self.difficulty, &mut self.rng)?;
        self.start_round(problem);
        Ok(())
    }

    /// Zero the stats and start over with a fresh problem.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.new_problem()?;
        self.stats.reset();
        info!("Session reset");
        Ok(())
    }

    /// Switch tiers; the current problem is replaced.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), SessionError> {
        self.difficulty = difficulty;
        self.new_problem()
    }

    fn start_round(&mut self, problem: Problem) {
        self.problem = problem;
        self.step = Step::Transcription;
        self.write_state = None;
        self.gates = Gates::default();
        self.last_report = None;
        self.round += 1;
        info!("Round {} started ({})", self.round, self.difficulty.code());
    }

    /// Validate step 1 and update the write gate.
    pub fn validate_transcription(
        &mut self,
        input: &TranscriptionInput,
    ) -> Result<&WriteState, TranscriptionReport> {
        match validate_transcription(&self.problem, input) {
            Ok(state) => {
                self.gates.write_ok = true;
                Ok(&*self.write_state.insert(state))
            }
            Err(report) => {
                self.gates.write_ok = false;
                self.write_state = None;
                Err(report)
            }
        }
    }

    pub fn next(&mut self) -> Result<Step, NavigationError> {
        match self.step {
            Step::Transcription if self.gates.write_ok => {
                self.step = Step::CalculationAndAnswer;
                debug!("Moved to step {}", self.step.number());
                Ok(self.step)
            }
            Step::Transcription => Err(NavigationError::TranscriptionPending),
            Step::CalculationAndAnswer => Err(NavigationError::AtLastStep),
        }
    }

    /// Always allowed; stays put on the first step.
    pub fn back(&mut self) -> Step {
        if self.step == Step::CalculationAndAnswer {
            self.step = Step::Transcription;
            debug!("Moved back to step {}", self.step.number());
        }
        self.step
    }

    /// Grade the calculation step and update the stats.
    pub fn check(&mut self, input: &CalculationInput) -> Result<&CheckReport, SessionError> {
        if self.step != Step::CalculationAndAnswer {
            return Err(SessionError::WrongStep {
                expected: Step::CalculationAndAnswer,
                actual: self.step,
            });
        }

        let report = grade(&self.problem, input);
        match (report.passed(), report.accuracy) {
            (true, Some(accuracy)) => {
                self.stats.record_success(accuracy);
                self.gates.calc_ok = true;
            }
            _ => {
                self.stats.record_failure();
                self.gates.calc_ok = false;
            }
        }
        Ok(&*self.last_report.insert(report))
    }
}
