//! Main module for the efficiency tutor using Yew.
//! Wires the session, form state and view components.

use efficiency_tutor::{
    AnswerUnit, CalculationInput, Difficulty, EfficiencyEntry, PowerEntry, PowerUnit,
    Session, SessionError, Step, TranscriptionInput,
};
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

mod components;
mod config;
mod hooks;
mod utils;

use components::{
    render_report, render_stats, AnswerUnitSelect, Feedback, StatementPanel, StepIndicator,
    UnitSelect,
};
use config::*;
use hooks::{use_round_state, use_text_field};
use utils::{checkbox_checked, current_year, split_template};

type SessionCell = Rc<RefCell<Result<Session, SessionError>>>;

// ──────────────────────────────────────────────────────────────────────────────
// Helper functions

/// Helper to bump the session version and trigger a re-render
fn update_session_version(version: &UseStateHandle<u64>) {
    version.set(version.wrapping_add(1));
}

/// Run `action` on the session and report failures through `error_message`.
fn with_session<F>(
    session: &SessionCell,
    error_message: &UseStateHandle<Option<String>>,
    action: F,
) where
    F: FnOnce(&mut Session) -> Result<(), String>,
{
    let outcome = match session.borrow_mut().as_mut() {
        Ok(s) => action(s),
        Err(e) => Err(e.to_string()),
    };
    match outcome {
        Ok(()) => error_message.set(None),
        Err(msg) => {
            log::error!("{}", msg);
            error_message.set(Some(msg));
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────

/// Primary application component wiring session state, effects and UI elements.
#[function_component(Main)]
fn main_component() -> Html {
    let session: SessionCell = use_mut_ref(|| Session::new(DEFAULT_DIFFICULTY));
    // Version state triggers UI re-render when the session is mutated in place
    let session_version = use_state(|| 0u64);
    let error_message = use_state(|| None::<String>);
    let write_feedback = use_state(|| None::<Result<String, String>>);

    let round = session.borrow().as_ref().map(|s| s.round()).unwrap_or(0);
    let default_result_unit = session
        .borrow()
        .as_ref()
        .map(|s| s.problem().suggested_result_unit())
        .unwrap_or(AnswerUnit::Percent);

    // Step 1 fields
    let p0_value = use_text_field(round);
    let p0_unit = use_round_state(round, PowerUnit::W);
    let p0_unknown = use_round_state(round, false);
    let p_value = use_text_field(round);
    let p_unit = use_round_state(round, PowerUnit::W);
    let p_unknown = use_round_state(round, false);
    let eta_percent = use_text_field(round);
    let eta_decimal = use_text_field(round);
    let eta_unknown = use_round_state(round, false);

    // Step 2 fields
    let formula = use_text_field(round);
    let substitution = use_text_field(round);
    let result_value = use_text_field(round);
    let result_unit = use_round_state(round, default_result_unit);
    let answer = use_text_field(round);

    let transcription = TranscriptionInput {
        input_power: PowerEntry {
            value: p0_value.text.clone(),
            unit: *p0_unit,
            unknown: *p0_unknown,
        },
        output_power: PowerEntry {
            value: p_value.text.clone(),
            unit: *p_unit,
            unknown: *p_unknown,
        },
        efficiency: EfficiencyEntry {
            percent: eta_percent.text.clone(),
            decimal: eta_decimal.text.clone(),
            unknown: *eta_unknown,
        },
    };

    // Debounced live check of the transcription; dropping the timeout cancels it
    {
        let session = session.clone();
        let write_feedback = write_feedback.clone();
        use_effect_with((round, transcription.clone()), move |(_, input)| {
            let input = input.clone();
            let handle = Timeout::new(DEBOUNCE_MS, move || {
                let feedback = match session.borrow_mut().as_mut() {
                    Ok(s) => Some(
                        s.validate_transcription(&input)
                            .map(|_| "Zápis odpovídá zadání.".to_string())
                            .map_err(|report| report.to_string()),
                    ),
                    Err(_) => None,
                };
                write_feedback.set(feedback);
            });
            move || drop(handle)
        });
    }

    let on_new = {
        let session = session.clone();
        let error_message = error_message.clone();
        let session_version = session_version.clone();
        Callback::from(move |_: MouseEvent| {
            with_session(&session, &error_message, |s| {
                s.new_problem().map_err(|e| e.to_string())
            });
            update_session_version(&session_version);
        })
    };

    let on_reset = {
        let session = session.clone();
        let error_message = error_message.clone();
        let session_version = session_version.clone();
        Callback::from(move |_: MouseEvent| {
            with_session(&session, &error_message, |s| s.reset().map_err(|e| e.to_string()));
            update_session_version(&session_version);
        })
    };

    let on_difficulty = {
        let session = session.clone();
        let error_message = error_message.clone();
        let session_version = session_version.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            with_session(&session, &error_message, |s| {
                let difficulty = select.value().parse::<Difficulty>()?;
                s.set_difficulty(difficulty).map_err(|e| e.to_string())
            });
            update_session_version(&session_version);
        })
    };

    let on_back = {
        let session = session.clone();
        let error_message = error_message.clone();
        let session_version = session_version.clone();
        Callback::from(move |_: MouseEvent| {
            with_session(&session, &error_message, |s| {
                s.back();
                Ok(())
            });
            update_session_version(&session_version);
        })
    };

    let on_next = {
        let session = session.clone();
        let error_message = error_message.clone();
        let session_version = session_version.clone();
        Callback::from(move |_: MouseEvent| {
            with_session(&session, &error_message, |s| {
                s.next().map(|_| ()).map_err(|e| e.to_string())
            });
            update_session_version(&session_version);
        })
    };

    let on_check = {
        let session = session.clone();
        let error_message = error_message.clone();
        let session_version = session_version.clone();
        let input = CalculationInput {
            formula: formula.text.clone(),
            substitution: substitution.text.clone(),
            result: result_value.text.clone(),
            result_unit: *result_unit,
            answer: answer.text.clone(),
        };
        Callback::from(move |_: MouseEvent| {
            with_session(&session, &error_message, |s| {
                s.check(&input).map(|_| ()).map_err(|e| e.to_string())
            });
            update_session_version(&session_version);
        })
    };

    // Marking a quantity unknown clears its value field
    let unknown_toggle = |flag: &UseStateHandle<bool>, fields: Vec<Callback<String>>| {
        let flag = flag.clone();
        Callback::from(move |e: Event| {
            let checked = checkbox_checked(&e);
            if checked {
                fields.iter().for_each(|f| f.emit(String::new()));
            }
            flag.set(checked);
        })
    };
    let on_p0_unknown = unknown_toggle(&p0_unknown, vec![p0_value.set.clone()]);
    let on_p_unknown = unknown_toggle(&p_unknown, vec![p_value.set.clone()]);
    let on_eta_unknown = unknown_toggle(
        &eta_unknown,
        vec![eta_percent.set.clone(), eta_decimal.set.clone()],
    );

    let set_unit = |handle: &UseStateHandle<PowerUnit>| {
        let handle = handle.clone();
        Callback::from(move |unit: PowerUnit| handle.set(unit))
    };

    let borrowed = session.borrow();
    let s = match borrowed.as_ref() {
        Ok(s) => s,
        Err(e) => {
            return html! {
                <div class="container">
                    <div class="current-error">{ format!("Aplikaci nelze spustit: {}", e) }</div>
                </div>
            };
        }
    };
    let problem = s.problem().clone();
    let step = s.step();

    let step_view = match step {
        Step::Transcription => html! {
            <section class="screen">
                <h2>{ "1. Zápis" }</h2>
                <p class="small muted">
                    { "Opiš dané veličiny i s jednotkami a označ tu, kterou máš vypočítat." }
                </p>
                <div class="grid2">
                    <div class="form-group">
                        <label>{ "P₀ (příkon)" }</label>
                        <div class="row gap">
                            <input class="input" type="text" inputmode="decimal"
                                placeholder={if *p0_unknown { "?" } else { "hodnota" }}
                                disabled={*p0_unknown}
                                value={p0_value.text.clone()}
                                oninput={p0_value.on_input.clone()} />
                            <UnitSelect value={*p0_unit} onchange={set_unit(&p0_unit)} />
                            <label class="unknown-flag">
                                <input type="checkbox" checked={*p0_unknown} onchange={on_p0_unknown} />
                                { "neznámá" }
                            </label>
                        </div>
                    </div>
                    <div class="form-group">
                        <label>{ "P (užitečný výkon)" }</label>
                        <div class="row gap">
                            <input class="input" type="text" inputmode="decimal"
                                placeholder={if *p_unknown { "?" } else { "hodnota" }}
                                disabled={*p_unknown}
                                value={p_value.text.clone()}
                                oninput={p_value.on_input.clone()} />
                            <UnitSelect value={*p_unit} onchange={set_unit(&p_unit)} />
                            <label class="unknown-flag">
                                <input type="checkbox" checked={*p_unknown} onchange={on_p_unknown} />
                                { "neznámá" }
                            </label>
                        </div>
                    </div>
                </div>
                <div class="form-group">
                    <label>{ "η (účinnost)" }</label>
                    <div class="row gap">
                        <input class="input" type="text" inputmode="decimal"
                            placeholder="v %, např. 75"
                            disabled={*eta_unknown}
                            value={eta_percent.text.clone()}
                            oninput={eta_percent.on_input.clone()} />
                        <span>{ "% =" }</span>
                        <input class="input" type="text" inputmode="decimal"
                            placeholder="desetinně, např. 0,75"
                            disabled={*eta_unknown}
                            value={eta_decimal.text.clone()}
                            oninput={eta_decimal.on_input.clone()} />
                        <label class="unknown-flag">
                            <input type="checkbox" checked={*eta_unknown} onchange={on_eta_unknown} />
                            { "neznámá" }
                        </label>
                    </div>
                </div>
                <Feedback result={(*write_feedback).clone()} />
            </section>
        },
        Step::CalculationAndAnswer => {
            let template = problem.answer_template();
            let (before, after) = split_template(&template);
            let summary = s
                .write_state()
                .map(|w| w.summary())
                .unwrap_or_else(|| problem.known_summary());
            html! {
                <section class="screen">
                    <h2>{ "2. Výpočet a odpověď" }</h2>
                    <div class="badge"><b>{ "Zápis: " }</b>{ summary }</div>

                    <div class="inline-buttons">
                        { FORMULA_SYMBOLS.iter().map(|&(label, insert)| {
                            let set = formula.set.clone();
                            let current = formula.text.clone();
                            let onclick = Callback::from(move |_: MouseEvent| {
                                set.emit(format!("{}{}", current, insert));
                            });
                            html! { <button type="button" {onclick}>{ label }</button> }
                        }).collect::<Html>() }
                    </div>
                    <label>{ "Vzorec" }</label>
                    <input class="input" type="text"
                        placeholder={problem.unknown.formula_hint()}
                        value={formula.text.clone()}
                        oninput={formula.on_input.clone()} />

                    <label>{ "Dosazení" }</label>
                    <input class="input" type="text"
                        placeholder={format!("{} = …", problem.unknown.symbol())}
                        value={substitution.text.clone()}
                        oninput={substitution.on_input.clone()} />

                    <label>{ format!("Výsledek: {} ({})", problem.unknown.symbol(), problem.unknown.label()) }</label>
                    <div class="row gap">
                        <input class="input" type="text" inputmode="decimal" placeholder="hodnota"
                            value={result_value.text.clone()}
                            oninput={result_value.on_input.clone()} />
                        <AnswerUnitSelect value={*result_unit}
                            onchange={
                                let result_unit = result_unit.clone();
                                Callback::from(move |unit: AnswerUnit| result_unit.set(unit))
                            } />
                    </div>

                    <label>{ "Odpověď" }</label>
                    <div class="note answer-sentence">
                        { before }
                        <input class="input inline" type="text" inputmode="decimal"
                            placeholder="výsledek"
                            value={answer.text.clone()}
                            oninput={answer.on_input.clone()} />
                        { after }
                    </div>

                    <button class="btn btn-primary" onclick={on_check}>{ "Zkontrolovat" }</button>
                    if let Some(report) = s.last_report() {
                        { render_report(&problem, report) }
                    }
                </section>
            }
        }
    };

    html! {
        <div class="container">
            <header class="top-controls">
                <h1>{ APP_TITLE }</h1>
                <div class="row gap">
                    <select class="input" onchange={on_difficulty}>
                        { Difficulty::ALL.into_iter().map(|d| html! {
                            <option value={d.code()} selected={d == s.difficulty()}>{ d.label() }</option>
                        }).collect::<Html>() }
                    </select>
                    <button class="btn" onclick={on_new}>{ "Nová úloha" }</button>
                    <button class="btn" onclick={on_reset}>{ "Reset" }</button>
                </div>
            </header>

            <main class="layout">
                <div class="side">
                    <StatementPanel problem={problem.clone()} />
                    { render_stats(s.stats()) }
                </div>
                <div class="work">
                    <StepIndicator {step} />
                    { step_view }
                    <div class="nav row gap">
                        <button class="btn" disabled={!s.can_go_back()} onclick={on_back}>{ "Zpět" }</button>
                        <button class="btn btn-primary" disabled={!s.can_go_next()} onclick={on_next}>{ "Dále" }</button>
                    </div>
                    if let Some(err) = &*error_message {
                        <div class="current-error compact">{ err }</div>
                    }
                </div>
            </main>

            <footer class="small muted">
                { format!("© {} {}", current_year(), FOOTER_TEXT) }
            </footer>
        </div>
    }
}

/// Entry point: initializes logging and the Yew renderer.
fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<Main>::new().render();
}
