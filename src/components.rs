//! Pure Yew view components for the efficiency tutor.
//!
//! Components render from props only; all session mutation happens in
//! `main.rs` callbacks.

use crate::utils::format_accuracy;
use efficiency_tutor::grading::expected_line;
use efficiency_tutor::{AnswerUnit, CheckReport, PowerUnit, Problem, Stats, Step};
use web_sys::HtmlSelectElement;
use yew::prelude::*;

/// Renders the running statistics panel.
pub fn render_stats(stats: &Stats) -> Html {
    html! {
        <div class="stats">
            <div class="stat ok">
                <span class="stat-label">{ "Správně" }</span>
                <span class="stat-value">{ stats.successes }</span>
            </div>
            <div class="stat err">
                <span class="stat-label">{ "Chybně" }</span>
                <span class="stat-value">{ stats.failures }</span>
            </div>
            <div class="stat avg">
                <span class="stat-label">{ "Průměrná přesnost" }</span>
                <span class="stat-value">{ format_accuracy(stats.average_accuracy()) }</span>
            </div>
        </div>
    }
}

/// Renders the outcome of a Check, including the model answer.
pub fn render_report(problem: &Problem, report: &CheckReport) -> Html {
    html! {
        <div class="check-report">
            if report.passed() {
                <div class="success">
                    { format!("✅ Vzorec i výpočet v pořádku. {}", expected_line(problem)) }
                </div>
            } else {
                <ul class="error">
                    { report.errors.iter().map(|e| html! {
                        <li>{ format!("❌ {}", e) }</li>
                    }).collect::<Html>() }
                </ul>
            }
            <div class="note">
                <b>{ "Vzorová odpověď: " }</b>
                <i>{ &report.canonical_answer }</i>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatementPanelProps {
    pub problem: Problem,
}

/// Left panel: statement, task and the given values.
#[function_component(StatementPanel)]
pub fn statement_panel(props: &StatementPanelProps) -> Html {
    let problem = &props.problem;
    html! {
        <aside class="statement">
            <h2>{ "Zadání" }</h2>
            <p class="statement-text">{ &problem.statement }</p>
            <p class="statement-task"><b>{ "Úkol: " }</b>{ &problem.question }</p>
            <div class="known-box">
                <b>{ "Dané: " }</b>{ problem.known_summary() }
            </div>
        </aside>
    }
}

#[derive(Properties, PartialEq)]
pub struct StepIndicatorProps {
    pub step: Step,
}

#[function_component(StepIndicator)]
pub fn step_indicator(props: &StepIndicatorProps) -> Html {
    html! {
        <ol class="steps">
            { [Step::Transcription, Step::CalculationAndAnswer].into_iter().map(|step| {
                let class = if step == props.step { "step active" } else { "step" };
                html! {
                    <li class={class}>{ format!("{}. {}", step.number(), step.title()) }</li>
                }
            }).collect::<Html>() }
        </ol>
    }
}

/// Unit selector for a power value.
#[derive(Properties, PartialEq)]
pub struct UnitSelectProps {
    pub value: PowerUnit,
    pub onchange: Callback<PowerUnit>,
}

#[function_component(UnitSelect)]
pub fn unit_select(props: &UnitSelectProps) -> Html {
    let onchange = {
        let emit = props.onchange.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Ok(unit) = select.value().parse::<PowerUnit>() {
                emit.emit(unit);
            }
        })
    };
    html! {
        <select class="input unit" {onchange}>
            { PowerUnit::ALL.into_iter().map(|unit| html! {
                <option value={unit.symbol()} selected={unit == props.value}>{ unit.symbol() }</option>
            }).collect::<Html>() }
        </select>
    }
}

/// Unit selector for the computed result (`%` or a power unit).
#[derive(Properties, PartialEq)]
pub struct AnswerUnitSelectProps {
    pub value: AnswerUnit,
    pub onchange: Callback<AnswerUnit>,
}

#[function_component(AnswerUnitSelect)]
pub fn answer_unit_select(props: &AnswerUnitSelectProps) -> Html {
    let onchange = {
        let emit = props.onchange.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            if let Ok(unit) = select.value().parse::<AnswerUnit>() {
                emit.emit(unit);
            }
        })
    };
    html! {
        <select class="input unit" {onchange}>
            { AnswerUnit::ALL.into_iter().map(|unit| html! {
                <option value={unit.symbol()} selected={unit == props.value}>{ unit.symbol() }</option>
            }).collect::<Html>() }
        </select>
    }
}

/// Inline feedback line under a form: success text or the error message.
#[derive(Properties, PartialEq)]
pub struct FeedbackProps {
    pub result: Option<Result<String, String>>,
}

#[function_component(Feedback)]
pub fn feedback(props: &FeedbackProps) -> Html {
    match &props.result {
        Some(Ok(msg)) => html! { <div class="feedback success">{ format!("✅ {}", msg) }</div> },
        Some(Err(msg)) => html! { <div class="feedback error">{ format!("❌ {}", msg) }</div> },
        None => html! {},
    }
}
