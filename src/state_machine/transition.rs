//! Pure state transition function

use super::effect::ReplyMenu;
use super::{CollectedData, Command, DialogueState, Effect, Event, GenerationOutcome};
use crate::generator::GenerationRequest;
use thiserror::Error;

pub(crate) const GREETING: &str =
    "Привет! Добро пожаловать в бота для генерации презентаций.\nВыберите действие:";
pub(crate) const CHOOSE_OPTION: &str = "Выберите опцию:";
pub(crate) const INVALID_CHOICE: &str = "Пожалуйста, выберите одну из опций.";
pub(crate) const BACK_TO_MENU: &str = "Вы вернулись в главное меню.";
pub(crate) const ASK_STYLE: &str = "Пожалуйста, введите стиль:";
pub(crate) const STYLE_SAVED: &str = "Стиль сохранён.\nТеперь выберите действие:";
pub(crate) const ASK_QUERY: &str = "Пожалуйста, введите запрос:";
pub(crate) const DONE: &str = "Готово. Вы вернулись в главное меню.";

/// Shown in the echo when no style was collected
const STYLE_NOT_SET: &str = "не указан";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: DialogueState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: DialogueState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Presentation is being generated, input is not accepted until it finishes")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the same state, data and event it always produces the same result,
/// with no I/O side effects.
pub fn transition(
    state: &DialogueState,
    data: &CollectedData,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Generation in flight
        // ============================================================
        (DialogueState::Generating, Event::UserInput { .. }) => Err(TransitionError::Busy),

        (DialogueState::Generating, Event::GenerationFinished { outcome }) => {
            Ok(TransitionResult::new(DialogueState::Idle)
                .with_effect(Effect::ClearData)
                .with_effect(Effect::PersistState)
                .with_effect(Effect::reply_with_menu(
                    format!("{}\n{DONE}", outcome_message(&outcome)),
                    ReplyMenu::main(),
                )))
        }

        (state, Event::GenerationFinished { .. }) => Err(TransitionError::InvalidTransition(
            format!("generation finished while in {}", state.name()),
        )),

        // ============================================================
        // Main menu
        // ============================================================
        (DialogueState::Idle, Event::UserInput { command: Command::Start, .. }) => {
            Ok(TransitionResult::new(DialogueState::Idle)
                .with_effect(Effect::reply_with_menu(GREETING, ReplyMenu::main())))
        }

        (DialogueState::Idle, Event::UserInput { command: Command::CreatePresentation, .. }) => {
            Ok(TransitionResult::new(DialogueState::AwaitingStyleChoice)
                .with_effect(Effect::PersistState)
                .with_effect(Effect::reply_with_menu(CHOOSE_OPTION, ReplyMenu::style())))
        }

        // Anything else is not addressed to the dialogue
        (DialogueState::Idle, Event::UserInput { .. }) => {
            Ok(TransitionResult::new(DialogueState::Idle))
        }

        // ============================================================
        // Style
        // ============================================================
        (DialogueState::AwaitingStyleChoice, Event::UserInput { command: Command::Back, .. })
        | (DialogueState::AwaitingQueryChoice, Event::UserInput { command: Command::Back, .. }) => {
            Ok(TransitionResult::new(DialogueState::Idle)
                .with_effect(Effect::ClearData)
                .with_effect(Effect::PersistState)
                .with_effect(Effect::reply_with_menu(BACK_TO_MENU, ReplyMenu::main())))
        }

        (DialogueState::AwaitingStyleChoice, Event::UserInput { command: Command::EnterStyle, .. }) => {
            Ok(TransitionResult::new(DialogueState::AwaitingStyleText)
                .with_effect(Effect::PersistState)
                .with_effect(Effect::prompt(ASK_STYLE)))
        }

        (DialogueState::AwaitingStyleChoice, Event::UserInput { .. }) => {
            Ok(TransitionResult::new(DialogueState::AwaitingStyleChoice)
                .with_effect(Effect::reply_with_menu(INVALID_CHOICE, ReplyMenu::style())))
        }

        // Free text is accepted as-is, command labels included
        (DialogueState::AwaitingStyleText, Event::UserInput { text, .. }) => {
            Ok(TransitionResult::new(DialogueState::AwaitingQueryChoice)
                .with_effect(Effect::UpdateData(CollectedData::with_style(text)))
                .with_effect(Effect::PersistState)
                .with_effect(Effect::reply_with_menu(STYLE_SAVED, ReplyMenu::query())))
        }

        // ============================================================
        // Query
        // ============================================================
        (DialogueState::AwaitingQueryChoice, Event::UserInput { command: Command::EnterQuery, .. }) => {
            Ok(TransitionResult::new(DialogueState::AwaitingQueryText)
                .with_effect(Effect::PersistState)
                .with_effect(Effect::prompt(ASK_QUERY)))
        }

        (DialogueState::AwaitingQueryChoice, Event::UserInput { .. }) => {
            Ok(TransitionResult::new(DialogueState::AwaitingQueryChoice)
                .with_effect(Effect::reply_with_menu(INVALID_CHOICE, ReplyMenu::query())))
        }

        (DialogueState::AwaitingQueryText, Event::UserInput { text, .. }) => {
            let echo = format!(
                "Отправка запроса на сервер...\nСтиль: {}\nЗапрос: {text}",
                data.style.as_deref().unwrap_or(STYLE_NOT_SET)
            );
            let request = GenerationRequest::new(text.clone(), data.style.clone());

            Ok(TransitionResult::new(DialogueState::Generating)
                .with_effect(Effect::UpdateData(CollectedData::with_query(text)))
                .with_effect(Effect::PersistState)
                .with_effect(Effect::reply(echo))
                .with_effect(Effect::RequestGeneration { request }))
        }
    }
}

fn outcome_message(outcome: &GenerationOutcome) -> String {
    match outcome {
        GenerationOutcome::Ready { url } => format!("Презентация готова: {url}"),
        GenerationOutcome::Failed { message } => {
            format!("Ошибка при генерации презентации: {message}")
        }
    }
}
