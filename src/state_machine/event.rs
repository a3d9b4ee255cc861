//! Events that drive the dialogue

/// Menu trigger shown on the main keyboard
pub const CREATE_PRESENTATION: &str = "Создать презентацию";
pub const ENTER_STYLE: &str = "Введи стиль";
pub const ENTER_QUERY: &str = "Введи запрос";
pub const GO_BACK: &str = "Вернуться назад";

const START_COMMAND: &str = "/start";

/// User input resolved from raw text at the transport boundary
///
/// Menu labels are matched by exact text. Anything else is `Text`, which the
/// free-text states store as-is and the choice states treat as invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Start,
    CreatePresentation,
    EnterStyle,
    EnterQuery,
    Back,
    Text,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        match text {
            CREATE_PRESENTATION => Command::CreatePresentation,
            ENTER_STYLE => Command::EnterStyle,
            ENTER_QUERY => Command::EnterQuery,
            GO_BACK => Command::Back,
            _ if is_start_command(text) => Command::Start,
            _ => Command::Text,
        }
    }

    /// Button label for menu commands
    #[allow(dead_code)] // Used by tests
    pub fn label(self) -> Option<&'static str> {
        match self {
            Command::Start => Some(START_COMMAND),
            Command::CreatePresentation => Some(CREATE_PRESENTATION),
            Command::EnterStyle => Some(ENTER_STYLE),
            Command::EnterQuery => Some(ENTER_QUERY),
            Command::Back => Some(GO_BACK),
            Command::Text => None,
        }
    }
}

/// `/start`, `/start@bot_name` and `/start payload` all count
fn is_start_command(text: &str) -> bool {
    text.split_whitespace()
        .next()
        .and_then(|head| head.split('@').next())
        .is_some_and(|command| command == START_COMMAND)
}

/// Result of a generation job as seen by the dialogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Artifact location, already resolved against the service base URL
    Ready { url: String },
    Failed { message: String },
}

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    UserInput { command: Command, text: String },
    GenerationFinished { outcome: GenerationOutcome },
}

impl Event {
    pub fn user_input(text: impl Into<String>) -> Self {
        let text = text.into();
        Event::UserInput {
            command: Command::parse(&text),
            text,
        }
    }
}
