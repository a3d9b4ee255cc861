//! Telegram Bot API wire types (the subset the bot uses)

use crate::state_machine::{Keyboard, Reply};
use serde::{Deserialize, Serialize};

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
}

/// Parameters of `getUpdates`
#[derive(Debug, Serialize)]
pub struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    pub timeout: u32,
    pub allowed_updates: Vec<&'static str>,
}

/// Parameters of `sendMessage`
#[derive(Debug, Serialize)]
pub struct SendMessage {
    /// Numeric id or `@channel` name; the API accepts both as a string
    pub chat_id: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendMessage {
    pub fn from_reply(chat_id: &str, reply: &Reply) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            text: reply.text.clone(),
            reply_markup: reply.keyboard.as_ref().map(ReplyMarkup::from),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Keyboard(ReplyKeyboardMarkup),
    ForceReply(ForceReply),
}

#[derive(Debug, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
    pub one_time_keyboard: bool,
}

#[derive(Debug, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ForceReply {
    pub force_reply: bool,
}

impl From<&Keyboard> for ReplyMarkup {
    fn from(keyboard: &Keyboard) -> Self {
        match keyboard {
            Keyboard::Menu(menu) => ReplyMarkup::Keyboard(ReplyKeyboardMarkup {
                keyboard: menu
                    .rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|label| KeyboardButton {
                                text: label.clone(),
                            })
                            .collect()
                    })
                    .collect(),
                resize_keyboard: true,
                one_time_keyboard: menu.one_time,
            }),
            Keyboard::ForceReply => ReplyMarkup::ForceReply(ForceReply { force_reply: true }),
        }
    }
}
