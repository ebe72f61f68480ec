//! Minimal Telegram Bot API client.

use crate::types::{CardgenError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, trace};

const API_BASE: &str = "https://api.telegram.org";

/// Formatting mode used for every outgoing message.
const PARSE_MODE: &str = "MarkdownV2";

/// Envelope wrapping every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    /// Keyboard with one button carrying `callback_data`.
    pub fn single(text: &str, callback_data: &str) -> Self {
        Self {
            inline_keyboard: vec![vec![InlineKeyboardButton {
                text: text.to_string(),
                callback_data: callback_data.to_string(),
            }]],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Serialize)]
struct GetUpdatesRequest<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Serialize)]
struct EditMessageTextRequest<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Serialize)]
struct AnswerCallbackQueryRequest<'a> {
    callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

/// Outgoing message options.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendOptions<'a> {
    /// Send as MarkdownV2 instead of plain text.
    pub markdown: bool,
    pub reply_to: Option<i64>,
    pub markup: Option<&'a InlineKeyboardMarkup>,
}

/// Telegram Bot API client.
pub struct TelegramApi {
    client: Client,
    token: String,
}

impl TelegramApi {
    /// Create a new client. `poll_timeout_secs` bounds long polling; the HTTP
    /// timeout is set slightly above it.
    pub fn new(token: &str, poll_timeout_secs: u64) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(CardgenError::ConfigError("Telegram token is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + 10))
            .build()?;

        Ok(Self {
            client,
            token: token.to_string(),
        })
    }

    /// Fetch pending updates starting at `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let body = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message", "callback_query"],
        };
        self.call("getUpdates", &body).await
    }

    /// Send a message to a chat.
    pub async fn send_message(&self, chat_id: i64, text: &str, options: SendOptions<'_>) -> Result<Message> {
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: options.markdown.then_some(PARSE_MODE),
            reply_to_message_id: options.reply_to,
            reply_markup: options.markup,
        };
        self.call("sendMessage", &body).await
    }

    /// Replace the text (and keyboard) of an existing message.
    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        options: SendOptions<'_>,
    ) -> Result<()> {
        let body = EditMessageTextRequest {
            chat_id,
            message_id,
            text,
            parse_mode: options.markdown.then_some(PARSE_MODE),
            reply_markup: options.markup,
        };
        // Result is the edited Message, or `true` for inline messages.
        self.call::<_, serde_json::Value>("editMessageText", &body).await?;
        Ok(())
    }

    /// Acknowledge a button press so the client stops its spinner, optionally
    /// showing `text` as a notification.
    pub async fn answer_callback_query(&self, callback_query_id: &str, text: Option<&str>) -> Result<()> {
        let body = AnswerCallbackQueryRequest {
            callback_query_id,
            text,
        };
        self.call::<_, bool>("answerCallbackQuery", &body).await?;
        Ok(())
    }

    async fn call<B: Serialize, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T> {
        let url = format!("{}/bot{}/{}", API_BASE, self.token, method);
        trace!("Telegram call: {}", method);

        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => {
                debug!("Telegram {} succeeded", method);
                Ok(result)
            }
            ApiResponse { description, .. } => {
                let message = description.unwrap_or_else(|| format!("HTTP {}", status));
                error!("Telegram {} failed: {}", method, message);
                Err(CardgenError::TelegramError(message))
            }
        }
    }
}
