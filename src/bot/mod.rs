//! Telegram front end.
//!
//! This module handles:
//! - Long polling the Bot API for messages and button presses
//! - Routing prefixed commands to the generator and BIN lookup
//! - Rendering MarkdownV2 replies with a RE-GEN button

pub mod commands;
pub mod format;
pub mod telegram;

pub use commands::{parse_command, Command};
pub use telegram::TelegramApi;

use crate::lookup::{query_bin, BinLookup};
use crate::session::{GenerationSession, SessionStore};
use crate::types::{CardgenError, Result};
use std::sync::Arc;
use std::time::Duration;
use telegram::{CallbackQuery, InlineKeyboardMarkup, Message, SendOptions, Update};
use tracing::{debug, error, info, warn};

/// Label of the regeneration button.
pub const REGEN_BUTTON: &str = "RE-GEN";

const GENERIC_ERROR: &str = "❌ An error occurred while processing your command";
const REGEN_NOT_FOUND: &str = "❌ Regeneration data not found";
const BIN_NO_DIGITS: &str = "❌ No digits found in the BIN provided";
const CALLBACK_EXPIRED: &str = "❌ This message can no longer be regenerated";

/// Pause before polling again after a transport failure.
const POLL_BACKOFF: Duration = Duration::from_secs(5);

/// A rendered reply and the session its button should regenerate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markdown: bool,
    pub regen_id: Option<String>,
}

impl Reply {
    fn markdown(text: String) -> Self {
        Self {
            text,
            markdown: true,
            regen_id: None,
        }
    }

    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
            regen_id: None,
        }
    }

    fn keyboard(&self) -> Option<InlineKeyboardMarkup> {
        self.regen_id
            .as_deref()
            .map(|id| InlineKeyboardMarkup::single(REGEN_BUTTON, id))
    }
}

/// Long-polling bot serving generation and lookup commands.
pub struct Bot<L, S> {
    api: TelegramApi,
    session: GenerationSession<L, S>,
    poll_timeout: u64,
}

impl<L, S> Bot<L, S>
where
    L: BinLookup + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    pub fn new(api: TelegramApi, session: GenerationSession<L, S>, poll_timeout: u64) -> Self {
        Self {
            api,
            session,
            poll_timeout,
        }
    }

    /// Poll for updates until the task is cancelled.
    pub async fn run(self: Arc<Self>) {
        info!("Bot started, polling for updates");
        let mut offset = 0;

        loop {
            let updates = match self.api.get_updates(offset, self.poll_timeout).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!("Polling failed: {}", e);
                    tokio::time::sleep(POLL_BACKOFF).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                tokio::spawn(Arc::clone(&self).handle_update(update));
            }
        }
    }

    async fn handle_update(self: Arc<Self>, update: Update) {
        if let Some(query) = update.callback_query {
            self.handle_callback(query).await;
        } else if let Some(message) = update.message {
            self.handle_message(message).await;
        }
    }

    async fn handle_message(self: Arc<Self>, message: Message) {
        let Some(text) = message.text.as_deref() else {
            return;
        };
        let Some(command) = parse_command(text) else {
            debug!("Ignoring message without command prefix");
            return;
        };
        info!("Command received: {:?}", command);

        let reply = match command {
            Command::Start => Reply::markdown(format::render_start(message.from.as_ref())),
            other => {
                let username = message.from.as_ref().and_then(|u| u.username.clone());
                Arc::clone(&self).execute_guarded(other, username).await
            }
        };

        let markup = reply.keyboard();
        let options = SendOptions {
            markdown: reply.markdown,
            reply_to: Some(message.message_id),
            markup: markup.as_ref(),
        };
        if let Err(e) = self.api.send_message(message.chat.id, &reply.text, options).await {
            error!("Failed to send reply: {}", e);
        }
    }

    async fn handle_callback(self: Arc<Self>, query: CallbackQuery) {
        let Some((chat_id, message_id, session_id)) = callback_target(&query) else {
            warn!("Callback {} has no editable message or data", query.id);
            if let Err(e) = self.api.answer_callback_query(&query.id, Some(CALLBACK_EXPIRED)).await {
                warn!("Failed to answer callback query: {}", e);
            }
            return;
        };

        if let Err(e) = self.api.answer_callback_query(&query.id, None).await {
            warn!("Failed to answer callback query: {}", e);
        }

        let username = query.from.username.clone();
        let reply = Arc::clone(&self)
            .execute_guarded(Command::Regenerate(session_id), username)
            .await;

        let markup = reply.keyboard();
        let options = SendOptions {
            markdown: reply.markdown,
            reply_to: None,
            markup: markup.as_ref(),
        };
        if let Err(e) = self
            .api
            .edit_message_text(chat_id, message_id, &reply.text, options)
            .await
        {
            error!("Failed to edit message: {}", e);
        }
    }

    /// Run a command on its own task so that both errors and panics end up
    /// as the generic error reply.
    async fn execute_guarded(self: Arc<Self>, command: Command, username: Option<String>) -> Reply {
        let task = tokio::spawn(async move { self.execute(command, username.as_deref()).await });

        match task.await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                error!("Command failed: {}", e);
                Reply::plain(GENERIC_ERROR)
            }
            Err(e) => {
                error!("Command task aborted: {}", e);
                Reply::plain(GENERIC_ERROR)
            }
        }
    }

    /// Run a command and render its reply.
    ///
    /// User-facing rejections are returned as replies; only unexpected
    /// failures surface as `Err`.
    pub async fn execute(&self, command: Command, username: Option<&str>) -> Result<Reply> {
        match command {
            Command::Start => Ok(Reply::markdown(format::render_start(None))),
            Command::Gen(args) if args.is_empty() => Ok(Reply::markdown(format::gen_usage())),
            Command::Gen(args) => {
                let report = self.session.generate(&args).await;
                let mut reply = Reply::markdown(format::render_generation(&report, username));
                reply.regen_id = Some(report.session_id);
                Ok(reply)
            }
            Command::Bin(args) if args.is_empty() => Ok(Reply::markdown(format::bin_usage())),
            Command::Bin(args) => match query_bin(self.session.lookup(), &args).await {
                Ok(report) => Ok(Reply::markdown(format::render_bin(&report))),
                Err(CardgenError::InvalidBin(_)) => Ok(Reply::plain(BIN_NO_DIGITS)),
                Err(e) => Err(e),
            },
            Command::Regenerate(session_id) => match self.session.regenerate(&session_id).await {
                Ok(report) => {
                    let mut reply = Reply::markdown(format::render_generation(&report, username));
                    reply.regen_id = Some(report.session_id);
                    Ok(reply)
                }
                Err(CardgenError::SessionNotFound(id)) => {
                    info!("Regeneration requested for unknown session {}", id);
                    Ok(Reply::plain(REGEN_NOT_FOUND))
                }
                Err(e) => Err(e),
            },
            Command::Unknown(word) => Ok(Reply::plain(format!("Unrecognized command: {}", word))),
        }
    }
}

/// Chat, message and session id a RE-GEN press refers to.
fn callback_target(query: &CallbackQuery) -> Option<(i64, i64, String)> {
    let message = query.message.as_ref()?;
    let session_id = query.data.clone()?;
    Some((message.chat.id, message.message_id, session_id))
}
