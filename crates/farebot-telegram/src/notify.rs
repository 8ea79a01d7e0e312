// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound delivery: the [`Notifier`] implementation over the Bot API.
//!
//! Choices render as one inline keyboard button per row, each carrying its
//! action's wire form as the callback payload.

use async_trait::async_trait;
use farebot_core::{Choice, FarebotError, Notifier, UserId};
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, ChatId, InlineKeyboardButton, InlineKeyboardMarkup};

#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_text(&self, user: UserId, text: &str) -> Result<(), FarebotError> {
        self.bot
            .send_message(ChatId(user.0), text)
            .await
            .map_err(|e| FarebotError::Channel {
                message: format!("failed to send message to chat {user}: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }

    async fn send_choices(
        &self,
        user: UserId,
        text: &str,
        choices: &[Choice],
    ) -> Result<(), FarebotError> {
        let keyboard = InlineKeyboardMarkup::new(choices.iter().map(|choice| {
            vec![InlineKeyboardButton::callback(
                choice.label.clone(),
                choice.action.to_string(),
            )]
        }));

        self.bot
            .send_message(ChatId(user.0), text)
            .reply_markup(keyboard)
            .await
            .map_err(|e| FarebotError::Channel {
                message: format!("failed to send choices to chat {user}: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }

    async fn ack(&self, event_id: &str, text: Option<&str>) -> Result<(), FarebotError> {
        let mut request = self
            .bot
            .answer_callback_query(CallbackQueryId(event_id.to_string()));
        if let Some(text) = text {
            request = request.text(text);
        }
        request.await.map_err(|e| FarebotError::Channel {
            message: format!("failed to answer callback {event_id}: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(())
    }
}
