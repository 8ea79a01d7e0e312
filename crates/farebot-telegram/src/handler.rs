// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update decoding: Telegram messages and callback queries into [`Inbound`]
//! events.
//!
//! The chat id doubles as the user identity; the bot only ever talks in
//! private chats, where the two coincide. Callback payloads are decoded here
//! once, so the engine never sees raw button data.

use farebot_core::{CallbackAction, UserId, UserRef};
use teloxide::types::{CallbackQuery, Message, User};

use crate::Inbound;

/// Decode a Telegram message. Returns `None` for non-text messages
/// (stickers, photos, locations), which the bot ignores.
pub fn decode_message(msg: &Message) -> Option<Inbound> {
    let text = msg.text()?;
    let user = UserRef {
        id: UserId(msg.chat.id.0),
        display_name: display_name(msg.from.as_ref()),
    };
    Some(Inbound::Text {
        user,
        text: text.to_string(),
    })
}

/// Decode a button press. Returns `None` when the payload is missing or
/// unknown, which can happen with buttons from older bot versions.
pub fn decode_callback(query: &CallbackQuery) -> Option<Inbound> {
    let data = query.data.as_deref()?;
    let action = CallbackAction::parse(data)?;

    // Route replies to the chat the keyboard was shown in; fall back to the
    // presser's own id if Telegram withheld the message.
    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat().id.0)
        .or_else(|| i64::try_from(query.from.id.0).ok())?;

    let user = UserRef {
        id: UserId(chat_id),
        display_name: display_name(Some(&query.from)),
    };

    Some(Inbound::Action {
        user,
        action,
        event_id: query.id.0.clone(),
    })
}

/// Best display name available: username, else first name.
fn display_name(from: Option<&User>) -> String {
    match from {
        Some(user) => user
            .username
            .clone()
            .unwrap_or_else(|| user.first_name.clone()),
        None => "unknown".to_string(),
    }
}
