// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Farebot booking assistant.
//!
//! Long-polls the Telegram Bot API via teloxide, decodes updates into
//! transport-agnostic [`Inbound`] events for the engine's event loop, and
//! implements [`Notifier`] for the outbound direction (plain text, inline
//! keyboards, callback acknowledgements).

pub mod handler;
pub mod notify;

use farebot_config::model::TelegramConfig;
use farebot_core::{CallbackAction, FarebotError, UserRef};
use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub use notify::TelegramNotifier;

/// A decoded inbound event, ready for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A plain text message.
    Text { user: UserRef, text: String },
    /// A button press carrying a decoded callback payload.
    Action {
        user: UserRef,
        action: CallbackAction,
        event_id: String,
    },
}

/// Telegram transport: owns the bot handle and the long-polling task.
///
/// Inbound updates are decoded on the polling task and queued; the event
/// loop drains them one at a time through [`TelegramChannel::receive`].
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<Inbound>>,
    inbound_tx: mpsc::Sender<Inbound>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates the channel. Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, FarebotError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            FarebotError::Config("telegram.bot_token is required for the Telegram channel".into())
        })?;

        if token.is_empty() {
            return Err(FarebotError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// An outbound [`Notifier`](farebot_core::Notifier) sharing this bot.
    pub fn notifier(&self) -> TelegramNotifier {
        TelegramNotifier::new(self.bot.clone())
    }

    /// Start long polling. Calling connect twice is a no-op.
    pub async fn connect(&mut self) -> Result<(), FarebotError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        let bot = self.bot.clone();
        let tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let message_tx = tx.clone();
            let callback_tx = tx;

            let tree = dptree::entry()
                .branch(Update::filter_message().endpoint(move |msg: Message| {
                    let tx = message_tx.clone();
                    async move {
                        match handler::decode_message(&msg) {
                            Some(inbound) => {
                                if tx.send(inbound).await.is_err() {
                                    warn!("inbound queue closed, dropping message");
                                }
                            }
                            None => {
                                debug!(msg_id = msg.id.0, "ignoring non-text message");
                            }
                        }
                        respond(())
                    }
                }))
                .branch(
                    Update::filter_callback_query().endpoint(move |query: CallbackQuery| {
                        let tx = callback_tx.clone();
                        async move {
                            match handler::decode_callback(&query) {
                                Some(inbound) => {
                                    if tx.send(inbound).await.is_err() {
                                        warn!("inbound queue closed, dropping callback");
                                    }
                                }
                                None => {
                                    debug!("ignoring undecodable callback payload");
                                }
                            }
                            respond(())
                        }
                    }),
                );

            Dispatcher::builder(bot, tree)
                .default_handler(|_| async {})
                .build()
                .dispatch()
                .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    /// Wait for the next decoded inbound event.
    pub async fn receive(&self) -> Result<Inbound, FarebotError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| FarebotError::Channel {
            message: "Telegram inbound queue closed".into(),
            source: None,
        })
    }
}

impl Drop for TelegramChannel {
    fn drop(&mut self) {
        if let Some(handle) = self.polling_handle.take() {
            handle.abort();
        }
    }
}
