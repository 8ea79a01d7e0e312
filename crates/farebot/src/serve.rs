// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `farebot serve` command implementation.
//!
//! Wires SQLite storage, the booking engine, the Telegram transport, and the
//! admin gateway together, then runs the single-consumer event loop until a
//! shutdown signal arrives. Events are handled one at a time, which is what
//! guarantees per-user ordering through the conversation flow.

use std::sync::Arc;
use std::time::Duration;

use farebot_config::model::FarebotConfig;
use farebot_core::{FarebotError, Notifier, UserId};
use farebot_engine::{Engine, EngineConfig};
use farebot_gateway::{GatewayState, ServerConfig};
use farebot_storage::{Database, SqliteStore};
use farebot_telegram::{Inbound, TelegramChannel};
use tracing::{error, info, warn};

use crate::shutdown;

/// Runs the `farebot serve` command.
pub async fn run_serve(config: FarebotConfig) -> Result<(), FarebotError> {
    init_tracing(&config.bot.log_level);

    info!("starting farebot serve");

    if config
        .telegram
        .bot_token
        .as_deref()
        .is_none_or(str::is_empty)
    {
        return Err(FarebotError::Config(
            "telegram.bot_token must be set to serve (farebot.toml or FAREBOT_TELEGRAM_BOT_TOKEN)"
                .into(),
        ));
    }

    // Storage: one connection, shared by all four store seams.
    let db = Arc::new(Database::open(&config.storage.database_path).await?);
    let store = SqliteStore::new(db);
    info!(path = %config.storage.database_path, "storage ready");

    // Transport.
    let mut channel = TelegramChannel::new(&config.telegram)?;
    let notifier: Arc<dyn Notifier> = Arc::new(channel.notifier());

    let engine = Arc::new(Engine::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store),
        notifier,
        EngineConfig {
            admin_chat: config.telegram.admin_chat_id.map(UserId),
            broadcast_batch_size: config.broadcast.batch_size,
            broadcast_batch_delay: Duration::from_millis(config.broadcast.batch_delay_ms),
        },
    ));

    // Admin gateway, as a background task.
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    let gateway_state = GatewayState::new(engine.clone(), config.gateway.admin_token.clone());
    tokio::spawn(async move {
        if let Err(e) = farebot_gateway::start_server(&server_config, gateway_state).await {
            error!(error = %e, "gateway server error");
        }
    });

    channel.connect().await?;

    let cancel = shutdown::install_signal_handler();

    info!("farebot ready");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("event loop shutting down");
                break;
            }
            inbound = channel.receive() => {
                let inbound = match inbound {
                    Ok(inbound) => inbound,
                    Err(e) => {
                        error!(error = %e, "transport closed");
                        break;
                    }
                };
                // One event at a time; a failed delivery must not take the
                // loop down.
                let result = match inbound {
                    Inbound::Text { user, text } => engine.handle_text(&user, &text).await,
                    Inbound::Action { user, action, event_id } => {
                        engine.handle_action(&user, &action, &event_id).await
                    }
                };
                if let Err(e) = result {
                    warn!(error = %e, "event handling failed");
                }
            }
        }
    }

    info!("farebot serve shutdown complete");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("farebot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
