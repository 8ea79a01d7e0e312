// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Broadcast subscriber registry.

use farebot_core::{FarebotError, UserId};
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Register a chat for broadcasts. Re-subscribing is a no-op.
pub async fn add_subscriber(db: &Database, user: UserId) -> Result<(), FarebotError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO subscribers (chat_id) VALUES (?1)",
                params![user.0],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// All subscribed chats, in subscription order.
pub async fn list_subscribers(db: &Database) -> Result<Vec<UserId>, FarebotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT chat_id FROM subscribers ORDER BY added_at, chat_id")?;
            let rows = stmt.query_map([], |row| row.get(0).map(UserId))?;
            let mut users = Vec::new();
            for row in rows {
                users.push(row?);
            }
            Ok(users)
        })
        .await
        .map_err(map_tr_err)
}
