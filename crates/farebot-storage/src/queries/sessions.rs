// SPDX-FileCopyrightText: 2026 Farebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user session persistence.
//!
//! Sessions are written after every accepted conversation step, so a restart
//! resumes each user exactly where they were.

use farebot_core::{FarebotError, Session, UserId};
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::models::session_from_row;

/// Load the session for `user`, if one is in progress.
pub async fn get_session(db: &Database, user: UserId) -> Result<Option<Session>, FarebotError> {
    db.connection()
        .call(move |conn| {
            let result = conn
                .query_row(
                    "SELECT step, draft, user_name FROM sessions WHERE user_id = ?1",
                    params![user.0],
                    session_from_row,
                )
                .optional()?;
            Ok(result)
        })
        .await
        .map_err(map_tr_err)
}

/// Write (or overwrite) the session for `user`.
pub async fn put_session(
    db: &Database,
    user: UserId,
    session: &Session,
) -> Result<(), FarebotError> {
    let draft = serde_json::to_string(&session.draft)
        .map_err(|e| FarebotError::Internal(format!("encoding session draft: {e}")))?;
    let step = session.step.to_string();
    let user_name = session.user_name.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO sessions (user_id, step, draft, user_name)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                     step = excluded.step,
                     draft = excluded.draft,
                     user_name = excluded.user_name,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![user.0, step, draft, user_name],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Drop the session for `user`. Removing an absent session is not an error.
pub async fn delete_session(db: &Database, user: UserId) -> Result<(), FarebotError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM sessions WHERE user_id = ?1", params![user.0])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use farebot_core::{FlowStep, QueryDraft};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_session() -> Session {
        Session {
            step: FlowStep::AwaitingTime,
            draft: QueryDraft {
                start: Some("Station A".to_string()),
                end: Some("Station B".to_string()),
                ..QueryDraft::default()
            },
            user_name: "alice".to_string(),
        }
    }

    #[tokio::test]
    async fn put_and_get_roundtrips() {
        let (db, _dir) = setup_db().await;
        let session = make_session();

        put_session(&db, UserId(7), &session).await.unwrap();
        let loaded = get_session(&db, UserId(7)).await.unwrap().unwrap();
        assert_eq!(loaded, session);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_session_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_session(&db, UserId(7)).await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn put_overwrites_previous_step() {
        let (db, _dir) = setup_db().await;
        let mut session = make_session();
        put_session(&db, UserId(7), &session).await.unwrap();

        session.step = FlowStep::AwaitingPax;
        session.draft.time = Some("07:30".to_string());
        put_session(&db, UserId(7), &session).await.unwrap();

        let loaded = get_session(&db, UserId(7)).await.unwrap().unwrap();
        assert_eq!(loaded.step, FlowStep::AwaitingPax);
        assert_eq!(loaded.draft.time.as_deref(), Some("07:30"));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (db, _dir) = setup_db().await;
        put_session(&db, UserId(7), &make_session()).await.unwrap();

        delete_session(&db, UserId(7)).await.unwrap();
        assert!(get_session(&db, UserId(7)).await.unwrap().is_none());
        delete_session(&db, UserId(7)).await.unwrap();

        db.close().await.unwrap();
    }
}
