use async_trait::async_trait;
use chrono::Utc;
use headcheck_core::model::{CompletionRecord, ScopeSettingsDraft};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{RootKind, line_from_i64, line_to_i64, parse_root_kind, position_to_i64};
use crate::repository::{PersistedState, StateRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl StateRepository for SqliteRepository {
    async fn load_state(&self) -> Result<Option<PersistedState>, StorageError> {
        let saved = sqlx::query("SELECT saved_at FROM state_meta WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        if saved.is_none() {
            return Ok(None);
        }

        let rows = sqlx::query("SELECT path, line FROM heading_done ORDER BY path, line")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut record = CompletionRecord::new();
        for row in rows {
            let path: String = row.try_get("path").map_err(ser)?;
            let line: i64 = row.try_get("line").map_err(ser)?;
            if let Some(line) = line_from_i64(line) {
                record.mark_done(&path, line);
            }
        }

        let rows = sqlx::query("SELECT kind, root FROM scope_roots ORDER BY kind, position")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let mut draft = ScopeSettingsDraft::new();
        for row in rows {
            let kind: String = row.try_get("kind").map_err(ser)?;
            let root: String = row.try_get("root").map_err(ser)?;
            match parse_root_kind(&kind)? {
                RootKind::Include => draft.include_roots.push(root),
                RootKind::Exclude => draft.exclude_roots.push(root),
            }
        }

        Ok(Some(PersistedState::new(record, draft.validate())))
    }

    async fn save_state(&self, state: &PersistedState) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM heading_done")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        sqlx::query("DELETE FROM scope_roots")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (path, line) in state.record.iter() {
            sqlx::query("INSERT INTO heading_done (path, line) VALUES (?1, ?2)")
                .bind(path)
                .bind(line_to_i64(line))
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }

        let roots = [
            (RootKind::Include, state.settings.include_roots()),
            (RootKind::Exclude, state.settings.exclude_roots()),
        ];
        for (kind, list) in roots {
            for (position, root) in list.iter().enumerate() {
                sqlx::query("INSERT INTO scope_roots (kind, position, root) VALUES (?1, ?2, ?3)")
                    .bind(kind.as_str())
                    .bind(position_to_i64(position)?)
                    .bind(root.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(conn)?;
            }
        }

        sqlx::query(
            r"
            INSERT INTO state_meta (id, saved_at)
            VALUES (1, ?1)
            ON CONFLICT(id) DO UPDATE SET saved_at = excluded.saved_at
            ",
        )
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
