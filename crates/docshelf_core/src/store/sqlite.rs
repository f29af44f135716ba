//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist document bodies as JSON text in the shared `documents` table,
//!   partitioned by collection name.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - Rows are visited in insertion (`seq`) order.
//! - `update_one` reads, mutates and writes back inside one `IMMEDIATE`
//!   transaction.
//! - Persisted rows that fail to decode are reported, never skipped.

use super::filter::Filter;
use super::update::ArrayUpdate;
use super::{DocumentStore, UpdateOutcome};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::document::{Document, DocumentId, StoredDocument};
use crate::repo::error::{RepoError, RepoResult};
use log::{debug, error, info};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::path::Path;
use uuid::Uuid;

const DOCUMENT_SELECT_SQL: &str = "SELECT seq, id, body
FROM documents
WHERE collection = ?1
ORDER BY seq ASC";

/// Document store owning one SQLite connection and bound to one collection.
pub struct SqliteDocumentStore {
    conn: Connection,
    collection: String,
}

impl SqliteDocumentStore {
    /// Wraps an already migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not current.
    /// - `MissingRequiredTable` when `documents` does not exist.
    pub fn try_new(conn: Connection, collection: impl Into<String>) -> RepoResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self {
            conn,
            collection: collection.into(),
        })
    }

    /// Opens a database file, migrating it if needed.
    ///
    /// Any failure while opening is reported as `StoreUnavailable`.
    pub fn open(path: impl AsRef<Path>, collection: impl Into<String>) -> RepoResult<Self> {
        let conn = open_db(path).map_err(RepoError::StoreUnavailable)?;
        Self::try_new(conn, collection)
    }

    pub fn open_in_memory(collection: impl Into<String>) -> RepoResult<Self> {
        let conn = open_db_in_memory().map_err(RepoError::StoreUnavailable)?;
        Self::try_new(conn, collection)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn scan<F>(&self, conn: &Connection, mut visit: F) -> RepoResult<()>
    where
        F: FnMut(i64, StoredDocument) -> bool,
    {
        let mut stmt = conn.prepare_cached(DOCUMENT_SELECT_SQL)?;
        let mut rows = stmt.query([self.collection.as_str()])?;
        while let Some(row) = rows.next()? {
            let seq: i64 = row.get("seq")?;
            if !visit(seq, parse_document_row(row)?) {
                break;
            }
        }
        Ok(())
    }

    fn first_match(
        &self,
        conn: &Connection,
        filter: &Filter,
    ) -> RepoResult<Option<(i64, StoredDocument)>> {
        let mut found = None;
        self.scan(conn, |seq, stored| {
            if filter.matches(&stored.document) {
                found = Some((seq, stored));
                return false;
            }
            true
        })?;
        Ok(found)
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn collection_name(&self) -> &str {
        &self.collection
    }

    fn delete_all(&self) -> RepoResult<u64> {
        let removed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1;",
            [self.collection.as_str()],
        )?;
        Ok(removed as u64)
    }

    fn insert_one(&self, document: &Document) -> RepoResult<DocumentId> {
        let id = Uuid::new_v4();
        let body = encode_body(document)?;
        self.conn.execute(
            "INSERT INTO documents (id, collection, body) VALUES (?1, ?2, ?3);",
            params![id.to_string(), self.collection.as_str(), body],
        )?;
        Ok(id)
    }

    fn find_one(&self, filter: &Filter) -> RepoResult<Option<StoredDocument>> {
        Ok(self
            .first_match(&self.conn, filter)?
            .map(|(_, stored)| stored))
    }

    fn find(&self, filter: &Filter) -> RepoResult<Vec<StoredDocument>> {
        let mut matches = Vec::new();
        self.scan(&self.conn, |_, stored| {
            if filter.matches(&stored.document) {
                matches.push(stored);
            }
            true
        })?;
        Ok(matches)
    }

    fn count(&self, filter: &Filter) -> RepoResult<u64> {
        let mut count = 0_u64;
        self.scan(&self.conn, |_, stored| {
            if filter.matches(&stored.document) {
                count += 1;
            }
            true
        })?;
        Ok(count)
    }

    fn update_one(&self, filter: &Filter, update: &ArrayUpdate) -> RepoResult<UpdateOutcome> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let Some((seq, mut stored)) = self.first_match(&tx, filter)? else {
            return Ok(UpdateOutcome::NO_MATCH);
        };

        let modified = update.apply(&mut stored.document)?;
        if modified {
            tx.execute(
                "UPDATE documents
                 SET
                    body = ?1,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE seq = ?2;",
                params![encode_body(&stored.document)?, seq],
            )?;
        }
        tx.commit()?;

        debug!(
            "event=doc_update module=store status=ok collection={} id={} modified={}",
            self.collection, stored.id, modified
        );
        Ok(UpdateOutcome::matched(modified))
    }

    fn close(self: Box<Self>) -> RepoResult<()> {
        let collection = self.collection;
        match self.conn.close() {
            Ok(()) => {
                info!("event=store_close module=store status=ok collection={collection}");
                Ok(())
            }
            Err((_, err)) => {
                error!(
                    "event=store_close module=store status=error collection={collection} error={err}"
                );
                Err(RepoError::Db(DbError::Sqlite(err)))
            }
        }
    }
}

fn encode_body(document: &Document) -> RepoResult<String> {
    serde_json::to_string(document)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode document body: {err}")))
}

fn parse_document_row(row: &Row<'_>) -> RepoResult<StoredDocument> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in documents.id"))
    })?;

    let body_text: String = row.get("body")?;
    let body: serde_json::Value = serde_json::from_str(&body_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid json in documents.body for `{id_text}`: {err}"))
    })?;
    let document = Document::from_value(body).map_err(|err| {
        RepoError::InvalidData(format!("invalid document body for `{id_text}`: {err}"))
    })?;

    Ok(StoredDocument { id, document })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'documents'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable("documents"));
    }

    Ok(())
}
