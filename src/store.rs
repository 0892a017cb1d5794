use rusqlite::{params, Connection, OptionalExtension};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::{sqlite, Error, Result};

/// A starred statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub id: i64,
    pub content: String,
}

/// Owns the working database and the bookmark database.
///
/// Both connections are released when the store is dropped; [`SessionStore::close`]
/// does the same but reports close failures.
#[derive(Debug)]
pub struct SessionStore {
    working: Connection,
    bookmarks: Connection,
}

impl SessionStore {
    /// Open both databases and make sure the bookmark table exists.
    ///
    /// Only the bookmark database's directory is created on demand; a working
    /// database in a missing directory fails to open.
    pub fn open(working_path: &Path, bookmark_path: &Path) -> Result<Self> {
        let working = sqlite::open(working_path)?;
        if let Some(parent) = bookmark_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let bookmarks = sqlite::open(bookmark_path)?;
        Self::from_connections(working, bookmarks)
    }

    /// Wrap already open connections.
    pub fn from_connections(working: Connection, bookmarks: Connection) -> Result<Self> {
        let store = Self { working, bookmarks };
        store.ensure_bookmark_schema()?;
        Ok(store)
    }

    pub fn ensure_bookmark_schema(&self) -> Result<()> {
        self.bookmarks.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS starList (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn bookmark_db(&self) -> &Connection {
        &self.bookmarks
    }

    /// Execute `statement` on the working database and render any results to `out`.
    pub fn execute<W: Write>(&self, statement: &str, out: &mut W) -> Result<()> {
        let statement = statement.trim();
        debug!(sql = statement, "executing");
        sqlite::execute_and_render(&self.working, statement, out)
    }

    /// All bookmarks in ascending id order.
    pub fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        let mut stmt = self
            .bookmarks
            .prepare("SELECT id, content FROM starList ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Bookmark {
                id: row.get(0)?,
                content: row.get(1)?,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn bookmark(&self, id: i64) -> Result<Option<Bookmark>> {
        let bookmark = self
            .bookmarks
            .query_row(
                "SELECT id, content FROM starList WHERE id = ?1",
                [id],
                |row| {
                    Ok(Bookmark {
                        id: row.get(0)?,
                        content: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(bookmark)
    }

    /// Save `content` as a new bookmark and return its id. Duplicates are allowed.
    pub fn star(&self, content: &str) -> Result<i64> {
        self.bookmarks
            .execute("INSERT INTO starList (content) VALUES (?1)", params![content])?;
        let id = self.bookmarks.last_insert_rowid();
        info!(id, "bookmark starred");
        Ok(id)
    }

    /// Delete every bookmark whose content equals `content`.
    pub fn unstar(&self, content: &str) -> Result<usize> {
        let deleted = self
            .bookmarks
            .execute("DELETE FROM starList WHERE content = ?1", params![content])?;
        info!(deleted, "bookmarks unstarred");
        Ok(deleted)
    }

    /// Renumber bookmark ids to 1..=n in their current order and reset the
    /// auto-increment counter so the next bookmark gets n + 1.
    pub fn zip(&mut self) -> Result<()> {
        let tx = self.bookmarks.transaction()?;
        let ids: Vec<i64> = {
            let mut stmt = tx.prepare("SELECT id FROM starList ORDER BY id")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect::<rusqlite::Result<_>>()?
        };
        // Ascending order keeps every target id free when its row moves.
        for (new_id, old_id) in (1i64..).zip(ids.iter().copied()) {
            if new_id != old_id {
                tx.execute(
                    "UPDATE starList SET id = ?1 WHERE id = ?2",
                    params![new_id, old_id],
                )?;
            }
        }
        tx.execute(
            "UPDATE sqlite_sequence SET seq = ?1 WHERE name = 'starList'",
            params![ids.len() as i64],
        )?;
        tx.commit()?;
        info!(count = ids.len(), "bookmarks zipped");
        Ok(())
    }

    /// Close both connections, reporting the first failure.
    pub fn close(self) -> Result<()> {
        let working = self
            .working
            .close()
            .map_err(|(_, source)| Error::Close { which: "working", source });
        let bookmarks = self
            .bookmarks
            .close()
            .map_err(|(_, source)| Error::Close { which: "bookmark", source });
        if let Err(err) = &working {
            warn!(%err, "close failed");
        }
        if let Err(err) = &bookmarks {
            warn!(%err, "close failed");
        }
        working.and(bookmarks)
    }
}
