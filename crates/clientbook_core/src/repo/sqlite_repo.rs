//! SQLite repository backend.
//!
//! # Responsibility
//! - Persist client records in the `clients` table, one statement per
//!   mutating call.
//! - Delegate identifier assignment to the engine's AUTOINCREMENT key.
//!
//! # Invariants
//! - Every `ORDER BY` column comes from the `SortField` allow-list.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `close` is idempotent; operations after close fail with `DbError::Closed`.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::client::{Client, ClientId};
use crate::repo::{ClientRepository, RepoError, RepoResult, SortField};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const CLIENT_SELECT_SQL: &str =
    "SELECT client_id, surname, name, patronymic, address, phone FROM clients";

/// Client repository backed by a caller-owned SQLite connection.
///
/// The connection is constructed once and owned by this handle; there is no
/// process-wide shared instance. Stored row order never mutates: `sort_by`
/// records the active field and reads apply it as a fresh `ORDER BY`.
#[derive(Debug)]
pub struct SqliteClientRepository {
    conn: Option<Connection>,
    order: SortField,
}

impl SqliteClientRepository {
    /// Opens a database file, applies migrations and binds a repository.
    ///
    /// # Errors
    /// Connectivity or migration failure at construction is fatal; the
    /// repository is never returned half-usable.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let conn = open_db(path)?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory database, mainly for tests.
    pub fn open_in_memory() -> RepoResult<Self> {
        let conn = open_db_in_memory()?;
        Self::from_connection(conn)
    }

    /// Binds a repository to an already-bootstrapped connection.
    ///
    /// # Errors
    /// Fails with `DbError::MissingTable` when the connection has not been
    /// through migration bootstrap.
    pub fn from_connection(conn: Connection) -> RepoResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'clients'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(DbError::MissingTable("clients").into());
        }
        Ok(Self {
            conn: Some(conn),
            order: SortField::default(),
        })
    }

    /// Releases the underlying connection.
    ///
    /// Safe to call more than once; a closed repository rejects further
    /// operations with `DbError::Closed`.
    pub fn close(&mut self) -> RepoResult<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(conn, err)| {
                // Keep the handle usable when the engine refuses to close.
                self.conn = Some(conn);
                RepoError::from(err)
            })?;
            info!("event=db_close module=repo status=ok");
        }
        Ok(())
    }

    fn conn(&self) -> RepoResult<&Connection> {
        self.conn
            .as_ref()
            .ok_or(RepoError::Storage(crate::repo::StorageError::Db(
                DbError::Closed,
            )))
    }

    fn select_ordered(&self, suffix: &str) -> String {
        // `order.column()` is allow-listed; `client_id` breaks ties so the
        // ordering stays deterministic.
        format!(
            "{CLIENT_SELECT_SQL} ORDER BY {} ASC, client_id ASC{suffix}",
            self.order.column()
        )
    }
}

impl ClientRepository for SqliteClientRepository {
    fn read_all(&self) -> RepoResult<Vec<Client>> {
        let conn = self.conn()?;
        let sql = self.select_ordered("");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut clients = Vec::new();
        while let Some(row) = rows.next()? {
            clients.push(parse_client_row(row)?);
        }
        Ok(clients)
    }

    fn get_by_id(&self, id: ClientId) -> RepoResult<Client> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{CLIENT_SELECT_SQL} WHERE client_id = ?1;"))?;
        let client = stmt
            .query_row(params![id], |row| Ok(parse_client_row(row)))
            .optional()?;

        match client {
            Some(parsed) => parsed,
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn add_client(&mut self, draft: Client) -> RepoResult<ClientId> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO clients (surname, name, patronymic, address, phone)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                draft.surname,
                draft.name,
                patronymic_to_db(&draft.patronymic),
                draft.address,
                draft.phone,
            ],
        )?;

        let id = conn.last_insert_rowid();
        info!("event=client_add module=repo backend=sqlite id={id}");
        Ok(id)
    }

    fn replace_by_id(&mut self, id: ClientId, replacement: Client) -> RepoResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE clients
             SET surname = ?1, name = ?2, patronymic = ?3, address = ?4, phone = ?5
             WHERE client_id = ?6;",
            params![
                replacement.surname,
                replacement.name,
                patronymic_to_db(&replacement.patronymic),
                replacement.address,
                replacement.phone,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        info!("event=client_replace module=repo backend=sqlite id={id}");
        Ok(())
    }

    fn delete_by_id(&mut self, id: ClientId) -> RepoResult<()> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM clients WHERE client_id = ?1;", params![id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        info!("event=client_delete module=repo backend=sqlite id={id}");
        Ok(())
    }

    fn count(&self) -> RepoResult<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM clients;", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn sort_by(&mut self, field: SortField) -> RepoResult<()> {
        self.order = field;
        Ok(())
    }

    fn page(&self, page_number: u32, page_size: u32) -> RepoResult<Vec<Client>> {
        if page_number == 0 || page_size == 0 {
            return Ok(Vec::new());
        }
        let conn = self.conn()?;
        let offset = i64::from(page_number - 1) * i64::from(page_size);

        let sql = self.select_ordered(" LIMIT ?1 OFFSET ?2");
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params![i64::from(page_size), offset])?;

        let mut clients = Vec::new();
        while let Some(row) = rows.next()? {
            clients.push(parse_client_row(row)?);
        }
        Ok(clients)
    }
}

fn parse_client_row(row: &Row<'_>) -> RepoResult<Client> {
    let id: ClientId = row.get("client_id")?;
    let patronymic: Option<String> = row.get("patronymic")?;

    let client = Client::with_id(
        row.get::<_, String>("surname")?,
        row.get::<_, String>("name")?,
        patronymic.unwrap_or_default(),
        row.get::<_, String>("address")?,
        row.get::<_, String>("phone")?,
        id,
    )?;
    Ok(client)
}

fn patronymic_to_db(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
