//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the uniform CRUD contract shared by every storage backend.
//! - Isolate file and SQL persistence details from callers.
//!
//! # Invariants
//! - Mutating operations leave the persisted medium consistent with the
//!   in-memory view before returning.
//! - Identifier-keyed operations report a missing identifier explicitly as
//!   `RepoError::NotFound`; no backend downgrades it to a silent no-op.
//! - Sort fields come from the closed `SortField` set, never from free text.

use crate::db::DbError;
use crate::model::client::{Client, ClientId};
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod file_repo;
pub mod sqlite_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error taxonomy shared by every backend.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    NotFound(ClientId),
    Storage(StorageError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "client not found: {id}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Storage(StorageError::Db(value))
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Db(DbError::Sqlite(value)))
    }
}

/// Failure of the persistence medium itself.
#[derive(Debug)]
pub enum StorageError {
    Io { path: PathBuf, source: std::io::Error },
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
    Db(DbError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "storage io failure at {}: {source}", path.display())
            }
            Self::Json(err) => write!(f, "json storage failure: {err}"),
            Self::Yaml(err) => write!(f, "yaml storage failure: {err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Yaml(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

/// Closed set of sortable record fields.
///
/// This is the allow-list consulted before any `ORDER BY` construction; a
/// field name that does not parse here never reaches a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Surname,
    Name,
    Patronymic,
    Address,
    Phone,
    #[default]
    ClientId,
}

impl SortField {
    /// Parses a user-supplied field name against the allow-list.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "surname" => Some(Self::Surname),
            "name" => Some(Self::Name),
            "patronymic" => Some(Self::Patronymic),
            "address" => Some(Self::Address),
            "phone" => Some(Self::Phone),
            "client_id" => Some(Self::ClientId),
            _ => None,
        }
    }

    /// Column name safe for interpolation into an `ORDER BY` clause.
    pub fn column(self) -> &'static str {
        match self {
            Self::Surname => "surname",
            Self::Name => "name",
            Self::Patronymic => "patronymic",
            Self::Address => "address",
            Self::Phone => "phone",
            Self::ClientId => "client_id",
        }
    }
}

/// Uniform CRUD contract implemented by every storage backend.
///
/// # Contract
/// - `add_client` consumes an unsaved draft, assigns the identifier and
///   persists before returning it.
/// - `replace_by_id` substitutes the record value in place, preserving the
///   slot's position and identifier; the replacement must be an unsaved
///   draft.
/// - `page` is 1-indexed and clips to the available records; out-of-range
///   pages yield an empty sequence, never an error.
pub trait ClientRepository {
    fn read_all(&self) -> RepoResult<Vec<Client>>;
    fn get_by_id(&self, id: ClientId) -> RepoResult<Client>;
    fn add_client(&mut self, draft: Client) -> RepoResult<ClientId>;
    fn replace_by_id(&mut self, id: ClientId, replacement: Client) -> RepoResult<()>;
    fn delete_by_id(&mut self, id: ClientId) -> RepoResult<()>;
    fn count(&self) -> RepoResult<usize>;
    fn sort_by(&mut self, field: SortField) -> RepoResult<()>;
    fn page(&self, page_number: u32, page_size: u32) -> RepoResult<Vec<Client>>;
}

#[cfg(test)]
mod tests {
    use super::SortField;

    #[test]
    fn sort_field_parses_known_columns() {
        assert_eq!(SortField::from_name("surname"), Some(SortField::Surname));
        assert_eq!(SortField::from_name("client_id"), Some(SortField::ClientId));
    }

    #[test]
    fn sort_field_rejects_unlisted_names() {
        assert_eq!(SortField::from_name("client_id; DROP TABLE clients"), None);
        assert_eq!(SortField::from_name("Surname"), None);
        assert_eq!(SortField::from_name(""), None);
    }
}
