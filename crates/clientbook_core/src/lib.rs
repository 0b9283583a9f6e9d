//! Core domain logic for Clientbook, a small client-record store.
//! This crate is the single source of truth for record validation and the
//! uniform repository contract over JSON, YAML and SQLite storage.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, StorageConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::client::{Client, ClientId, DEFAULT_DELIMITER};
pub use model::validation::{validate_field, ValidationError, PHONE_PATTERN};
pub use repo::file_repo::{
    FileClientRepository, JsonClientRepository, JsonFormat, StorageFormat, YamlClientRepository,
    YamlFormat,
};
pub use repo::sqlite_repo::SqliteClientRepository;
pub use repo::{ClientRepository, RepoError, RepoResult, SortField, StorageError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
