//! Whole-file repository backend for JSON and YAML targets.
//!
//! # Responsibility
//! - Keep the full record collection in memory and mirror it to one
//!   structured text file on every mutation.
//! - Share the load/persist/paginate machinery between formats behind the
//!   `StorageFormat` seam.
//!
//! # Invariants
//! - Load failures degrade to an empty collection with a diagnostic; they
//!   never abort construction.
//! - Persist writes to a sibling temp file and renames over the target, so
//!   the target is never left truncated.
//! - Every record holds an identifier by the time it reaches disk.

use crate::model::client::{Client, ClientId};
use crate::repo::{ClientRepository, RepoError, RepoResult, SortField, StorageError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// On-disk record shape shared by the JSON and YAML targets.
///
/// `client_id` is null until the repository has persisted the record once;
/// `patronymic` may be absent in hand-written files.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredClient {
    pub surname: String,
    pub name: String,
    #[serde(default)]
    pub patronymic: String,
    pub address: String,
    pub phone: String,
    #[serde(default)]
    pub client_id: Option<ClientId>,
}

impl From<&Client> for StoredClient {
    fn from(client: &Client) -> Self {
        Self {
            surname: client.surname.clone(),
            name: client.name.clone(),
            patronymic: client.patronymic.clone(),
            address: client.address.clone(),
            phone: client.phone.clone(),
            client_id: client.id(),
        }
    }
}

/// Encoding seam between the shared file machinery and a concrete format.
pub trait StorageFormat {
    /// Stable format tag used in log events and diagnostics.
    const NAME: &'static str;

    fn decode(text: &str) -> Result<Vec<StoredClient>, StorageError>;
    fn encode(records: &[StoredClient]) -> Result<String, StorageError>;
}

/// Pretty-printed JSON array of record objects.
pub struct JsonFormat;

impl StorageFormat for JsonFormat {
    const NAME: &'static str = "json";

    fn decode(text: &str) -> Result<Vec<StoredClient>, StorageError> {
        serde_json::from_str(text).map_err(StorageError::Json)
    }

    fn encode(records: &[StoredClient]) -> Result<String, StorageError> {
        serde_json::to_string_pretty(records).map_err(StorageError::Json)
    }
}

/// Block-style YAML sequence of record mappings.
pub struct YamlFormat;

impl StorageFormat for YamlFormat {
    const NAME: &'static str = "yaml";

    fn decode(text: &str) -> Result<Vec<StoredClient>, StorageError> {
        // An empty file or explicit null document reads as an empty
        // collection, not a decode failure.
        let records: Option<Vec<StoredClient>> =
            serde_yaml::from_str(text).map_err(StorageError::Yaml)?;
        Ok(records.unwrap_or_default())
    }

    fn encode(records: &[StoredClient]) -> Result<String, StorageError> {
        serde_yaml::to_string(records).map_err(StorageError::Yaml)
    }
}

/// File-backed client repository generic over the storage format.
pub struct FileClientRepository<F: StorageFormat> {
    path: PathBuf,
    clients: Vec<Client>,
    _format: PhantomData<F>,
}

pub type JsonClientRepository = FileClientRepository<JsonFormat>;
pub type YamlClientRepository = FileClientRepository<YamlFormat>;

impl<F: StorageFormat> FileClientRepository<F> {
    /// Binds a repository to the target file and loads its collection.
    ///
    /// A missing file yields an empty collection; malformed content yields
    /// an empty collection plus a `warn!` diagnostic. Neither is fatal.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let clients = load_collection::<F>(&path);
        Self {
            path,
            clients,
            _format: PhantomData,
        }
    }

    /// Target file this repository reads and rewrites.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the target file, replacing the in-memory collection.
    ///
    /// Same degradation rules as construction.
    pub fn reload(&mut self) {
        self.clients = load_collection::<F>(&self.path);
    }

    /// Next free identifier: one past the highest assigned so far.
    pub fn next_id(&self) -> ClientId {
        1 + self
            .clients
            .iter()
            .filter_map(Client::id)
            .max()
            .unwrap_or(0)
    }

    fn persist(&mut self) -> RepoResult<()> {
        // Backfill identifiers for records loaded from legacy files that
        // carried `client_id: null`.
        loop {
            let next = self.next_id();
            match self.clients.iter_mut().find(|c| c.id().is_none()) {
                Some(client) => client.assign_id(next),
                None => break,
            }
        }

        let records: Vec<StoredClient> = self.clients.iter().map(StoredClient::from).collect();
        let text = F::encode(&records)?;

        let mut tmp_name = self.path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, text).map_err(|source| {
            RepoError::Storage(StorageError::Io {
                path: tmp_path.clone(),
                source,
            })
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| {
            RepoError::Storage(StorageError::Io {
                path: self.path.clone(),
                source,
            })
        })?;

        info!(
            "event=file_persist module=repo format={} count={} path={}",
            F::NAME,
            self.clients.len(),
            self.path.display()
        );
        Ok(())
    }
}

impl<F: StorageFormat> ClientRepository for FileClientRepository<F> {
    fn read_all(&self) -> RepoResult<Vec<Client>> {
        Ok(self.clients.clone())
    }

    fn get_by_id(&self, id: ClientId) -> RepoResult<Client> {
        self.clients
            .iter()
            .find(|c| c.id() == Some(id))
            .cloned()
            .ok_or(RepoError::NotFound(id))
    }

    fn add_client(&mut self, mut draft: Client) -> RepoResult<ClientId> {
        let id = match draft.id() {
            Some(existing) => existing,
            None => {
                let id = self.next_id();
                draft.assign_id(id);
                id
            }
        };
        self.clients.push(draft);
        self.persist()?;
        info!("event=client_add module=repo format={} id={id}", F::NAME);
        Ok(id)
    }

    fn replace_by_id(&mut self, id: ClientId, mut replacement: Client) -> RepoResult<()> {
        let position = self
            .clients
            .iter()
            .position(|c| c.id() == Some(id))
            .ok_or(RepoError::NotFound(id))?;

        if replacement.id().is_none() {
            replacement.assign_id(id);
        }
        self.clients[position] = replacement;
        self.persist()?;
        info!("event=client_replace module=repo format={} id={id}", F::NAME);
        Ok(())
    }

    fn delete_by_id(&mut self, id: ClientId) -> RepoResult<()> {
        let before = self.clients.len();
        self.clients.retain(|c| c.id() != Some(id));
        if self.clients.len() == before {
            return Err(RepoError::NotFound(id));
        }
        self.persist()?;
        info!("event=client_delete module=repo format={} id={id}", F::NAME);
        Ok(())
    }

    fn count(&self) -> RepoResult<usize> {
        Ok(self.clients.len())
    }

    fn sort_by(&mut self, field: SortField) -> RepoResult<()> {
        self.clients.sort_by(|a, b| compare_by(field, a, b));
        Ok(())
    }

    fn page(&self, page_number: u32, page_size: u32) -> RepoResult<Vec<Client>> {
        let (start, end) = page_bounds(self.clients.len(), page_number, page_size);
        Ok(self.clients[start..end].to_vec())
    }
}

fn load_collection<F: StorageFormat>(path: &Path) -> Vec<Client> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(
                "event=file_load module=repo format={} status=missing path={}",
                F::NAME,
                path.display()
            );
            return Vec::new();
        }
        Err(err) => {
            warn!(
                "event=file_load module=repo format={} status=error path={} error={err}",
                F::NAME,
                path.display()
            );
            return Vec::new();
        }
    };

    let records = match F::decode(&text) {
        Ok(records) => records,
        Err(err) => {
            warn!(
                "event=file_load module=repo format={} status=malformed path={} error={err}",
                F::NAME,
                path.display()
            );
            return Vec::new();
        }
    };

    let mut clients = Vec::with_capacity(records.len());
    for record in records {
        let client = match record.client_id {
            Some(id) => Client::with_id(
                &record.surname,
                &record.name,
                &record.patronymic,
                &record.address,
                &record.phone,
                id,
            ),
            None => Client::new(
                &record.surname,
                &record.name,
                &record.patronymic,
                &record.address,
                &record.phone,
            ),
        };
        match client {
            Ok(client) => clients.push(client),
            Err(err) => {
                // Field-invalid persisted records are treated like malformed
                // content: the whole load degrades.
                warn!(
                    "event=file_load module=repo format={} status=invalid_record path={} error={err}",
                    F::NAME,
                    path.display()
                );
                return Vec::new();
            }
        }
    }

    info!(
        "event=file_load module=repo format={} status=ok count={} path={}",
        F::NAME,
        clients.len(),
        path.display()
    );
    clients
}

fn compare_by(field: SortField, a: &Client, b: &Client) -> Ordering {
    match field {
        SortField::Surname => a.surname.cmp(&b.surname),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Patronymic => a.patronymic.cmp(&b.patronymic),
        SortField::Address => a.address.cmp(&b.address),
        SortField::Phone => a.phone.cmp(&b.phone),
        SortField::ClientId => a.id().cmp(&b.id()),
    }
}

fn page_bounds(len: usize, page_number: u32, page_size: u32) -> (usize, usize) {
    if page_number == 0 || page_size == 0 {
        return (0, 0);
    }
    let start = (page_number as usize - 1).saturating_mul(page_size as usize);
    if start >= len {
        return (0, 0);
    }
    let end = start.saturating_add(page_size as usize).min(len);
    (start, end)
}
