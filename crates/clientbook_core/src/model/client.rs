//! Client domain model.
//!
//! # Responsibility
//! - Define the canonical client record shared by all repository backends.
//! - Guarantee all-or-nothing validated construction.
//!
//! # Invariants
//! - A constructed `Client` satisfies every active field rule.
//! - `client_id` is assigned once by the owning repository and never changes
//!   afterwards.
//! - Equality compares the five data fields only; the identifier is excluded.

use crate::model::validation::{phone_regex, validate_field, ValidationError};
use std::fmt::{Display, Formatter};

/// Repository-assigned identifier for a persisted client record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ClientId = i64;

/// Delimiter used by `from_delimited` callers that do not override it.
pub const DEFAULT_DELIMITER: char = ',';

/// Validated client record.
///
/// Data fields are immutable after construction. The identifier starts
/// unassigned and is filled in by a repository on first persistence.
#[derive(Debug, Clone)]
pub struct Client {
    pub surname: String,
    pub name: String,
    /// May be empty; the only optional data field.
    pub patronymic: String,
    pub address: String,
    /// Always matches `+<1-3 digits>-<3 digits>-<3 digits>-<4 digits>`.
    pub phone: String,
    client_id: Option<ClientId>,
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        self.surname == other.surname
            && self.name == other.name
            && self.patronymic == other.patronymic
            && self.address == other.address
            && self.phone == other.phone
    }
}

impl Eq for Client {}

impl Client {
    /// Creates a validated client draft with no identifier.
    ///
    /// # Errors
    /// Returns the first failing field rule; no partially-valid instance is
    /// ever produced.
    pub fn new(
        surname: impl AsRef<str>,
        name: impl AsRef<str>,
        patronymic: impl AsRef<str>,
        address: impl AsRef<str>,
        phone: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            surname: validate_field(surname.as_ref(), "Surname", true, true, None)?,
            name: validate_field(name.as_ref(), "Name", true, true, None)?,
            patronymic: validate_field(patronymic.as_ref(), "Patronymic", false, true, None)?,
            address: validate_field(address.as_ref(), "Address", true, false, None)?,
            phone: validate_field(phone.as_ref(), "Phone", true, false, Some(phone_regex()))?,
            client_id: None,
        })
    }

    /// Creates a validated client carrying an already-assigned identifier.
    ///
    /// Used by storage backends when re-hydrating persisted records.
    pub fn with_id(
        surname: impl AsRef<str>,
        name: impl AsRef<str>,
        patronymic: impl AsRef<str>,
        address: impl AsRef<str>,
        phone: impl AsRef<str>,
        id: ClientId,
    ) -> Result<Self, ValidationError> {
        let mut client = Self::new(surname, name, patronymic, address, phone)?;
        client.client_id = Some(id);
        Ok(client)
    }

    /// Parses one delimited line into a client draft.
    ///
    /// The line must split into exactly five fields in the order surname,
    /// name, patronymic, address, phone; each field is trimmed before
    /// validation. The field count is checked before any per-field rule.
    pub fn from_delimited(line: &str, delimiter: char) -> Result<Self, ValidationError> {
        let fields: Vec<&str> = line.split(delimiter).collect();
        if fields.len() != 5 {
            return Err(ValidationError::WrongFieldCount {
                expected: 5,
                actual: fields.len(),
            });
        }
        Self::new(fields[0], fields[1], fields[2], fields[3], fields[4])
    }

    /// Parses a JSON key-value document into a client draft.
    ///
    /// Missing keys default to the empty string before validation, so a
    /// document without a required key fails with the matching field rule,
    /// not a decode error. Malformed syntax fails with
    /// `ValidationError::Decode`.
    pub fn from_json_str(text: &str) -> Result<Self, ValidationError> {
        let doc: serde_json::Value = serde_json::from_str(text)?;
        let field = |key: &str| doc.get(key).and_then(|v| v.as_str()).unwrap_or("");
        Self::new(
            field("surname"),
            field("name"),
            field("patronymic"),
            field("address"),
            field("phone"),
        )
    }

    /// Returns the repository-assigned identifier, if any.
    pub fn id(&self) -> Option<ClientId> {
        self.client_id
    }

    /// Assigns the identifier for this record.
    ///
    /// # Contract
    /// Must only be called while the identifier is unassigned; repositories
    /// call it exactly once per record.
    pub fn assign_id(&mut self, id: ClientId) {
        debug_assert!(self.client_id.is_none(), "identifier is assigned once");
        self.client_id = Some(id);
    }

    /// Short `name surname` label for list-style rendering.
    pub fn short_label(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

impl Display for Client {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Surname: {}", self.surname)?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Patronymic: {}", self.patronymic)?;
        writeln!(f, "Address: {}", self.address)?;
        write!(f, "Phone: {}", self.phone)
    }
}
