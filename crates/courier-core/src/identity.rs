//! In-memory client identity.

use courier_crypto::SymmetricKey;
use courier_files::IdentityRecord;
use courier_proto::ClientId;

/// Who the client is for the current run.
///
/// Starts empty; the id comes from registration or the identity record and the
/// symmetric key from the key exchange or reconnection.
#[derive(Clone, Default)]
pub struct ClientIdentity {
    /// Server-assigned id (unset until registration or reload)
    pub id: ClientId,
    /// Display name
    pub name: String,
    /// Session key for file encryption
    pub symmetric_key: Option<SymmetricKey>,
}

impl ClientIdentity {
    /// An identity with nothing assigned yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take name and id from a stored record.
    pub fn adopt(&mut self, record: &IdentityRecord) {
        self.name.clone_from(&record.name);
        self.id = record.id;
    }

    /// Forget the id and key, keeping nothing from a previous registration.
    pub fn reset(&mut self) {
        self.id = ClientId::UNSET;
        self.symmetric_key = None;
    }

    /// Whether the key exchange has completed.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.id.is_unset() && self.symmetric_key.is_some()
    }
}

impl std::fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("has_key", &self.symmetric_key.is_some())
            .finish()
    }
}
