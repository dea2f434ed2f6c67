//! Reconnection, registration and key exchange.

use super::{Session, SessionState};
use crate::error::{Result, SessionError};
use courier_crypto::{PrivateKey, SymmetricKey};
use courier_files::IdentityRecord;
use courier_proto::{NameField, REGISTRATION_RESPONSE_SIZE, RequestBody, Response, ResponseCode};
use courier_transport::VariableResponse;
use tracing::{debug, info, warn};

impl Session {
    /// Try to resume the stored identity.
    ///
    /// Returns `Ok(false)` when the server rejects the reconnection, in which
    /// case the caller registers instead.
    pub(super) fn reconnect(&mut self) -> Result<bool> {
        self.set_state(SessionState::Reconnecting);

        let record = IdentityRecord::load(&self.config.identity_path)?;
        self.identity.adopt(&record);
        info!(username = %record.name, id = %record.id, "Reconnecting");

        let request = self.request(RequestBody::Reconnect {
            name: NameField::new(&record.name)?,
        })?;
        let response = self
            .transport
            .send_and_receive_variable(&request, ResponseCode::ReconnectAccepted)?;

        let (header, payload) = match response {
            VariableResponse::Payload { header, payload } => (header, payload),
            VariableResponse::WrongCode(header) => {
                warn!(code = header.code, "Reconnection rejected, registering instead");
                self.identity.reset();
                return Ok(false);
            }
        };

        let Response::ReconnectAccepted {
            client_id,
            encrypted_key,
        } = Response::decode(&header, &payload)?
        else {
            return Err(SessionError::Rejected {
                step: "reconnection",
                code: header.code,
            });
        };
        debug!(echoed = %client_id, "reconnection accepted");

        let private_key = PrivateKey::from_der(&record.private_key_der)?;
        self.identity.symmetric_key = Some(recover_key(&private_key, &encrypted_key)?);
        info!("Reconnected");
        Ok(true)
    }

    /// Register the descriptor's username and persist the new identity.
    ///
    /// Returns the freshly generated private key for the key exchange.
    pub(super) fn register(&mut self) -> Result<PrivateKey> {
        self.set_state(SessionState::Registering);
        self.identity.reset();
        self.identity.name.clone_from(&self.descriptor.username);
        info!(username = %self.identity.name, "Registering");

        let body = RequestBody::Registration {
            name: NameField::new(&self.identity.name)?,
        };
        let response = self.exchange_fixed(
            "registration",
            body,
            REGISTRATION_RESPONSE_SIZE,
            ResponseCode::RegistrationAccepted,
        )?;
        let Response::RegistrationAccepted { client_id } = response else {
            return Err(SessionError::Rejected {
                step: "registration",
                code: response.code().into(),
            });
        };
        self.identity.id = client_id;
        info!(id = %client_id, "Registered");

        let private_key = PrivateKey::generate()?;
        let record = IdentityRecord {
            name: self.identity.name.clone(),
            id: client_id,
            private_key_der: private_key.to_der()?,
        };
        record.store(&self.config.identity_path)?;
        debug!(path = %self.config.identity_path.display(), "identity record written");

        Ok(private_key)
    }

    /// Submit the public key and receive the session key.
    pub(super) fn exchange_keys(&mut self, private_key: &PrivateKey) -> Result<()> {
        self.set_state(SessionState::ExchangingKeys);

        let request = self.request(RequestBody::PublicKey {
            name: NameField::new(&self.identity.name)?,
            public_key: private_key.public_key_field()?,
        })?;
        let response = self
            .transport
            .send_and_receive_variable(&request, ResponseCode::PublicKeyReceived)?;

        let (header, payload) = match response {
            VariableResponse::Payload { header, payload } => (header, payload),
            VariableResponse::WrongCode(header) => {
                return Err(SessionError::Rejected {
                    step: "key exchange",
                    code: header.code,
                });
            }
        };

        let Response::PublicKeyReceived {
            client_id,
            encrypted_key,
        } = Response::decode(&header, &payload)?
        else {
            return Err(SessionError::Rejected {
                step: "key exchange",
                code: header.code,
            });
        };
        debug!(echoed = %client_id, key_bytes = encrypted_key.len(), "public key accepted");

        self.identity.symmetric_key = Some(recover_key(private_key, &encrypted_key)?);
        info!("Symmetric key received");
        Ok(())
    }
}

/// Decrypt the session key; it must be exactly 16 bytes.
fn recover_key(private_key: &PrivateKey, encrypted: &[u8]) -> Result<SymmetricKey> {
    let raw = private_key.decrypt(encrypted)?;
    Ok(SymmetricKey::from_slice(&raw)?)
}
