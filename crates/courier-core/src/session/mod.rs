//! Client session state machine.
//!
//! ```text
//! Start -> InputsParsed -+-> Reconnecting -+-------------------------+
//!                        |                 | rejected                |
//!                        |                 v                         v
//!                        +-------------> Registering -> ExchangingKeys -> Transferring
//!                                                                         |
//!                                                 Confirming (on match) <-+
//!                                                         |               |
//!                                                         v               v
//!                                                      Finished <---------+ (retries exhausted)
//! ```
//!
//! Every exchange runs on its own connection. Failures abort the session
//! except where a step documents otherwise: a rejected reconnection falls back
//! to registration and a lost retry notification is only logged.

mod auth;
mod transfer;

use crate::config::ClientConfig;
use crate::error::{Result, SessionError};
use crate::identity::ClientIdentity;
use courier_files::TransferDescriptor;
use courier_proto::{
    NameField, RESPONSE_HEADER_SIZE, Request, RequestBody, Response, ResponseCode, ResponseHeader,
};
use courier_transport::{TransportStats, WireTransport};
use std::fmt;
use tracing::{debug, info};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Nothing loaded yet
    Start,
    /// Descriptor loaded and validated
    InputsParsed,
    /// Reconnecting with a stored identity
    Reconnecting,
    /// Registering a new identity
    Registering,
    /// Submitting the public key and receiving the session key
    ExchangingKeys,
    /// Sending the file
    Transferring,
    /// Confirming a matching checksum
    Confirming,
    /// Session complete
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Start => write!(f, "start"),
            SessionState::InputsParsed => write!(f, "inputs-parsed"),
            SessionState::Reconnecting => write!(f, "reconnecting"),
            SessionState::Registering => write!(f, "registering"),
            SessionState::ExchangingKeys => write!(f, "exchanging-keys"),
            SessionState::Transferring => write!(f, "transferring"),
            SessionState::Confirming => write!(f, "confirming"),
            SessionState::Finished => write!(f, "finished"),
        }
    }
}

/// How a completed session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The server's checksum matched and the transfer was confirmed.
    Verified {
        /// File-send attempts used
        attempts: u32,
    },
    /// Every attempt produced a mismatching checksum; the server was told the
    /// transfer is abandoned.
    Unverified {
        /// File-send attempts used
        attempts: u32,
    },
}

impl TransferOutcome {
    /// Whether the server confirmed the content.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    /// File-send attempts used.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Verified { attempts } | Self::Unverified { attempts } => *attempts,
        }
    }
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Verified { attempts } => {
                write!(f, "transfer verified after {attempts} attempt(s)")
            }
            Self::Unverified { attempts } => {
                write!(f, "checksum never matched after {attempts} attempt(s)")
            }
        }
    }
}

/// One client run against one server.
#[derive(Debug)]
pub struct Session {
    config: ClientConfig,
    descriptor: TransferDescriptor,
    file_name: NameField,
    transport: WireTransport,
    identity: ClientIdentity,
    state: SessionState,
}

impl Session {
    /// Load the transfer descriptor named by `config` and prepare a session.
    ///
    /// No network activity happens here.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Input`] if the descriptor cannot be loaded or
    /// the file to send is missing, and [`SessionError::Protocol`] if the
    /// username or file path does not fit its wire field.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let descriptor = TransferDescriptor::load(&config.transfer_path)?;
        Self::with_descriptor(config, descriptor)
    }

    /// Prepare a session from an already loaded descriptor.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_config`], minus descriptor loading.
    pub fn with_descriptor(config: ClientConfig, descriptor: TransferDescriptor) -> Result<Self> {
        descriptor.check_source()?;
        NameField::new(&descriptor.username)?;
        let file_name = NameField::new(&descriptor.file_path)?;

        info!(
            server = %descriptor.address,
            port = descriptor.port,
            username = %descriptor.username,
            file = %descriptor.file_path,
            "Transfer info"
        );

        let mut transport = WireTransport::new();
        transport.configure(descriptor.address.clone(), descriptor.port);

        let mut session = Self {
            config,
            descriptor,
            file_name,
            transport,
            identity: ClientIdentity::new(),
            state: SessionState::Start,
        };
        session.set_state(SessionState::InputsParsed);
        Ok(session)
    }

    /// Run the session to completion.
    ///
    /// A transfer whose checksum never matches is still `Ok`, as
    /// [`TransferOutcome::Unverified`].
    ///
    /// # Errors
    ///
    /// Any fatal failure: transport errors, rejected registration, key
    /// exchange, file send or confirmation, and undecryptable keys.
    pub fn run(&mut self) -> Result<TransferOutcome> {
        let result = self.run_inner();
        self.transport.close();
        debug!(stats = ?self.transport.stats(), "transport totals");
        result
    }

    fn run_inner(&mut self) -> Result<TransferOutcome> {
        let reconnected = if courier_files::IdentityRecord::exists(&self.config.identity_path) {
            self.reconnect()?
        } else {
            info!("No identity record found, registering");
            false
        };

        if !reconnected {
            let private_key = self.register()?;
            self.exchange_keys(&private_key)?;
        }

        let outcome = self.transfer()?;
        if outcome.is_verified() {
            self.confirm()?;
        }

        self.set_state(SessionState::Finished);
        info!("{outcome}");
        Ok(outcome)
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current identity.
    #[must_use]
    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    /// The descriptor this session was built from.
    #[must_use]
    pub fn descriptor(&self) -> &TransferDescriptor {
        &self.descriptor
    }

    /// Transport counters so far.
    #[must_use]
    pub fn transport_stats(&self) -> TransportStats {
        self.transport.stats()
    }

    fn set_state(&mut self, next: SessionState) {
        debug!(from = %self.state, to = %next, "session state");
        self.state = next;
    }

    /// Encode a request carrying the current client id.
    fn request(&self, body: RequestBody) -> Result<Vec<u8>> {
        Ok(Request::new(self.identity.id, body).encode()?)
    }

    /// Send `body`, read a fixed-size response and require `expected`.
    fn exchange_fixed(
        &mut self,
        step: &'static str,
        body: RequestBody,
        response_size: usize,
        expected: ResponseCode,
    ) -> Result<Response> {
        let request = self.request(body)?;
        let buf = self.transport.send_and_receive_fixed(&request, response_size)?;
        let header = ResponseHeader::decode(&buf)?;
        if !header.is(expected) {
            return Err(SessionError::Rejected {
                step,
                code: header.code,
            });
        }
        Ok(Response::decode(&header, &buf[RESPONSE_HEADER_SIZE..])?)
    }
}
