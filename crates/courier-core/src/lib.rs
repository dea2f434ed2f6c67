//! # Courier Core
//!
//! The client session for the Courier transfer protocol.
//!
//! A [`Session`] runs once per process:
//!
//! 1. Load the transfer descriptor and check the file exists.
//! 2. Reconnect with the stored identity, or register a new one and submit
//!    a fresh RSA public key.
//! 3. Receive the AES session key, encrypted with the client's RSA key.
//! 4. Send the file as encrypted blocks and compare the server's CRC with
//!    the local one, resending up to [`MAX_TRIES`] times.
//! 5. Confirm a matching checksum, or tell the server the transfer is
//!    abandoned.
//!
//! # Example
//!
//! ```no_run
//! use courier_core::{ClientConfig, Session};
//!
//! let mut session = Session::from_config(ClientConfig::default())?;
//! let outcome = session.run()?;
//! println!("{outcome}");
//! # Ok::<(), courier_core::SessionError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod identity;
pub mod session;

pub use config::ClientConfig;
pub use error::{Result, SessionError};
pub use identity::ClientIdentity;
pub use session::{Session, SessionState, TransferOutcome};

/// File-send attempts before the transfer is abandoned.
pub const MAX_TRIES: u32 = 3;
