//! # Courier Transport
//!
//! Blocking request/response exchanges over TCP.
//!
//! Every exchange opens a fresh connection, writes the whole request through
//! a fixed 1024-byte staging chunk and then reads the response either as a
//! known number of bytes or as a header followed by the payload length that
//! header declares. Partial reads and writes are expected and looped over; a
//! read or write that transfers zero bytes ends the exchange with an error.
//!
//! The chunked loops in [`wire`] work over any [`std::io::Read`] /
//! [`std::io::Write`], which is what [`WireTransport`] drives with its
//! [`std::net::TcpStream`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod wire;

pub use client::{TransportStats, WireTransport};
pub use error::{TransportError, TransportResult};
pub use wire::{VariableResponse, receive_exact, receive_variable, send_exact};

/// Size of the staging buffer used for every socket read and write.
pub const WIRE_CHUNK_SIZE: usize = 1024;

/// Largest variable-length payload accepted from a response header (16 MiB).
pub const MAX_VARIABLE_PAYLOAD: usize = 16 * 1024 * 1024;
