//! # Courier Files
//!
//! Local file handling for the Courier client:
//! - The transfer descriptor naming the server, user and file to send
//! - The identity record that allows reconnecting without re-registering
//! - Reading the source file as encrypted 16-byte blocks

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod blocks;
pub mod descriptor;
pub mod error;
pub mod identity_file;

pub use blocks::{BLOCK_SIZE, EncryptedFile, MARKER_BYTE, encrypt_file, encrypt_reader};
pub use descriptor::TransferDescriptor;
pub use error::{FileError, Result};
pub use identity_file::IdentityRecord;
