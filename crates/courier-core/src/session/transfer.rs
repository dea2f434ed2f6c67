//! Encrypted file transfer with CRC retry, and the final confirmation.

use super::{Session, SessionState, TransferOutcome};
use crate::MAX_TRIES;
use crate::error::{Result, SessionError};
use courier_crypto::BlockCipher;
use courier_files::encrypt_file;
use courier_proto::{
    ACK_RESPONSE_SIZE, FILE_RECEIVED_RESPONSE_SIZE, RequestBody, Response, ResponseCode,
};
use std::path::Path;
use tracing::{debug, info, warn};

impl Session {
    /// Send the file until the server's checksum matches or attempts run out.
    pub(super) fn transfer(&mut self) -> Result<TransferOutcome> {
        self.set_state(SessionState::Transferring);
        let key = self
            .identity
            .symmetric_key
            .clone()
            .ok_or(SessionError::NoSymmetricKey)?;
        let cipher = BlockCipher::new(key);
        let path = self.descriptor.file_path.clone();

        for attempt in 1..=MAX_TRIES {
            let encrypted = encrypt_file(Path::new(&path), &cipher)?;
            let expected = encrypted.checksum();
            info!(
                attempt,
                bytes = encrypted.content_len(),
                ciphertext = encrypted.ciphertext.len(),
                "Sending file"
            );

            let body = RequestBody::FileSend {
                file_name: self.file_name.clone(),
                content: encrypted.ciphertext,
            };
            let response = self.exchange_fixed(
                "file send",
                body,
                FILE_RECEIVED_RESPONSE_SIZE,
                ResponseCode::FileReceived,
            )?;
            let Response::FileReceived {
                content_size,
                checksum,
                ..
            } = response
            else {
                return Err(SessionError::Rejected {
                    step: "file send",
                    code: response.code().into(),
                });
            };
            debug!(
                attempt,
                server_size = content_size,
                server_crc = checksum,
                local_crc = expected,
                "file received by server"
            );

            if checksum == expected {
                info!(attempt, "Checksum matched");
                return Ok(TransferOutcome::Verified { attempts: attempt });
            }

            if attempt < MAX_TRIES {
                warn!(attempt, "Checksum mismatch, resending");
                let notice = self.request(RequestBody::CrcRetry {
                    file_name: self.file_name.clone(),
                })?;
                self.transport.notify(&notice);
            }
        }

        warn!(attempts = MAX_TRIES, "Checksum mismatch on every attempt, giving up");
        self.exchange_fixed(
            "abort notification",
            RequestBody::CrcAbort {
                file_name: self.file_name.clone(),
            },
            ACK_RESPONSE_SIZE,
            ResponseCode::MessageReceived,
        )?;
        Ok(TransferOutcome::Unverified {
            attempts: MAX_TRIES,
        })
    }

    /// Tell the server the checksum matched.
    pub(super) fn confirm(&mut self) -> Result<()> {
        self.set_state(SessionState::Confirming);
        self.exchange_fixed(
            "confirmation",
            RequestBody::CrcGood {
                file_name: self.file_name.clone(),
            },
            ACK_RESPONSE_SIZE,
            ResponseCode::MessageReceived,
        )?;
        info!("Transfer confirmed");
        Ok(())
    }
}
