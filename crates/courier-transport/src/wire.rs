//! Chunked send and receive loops.
//!
//! All socket traffic goes through a [`WIRE_CHUNK_SIZE`] staging buffer. The
//! loops tolerate short reads and writes, retry on `EINTR` and fail on a
//! zero-byte transfer.

use crate::error::{TransportError, TransportResult};
use crate::{MAX_VARIABLE_PAYLOAD, WIRE_CHUNK_SIZE};
use courier_proto::{RESPONSE_HEADER_SIZE, ResponseCode, ResponseHeader};
use std::io::{ErrorKind, Read, Write};
use tracing::trace;

/// Outcome of a variable-length response read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableResponse {
    /// The expected code arrived; `payload` holds exactly the declared bytes.
    Payload {
        /// Response header
        header: ResponseHeader,
        /// Assembled payload
        payload: Vec<u8>,
    },
    /// The server answered with a different code. The payload is not read.
    WrongCode(ResponseHeader),
}

/// Write all of `buf` to `writer`, one staging chunk at a time.
///
/// # Errors
///
/// Returns [`TransportError::ZeroWrite`] if a write accepts no bytes and
/// [`TransportError::Io`] for any other I/O failure.
pub fn send_exact<W: Write>(writer: &mut W, buf: &[u8]) -> TransportResult<()> {
    let mut staging = [0u8; WIRE_CHUNK_SIZE];
    let mut sent = 0;

    for chunk in buf.chunks(WIRE_CHUNK_SIZE) {
        staging[..chunk.len()].copy_from_slice(chunk);
        let mut offset = 0;
        while offset < chunk.len() {
            match writer.write(&staging[offset..chunk.len()]) {
                Ok(0) => {
                    return Err(TransportError::ZeroWrite {
                        sent,
                        expected: buf.len(),
                    });
                }
                Ok(n) => {
                    offset += n;
                    sent += n;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    writer.flush()?;
    trace!(bytes = sent, "sent");
    Ok(())
}

/// Read up to `dest.len()` bytes in one call, retrying on `EINTR`.
fn read_some<R: Read>(reader: &mut R, dest: &mut [u8]) -> TransportResult<usize> {
    loop {
        match reader.read(dest) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
}

/// Append exactly `count` more bytes from `reader` to `dest`.
fn fill<R: Read>(reader: &mut R, dest: &mut Vec<u8>, count: usize) -> TransportResult<()> {
    let mut staging = [0u8; WIRE_CHUNK_SIZE];
    let target = dest.len() + count;
    while dest.len() < target {
        let want = (target - dest.len()).min(WIRE_CHUNK_SIZE);
        let n = read_some(reader, &mut staging[..want])?;
        if n == 0 {
            return Err(TransportError::ZeroRead {
                received: dest.len() - (target - count),
                expected: count,
            });
        }
        dest.extend_from_slice(&staging[..n]);
    }
    Ok(())
}

/// Read exactly `size` bytes from `reader`.
///
/// # Errors
///
/// Returns [`TransportError::ZeroRead`] if the stream ends early.
pub fn receive_exact<R: Read>(reader: &mut R, size: usize) -> TransportResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(size);
    fill(reader, &mut buf, size)?;
    trace!(bytes = size, "received");
    Ok(buf)
}

/// Read a response whose payload length is only known from its header.
///
/// Reads whole staging chunks until a header is available, checks the code
/// against `expected`, then keeps reading until the declared payload is
/// complete. Payload bytes that arrived together with the header are kept.
///
/// # Errors
///
/// Returns [`TransportError::ZeroRead`] if the stream ends before the header
/// or the payload is complete, and [`TransportError::PayloadTooLarge`] if the
/// header declares more than [`MAX_VARIABLE_PAYLOAD`] bytes.
pub fn receive_variable<R: Read>(
    reader: &mut R,
    expected: ResponseCode,
) -> TransportResult<VariableResponse> {
    let mut staging = [0u8; WIRE_CHUNK_SIZE];
    let mut working = Vec::with_capacity(WIRE_CHUNK_SIZE);

    while working.len() < RESPONSE_HEADER_SIZE {
        let n = read_some(reader, &mut staging)?;
        if n == 0 {
            return Err(TransportError::ZeroRead {
                received: working.len(),
                expected: RESPONSE_HEADER_SIZE,
            });
        }
        working.extend_from_slice(&staging[..n]);
    }

    let header = ResponseHeader::decode(&working)?;
    if !header.is(expected) {
        trace!(code = header.code, expected = u16::from(expected), "unexpected response code");
        return Ok(VariableResponse::WrongCode(header));
    }

    let declared = header.payload_len();
    if declared > MAX_VARIABLE_PAYLOAD {
        return Err(TransportError::PayloadTooLarge {
            declared,
            max: MAX_VARIABLE_PAYLOAD,
        });
    }

    let mut payload = Vec::with_capacity(declared);
    let early = &working[RESPONSE_HEADER_SIZE..];
    payload.extend_from_slice(&early[..early.len().min(declared)]);
    if early.len() > declared {
        trace!(extra = early.len() - declared, "discarding bytes past declared payload");
    }

    let remaining = declared - payload.len();
    fill(reader, &mut payload, remaining).map_err(|e| match e {
        TransportError::ZeroRead { received, .. } => TransportError::ZeroRead {
            received: declared - remaining + received,
            expected: declared,
        },
        other => other,
    })?;

    trace!(code = header.code, bytes = declared, "received variable response");
    Ok(VariableResponse::Payload { header, payload })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    /// Reader that hands out data in the given slice sizes, cycling.
    struct ChunkyReader {
        data: Vec<u8>,
        pos: usize,
        splits: Vec<usize>,
        call: usize,
    }

    impl ChunkyReader {
        fn new(data: Vec<u8>, splits: Vec<usize>) -> Self {
            Self {
                data,
                pos: 0,
                splits,
                call: 0,
            }
        }
    }

    impl Read for ChunkyReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let limit = self.splits[self.call % self.splits.len()].max(1);
            self.call += 1;
            let n = limit.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    /// Writer that accepts at most `limit` bytes per call.
    struct ChunkyWriter {
        out: Vec<u8>,
        limit: usize,
        interrupt_next: bool,
    }

    impl Write for ChunkyWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.interrupt_next {
                self.interrupt_next = false;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            self.interrupt_next = true;
            let n = buf.len().min(self.limit);
            self.out.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct ClosedWriter;

    impl Write for ClosedWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn frame(code: ResponseCode, payload: &[u8]) -> Vec<u8> {
        let mut buf = ResponseHeader::new(code, payload.len() as u32)
            .encode()
            .to_vec();
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn test_send_exact_survives_short_writes_and_eintr() {
        let data: Vec<u8> = (0..3000u32).map(|i| i as u8).collect();
        let mut writer = ChunkyWriter {
            out: Vec::new(),
            limit: 7,
            interrupt_next: false,
        };
        send_exact(&mut writer, &data).unwrap();
        assert_eq!(writer.out, data);
    }

    #[test]
    fn test_send_exact_zero_write_fails() {
        let result = send_exact(&mut ClosedWriter, b"hello");
        assert!(matches!(
            result,
            Err(TransportError::ZeroWrite {
                sent: 0,
                expected: 5
            })
        ));
    }

    #[test]
    fn test_send_exact_empty_buffer() {
        let mut out = Vec::new();
        send_exact(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_receive_exact_short_stream() {
        let mut reader = Cursor::new(vec![1u8; 10]);
        assert!(matches!(
            receive_exact(&mut reader, 20),
            Err(TransportError::ZeroRead {
                received: 10,
                expected: 20
            })
        ));
    }

    #[test]
    fn test_receive_exact_leaves_trailing_bytes() {
        let mut reader = Cursor::new(vec![9u8; 2048]);
        let got = receive_exact(&mut reader, 1500).unwrap();
        assert_eq!(got.len(), 1500);
        assert_eq!(reader.position(), 1500);
    }

    #[test]
    fn test_variable_empty_payload() {
        let mut reader = Cursor::new(frame(ResponseCode::PublicKeyReceived, &[]));
        let response = receive_variable(&mut reader, ResponseCode::PublicKeyReceived).unwrap();
        assert!(matches!(
            response,
            VariableResponse::Payload { ref payload, .. } if payload.is_empty()
        ));
    }

    #[test]
    fn test_variable_wrong_code_is_not_an_error() {
        let mut reader = Cursor::new(frame(ResponseCode::ReconnectRejected, &[0u8; 16]));
        let response = receive_variable(&mut reader, ResponseCode::ReconnectAccepted).unwrap();
        match response {
            VariableResponse::WrongCode(header) => {
                assert!(header.is(ResponseCode::ReconnectRejected));
            }
            other => panic!("expected wrong code, got {other:?}"),
        }
    }

    #[test]
    fn test_variable_truncated_payload() {
        let mut bytes = frame(ResponseCode::ReconnectAccepted, &[3u8; 144]);
        bytes.truncate(8 + 100);
        let mut reader = ChunkyReader::new(bytes, vec![30]);
        assert!(matches!(
            receive_variable(&mut reader, ResponseCode::ReconnectAccepted),
            Err(TransportError::ZeroRead {
                received: 100,
                expected: 144
            })
        ));
    }

    #[test]
    fn test_variable_header_never_arrives() {
        let mut reader = Cursor::new(vec![0u8; 5]);
        assert!(matches!(
            receive_variable(&mut reader, ResponseCode::PublicKeyReceived),
            Err(TransportError::ZeroRead {
                received: 5,
                expected: 8
            })
        ));
    }

    #[test]
    fn test_variable_rejects_oversized_declaration() {
        let mut bytes = ResponseHeader::new(ResponseCode::PublicKeyReceived, u32::MAX)
            .encode()
            .to_vec();
        bytes.extend_from_slice(&[0u8; 32]);
        let mut reader = Cursor::new(bytes);
        assert!(matches!(
            receive_variable(&mut reader, ResponseCode::PublicKeyReceived),
            Err(TransportError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_variable_ignores_bytes_past_declared_length() {
        let mut bytes = frame(ResponseCode::PublicKeyReceived, b"0123456789abcdefKEY");
        bytes.extend_from_slice(&[0xEE; 64]);
        let mut reader = Cursor::new(bytes);
        match receive_variable(&mut reader, ResponseCode::PublicKeyReceived).unwrap() {
            VariableResponse::Payload { payload, .. } => {
                assert_eq!(payload, b"0123456789abcdefKEY");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_chunked_loopback_reconstructs(
                data in prop::collection::vec(any::<u8>(), 0..5000),
                write_limit in 1usize..2000,
                splits in prop::collection::vec(1usize..2000, 1..8),
            ) {
                let mut writer = ChunkyWriter { out: Vec::new(), limit: write_limit, interrupt_next: false };
                send_exact(&mut writer, &data).unwrap();

                let mut reader = ChunkyReader::new(writer.out, splits);
                let received = receive_exact(&mut reader, data.len()).unwrap();
                prop_assert_eq!(received, data);
            }

            #[test]
            fn prop_variable_payload_any_split(
                payload in prop::collection::vec(any::<u8>(), 16..4000),
                splits in prop::collection::vec(1usize..=WIRE_CHUNK_SIZE, 1..8),
            ) {
                let bytes = frame(ResponseCode::ReconnectAccepted, &payload);
                let mut reader = ChunkyReader::new(bytes, splits);
                let response = receive_variable(&mut reader, ResponseCode::ReconnectAccepted).unwrap();
                match response {
                    VariableResponse::Payload { header, payload: got } => {
                        prop_assert_eq!(header.payload_len(), payload.len());
                        prop_assert_eq!(got, payload);
                    }
                    VariableResponse::WrongCode(_) => prop_assert!(false, "wrong code"),
                }
            }
        }
    }
}
