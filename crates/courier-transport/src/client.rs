//! Connection-owning transport used by the session.

use crate::error::{TransportError, TransportResult};
use crate::wire::{self, VariableResponse};
use courier_proto::ResponseCode;
use std::io;
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use tracing::{debug, warn};

/// Counters kept across the lifetime of a [`WireTransport`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportStats {
    /// Connections opened
    pub connects: u64,
    /// Request bytes written
    pub bytes_sent: u64,
    /// Response bytes read
    pub bytes_received: u64,
    /// Completed request/response exchanges
    pub exchanges: u64,
}

/// Blocking TCP transport owning at most one connection.
///
/// Each higher-level exchange opens a fresh connection; opening a connection
/// closes the previous one.
#[derive(Debug, Default)]
pub struct WireTransport {
    target: Option<(String, u16)>,
    stream: Option<TcpStream>,
    stats: TransportStats,
}

impl WireTransport {
    /// Create an unconfigured transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the server to talk to. No I/O happens here.
    pub fn configure(&mut self, address: impl Into<String>, port: u16) {
        self.target = Some((address.into(), port));
    }

    /// `address:port` of the configured target, if any.
    #[must_use]
    pub fn target(&self) -> Option<String> {
        self.target
            .as_ref()
            .map(|(address, port)| format!("{address}:{port}"))
    }

    /// Open a connection to the configured target, closing any previous one.
    ///
    /// Every address the target resolves to is tried in order.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConfigured`], [`TransportError::Resolve`]
    /// or [`TransportError::ConnectionFailed`]; the transport is left
    /// disconnected in every case.
    pub fn connect(&mut self) -> TransportResult<()> {
        self.close();

        let (address, port) = self.target.as_ref().ok_or(TransportError::NotConfigured)?;
        let target = format!("{address}:{port}");
        let addrs: Vec<_> = (address.as_str(), *port)
            .to_socket_addrs()
            .map_err(|e| TransportError::Resolve {
                target: target.clone(),
                reason: e.to_string(),
            })?
            .collect();
        if addrs.is_empty() {
            return Err(TransportError::Resolve {
                target,
                reason: "no addresses".to_string(),
            });
        }

        let mut last_err = io::Error::new(io::ErrorKind::NotConnected, "no address tried");
        for addr in addrs {
            match TcpStream::connect(addr) {
                Ok(stream) => {
                    debug!(%addr, "connected");
                    self.stream = Some(stream);
                    self.stats.connects += 1;
                    return Ok(());
                }
                Err(e) => {
                    debug!(%addr, error = %e, "connect attempt failed");
                    last_err = e;
                }
            }
        }

        Err(TransportError::ConnectionFailed {
            target,
            source: last_err,
        })
    }

    /// Release the connection if one is open. Idempotent.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            // The peer may already have closed its side.
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    /// Whether a connection is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn stream(&mut self) -> TransportResult<&mut TcpStream> {
        self.stream.as_mut().ok_or(TransportError::NotConnected)
    }

    /// Write all of `buf` over the open connection.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConnected`] without a connection, or the
    /// error of the chunked write loop.
    pub fn send_exact(&mut self, buf: &[u8]) -> TransportResult<()> {
        wire::send_exact(self.stream()?, buf)?;
        self.stats.bytes_sent += buf.len() as u64;
        Ok(())
    }

    /// Read exactly `size` bytes from the open connection.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::NotConnected`] without a connection, or
    /// [`TransportError::ZeroRead`] if the peer closes early.
    pub fn receive_exact(&mut self, size: usize) -> TransportResult<Vec<u8>> {
        let buf = wire::receive_exact(self.stream()?, size)?;
        self.stats.bytes_received += buf.len() as u64;
        Ok(buf)
    }

    /// Connect, send `request` and read a response of known size.
    ///
    /// # Errors
    ///
    /// Any connect, send or receive failure.
    pub fn send_and_receive_fixed(
        &mut self,
        request: &[u8],
        response_size: usize,
    ) -> TransportResult<Vec<u8>> {
        self.connect()?;
        self.send_exact(request)?;
        let response = self.receive_exact(response_size)?;
        self.stats.exchanges += 1;
        Ok(response)
    }

    /// Connect, send `request` and read a response whose payload length comes
    /// from its header.
    ///
    /// A response carrying a code other than `expected` is reported as
    /// [`VariableResponse::WrongCode`] rather than an error.
    ///
    /// # Errors
    ///
    /// Any connect, send or receive failure, or an oversized declaration.
    pub fn send_and_receive_variable(
        &mut self,
        request: &[u8],
        expected: ResponseCode,
    ) -> TransportResult<VariableResponse> {
        self.connect()?;
        self.send_exact(request)?;
        let response = wire::receive_variable(self.stream()?, expected)?;
        if let VariableResponse::Payload { payload, .. } = &response {
            self.stats.bytes_received +=
                (courier_proto::RESPONSE_HEADER_SIZE + payload.len()) as u64;
        }
        self.stats.exchanges += 1;
        Ok(response)
    }

    /// Best-effort connect and send with no response expected.
    ///
    /// Failures are logged and reported through the return value only.
    pub fn notify(&mut self, request: &[u8]) -> bool {
        match self.connect().and_then(|()| self.send_exact(request)) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "best-effort notification not delivered");
                false
            }
        }
    }

    /// Snapshot of the transport counters.
    #[must_use]
    pub fn stats(&self) -> TransportStats {
        self.stats
    }
}

impl Drop for WireTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_proto::ResponseHeader;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn listener() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    #[test]
    fn test_connect_requires_configure() {
        let mut transport = WireTransport::new();
        assert!(matches!(
            transport.connect(),
            Err(TransportError::NotConfigured)
        ));
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_connect_refused_leaves_disconnected() {
        let (listener, port) = listener();
        drop(listener);

        let mut transport = WireTransport::new();
        transport.configure("127.0.0.1", port);
        assert!(matches!(
            transport.connect(),
            Err(TransportError::ConnectionFailed { .. })
        ));
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_send_without_connection() {
        let mut transport = WireTransport::new();
        assert!(matches!(
            transport.send_exact(b"x"),
            Err(TransportError::NotConnected)
        ));
        assert!(matches!(
            transport.receive_exact(1),
            Err(TransportError::NotConnected)
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let (_listener, port) = listener();
        let mut transport = WireTransport::new();
        transport.configure("localhost", port);
        transport.connect().unwrap();
        assert!(transport.is_connected());
        transport.close();
        transport.close();
        assert!(!transport.is_connected());
    }

    #[test]
    fn test_fixed_exchange_over_loopback() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = vec![0u8; 3000];
            stream.read_exact(&mut request).unwrap();
            stream.write_all(&request[..100]).unwrap();
            request
        });

        let request: Vec<u8> = (0..3000u32).map(|i| (i % 251) as u8).collect();
        let mut transport = WireTransport::new();
        transport.configure("127.0.0.1", port);
        let response = transport.send_and_receive_fixed(&request, 100).unwrap();

        assert_eq!(server.join().unwrap(), request);
        assert_eq!(response, &request[..100]);
        let stats = transport.stats();
        assert_eq!(stats.connects, 1);
        assert_eq!(stats.bytes_sent, 3000);
        assert_eq!(stats.bytes_received, 100);
        assert_eq!(stats.exchanges, 1);
    }

    #[test]
    fn test_variable_exchange_over_loopback() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 4];
            stream.read_exact(&mut request).unwrap();
            let mut response = ResponseHeader::new(ResponseCode::PublicKeyReceived, 2000)
                .encode()
                .to_vec();
            response.extend(std::iter::repeat_n(0xAB, 2000));
            // Split the header across two writes.
            stream.write_all(&response[..3]).unwrap();
            stream.flush().unwrap();
            stream.write_all(&response[3..]).unwrap();
        });

        let mut transport = WireTransport::new();
        transport.configure("127.0.0.1", port);
        let response = transport
            .send_and_receive_variable(b"ping", ResponseCode::PublicKeyReceived)
            .unwrap();
        server.join().unwrap();

        match response {
            VariableResponse::Payload { payload, .. } => {
                assert_eq!(payload.len(), 2000);
                assert!(payload.iter().all(|&b| b == 0xAB));
            }
            VariableResponse::WrongCode(h) => panic!("wrong code {}", h.code),
        }
    }

    #[test]
    fn test_notify_swallows_failure() {
        let (listener, port) = listener();
        drop(listener);
        let mut transport = WireTransport::new();
        transport.configure("127.0.0.1", port);
        assert!(!transport.notify(b"retry"));
    }

    #[test]
    fn test_notify_delivers() {
        let (listener, port) = listener();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).unwrap();
            buf
        });

        let mut transport = WireTransport::new();
        transport.configure("127.0.0.1", port);
        assert!(transport.notify(b"retry"));
        transport.close();
        assert_eq!(server.join().unwrap(), b"retry");
    }
}
