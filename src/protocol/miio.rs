// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MiIO UDP transport.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::{Error, ProtocolError};
use crate::protocol::packet::{self, HEADER_LEN, Header, Token};
use crate::protocol::{DeviceClient, PropertyReading};
use crate::types::{Address, RawValue};

const RECV_BUFFER: usize = 4096;

// ============================================================================
// MiioConfig - Connection parameters
// ============================================================================

/// Connection parameters for a MiIO device.
///
/// # Examples
///
/// ```
/// use miheater_lib::protocol::MiioConfig;
/// use std::time::Duration;
///
/// let config = MiioConfig::new("192.168.1.40", "00112233445566778899aabbccddeeff")
///     .with_timeout(Duration::from_secs(3));
/// assert_eq!(config.port(), 54321);
/// ```
#[derive(Clone)]
pub struct MiioConfig {
    host: String,
    port: u16,
    token: String,
    timeout: Duration,
}

impl MiioConfig {
    /// Default MiIO UDP port.
    pub const DEFAULT_PORT: u16 = 54321;
    /// Default round-trip timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a configuration for the given host and hex token.
    #[must_use]
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: Self::DEFAULT_PORT,
            token: token.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets a custom port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the round-trip timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves the host and opens a UDP socket towards it.
    ///
    /// No datagram is sent until the first request; the handshake happens
    /// lazily.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidToken` for a malformed token,
    /// `ProtocolError::ConnectionFailed` if the host cannot be resolved or
    /// reached, and `ProtocolError::Io` if no local socket can be bound.
    pub async fn connect(self) -> Result<MiioClient, Error> {
        let token = Token::from_hex(&self.token)?;

        let peer = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| ProtocolError::ConnectionFailed(format!("{}: {e}", self.host)))?
            .next()
            .ok_or_else(|| ProtocolError::InvalidAddress(self.host.clone()))?;

        let local = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local).await.map_err(ProtocolError::Io)?;
        socket
            .connect(peer)
            .await
            .map_err(|e| ProtocolError::ConnectionFailed(format!("{peer}: {e}")))?;

        tracing::debug!(peer = %peer, "Opened MiIO socket");

        Ok(MiioClient {
            socket,
            peer,
            token,
            timeout: self.timeout,
            next_id: AtomicU32::new(1),
            session: Mutex::new(None),
        })
    }
}

impl std::fmt::Debug for MiioConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiioConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// MiioClient - Request/response over UDP
// ============================================================================

/// Device id and stamp learned from the hello handshake.
#[derive(Debug, Clone, Copy)]
struct Session {
    device_id: u32,
    stamp: u32,
    established: Instant,
}

impl Session {
    /// The device stamp advanced by the time elapsed since the handshake.
    fn current_stamp(&self) -> u32 {
        let elapsed = u32::try_from(self.established.elapsed().as_secs()).unwrap_or(u32::MAX);
        self.stamp.wrapping_add(elapsed)
    }
}

#[derive(Serialize)]
struct Request<'a> {
    id: u32,
    method: &'a str,
    params: &'a Value,
}

#[derive(Deserialize)]
struct Response {
    id: u32,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct PropertyQuery {
    siid: u32,
    piid: u32,
}

#[derive(Serialize)]
struct PropertyAssignment<'a> {
    siid: u32,
    piid: u32,
    value: &'a RawValue,
}

/// Client for the encrypted MiIO protocol.
///
/// One client owns one UDP socket connected to one device. Requests are
/// serialized internally: the session lock is held for a whole exchange, so
/// replies cannot be mixed up between concurrent callers.
///
/// The session (device id and stamp from the hello handshake) is cached and
/// dropped after any transport failure, so the next request starts with a
/// fresh handshake. No request is ever retried.
///
/// # Examples
///
/// ```no_run
/// use miheater_lib::protocol::{DeviceClient, MiioConfig};
/// use miheater_lib::types::Address;
///
/// # async fn example() -> miheater_lib::Result<()> {
/// let client = MiioConfig::new("192.168.1.40", "00112233445566778899aabbccddeeff")
///     .connect()
///     .await?;
///
/// let readings = client.read(&[Address::new(2, 1), Address::new(2, 5)]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MiioClient {
    socket: UdpSocket,
    peer: SocketAddr,
    token: Token,
    timeout: Duration,
    next_id: AtomicU32,
    session: Mutex<Option<Session>>,
}

impl MiioClient {
    /// Returns the device socket address.
    #[must_use]
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Returns the round-trip timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends an arbitrary JSON-RPC method and returns its `result`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Timeout` if no matching reply arrives in time,
    /// `ProtocolError::CommandRejected` if the device answers with an error,
    /// or another `ProtocolError` on socket or framing failures.
    pub async fn raw_command(&self, method: &str, params: Value) -> Result<Value, ProtocolError> {
        self.send(method, params).await
    }

    async fn send<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<R, ProtocolError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = serde_json::to_vec(&Request {
            id,
            method,
            params: &params,
        })?;

        let mut session = self.session.lock().await;

        // Safe: timeout in practical use will never exceed u64::MAX milliseconds
        #[allow(clippy::cast_possible_truncation)]
        let timeout_ms = self.timeout.as_millis() as u64;

        let result = tokio::time::timeout(self.timeout, self.exchange(&mut session, id, &request))
            .await
            .unwrap_or(Err(ProtocolError::Timeout(timeout_ms)));

        match result {
            Ok(value) => Ok(serde_json::from_value(value)?),
            Err(e) => {
                if !matches!(
                    e,
                    ProtocolError::CommandRejected { .. } | ProtocolError::Json(_)
                ) {
                    *session = None;
                }
                tracing::debug!(peer = %self.peer, id, method, error = %e, "MiIO request failed");
                Err(e)
            }
        }
    }

    async fn exchange(
        &self,
        session: &mut Option<Session>,
        id: u32,
        request: &[u8],
    ) -> Result<Value, ProtocolError> {
        let current = match *session {
            Some(current) => current,
            None => {
                let fresh = self.handshake().await?;
                *session = Some(fresh);
                fresh
            }
        };

        let datagram = packet::encode(&self.token, current.device_id, current.current_stamp(), request)?;
        tracing::debug!(peer = %self.peer, id, bytes = datagram.len(), "Sending MiIO request");
        self.socket.send(&datagram).await?;

        let mut buf = vec![0_u8; RECV_BUFFER];
        loop {
            let len = self.socket.recv(&mut buf).await?;
            let packet = packet::decode(&self.token, &buf[..len])?;
            if packet.payload.is_empty() {
                continue;
            }

            let response: Response = serde_json::from_slice(trim_trailing_nul(&packet.payload))?;
            if response.id != id {
                tracing::trace!(expected = id, received = response.id, "Discarding stale MiIO reply");
                continue;
            }

            tracing::debug!(peer = %self.peer, id, "Received MiIO reply");

            if let Some(error) = response.error {
                return Err(ProtocolError::CommandRejected {
                    code: error.code,
                    message: error.message,
                });
            }
            return response.result.ok_or_else(|| {
                ProtocolError::MalformedPacket("reply has neither result nor error".to_string())
            });
        }
    }

    async fn handshake(&self) -> Result<Session, ProtocolError> {
        self.socket.send(&packet::hello()).await?;

        let mut buf = vec![0_u8; RECV_BUFFER];
        loop {
            let len = self.socket.recv(&mut buf).await?;
            let header = Header::parse(&buf[..len])?;
            if header.length != HEADER_LEN {
                continue;
            }

            tracing::debug!(
                peer = %self.peer,
                device_id = header.device_id,
                stamp = header.stamp,
                "MiIO handshake complete"
            );

            return Ok(Session {
                device_id: header.device_id,
                stamp: header.stamp,
                established: Instant::now(),
            });
        }
    }
}

impl DeviceClient for MiioClient {
    async fn read(&self, addresses: &[Address]) -> Result<Vec<PropertyReading>, ProtocolError> {
        let queries: Vec<PropertyQuery> = addresses
            .iter()
            .map(|addr| PropertyQuery {
                siid: addr.siid,
                piid: addr.piid,
            })
            .collect();
        let params = serde_json::to_value(&queries)?;
        self.send("get_properties", params).await
    }

    async fn write(&self, address: Address, value: RawValue) -> Result<bool, ProtocolError> {
        let params = serde_json::to_value([PropertyAssignment {
            siid: address.siid,
            piid: address.piid,
            value: &value,
        }])?;
        let acks: Vec<PropertyReading> = self.send("set_properties", params).await?;
        Ok(acks
            .iter()
            .any(|ack| ack.address() == address && ack.is_success()))
    }
}

/// Strips the NUL terminator some firmwares append to the JSON payload.
fn trim_trailing_nul(payload: &[u8]) -> &[u8] {
    let end = payload.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    &payload[..end]
}
