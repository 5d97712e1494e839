// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MiIO datagram framing and payload encryption.
//!
//! Every datagram starts with a 32-byte big-endian header:
//!
//! | Offset | Size | Field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 2    | magic `0x2131`                          |
//! | 2      | 2    | total length, header included           |
//! | 4      | 4    | unknown (`0`, or `0xFFFFFFFF` in hello) |
//! | 8      | 4    | device id                               |
//! | 12     | 4    | stamp (device uptime, seconds)          |
//! | 16     | 16   | MD5 checksum                            |
//!
//! The payload is AES-128-CBC encrypted with PKCS#7 padding, using
//! `key = md5(token)` and `iv = md5(key || token)`. The checksum is
//! `md5(header[0..16] || token || payload)`.
//!
//! These functions are public so that device simulators can speak the same
//! framing.

use std::fmt;

use aes::Aes128;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::{Digest, Md5};

use crate::error::{ProtocolError, ValueError};

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Header magic number.
pub const MAGIC: u16 = 0x2131;

/// Header length in bytes.
pub const HEADER_LEN: usize = 32;

fn md5(parts: &[&[u8]]) -> [u8; 16] {
    let mut hasher = Md5::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// A device token and the cipher parameters derived from it.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    raw: [u8; 16],
    key: [u8; 16],
    iv: [u8; 16],
}

impl Token {
    /// Parses a 32-character hexadecimal token.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidToken` if the string is not exactly 16
    /// hex-encoded bytes.
    pub fn from_hex(token: &str) -> Result<Self, ValueError> {
        let bytes =
            hex::decode(token.trim()).map_err(|e| ValueError::InvalidToken(e.to_string()))?;
        let raw: [u8; 16] = bytes.try_into().map_err(|b: Vec<u8>| {
            ValueError::InvalidToken(format!("expected 16 bytes, got {}", b.len()))
        })?;
        Ok(Self::from_bytes(raw))
    }

    /// Creates a token from raw bytes.
    #[must_use]
    pub fn from_bytes(raw: [u8; 16]) -> Self {
        let key = md5(&[&raw[..]]);
        let iv = md5(&[&key[..], &raw[..]]);
        Self { raw, key, iv }
    }

    /// Encrypts a payload.
    #[must_use]
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        Aes128CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
    }

    /// Decrypts a payload.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Decryption` if the ciphertext length or
    /// padding is invalid.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, ProtocolError> {
        Aes128CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|e| ProtocolError::Decryption(e.to_string()))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// A parsed datagram header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Total datagram length.
    pub length: usize,
    /// The `unknown` field.
    pub unknown: u32,
    /// Device id.
    pub device_id: u32,
    /// Device stamp.
    pub stamp: u32,
    /// Checksum field.
    pub checksum: [u8; 16],
}

impl Header {
    /// Parses the header of a datagram.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::MalformedPacket` on short input, a wrong magic
    /// number or an inconsistent length field.
    pub fn parse(datagram: &[u8]) -> Result<Self, ProtocolError> {
        if datagram.len() < HEADER_LEN {
            return Err(ProtocolError::MalformedPacket(format!(
                "datagram of {} bytes is shorter than the header",
                datagram.len()
            )));
        }

        let word = |at: usize| {
            u32::from_be_bytes([
                datagram[at],
                datagram[at + 1],
                datagram[at + 2],
                datagram[at + 3],
            ])
        };

        let magic = u16::from_be_bytes([datagram[0], datagram[1]]);
        if magic != MAGIC {
            return Err(ProtocolError::MalformedPacket(format!(
                "bad magic {magic:#06x}"
            )));
        }

        let length = usize::from(u16::from_be_bytes([datagram[2], datagram[3]]));
        if length < HEADER_LEN || length > datagram.len() {
            return Err(ProtocolError::MalformedPacket(format!(
                "length field {length} does not match datagram of {} bytes",
                datagram.len()
            )));
        }

        let mut checksum = [0u8; 16];
        checksum.copy_from_slice(&datagram[16..32]);

        Ok(Self {
            length,
            unknown: word(4),
            device_id: word(8),
            stamp: word(12),
            checksum,
        })
    }
}

/// A decoded datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Parsed header.
    pub header: Header,
    /// Decrypted payload; empty for hello packets.
    pub payload: Vec<u8>,
}

/// Builds the 32-byte hello packet that starts a session.
#[must_use]
pub fn hello() -> [u8; HEADER_LEN] {
    let mut packet = [0xFF_u8; HEADER_LEN];
    packet[0..2].copy_from_slice(&MAGIC.to_be_bytes());
    packet[2..4].copy_from_slice(&0x0020_u16.to_be_bytes());
    packet
}

/// Encrypts `plaintext` and frames it into a datagram.
///
/// # Errors
///
/// Returns `ProtocolError::MalformedPacket` if the payload does not fit the
/// 16-bit length field.
pub fn encode(
    token: &Token,
    device_id: u32,
    stamp: u32,
    plaintext: &[u8],
) -> Result<Vec<u8>, ProtocolError> {
    let payload = token.encrypt(plaintext);
    let length = u16::try_from(HEADER_LEN + payload.len()).map_err(|_| {
        ProtocolError::MalformedPacket(format!("payload of {} bytes is too large", payload.len()))
    })?;

    let mut packet = Vec::with_capacity(usize::from(length));
    packet.extend_from_slice(&MAGIC.to_be_bytes());
    packet.extend_from_slice(&length.to_be_bytes());
    packet.extend_from_slice(&0_u32.to_be_bytes());
    packet.extend_from_slice(&device_id.to_be_bytes());
    packet.extend_from_slice(&stamp.to_be_bytes());

    let checksum = md5(&[&packet[..16], &token.raw[..], &payload[..]]);
    packet.extend_from_slice(&checksum);
    packet.extend_from_slice(&payload);
    Ok(packet)
}

/// Verifies and decrypts a datagram.
///
/// Datagrams without a payload (hello replies) are returned as-is without a
/// checksum check.
///
/// # Errors
///
/// Returns an error if the header is malformed, the checksum does not match
/// or the payload cannot be decrypted.
pub fn decode(token: &Token, datagram: &[u8]) -> Result<Packet, ProtocolError> {
    let header = Header::parse(datagram)?;
    let body = &datagram[HEADER_LEN..header.length];

    if body.is_empty() {
        return Ok(Packet {
            header,
            payload: Vec::new(),
        });
    }

    if md5(&[&datagram[..16], &token.raw[..], body]) != header.checksum {
        return Err(ProtocolError::ChecksumMismatch);
    }

    let payload = token.decrypt(body)?;
    Ok(Packet { header, payload })
}
