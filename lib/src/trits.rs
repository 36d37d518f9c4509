// Tangledb
// Copyright (c) 2026 Tangledb Contributors
// Licensed and distributed under either of
//   * MIT license (license terms in the root directory or at http://opensource.org/licenses/MIT).
//   * Apache v2 license (license terms in the root directory or at http://www.apache.org/licenses/LICENSE-2.0).
// at your option. This file may not be copied, modified, or distributed except according to those terms.

use std::fmt;

use thiserror::Error;

/// Flex-trit width of a 243-trit hash. Bundle, address, transaction,
/// trunk and branch hashes all share this width on the ledger.
pub const HASH_LEN: usize = 81;

/// Flex-trit width of the signature/message fragment.
pub const MESSAGE_LEN: usize = 2187;

/// A byte slice did not match the declared width of its target field.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("expected {expected} bytes, got {actual}")]
pub struct WidthError {
    pub expected: usize,
    pub actual: usize,
}

/// An opaque 243-trit hash in flex-trit encoding.
///
/// The storage layer never interprets the content; it only moves the bytes
/// and compares them for equality and ordering.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash243([u8; HASH_LEN]);

impl Hash243 {
    pub const fn new(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Width-checked construction from untrusted input.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, WidthError> {
        let bytes: [u8; HASH_LEN] = bytes.try_into().map_err(|_| WidthError {
            expected: HASH_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(bytes))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub const fn into_inner(self) -> [u8; HASH_LEN] {
        self.0
    }
}

impl Default for Hash243 {
    fn default() -> Self {
        Self([0; HASH_LEN])
    }
}

impl From<[u8; HASH_LEN]> for Hash243 {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Hash243 {
    type Error = WidthError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl AsRef<[u8]> for Hash243 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash243 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Hash243 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash243({self})")
    }
}

/// The signature/message fragment of a transaction.
///
/// Boxed because the fragment dwarfs the other seven fields put together.
#[derive(Clone, PartialEq, Eq)]
pub struct Message(Box<[u8; MESSAGE_LEN]>);

impl Message {
    pub fn new(bytes: [u8; MESSAGE_LEN]) -> Self {
        Self(Box::new(bytes))
    }

    /// Width-checked construction from untrusted input.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, WidthError> {
        let bytes: [u8; MESSAGE_LEN] = bytes.try_into().map_err(|_| WidthError {
            expected: MESSAGE_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(Box::new(bytes)))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }
}

impl Default for Message {
    fn default() -> Self {
        Self(Box::new([0; MESSAGE_LEN]))
    }
}

impl TryFrom<&[u8]> for Message {
    type Error = WidthError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_slice(bytes)
    }
}

impl AsRef<[u8]> for Message {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Message({}..)", hex::encode(&self.0[..8]))
    }
}
