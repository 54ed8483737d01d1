// Copyright (c) 2024 Botho Foundation

//! Fixed-width identities: execution-layer addresses and validator pubkeys.

use core::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors from parsing a hex-encoded identity.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseIdError {
    /// Input was not valid hex
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Input decoded to the wrong number of bytes
    #[error("expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Required byte length
        expected: usize,
        /// Decoded byte length
        got: usize,
    },
}

macro_rules! fixed_bytes_id {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Length of the identity in bytes.
            pub const LEN: usize = $len;

            /// The all-zero value.
            pub const EMPTY: Self = Self([0u8; $len]);

            /// Whether every byte is zero.
            pub fn is_empty(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }

            /// Raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Lowercase `0x`-prefixed hex.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::EMPTY
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter) -> FmtResult {
                f.write_str(&self.to_hex())
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter) -> FmtResult {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let digits = s.strip_prefix("0x").unwrap_or(s);
                let bytes =
                    hex::decode(digits).map_err(|e| ParseIdError::InvalidHex(e.to_string()))?;
                let array: [u8; $len] =
                    bytes
                        .as_slice()
                        .try_into()
                        .map_err(|_| ParseIdError::InvalidLength {
                            expected: $len,
                            got: bytes.len(),
                        })?;
                Ok(Self(array))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(D::Error::custom)
            }
        }
    };
}

fixed_bytes_id!(
    /// A 20-byte execution-layer account address (node operator or minipool).
    Address,
    20
);

fixed_bytes_id!(
    /// A 48-byte BLS validator public key. [`ValidatorPubkey::EMPTY`] means the
    /// minipool has not been assigned a validator yet.
    ValidatorPubkey,
    48
);
