use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::span::SpanStatus;

macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident, $len:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Generate a new id from the thread-local RNG
            pub fn new() -> Self {
                Self::random(&mut rand::thread_rng())
            }

            /// Generate a new id from the given RNG
            pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
                let mut bytes = [0u8; $len];
                rng.fill(&mut bytes[..]);
                Self(bytes)
            }

            /// Parse from a lowercase or uppercase hex string
            pub fn from_hex(s: &str) -> Result<Self, IdError> {
                if s.len() != $len * 2 {
                    return Err(IdError::InvalidLength {
                        expected: $len * 2,
                        actual: s.len(),
                    });
                }
                let mut bytes = [0u8; $len];
                hex::decode_to_slice(s, &mut bytes).map_err(|_| IdError::InvalidHex)?;
                Ok(Self(bytes))
            }

            /// Format as hex string
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
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
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_id!(
    /// 16-byte trace ID (32 hex chars)
    TraceId,
    16
);

hex_id!(
    /// 8-byte span ID (16 hex chars)
    SpanId,
    8
);

hex_id!(
    /// 16-byte error event ID (32 hex chars)
    EventId,
    16
);

/// Trace context attached to an error envelope
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TraceContext {
    pub trace_id: TraceId,
    pub span_id: SpanId,
    pub status: SpanStatus,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TraceContext {
    /// Context for an error captured outside of any known span outcome
    pub fn new(trace_id: TraceId, span_id: SpanId) -> Self {
        Self {
            trace_id,
            span_id,
            status: SpanStatus::Unknown,
            kind: "trace".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdError {
    #[error("invalid hex encoding")]
    InvalidHex,
    #[error("invalid length: expected {expected} hex chars, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
