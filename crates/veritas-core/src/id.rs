use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;
use crate::field::{Field, Hash};

/// Length of an identity id in bytes.
pub const ID_LEN: usize = 31;
/// Length of the genesis segment of an id.
pub const GENESIS_LEN: usize = 27;

/// Identity identifier: `[type (2) | genesis (27) | checksum (2)]`.
///
/// The genesis segment is derived from the identity's first state, which is
/// what lets a verifier accept a state that was never published on chain.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id([u8; ID_LEN]);

impl Id {
    /// Build an id from its type and genesis segment, computing the checksum.
    pub fn new(id_type: [u8; 2], genesis: [u8; GENESIS_LEN]) -> Self {
        let checksum = calculate_checksum(id_type, &genesis);
        let mut bytes = [0u8; ID_LEN];
        bytes[..2].copy_from_slice(&id_type);
        bytes[2..2 + GENESIS_LEN].copy_from_slice(&genesis);
        bytes[ID_LEN - 2..].copy_from_slice(&checksum);
        Self(bytes)
    }

    /// Parse raw id bytes, validating the checksum.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CoreError> {
        if bytes.len() != ID_LEN {
            return Err(CoreError::InvalidId(format!(
                "expected {} bytes, got {}",
                ID_LEN,
                bytes.len()
            )));
        }
        if bytes.iter().all(|b| *b == 0) {
            return Err(CoreError::InvalidId("id is empty".into()));
        }
        let mut raw = [0u8; ID_LEN];
        raw.copy_from_slice(bytes);
        let id = Self(raw);
        if calculate_checksum(id.id_type(), &id.genesis()) != id.checksum() {
            return Err(CoreError::InvalidId(format!(
                "checksum mismatch for {}",
                hex::encode(bytes)
            )));
        }
        Ok(id)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// The two type bytes: DID method byte and network byte.
    pub fn id_type(&self) -> [u8; 2] {
        [self.0[0], self.0[1]]
    }

    pub fn genesis(&self) -> [u8; GENESIS_LEN] {
        let mut g = [0u8; GENESIS_LEN];
        g.copy_from_slice(&self.0[2..2 + GENESIS_LEN]);
        g
    }

    fn checksum(&self) -> [u8; 2] {
        [self.0[ID_LEN - 2], self.0[ID_LEN - 1]]
    }

    /// Field form: the little-endian integer of the id bytes.
    pub fn to_field(&self) -> Field {
        // 31 bytes never reach the 254-bit modulus.
        Field::from_bytes_le(&self.0).unwrap_or_default()
    }

    /// Decode an id from its field form.
    pub fn from_field(value: &Field) -> Result<Self, CoreError> {
        let bytes = value.to_bytes_le();
        if bytes[ID_LEN] != 0 {
            return Err(CoreError::InvalidId(format!(
                "{} does not fit in {} bytes",
                value, ID_LEN
            )));
        }
        Self::from_bytes(&bytes[..ID_LEN])
    }

    pub fn from_base58(s: &str) -> Result<Self, CoreError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| CoreError::InvalidId(format!("invalid base58 '{}': {}", s, e)))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// The id an identity of `id_type` gets when its genesis state is `state`.
    pub fn genesis_from_state(id_type: [u8; 2], state: &Hash) -> Self {
        let state_bytes = state.to_bytes_le();
        let mut genesis = [0u8; GENESIS_LEN];
        genesis.copy_from_slice(&state_bytes[state_bytes.len() - GENESIS_LEN..]);
        Self::new(id_type, genesis)
    }

    /// Whether `state` is this identity's genesis state.
    pub fn is_genesis_state(&self, state: &Hash) -> bool {
        Self::genesis_from_state(self.id_type(), state) == *self
    }
}

fn calculate_checksum(id_type: [u8; 2], genesis: &[u8; GENESIS_LEN]) -> [u8; 2] {
    let sum = id_type
        .iter()
        .chain(genesis.iter())
        .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)));
    sum.to_be_bytes()
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.to_base58())
    }
}

impl FromStr for Id {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_base58(&s).map_err(serde::de::Error::custom)
    }
}
