use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// BN254 scalar field modulus, big-endian.
const MODULUS_BE: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29, 0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91, 0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00, 0x00, 0x01,
];

/// The scalar field modulus every circuit value must stay below.
pub fn modulus() -> &'static BigUint {
    static MODULUS: OnceLock<BigUint> = OnceLock::new();
    MODULUS.get_or_init(|| BigUint::from_bytes_be(&MODULUS_BE))
}

/// An element of the proof system's scalar field.
///
/// On the wire a field element is always a base-10 string, which is what both
/// the prover's input object and its public output use.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Field(BigUint);

/// Merkle node hashes, roots and identity states are field elements.
pub type Hash = Field;

impl Field {
    /// The zero element (also the zero hash).
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn one() -> Self {
        Self(BigUint::one())
    }

    /// Wrap an integer, rejecting values outside the field.
    pub fn new(value: BigUint) -> Result<Self, CoreError> {
        if &value >= modulus() {
            return Err(CoreError::InvalidField(format!(
                "{} is not below the field modulus",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Parse a base-10 string. Signs, separators and blanks are rejected.
    pub fn from_dec_str(s: &str) -> Result<Self, CoreError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidField(format!(
                "'{}' is not a decimal integer",
                s
            )));
        }
        let value = BigUint::parse_bytes(s.as_bytes(), 10)
            .ok_or_else(|| CoreError::InvalidField(format!("'{}' is not a decimal integer", s)))?;
        Self::new(value)
    }

    /// Interpret little-endian bytes as an integer.
    pub fn from_bytes_le(bytes: &[u8]) -> Result<Self, CoreError> {
        Self::new(BigUint::from_bytes_le(bytes))
    }

    /// Little-endian encoding, zero-padded to 32 bytes.
    pub fn to_bytes_le(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        let bytes = self.0.to_bytes_le();
        // Values are below the modulus, so they always fit in 32 bytes.
        let n = bytes.len().min(32);
        out[..n].copy_from_slice(&bytes[..n]);
        out
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.0.to_u64()
    }
}

impl From<u64> for Field {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<bool> for Field {
    fn from(value: bool) -> Self {
        Self::from(u64::from(value))
    }
}

impl FromStr for Field {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dec_str(s)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({})", self.0)
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldVisitor;

        impl Visitor<'_> for FieldVisitor {
            type Value = Field;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal string or unsigned integer field element")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Field, E> {
                Field::from_dec_str(v).map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Field, E> {
                Ok(Field::from(v))
            }
        }

        deserializer.deserialize_any(FieldVisitor)
    }
}

/// Decimal string form of a flag as the circuits expect it.
pub fn flag(value: bool) -> String {
    let s = if value { "1" } else { "0" };
    s.to_string()
}
