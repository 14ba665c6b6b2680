use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::field::Field;

/// Number of field-element slots in a claim.
pub const CLAIM_SLOTS: usize = 8;

/// A fixed-size credential record: four index slots followed by four value
/// slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claim([Field; CLAIM_SLOTS]);

impl Claim {
    pub fn new(slots: [Field; CLAIM_SLOTS]) -> Self {
        Self(slots)
    }

    /// The all-zero claim circuits take for an unused branch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a claim from its wire form.
    pub fn from_strings<S: AsRef<str>>(slots: &[S]) -> Result<Self, CoreError> {
        if slots.len() != CLAIM_SLOTS {
            return Err(CoreError::InvalidLength {
                expected: CLAIM_SLOTS,
                actual: slots.len(),
            });
        }
        let mut out: [Field; CLAIM_SLOTS] = Default::default();
        for (dst, src) in out.iter_mut().zip(slots) {
            *dst = Field::from_dec_str(src.as_ref())?;
        }
        Ok(Self(out))
    }

    pub fn slots(&self) -> &[Field; CLAIM_SLOTS] {
        &self.0
    }

    /// Slot `index` (0..8), as the circuits address them via `slotIndex`.
    pub fn slot(&self, index: usize) -> Option<&Field> {
        self.0.get(index)
    }

    /// Schema hash: the low 16 bytes of slot 0.
    pub fn schema_hash(&self) -> Field {
        let bytes = self.0[0].to_bytes_le();
        Field::from_bytes_le(&bytes[..16]).unwrap_or_default()
    }

    /// Revocation nonce: the low 8 bytes of slot 4.
    pub fn revocation_nonce(&self) -> u64 {
        let bytes = self.0[4].to_bytes_le();
        let mut nonce = [0u8; 8];
        nonce.copy_from_slice(&bytes[..8]);
        u64::from_le_bytes(nonce)
    }

    /// Wire form: eight decimal strings.
    pub fn marshal(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

/// A BabyJubJub signature, carried through to the circuit unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub r8x: Field,
    pub r8y: Field,
    pub s: Field,
}

impl Signature {
    pub fn zero() -> Self {
        Self::default()
    }
}
