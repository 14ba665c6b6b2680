use num_bigint::BigUint;

use crate::error::CoreError;
use crate::field::{modulus, Field};

/// Largest frame a sponge hash may absorb per permutation.
pub const MAX_FRAME_SIZE: usize = 16;
/// Most inputs a sponge hash accepts.
pub const MAX_SPONGE_INPUTS: usize = 256;

/// The circuit-friendly hash function used to commit to query parameters.
///
/// Implementations wrap a concrete permutation; this crate only needs the
/// fixed-arity hash and derives the sponge construction from it.
pub trait FieldHasher: Send + Sync {
    /// Hash a fixed number of field elements.
    fn hash(&self, inputs: &[Field]) -> Result<Field, CoreError>;

    /// Hash an arbitrary-length sequence by absorbing it in frames of
    /// `frame_size`. Each full frame is hashed and the digest seeds the next
    /// frame; a partially filled final frame is zero-padded and hashed.
    fn sponge_hash(&self, inputs: &[Field], frame_size: usize) -> Result<Field, CoreError> {
        if !(2..=MAX_FRAME_SIZE).contains(&frame_size) {
            return Err(CoreError::Hash(format!(
                "frame size {} outside 2..={}",
                frame_size, MAX_FRAME_SIZE
            )));
        }
        if inputs.is_empty() || inputs.len() > MAX_SPONGE_INPUTS {
            return Err(CoreError::Hash(format!(
                "sponge takes 1..={} inputs, got {}",
                MAX_SPONGE_INPUTS,
                inputs.len()
            )));
        }

        let mut frame = vec![Field::zero(); frame_size];
        let mut digest = Field::zero();
        let mut dirty = false;
        let mut k = 0;
        for input in inputs {
            dirty = true;
            frame[k] = input.clone();
            if k == frame_size - 1 {
                digest = self.hash(&frame)?;
                dirty = false;
                frame = vec![Field::zero(); frame_size];
                frame[0] = digest.clone();
                k = 1;
            } else {
                k += 1;
            }
        }
        if dirty {
            digest = self.hash(&frame)?;
        }
        Ok(digest)
    }
}

/// BLAKE3 over the little-endian encodings, reduced into the field.
///
/// Deterministic and cheap, but not the hash the circuits compute: use it for
/// fixtures and offline tooling, never to check a real proof.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl FieldHasher for Blake3Hasher {
    fn hash(&self, inputs: &[Field]) -> Result<Field, CoreError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(inputs.len() as u64).to_le_bytes());
        for input in inputs {
            hasher.update(&input.to_bytes_le());
        }
        let digest = hasher.finalize();
        let reduced = BigUint::from_bytes_le(digest.as_bytes()) % modulus();
        Field::new(reduced)
    }
}
