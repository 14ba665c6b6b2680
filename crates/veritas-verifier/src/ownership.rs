//! Binds a proof to the identity that sent it and the challenge it answers.

use veritas_core::{Did, Field, Id};

use crate::error::VerifierError;

/// The proof's user id must be the identity behind the sender's DID.
pub fn verify_sender(sender: &Did, user_id: &Id) -> Result<(), VerifierError> {
    let expected = sender.id();
    if expected != *user_id {
        return Err(VerifierError::OwnershipMismatch {
            axis: "userID",
            expected: expected.to_string(),
            actual: user_id.to_string(),
        });
    }
    Ok(())
}

pub fn verify_challenge(expected: &Field, actual: &Field) -> Result<(), VerifierError> {
    if expected != actual {
        return Err(VerifierError::OwnershipMismatch {
            axis: "challenge",
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}
