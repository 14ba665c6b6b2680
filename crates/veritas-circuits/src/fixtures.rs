//! Shared test material for the circuit modules.

use veritas_core::id::GENESIS_LEN;
use veritas_core::{
    Claim, Field, GistProof, Id, MerkleProof, MtpWithState, Operator, Signature, TreeState,
};

use crate::atomic_mtp_v2::AtomicQueryMtpV2Inputs;
use crate::atomic_sig_v2::AtomicQuerySigV2Inputs;
use crate::common::{BjjSignatureProof, ClaimWithMtp, ClaimWithSig, Query, Requester, UserAuthProof};

pub(crate) const TIMESTAMP: u64 = 1642074362;

pub(crate) fn user_id() -> Id {
    Id::new([0x01, 0x13], [0x11; GENESIS_LEN])
}

pub(crate) fn issuer_id() -> Id {
    Id::new([0x01, 0x13], [0x22; GENESIS_LEN])
}

pub(crate) fn tree(state: u64) -> TreeState {
    TreeState {
        state: Field::from(state),
        claims_root: Field::from(state + 1),
        revocation_root: Field::from(state + 2),
        root_of_roots: Field::from(state + 3),
    }
}

/// A claim of schema `KYCAgeCredential` with a birthday in slot 2.
pub(crate) fn claim() -> Claim {
    Claim::new([
        Field::from_dec_str("180410020913331409885634153623124536270").unwrap(),
        Field::zero(),
        Field::from(19960424u64),
        Field::zero(),
        Field::from(1u64),
        Field::zero(),
        Field::zero(),
        Field::zero(),
    ])
}

pub(crate) fn requester() -> Requester {
    Requester {
        request_id: Field::from(23u64),
        id: user_id(),
        profile_nonce: Field::zero(),
        claim_subject_profile_nonce: Field::zero(),
    }
}

pub(crate) fn gt_query() -> Query {
    Query {
        operator: Operator::Gt,
        values: vec![Field::from(10u64)],
        slot_index: 2,
        value_proof: None,
    }
}

pub(crate) fn mtp_v2_inputs() -> AtomicQueryMtpV2Inputs {
    AtomicQueryMtpV2Inputs {
        requester: requester(),
        claim: ClaimWithMtp {
            issuer_id: issuer_id(),
            claim: claim(),
            inc_proof: MtpWithState {
                proof: MerkleProof::inclusion(vec![Field::from(5u64)]),
                tree_state: tree(300),
            },
            non_rev_proof: Some(MtpWithState {
                proof: MerkleProof::empty(),
                tree_state: tree(300),
            }),
        },
        skip_claim_revocation_check: false,
        query: gt_query(),
        current_timestamp: TIMESTAMP,
    }
}

pub(crate) fn signature_proof() -> BjjSignatureProof {
    BjjSignatureProof {
        signature: Signature {
            r8x: Field::from(41u64),
            r8y: Field::from(42u64),
            s: Field::from(43u64),
        },
        issuer_auth_claim: Claim::empty(),
        issuer_auth_inc_proof: MtpWithState {
            proof: MerkleProof::inclusion(vec![]),
            tree_state: tree(400),
        },
        issuer_auth_non_rev_proof: MtpWithState {
            proof: MerkleProof::empty(),
            tree_state: tree(400),
        },
    }
}

pub(crate) fn sig_v2_inputs() -> AtomicQuerySigV2Inputs {
    AtomicQuerySigV2Inputs {
        requester: requester(),
        claim: ClaimWithSig {
            issuer_id: issuer_id(),
            claim: claim(),
            signature_proof: signature_proof(),
            non_rev_proof: Some(MtpWithState {
                proof: MerkleProof::empty(),
                tree_state: tree(410),
            }),
        },
        skip_claim_revocation_check: false,
        query: gt_query(),
        current_timestamp: TIMESTAMP,
    }
}

pub(crate) fn user_auth() -> UserAuthProof {
    UserAuthProof {
        auth_claim: Claim::empty(),
        inc_mtp: MerkleProof::inclusion(vec![]),
        non_rev_mtp: MerkleProof::empty(),
        tree_state: tree(500),
        gist_proof: GistProof {
            root: Field::from(900u64),
            proof: MerkleProof::inclusion(vec![Field::from(9u64)]),
        },
        signature: Signature::zero(),
    }
}

/// Wire form of a signal list.
pub(crate) fn strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: ToString,
{
    values.into_iter().map(|v| v.to_string()).collect()
}
