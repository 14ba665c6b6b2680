use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::CircuitParams;
use crate::error::CoreError;
use crate::operator::Operator;

/// Operators of the single-query V2 circuits.
const V2_OPERATORS: &[Operator] = &[
    Operator::Noop,
    Operator::Eq,
    Operator::Lt,
    Operator::Gt,
    Operator::In,
    Operator::Nin,
    Operator::Ne,
    Operator::Sd,
];

/// Operators of the on-chain V2 circuits.
const V2_ON_CHAIN_OPERATORS: &[Operator] = &[
    Operator::Eq,
    Operator::Lt,
    Operator::Gt,
    Operator::In,
    Operator::Nin,
    Operator::Ne,
];

/// Identifies a circuit build the prover runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CircuitId {
    Auth,
    AuthV2,
    AuthV3,
    AuthV3_8_32,
    StateTransition,
    AtomicQueryMtpV2,
    AtomicQuerySigV2,
    AtomicQueryMtpV2OnChain,
    AtomicQuerySigV2OnChain,
    AtomicQueryV3,
    AtomicQueryV3OnChain,
    LinkedMultiQuery10,
}

impl CircuitId {
    pub const ALL: [CircuitId; 12] = [
        Self::Auth,
        Self::AuthV2,
        Self::AuthV3,
        Self::AuthV3_8_32,
        Self::StateTransition,
        Self::AtomicQueryMtpV2,
        Self::AtomicQuerySigV2,
        Self::AtomicQueryMtpV2OnChain,
        Self::AtomicQuerySigV2OnChain,
        Self::AtomicQueryV3,
        Self::AtomicQueryV3OnChain,
        Self::LinkedMultiQuery10,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::AuthV2 => "authV2",
            Self::AuthV3 => "authV3",
            Self::AuthV3_8_32 => "authV3-8-32",
            Self::StateTransition => "stateTransition",
            Self::AtomicQueryMtpV2 => "credentialAtomicQueryMTPV2",
            Self::AtomicQuerySigV2 => "credentialAtomicQuerySigV2",
            Self::AtomicQueryMtpV2OnChain => "credentialAtomicQueryMTPV2OnChain",
            Self::AtomicQuerySigV2OnChain => "credentialAtomicQuerySigV2OnChain",
            Self::AtomicQueryV3 => "credentialAtomicQueryV3",
            Self::AtomicQueryV3OnChain => "credentialAtomicQueryV3OnChain",
            Self::LinkedMultiQuery10 => "linkedMultiQuery10",
        }
    }

    /// Look up a circuit id. A version suffix after `-` is ignored unless the
    /// full string names a parameter preset such as `authV3-8-32`.
    pub fn parse(id: &str) -> Result<Self, CoreError> {
        if let Some(exact) = Self::ALL.iter().find(|c| c.as_str() == id) {
            return Ok(*exact);
        }
        let base = id.split('-').next().unwrap_or(id);
        Self::ALL
            .iter()
            .find(|c| c.as_str() == base)
            .copied()
            .ok_or_else(|| CoreError::UnknownCircuit(id.to_string()))
    }

    /// Identity-ownership circuits.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::Auth | Self::AuthV2 | Self::AuthV3 | Self::AuthV3_8_32
        )
    }

    /// Most predicates one proof of this circuit can carry.
    pub fn max_queries(&self) -> usize {
        match self {
            Self::Auth | Self::AuthV2 | Self::AuthV3 | Self::AuthV3_8_32 | Self::StateTransition => 0,
            Self::LinkedMultiQuery10 => 10,
            _ => 1,
        }
    }

    pub fn supported_operators(&self) -> &'static [Operator] {
        match self {
            Self::AtomicQueryMtpV2 | Self::AtomicQuerySigV2 => V2_OPERATORS,
            Self::AtomicQueryMtpV2OnChain | Self::AtomicQuerySigV2OnChain => V2_ON_CHAIN_OPERATORS,
            Self::AtomicQueryV3 | Self::AtomicQueryV3OnChain | Self::LinkedMultiQuery10 => {
                &Operator::ALL
            }
            _ => &[],
        }
    }

    pub fn supports_operator(&self, op: Operator) -> bool {
        self.supported_operators().contains(&op)
    }

    /// Reject a request this circuit cannot express: too many predicates or
    /// an operator outside its table.
    pub fn validate_request(&self, operators: &[Operator]) -> Result<(), CoreError> {
        if operators.len() > self.max_queries() {
            return Err(CoreError::QueryLimit {
                circuit: self.to_string(),
                max: self.max_queries(),
                actual: operators.len(),
            });
        }
        if let Some(op) = operators.iter().find(|op| !self.supports_operator(**op)) {
            return Err(CoreError::UnsupportedOperator(format!(
                "{} is not supported by {}",
                op, self
            )));
        }
        Ok(())
    }

    /// Parameters this circuit was built with when not configured otherwise.
    pub fn default_params(&self) -> CircuitParams {
        match self {
            Self::AuthV3_8_32 => CircuitParams::new()
                .with_mt_level(8)
                .with_mt_level_on_chain(32),
            _ => CircuitParams::new(),
        }
    }
}

impl fmt::Display for CircuitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CircuitId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CircuitId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CircuitId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// How an issuer vouches for a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProofType {
    /// Issuer's BabyJubJub signature over the claim.
    #[serde(rename = "BJJSignature2021")]
    Signature,
    /// Inclusion of the claim in the issuer's claims tree.
    #[serde(rename = "Iden3SparseMerkleTreeProof")]
    Inclusion,
}

impl ProofType {
    pub fn code(self) -> u64 {
        match self {
            Self::Signature => 1,
            Self::Inclusion => 2,
        }
    }

    pub fn from_code(code: u64) -> Result<Self, CoreError> {
        match code {
            1 => Ok(Self::Signature),
            2 => Ok(Self::Inclusion),
            other => Err(CoreError::InvalidProofType(other)),
        }
    }
}

impl fmt::Display for ProofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signature => f.write_str("BJJSignature2021"),
            Self::Inclusion => f.write_str("Iden3SparseMerkleTreeProof"),
        }
    }
}
