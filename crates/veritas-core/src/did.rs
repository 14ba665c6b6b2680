use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;
use crate::id::Id;

/// DID methods and their id type byte.
const METHODS: &[(&str, u8)] = &[("iden3", 0x01), ("polygonid", 0x02)];

/// `(blockchain, network, network byte)`.
const NETWORKS: &[(&str, &str, u8)] = &[
    ("polygon", "main", 0x11),
    ("polygon", "mumbai", 0x12),
    ("polygon", "amoy", 0x13),
    ("eth", "main", 0x21),
    ("eth", "sepolia", 0x23),
    ("privado", "main", 0xa1),
    ("privado", "test", 0xa2),
];

/// Decentralized identifier bound to an identity id.
/// Format: `did:<method>:<blockchain>:<network>:<base58 id>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Did {
    method: String,
    blockchain: String,
    network: String,
    id: Id,
}

impl Did {
    /// Parse a DID string, checking that the id's type bytes agree with the
    /// method and network named in the DID.
    pub fn parse(uri: &str) -> Result<Self, CoreError> {
        let parts: Vec<&str> = uri.split(':').collect();
        if parts.len() != 5 || parts[0] != "did" {
            return Err(CoreError::InvalidDid(format!(
                "DID must have format 'did:<method>:<blockchain>:<network>:<id>', got: {}",
                uri
            )));
        }
        let (method, blockchain, network) = (parts[1], parts[2], parts[3]);
        let method_byte = method_byte(method)
            .ok_or_else(|| CoreError::InvalidDid(format!("unknown DID method '{}'", method)))?;
        let network_byte = network_byte(blockchain, network)
            .ok_or_else(|| CoreError::UnsupportedNetwork(format!("{}:{}", blockchain, network)))?;
        let id = Id::from_base58(parts[4])?;
        if id.id_type() != [method_byte, network_byte] {
            return Err(CoreError::InvalidDid(format!(
                "id type {} does not match {}:{}:{}",
                hex::encode(id.id_type()),
                method,
                blockchain,
                network
            )));
        }
        Ok(Self {
            method: method.to_string(),
            blockchain: blockchain.to_string(),
            network: network.to_string(),
            id,
        })
    }

    /// Build the DID that names `id`, from the id's type bytes.
    pub fn from_id(id: Id) -> Result<Self, CoreError> {
        let [method_b, network_b] = id.id_type();
        let method = METHODS
            .iter()
            .find(|(_, b)| *b == method_b)
            .map(|(m, _)| *m)
            .ok_or_else(|| {
                CoreError::InvalidDid(format!("unknown DID method byte 0x{:02x}", method_b))
            })?;
        let (blockchain, network) = network_of(network_b)?;
        Ok(Self {
            method: method.to_string(),
            blockchain: blockchain.to_string(),
            network: network.to_string(),
            id,
        })
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// `<blockchain>:<network>`, the key state resolvers are registered under.
    pub fn network_key(&self) -> String {
        format!("{}:{}", self.blockchain, self.network)
    }
}

/// Resolver key (`<blockchain>:<network>`) for an id, from its type bytes.
pub fn network_key_for_id(id: &Id) -> Result<String, CoreError> {
    let (blockchain, network) = network_of(id.id_type()[1])?;
    Ok(format!("{}:{}", blockchain, network))
}

/// Id type bytes for a method and network.
pub fn id_type_for(method: &str, blockchain: &str, network: &str) -> Result<[u8; 2], CoreError> {
    let m = method_byte(method)
        .ok_or_else(|| CoreError::InvalidDid(format!("unknown DID method '{}'", method)))?;
    let n = network_byte(blockchain, network)
        .ok_or_else(|| CoreError::UnsupportedNetwork(format!("{}:{}", blockchain, network)))?;
    Ok([m, n])
}

fn method_byte(method: &str) -> Option<u8> {
    METHODS.iter().find(|(m, _)| *m == method).map(|(_, b)| *b)
}

fn network_byte(blockchain: &str, network: &str) -> Option<u8> {
    NETWORKS
        .iter()
        .find(|(c, n, _)| *c == blockchain && *n == network)
        .map(|(_, _, b)| *b)
}

fn network_of(byte: u8) -> Result<(&'static str, &'static str), CoreError> {
    NETWORKS
        .iter()
        .find(|(_, _, b)| *b == byte)
        .map(|(c, n, _)| (*c, *n))
        .ok_or_else(|| CoreError::UnsupportedNetwork(format!("network byte 0x{:02x}", byte)))
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "did:{}:{}:{}:{}",
            self.method, self.blockchain, self.network, self.id
        )
    }
}

impl FromStr for Did {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Did {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Did {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::GENESIS_LEN;

    fn amoy_id() -> Id {
        let id_type = id_type_for("iden3", "polygon", "amoy").unwrap();
        Id::new(id_type, [7u8; GENESIS_LEN])
    }

    #[test]
    fn test_did_roundtrip() {
        let id = amoy_id();
        let did = Did::from_id(id).unwrap();
        let s = did.to_string();
        assert!(s.starts_with("did:iden3:polygon:amoy:"));
        let parsed = Did::parse(&s).unwrap();
        assert_eq!(parsed.id(), id);
        assert_eq!(parsed.method(), "iden3");
        assert_eq!(parsed.network_key(), "polygon:amoy");
    }

    #[test]
    fn test_did_type_mismatch() {
        let id = amoy_id();
        let s = format!("did:iden3:eth:main:{}", id);
        assert!(matches!(Did::parse(&s), Err(CoreError::InvalidDid(_))));
    }

    #[test]
    fn test_did_unknown_network() {
        let id = amoy_id();
        let s = format!("did:iden3:solana:main:{}", id);
        assert!(matches!(
            Did::parse(&s),
            Err(CoreError::UnsupportedNetwork(_))
        ));
    }

    #[test]
    fn test_did_malformed() {
        assert!(Did::parse("did:iden3:polygon").is_err());
        assert!(Did::parse("urn:iden3:polygon:amoy:abc").is_err());
        assert!(Did::parse("did:iden3:polygon:amoy:not-base58!").is_err());
    }

    #[test]
    fn test_network_key_for_id() {
        assert_eq!(network_key_for_id(&amoy_id()).unwrap(), "polygon:amoy");
        let unknown = Id::new([0x01, 0x77], [1u8; GENESIS_LEN]);
        assert!(network_key_for_id(&unknown).is_err());
    }

    #[test]
    fn test_id_type_for_polygonid_main() {
        assert_eq!(
            id_type_for("polygonid", "polygon", "main").unwrap(),
            [0x02, 0x11]
        );
    }
}
