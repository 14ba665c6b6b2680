//! Verifier configuration loading and management.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use veritas_core::{CircuitId, CircuitParams};
use veritas_query::opts::{
    DEFAULT_AUTH_STATE_TRANSITION_DELAY_MS, DEFAULT_PROOF_GENERATION_DELAY_MS,
    DEFAULT_STATE_TRANSITION_DELAY_MS,
};
use veritas_query::VerifyOpts;

/// Full configuration for a Veritas verifier.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerifierConfig {
    /// Acceptance windows.
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Per-circuit parameter overrides, keyed by circuit id.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub circuits: BTreeMap<CircuitId, CircuitParams>,

    /// State contracts, one per network.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resolvers: Vec<ResolverConfig>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Maximum age of a credential proof.
    #[serde(default = "default_proof_generation_delay")]
    pub proof_generation_delay_ms: i64,
    /// How long a superseded issuer or global state stays acceptable.
    #[serde(default = "default_state_transition_delay")]
    pub state_transition_delay_ms: i64,
    /// The same window for authentication proofs.
    #[serde(default = "default_auth_state_transition_delay")]
    pub auth_state_transition_delay_ms: i64,
}

/// Where the state contract of one network lives. Transport belongs to the
/// caller that turns this into a `StateContract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// `blockchain:network`, e.g. `polygon:amoy`.
    pub network: String,
    pub rpc_url: String,
    pub contract_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_proof_generation_delay() -> i64 {
    DEFAULT_PROOF_GENERATION_DELAY_MS
}
fn default_state_transition_delay() -> i64 {
    DEFAULT_STATE_TRANSITION_DELAY_MS
}
fn default_auth_state_transition_delay() -> i64 {
    DEFAULT_AUTH_STATE_TRANSITION_DELAY_MS
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            proof_generation_delay_ms: default_proof_generation_delay(),
            state_transition_delay_ms: default_state_transition_delay(),
            auth_state_transition_delay_ms: default_auth_state_transition_delay(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl VerifierConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: VerifierConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Options for credential proofs.
    pub fn verify_opts(&self) -> VerifyOpts {
        VerifyOpts::default()
            .with_proof_generation_delay(Duration::milliseconds(
                self.verification.proof_generation_delay_ms,
            ))
            .with_state_transition_delay(Duration::milliseconds(
                self.verification.state_transition_delay_ms,
            ))
    }

    /// Options for authentication proofs.
    pub fn auth_verify_opts(&self) -> VerifyOpts {
        VerifyOpts::default().with_state_transition_delay(Duration::milliseconds(
            self.verification.auth_state_transition_delay_ms,
        ))
    }

    /// Effective parameters of `circuit`.
    pub fn circuit_params(&self, circuit: CircuitId) -> CircuitParams {
        match self.circuits.get(&circuit) {
            Some(overrides) => circuit.default_params().merged(overrides),
            None => circuit.default_params(),
        }
    }

    /// Resolver entries with every field filled in.
    pub fn usable_resolvers(&self) -> impl Iterator<Item = &ResolverConfig> {
        self.resolvers.iter().filter(|r| {
            let usable = !r.network.is_empty() && !r.rpc_url.is_empty() && !r.contract_address.is_empty();
            if !usable {
                tracing::warn!(network = %r.network, "skipping incomplete resolver entry");
            }
            usable
        })
    }
}
