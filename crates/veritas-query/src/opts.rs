use chrono::{DateTime, Duration, Utc};
use veritas_core::Id;

/// Default window for a proof's generation time.
pub const DEFAULT_PROOF_GENERATION_DELAY_MS: i64 = 86_400_000;
/// Default window for a superseded state on credential-query proofs.
pub const DEFAULT_STATE_TRANSITION_DELAY_MS: i64 = 3_600_000;
/// Default window for a superseded state on authentication proofs.
pub const DEFAULT_AUTH_STATE_TRANSITION_DELAY_MS: i64 = 300_000;

/// Verification tolerances.
#[derive(Debug, Clone)]
pub struct VerifyOpts {
    pub accepted_state_transition_delay: Duration,
    pub accepted_proof_generation_delay: Duration,
    /// The verifier's own identity, required when a nullifier session is
    /// requested.
    pub verifier_id: Option<Id>,
    /// Fixed clock; `None` uses the system time.
    pub now: Option<DateTime<Utc>>,
}

impl Default for VerifyOpts {
    fn default() -> Self {
        Self {
            accepted_state_transition_delay: Duration::milliseconds(DEFAULT_STATE_TRANSITION_DELAY_MS),
            accepted_proof_generation_delay: Duration::milliseconds(DEFAULT_PROOF_GENERATION_DELAY_MS),
            verifier_id: None,
            now: None,
        }
    }
}

impl VerifyOpts {
    /// Defaults for authentication proofs.
    pub fn auth() -> Self {
        Self {
            accepted_state_transition_delay: Duration::milliseconds(
                DEFAULT_AUTH_STATE_TRANSITION_DELAY_MS,
            ),
            ..Self::default()
        }
    }

    pub fn with_state_transition_delay(mut self, delay: Duration) -> Self {
        self.accepted_state_transition_delay = delay;
        self
    }

    pub fn with_proof_generation_delay(mut self, delay: Duration) -> Self {
        self.accepted_proof_generation_delay = delay;
        self
    }

    pub fn with_verifier_id(mut self, id: Id) -> Self {
        self.verifier_id = Some(id);
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn current_time(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}
