//! State freshness: is a state a proof was generated against still
//! acceptable?

use chrono::{DateTime, Duration, Utc};
use veritas_core::{Hash, Id};

use crate::error::VerifierError;
use crate::resolver::{ResolvedState, Resolvers};

/// Accept a superseded state only within `delay` of its replacement.
pub fn check_transition(
    kind: &'static str,
    resolved: &ResolvedState,
    delay: Duration,
    now: DateTime<Utc>,
) -> Result<(), VerifierError> {
    if resolved.latest {
        return Ok(());
    }
    let replaced_at = resolved
        .transition_timestamp
        .and_then(|ts| i64::try_from(ts).ok())
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .ok_or_else(|| {
            VerifierError::UnknownState(format!("{} state {} has no replacement time", kind, resolved.state))
        })?;

    let age = now - replaced_at;
    if age > delay {
        return Err(VerifierError::StaleState {
            kind,
            age_ms: age.num_milliseconds(),
            max_ms: delay.num_milliseconds(),
        });
    }
    tracing::warn!(
        kind,
        state = %resolved.state,
        age_ms = age.num_milliseconds(),
        "accepting superseded state within the transition window"
    );
    Ok(())
}

/// Checks states named by a proof against the resolver of each identity's
/// network.
pub struct StateChecker<'a> {
    resolvers: &'a Resolvers,
    delay: Duration,
    now: DateTime<Utc>,
}

impl<'a> StateChecker<'a> {
    pub fn new(resolvers: &'a Resolvers, delay: Duration, now: DateTime<Utc>) -> Self {
        Self {
            resolvers,
            delay,
            now,
        }
    }

    /// The issuer's identity state only has to be known. The transition
    /// window is not applied: credentials issued under an older issuer state
    /// stay valid however long ago it was superseded.
    pub async fn issuer_state(&self, issuer: &Id, state: &Hash) -> Result<ResolvedState, VerifierError> {
        let resolved = self.resolvers.for_id(issuer)?.resolve(issuer, state).await?;
        tracing::debug!(issuer = %issuer, state = %state, latest = resolved.latest, "issuer state resolved");
        Ok(resolved)
    }

    /// The state the non-revocation proof was built against.
    pub async fn issuer_non_rev_state(&self, issuer: &Id, state: &Hash) -> Result<(), VerifierError> {
        let resolved = self.resolvers.for_id(issuer)?.resolve(issuer, state).await?;
        check_transition("issuer non-revocation", &resolved, self.delay, self.now)
    }

    /// A user state proven directly (`auth` v1).
    pub async fn user_state(&self, user: &Id, state: &Hash) -> Result<(), VerifierError> {
        let resolved = self.resolvers.for_id(user)?.resolve(user, state).await?;
        check_transition("user", &resolved, self.delay, self.now)
    }

    /// The global root, resolved on the network of the proving identity.
    pub async fn gist_root(&self, user: &Id, root: &Hash) -> Result<(), VerifierError> {
        let resolved = self.resolvers.for_id(user)?.root_resolve(root).await?;
        check_transition("global", &resolved, self.delay, self.now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{ContractStateResolver, MemoryStateContract};
    use std::sync::Arc;
    use veritas_core::id::GENESIS_LEN;
    use veritas_core::Field;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_latest_always_accepted() {
        let resolved = ResolvedState::latest(Field::from(5u64));
        assert!(check_transition("user", &resolved, Duration::zero(), now()).is_ok());
    }

    #[test]
    fn test_stale_state_window() {
        let replaced = (now() - Duration::minutes(10)).timestamp() as u64;
        let resolved = ResolvedState::replaced(Field::from(5u64), replaced);

        assert!(matches!(
            check_transition("user", &resolved, Duration::minutes(5), now()),
            Err(VerifierError::StaleState { kind: "user", .. })
        ));
        assert!(check_transition("user", &resolved, Duration::minutes(15), now()).is_ok());
    }

    #[test]
    fn test_replaced_without_time_is_unknown() {
        let resolved = ResolvedState {
            state: Field::from(5u64),
            latest: false,
            genesis: false,
            transition_timestamp: None,
        };
        assert!(matches!(
            check_transition("user", &resolved, Duration::hours(1), now()),
            Err(VerifierError::UnknownState(_))
        ));
    }

    #[tokio::test]
    async fn test_superseded_issuer_state_outlives_window() {
        let issuer = Id::new([0x01, 0x13], [0x22; GENESIS_LEN]);
        let contract = Arc::new(MemoryStateContract::new());
        let hours_ago = |h: i64| (now() - Duration::hours(h)).timestamp() as u64;
        contract.publish_state(issuer, Field::from(300u64), hours_ago(48));
        contract.publish_state(issuer, Field::from(310u64), hours_ago(24));
        let resolvers =
            Resolvers::new().with("polygon:amoy", Arc::new(ContractStateResolver::new(contract)));
        let checker = StateChecker::new(&resolvers, Duration::minutes(5), now());

        let resolved = checker.issuer_state(&issuer, &Field::from(300u64)).await.unwrap();
        assert!(!resolved.latest);

        // The same state fails the window when used for non-revocation.
        assert!(matches!(
            checker.issuer_non_rev_state(&issuer, &Field::from(300u64)).await,
            Err(VerifierError::StaleState { .. })
        ));
    }
}
