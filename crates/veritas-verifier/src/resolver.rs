//! Identity-state resolution against the state contract of each network.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use veritas_core::did::network_key_for_id;
use veritas_core::{Hash, Id};

use crate::error::VerifierError;

/// How a state or root relates to the current on-chain record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedState {
    pub state: Hash,
    /// The state is the current one (or an unpublished genesis state).
    pub latest: bool,
    pub genesis: bool,
    /// Unix seconds at which a superseded state was replaced.
    pub transition_timestamp: Option<u64>,
}

impl ResolvedState {
    pub fn latest(state: Hash) -> Self {
        Self {
            state,
            latest: true,
            genesis: false,
            transition_timestamp: None,
        }
    }

    pub fn genesis(state: Hash) -> Self {
        Self {
            genesis: true,
            ..Self::latest(state)
        }
    }

    pub fn replaced(state: Hash, at: u64) -> Self {
        Self {
            state,
            latest: false,
            genesis: false,
            transition_timestamp: Some(at),
        }
    }
}

/// Trait for classifying identity states and global roots.
#[async_trait]
pub trait StateResolver: Send + Sync {
    /// Resolve `state` of identity `id`.
    async fn resolve(&self, id: &Id, state: &Hash) -> Result<ResolvedState, VerifierError>;

    /// Resolve a global identity-tree root.
    async fn root_resolve(&self, root: &Hash) -> Result<ResolvedState, VerifierError>;
}

/// A state record as the state contract stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateInfo {
    pub id: Id,
    pub state: Hash,
    /// Zero while the state is current.
    pub replaced_by_state: Hash,
    pub created_at_timestamp: u64,
    pub replaced_at_timestamp: u64,
}

/// A global root record as the state contract stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootInfo {
    pub root: Hash,
    /// Zero while the root is current.
    pub replaced_by_root: Hash,
    pub created_at_timestamp: u64,
    pub replaced_at_timestamp: u64,
}

/// Read access to a state contract. Transport is the implementor's concern.
#[async_trait]
pub trait StateContract: Send + Sync {
    /// Latest state record of `id`, if it ever published one.
    async fn state_info_by_id(&self, id: &Id) -> Result<Option<StateInfo>, VerifierError>;

    async fn state_info_by_id_and_state(
        &self,
        id: &Id,
        state: &Hash,
    ) -> Result<Option<StateInfo>, VerifierError>;

    async fn gist_root_info(&self, root: &Hash) -> Result<Option<RootInfo>, VerifierError>;
}

/// [`StateResolver`] over a [`StateContract`].
pub struct ContractStateResolver<C> {
    contract: C,
}

impl<C: StateContract> ContractStateResolver<C> {
    pub fn new(contract: C) -> Self {
        Self { contract }
    }
}

#[async_trait]
impl<C: StateContract> StateResolver for ContractStateResolver<C> {
    async fn resolve(&self, id: &Id, state: &Hash) -> Result<ResolvedState, VerifierError> {
        let Some(latest) = self.contract.state_info_by_id(id).await? else {
            if id.is_genesis_state(state) {
                return Ok(ResolvedState::genesis(state.clone()));
            }
            return Err(VerifierError::UnknownState(format!(
                "{} has no published state and {} is not its genesis state",
                id, state
            )));
        };

        if latest.state == *state {
            return Ok(ResolvedState::latest(state.clone()));
        }

        match self.contract.state_info_by_id_and_state(id, state).await? {
            Some(info) if info.id != *id => Err(VerifierError::UnknownState(format!(
                "state {} belongs to another identity",
                state
            ))),
            Some(info) if info.replaced_at_timestamp != 0 => Ok(ResolvedState::replaced(
                state.clone(),
                info.replaced_at_timestamp,
            )),
            _ => Err(VerifierError::UnknownState(format!(
                "state {} of {} is not on chain",
                state, id
            ))),
        }
    }

    async fn root_resolve(&self, root: &Hash) -> Result<ResolvedState, VerifierError> {
        let info = self
            .contract
            .gist_root_info(root)
            .await?
            .ok_or_else(|| VerifierError::UnknownState(format!("global root {} not found", root)))?;

        if info.replaced_by_root.is_zero() {
            return Ok(ResolvedState::latest(root.clone()));
        }
        if info.replaced_at_timestamp == 0 {
            return Err(VerifierError::UnknownState(format!(
                "global root {} replaced without a timestamp",
                root
            )));
        }
        Ok(ResolvedState::replaced(root.clone(), info.replaced_at_timestamp))
    }
}

/// State contract held in memory, for tests and offline tooling.
#[derive(Default)]
pub struct MemoryStateContract {
    latest: DashMap<Id, StateInfo>,
    history: DashMap<Hash, StateInfo>,
    roots: DashMap<Hash, RootInfo>,
}

impl MemoryStateContract {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a new state for `id` at `timestamp`, superseding the previous one.
    pub fn publish_state(&self, id: Id, state: Hash, timestamp: u64) {
        if let Some(mut previous) = self.latest.get(&id).map(|entry| entry.value().clone()) {
            previous.replaced_by_state = state.clone();
            previous.replaced_at_timestamp = timestamp;
            self.history.insert(previous.state.clone(), previous);
        }
        let info = StateInfo {
            id,
            state: state.clone(),
            replaced_by_state: Hash::zero(),
            created_at_timestamp: timestamp,
            replaced_at_timestamp: 0,
        };
        self.history.insert(state, info.clone());
        self.latest.insert(id, info);
    }

    /// Publish a new global root at `timestamp`, superseding `previous`.
    pub fn publish_root(&self, root: Hash, previous: Option<&Hash>, timestamp: u64) {
        if let Some(prev) = previous {
            if let Some(mut info) = self.roots.get_mut(prev) {
                info.replaced_by_root = root.clone();
                info.replaced_at_timestamp = timestamp;
            }
        }
        self.roots.insert(
            root.clone(),
            RootInfo {
                root,
                replaced_by_root: Hash::zero(),
                created_at_timestamp: timestamp,
                replaced_at_timestamp: 0,
            },
        );
    }
}

#[async_trait]
impl StateContract for MemoryStateContract {
    async fn state_info_by_id(&self, id: &Id) -> Result<Option<StateInfo>, VerifierError> {
        Ok(self.latest.get(id).map(|entry| entry.value().clone()))
    }

    async fn state_info_by_id_and_state(
        &self,
        _id: &Id,
        state: &Hash,
    ) -> Result<Option<StateInfo>, VerifierError> {
        Ok(self.history.get(state).map(|entry| entry.value().clone()))
    }

    async fn gist_root_info(&self, root: &Hash) -> Result<Option<RootInfo>, VerifierError> {
        Ok(self.roots.get(root).map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl<T: StateContract + ?Sized> StateContract for Arc<T> {
    async fn state_info_by_id(&self, id: &Id) -> Result<Option<StateInfo>, VerifierError> {
        (**self).state_info_by_id(id).await
    }

    async fn state_info_by_id_and_state(
        &self,
        id: &Id,
        state: &Hash,
    ) -> Result<Option<StateInfo>, VerifierError> {
        (**self).state_info_by_id_and_state(id, state).await
    }

    async fn gist_root_info(&self, root: &Hash) -> Result<Option<RootInfo>, VerifierError> {
        (**self).gist_root_info(root).await
    }
}

/// State resolvers keyed by `blockchain:network`.
#[derive(Clone, Default)]
pub struct Resolvers {
    by_network: HashMap<String, Arc<dyn StateResolver>>,
}

impl Resolvers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, network: impl Into<String>, resolver: Arc<dyn StateResolver>) {
        self.by_network.insert(network.into(), resolver);
    }

    pub fn with(mut self, network: impl Into<String>, resolver: Arc<dyn StateResolver>) -> Self {
        self.insert(network, resolver);
        self
    }

    pub fn len(&self) -> usize {
        self.by_network.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_network.is_empty()
    }

    /// Resolver for the network encoded in `id`'s type bytes.
    pub fn for_id(&self, id: &Id) -> Result<&dyn StateResolver, VerifierError> {
        let network = network_key_for_id(id)?;
        self.by_network
            .get(&network)
            .map(|r| r.as_ref())
            .ok_or(VerifierError::UnsupportedNetwork(network))
    }
}
