//! Bounded undo/redo history of activity networks.
//!
//! # Model
//!
//! One active chain holds `(network, timestamp)` versions of every network a
//! user touches, oldest first. A network's current state is its newest
//! version in that chain. `undo` moves that newest version onto a redo
//! stack; `redo` moves it back. Any `create` or `modify` clears the whole
//! redo stack.
//!
//! The active chain is capped: appending at the cap evicts the oldest
//! version first, whichever network it belongs to.
//!
//! # Complexity
//! Lookups scan the chain backwards: O(chain length), bounded by the cap.

use std::collections::VecDeque;

use jiff::Timestamp;
use log::{debug, trace};
use rand::Rng;

use super::ChainConfig;
use crate::error::{CpmError, Result};
use crate::models::{ActivityNetwork, NetworkId};

/// Where a network's newest version currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionState {
    /// Visible to retrieve, modify and undo.
    Active,
    /// Only undone versions remain; visible to redo.
    Redoable,
    /// Never created, or evicted with nothing left to redo.
    Absent,
}

/// One stored version.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainEntry {
    network: ActivityNetwork,
    timestamp: Timestamp,
}

impl ChainEntry {
    /// Network snapshot.
    pub fn network(&self) -> &ActivityNetwork {
        &self.network
    }

    /// When this version was recorded.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

/// Version chain controller for one user's networks.
///
/// # Example
///
/// ```
/// use u_cpm::history::VersionChain;
/// use u_cpm::models::Activity;
///
/// let mut chain = VersionChain::new();
/// let id = chain.create("Launch");
///
/// let mut net = chain.retrieve(id).unwrap();
/// net.insert(Activity::new(1, "Design", "", 2.0, 3.0, 4.0).unwrap()).unwrap();
/// chain.modify(net).unwrap();
/// assert_eq!(chain.retrieve(id).unwrap().node_count(), 1);
///
/// chain.undo(id).unwrap();
/// assert_eq!(chain.retrieve(id).unwrap().node_count(), 0);
///
/// chain.redo(id).unwrap();
/// assert_eq!(chain.retrieve(id).unwrap().node_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VersionChain {
    config: ChainConfig,
    active: VecDeque<ChainEntry>,
    undone: Vec<ChainEntry>,
}

impl VersionChain {
    /// Creates an empty chain with the default cap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty chain with the given configuration.
    pub fn with_config(config: ChainConfig) -> Self {
        Self {
            config,
            active: VecDeque::new(),
            undone: Vec::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Number of versions in the active chain.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether the active chain is empty.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of versions available to redo.
    pub fn redo_len(&self) -> usize {
        self.undone.len()
    }

    /// Active versions, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ChainEntry> {
        self.active.iter()
    }

    /// Creates an empty network under a fresh identity.
    pub fn create(&mut self, name: impl Into<String>) -> NetworkId {
        let id = self.fresh_id();
        self.append(ActivityNetwork::new(id, name));
        debug!("created network {id}");
        id
    }

    /// Records a new version of an existing network.
    ///
    /// # Errors
    /// [`CpmError::UnknownNetwork`] if no active version has `network.id()`.
    pub fn modify(&mut self, network: ActivityNetwork) -> Result<()> {
        let id = network.id();
        if !self.contains(id) {
            return Err(CpmError::UnknownNetwork { id });
        }
        self.append(network);
        debug!("recorded new version of network {id}");
        Ok(())
    }

    /// Copy of the newest active version, or `None` if there is none.
    pub fn retrieve(&self, id: NetworkId) -> Option<ActivityNetwork> {
        self.latest(id).map(|e| e.network.clone())
    }

    /// Timestamp of the newest active version.
    pub fn retrieve_timestamp(&self, id: NetworkId) -> Option<Timestamp> {
        self.latest(id).map(|e| e.timestamp)
    }

    /// Timestamps of every active version of `id`, oldest first.
    pub fn history(&self, id: NetworkId) -> Vec<Timestamp> {
        self.active
            .iter()
            .filter(|e| e.network.id() == id)
            .map(|e| e.timestamp)
            .collect()
    }

    /// Whether `id` has an active version.
    pub fn contains(&self, id: NetworkId) -> bool {
        self.latest(id).is_some()
    }

    /// Lifecycle state of `id`.
    pub fn state(&self, id: NetworkId) -> VersionState {
        if self.contains(id) {
            VersionState::Active
        } else if self.undone.iter().any(|e| e.network.id() == id) {
            VersionState::Redoable
        } else {
            VersionState::Absent
        }
    }

    /// Moves the newest active version of `id` to the redo stack.
    ///
    /// The oldest remaining version of a network is its seed and is never
    /// undone, so an undo always leaves the network retrievable.
    ///
    /// # Errors
    /// [`CpmError::NothingToUndo`] if `id` has fewer than two active versions.
    pub fn undo(&mut self, id: NetworkId) -> Result<()> {
        let versions = self.active.iter().filter(|e| e.network.id() == id).count();
        if versions < 2 {
            return Err(CpmError::NothingToUndo { id });
        }
        let pos = self
            .active
            .iter()
            .rposition(|e| e.network.id() == id)
            .ok_or(CpmError::NothingToUndo { id })?;
        let entry = self
            .active
            .remove(pos)
            .ok_or(CpmError::NothingToUndo { id })?;
        self.undone.push(entry);
        debug!("undid latest version of network {id}");
        Ok(())
    }

    /// Moves the most recently undone version of `id` back to the active chain.
    ///
    /// The version keeps its original timestamp and is placed by it, which
    /// makes it the newest active version of `id` again.
    ///
    /// # Errors
    /// [`CpmError::NothingToRedo`] if no undone version of `id` exists.
    pub fn redo(&mut self, id: NetworkId) -> Result<()> {
        let pos = self
            .undone
            .iter()
            .rposition(|e| e.network.id() == id)
            .ok_or(CpmError::NothingToRedo { id })?;
        let entry = self.undone.remove(pos);
        let at = self.active.partition_point(|e| e.timestamp <= entry.timestamp);
        self.active.insert(at, entry);
        debug!("redid version of network {id}");
        Ok(())
    }

    fn latest(&self, id: NetworkId) -> Option<&ChainEntry> {
        self.active.iter().rev().find(|e| e.network.id() == id)
    }

    fn append(&mut self, network: ActivityNetwork) {
        let cap = self.config.max_chain_length();
        while self.active.len() >= cap {
            if let Some(evicted) = self.active.pop_front() {
                trace!("evicted version of network {} at cap {cap}", evicted.network.id());
            }
        }

        // Keep the chain time-ordered even if the wall clock steps back.
        let now = Timestamp::now();
        let timestamp = self.active.back().map_or(now, |e| e.timestamp.max(now));
        self.active.push_back(ChainEntry { network, timestamp });

        if !self.undone.is_empty() {
            trace!("cleared {} redo versions", self.undone.len());
            self.undone.clear();
        }
    }

    fn fresh_id(&self) -> NetworkId {
        let mut rng = rand::rng();
        loop {
            let id = NetworkId(rng.random());
            let taken = self
                .active
                .iter()
                .chain(self.undone.iter())
                .any(|e| e.network.id() == id);
            if !taken {
                return id;
            }
        }
    }
}
