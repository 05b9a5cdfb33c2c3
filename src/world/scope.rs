//! Scope context: what the acting entity can currently refer to
//!
//! Supplied per parse call by the world collaborator; the pipeline
//! never owns it. Id lists are duplicate-free and enumeration order is
//! deterministic, which ALL-expansion and scoring both rely on.

use crate::core::types::EntityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeContext {
    /// The entity issuing the command
    pub actor: EntityId,
    pub visible: Vec<EntityId>,
    pub reachable: Vec<EntityId>,
    pub known: Vec<EntityId>,
    /// Recently mentioned entities, most recent first
    pub recent: Vec<EntityId>,
}

impl ScopeContext {
    pub fn new(actor: EntityId) -> Self {
        Self {
            actor,
            visible: Vec::new(),
            reachable: Vec::new(),
            known: Vec::new(),
            recent: Vec::new(),
        }
    }

    pub fn with_visible(mut self, ids: Vec<EntityId>) -> Self {
        self.visible = ids;
        self
    }

    pub fn with_reachable(mut self, ids: Vec<EntityId>) -> Self {
        self.reachable = ids;
        self
    }

    pub fn with_known(mut self, ids: Vec<EntityId>) -> Self {
        self.known = ids;
        self
    }

    pub fn with_recent(mut self, ids: Vec<EntityId>) -> Self {
        self.recent = ids;
        self
    }

    pub fn is_visible(&self, id: EntityId) -> bool {
        self.visible.contains(&id)
    }

    pub fn is_reachable(&self, id: EntityId) -> bool {
        self.reachable.contains(&id)
    }

    /// Position in the mention list, most recent = 0
    pub fn recency_of(&self, id: EntityId) -> Option<usize> {
        self.recent.iter().position(|&r| r == id)
    }

    /// Union of visible, reachable, and known ids, preserving first
    /// appearance order
    pub fn candidate_pool(&self) -> Vec<EntityId> {
        let mut pool = Vec::new();
        for &id in self
            .visible
            .iter()
            .chain(self.reachable.iter())
            .chain(self.known.iter())
        {
            if !pool.contains(&id) {
                pool.push(id);
            }
        }
        pool
    }
}
