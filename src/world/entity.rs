//! Entity snapshots with optional capability states
//!
//! The pipeline never keys behavior off entity types; it branches on
//! which capabilities are present. An entity is takeable because it is
//! a non-fixed thing, lockable because it carries a lock state, a key
//! because it carries a key spec.

use crate::core::types::EntityId;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Room,
    Actor,
    Thing,
}

/// Container capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerState {
    pub open: bool,
}

/// Lock capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockState {
    pub locked: bool,
}

/// Key capability; `unlocks: None` means a skeleton key that works on
/// any lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySpec {
    pub unlocks: Option<EntityId>,
}

/// Light-source capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightState {
    pub lit: bool,
}

/// Acting-entity capability
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorState {
    /// Maximum number of directly held entities, if bounded
    pub carry_limit: Option<usize>,
}

/// Snapshot of one entity as the pipeline sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub id: EntityId,
    pub name: String,
    /// Distinguishing words ("brass", "rusty"); also the source of
    /// disambiguation discriminators
    pub adjectives: Vec<String>,
    /// Alternative nouns the entity answers to
    pub synonyms: Vec<String>,
    pub kind: EntityKind,
    /// Scenery: anchored in place, never a batch or take target
    pub fixed: bool,
    pub container: Option<ContainerState>,
    pub lock: Option<LockState>,
    pub key: Option<KeySpec>,
    pub light: Option<LightState>,
    pub actor: Option<ActorState>,
    /// Room exits, canonical direction name to destination
    pub exits: AHashMap<String, EntityId>,
}

impl EntityInfo {
    fn base(name: &str, kind: EntityKind) -> Self {
        Self {
            id: EntityId::new(),
            name: name.to_string(),
            adjectives: Vec::new(),
            synonyms: Vec::new(),
            kind,
            fixed: false,
            container: None,
            lock: None,
            key: None,
            light: None,
            actor: None,
            exits: AHashMap::new(),
        }
    }

    pub fn thing(name: &str) -> Self {
        Self::base(name, EntityKind::Thing)
    }

    pub fn room(name: &str) -> Self {
        let mut info = Self::base(name, EntityKind::Room);
        info.fixed = true;
        info
    }

    pub fn actor(name: &str) -> Self {
        let mut info = Self::base(name, EntityKind::Actor);
        info.actor = Some(ActorState::default());
        info
    }

    pub fn with_adjectives(mut self, adjectives: &[&str]) -> Self {
        self.adjectives = adjectives.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_synonyms(mut self, synonyms: &[&str]) -> Self {
        self.synonyms = synonyms.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn scenery(mut self) -> Self {
        self.fixed = true;
        self
    }

    pub fn container(mut self, open: bool) -> Self {
        self.container = Some(ContainerState { open });
        self
    }

    pub fn lockable(mut self, locked: bool) -> Self {
        self.lock = Some(LockState { locked });
        self
    }

    pub fn key_for(mut self, target: Option<EntityId>) -> Self {
        self.key = Some(KeySpec { unlocks: target });
        self
    }

    pub fn light_source(mut self, lit: bool) -> Self {
        self.light = Some(LightState { lit });
        self
    }

    pub fn carry_limit(mut self, limit: usize) -> Self {
        self.actor.get_or_insert_with(ActorState::default).carry_limit = Some(limit);
        self
    }

    pub fn exit(mut self, direction: &str, destination: EntityId) -> Self {
        self.exits.insert(direction.to_string(), destination);
        self
    }

    /// Can this entity ever be picked up and carried?
    pub fn portable(&self) -> bool {
        self.kind == EntityKind::Thing && !self.fixed
    }
}
