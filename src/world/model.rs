//! World-model collaborator interface and an in-memory implementation
//!
//! The pipeline queries entities, locations, containment, and scope
//! through `WorldModel`; entity behavior itself lives on the other
//! side of this seam. `StaticWorld` is the reference implementation
//! used by the binary and the test suite.

use crate::core::types::EntityId;
use crate::world::entity::EntityInfo;
use crate::world::scope::ScopeContext;
use ahash::AHashMap;

/// Entity, location, and scope queries plus the mutations actions need
pub trait WorldModel {
    fn entity(&self, id: EntityId) -> Option<&EntityInfo>;

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut EntityInfo>;

    /// Direct parent of an entity (room, container, or holder)
    fn location_of(&self, id: EntityId) -> Option<EntityId>;

    /// Direct children in deterministic enumeration order
    fn contents_of(&self, id: EntityId) -> Vec<EntityId>;

    /// Compute the acting entity's current scope
    fn scope_for(&self, actor: EntityId) -> ScopeContext;

    /// Reparent an entity
    fn move_entity(&mut self, id: EntityId, destination: EntityId);
}

/// How many mentions the recency list keeps
const MENTION_HISTORY: usize = 8;

/// In-memory world storage
///
/// Contents enumerate in insertion order, which keeps ALL-expansion
/// and batch summaries deterministic.
#[derive(Debug, Default)]
pub struct StaticWorld {
    entities: AHashMap<EntityId, EntityInfo>,
    locations: AHashMap<EntityId, EntityId>,
    order: Vec<EntityId>,
    recent: Vec<EntityId>,
}

impl StaticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, returning its id
    pub fn add(&mut self, info: EntityInfo) -> EntityId {
        let id = info.id;
        self.order.push(id);
        self.entities.insert(id, info);
        id
    }

    /// Add an entity directly inside a parent
    pub fn add_in(&mut self, info: EntityInfo, parent: EntityId) -> EntityId {
        let id = self.add(info);
        self.locations.insert(id, parent);
        id
    }

    pub fn place(&mut self, id: EntityId, parent: EntityId) {
        self.locations.insert(id, parent);
    }

    /// Record a mention for pronoun resolution, most recent first
    pub fn mention(&mut self, id: EntityId) {
        self.recent.retain(|&r| r != id);
        self.recent.insert(0, id);
        self.recent.truncate(MENTION_HISTORY);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl WorldModel for StaticWorld {
    fn entity(&self, id: EntityId) -> Option<&EntityInfo> {
        self.entities.get(&id)
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut EntityInfo> {
        self.entities.get_mut(&id)
    }

    fn location_of(&self, id: EntityId) -> Option<EntityId> {
        self.locations.get(&id).copied()
    }

    fn contents_of(&self, id: EntityId) -> Vec<EntityId> {
        self.order
            .iter()
            .copied()
            .filter(|e| self.locations.get(e) == Some(&id))
            .collect()
    }

    fn scope_for(&self, actor: EntityId) -> ScopeContext {
        let mut visible = Vec::new();

        if let Some(location) = self.location_of(actor) {
            for id in self.contents_of(location) {
                if id == actor {
                    continue;
                }
                visible.push(id);

                // Contents of open containers are visible too
                let open = self
                    .entity(id)
                    .and_then(|e| e.container)
                    .map(|c| c.open)
                    .unwrap_or(false);
                if open {
                    visible.extend(self.contents_of(id));
                }
            }
        }

        // Held items are always in scope
        visible.extend(self.contents_of(actor));

        let reachable = visible.clone();
        let mut known = visible.clone();
        for &id in &self.recent {
            if !known.contains(&id) {
                known.push(id);
            }
        }

        ScopeContext::new(actor)
            .with_visible(visible)
            .with_reachable(reachable)
            .with_known(known)
            .with_recent(self.recent.clone())
    }

    fn move_entity(&mut self, id: EntityId, destination: EntityId) {
        self.locations.insert(id, destination);
    }
}
