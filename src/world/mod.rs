//! World-model seam: entity snapshots, scope, and the collaborator trait

pub mod entity;
pub mod model;
pub mod scope;

pub use entity::{
    ActorState, ContainerState, EntityInfo, EntityKind, KeySpec, LightState, LockState,
};
pub use model::{StaticWorld, WorldModel};
pub use scope::ScopeContext;
