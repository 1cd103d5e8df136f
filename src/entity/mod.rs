//! Entity layers: identity and bitemporal bookkeeping over any constructor.
//!
//! # Design Principles
//!
//! - `id` is required, non-empty, and never defaulted; failures reject the
//!   construction
//! - `createdAt`/`updatedAt` always resolve to some valid timestamp; failures
//!   silently resolve to now — this asymmetry is deliberate
//! - Copy preserves `createdAt` and forces `updatedAt` to now, however many
//!   layers sit below the entity layer
//! - Entity fields are validated ad hoc; the introspectable descriptor stays
//!   the base's

mod entity;
mod polymorphic;
mod timestamps;

pub use entity::{entity, entity_mixin, EntityClass, EntityFields, CREATED_AT, ID, UPDATED_AT};
pub use polymorphic::{
    polymorphic_entity, polymorphic_entity_mixin, EntityVariantClass, PolymorphicEntityClass,
};
