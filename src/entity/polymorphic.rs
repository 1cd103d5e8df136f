//! The polymorphic entity extension.
//!
//! Layers identity and timestamps over a polymorphic data class. The
//! universal constructor and every per-tag constructor are independent entry
//! points, so the entity fields attach uniformly to all of them.
//!
//! Timestamp resolution here uses the best-available-timestamp policy: a
//! missing `createdAt` inherits a supplied `updatedAt` before falling back
//! to now. The plain entity layer resolves the two fields independently;
//! the difference is intentional.

use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::data::{Construct, ConstructResult, CopyPolicy, Instance};
use crate::mixin::layer;
use crate::observe::Logger;
use crate::polymorphic::{polymorphic_data, PolymorphicDataClass, PolymorphicOptions, VariantClass};
use crate::schema::{require_object, Descriptor, SchemaResult};

use super::entity::{parse_id, CREATED_AT, ENTITY_TIMESTAMPS, ID, UPDATED_AT};
use super::timestamps::{coerce_timestamp, timestamp_value};

/// Layers identity and timestamps over a polymorphic data class.
pub fn polymorphic_entity_mixin(base: PolymorphicDataClass) -> PolymorphicEntityClass {
    layer(base, PolymorphicEntityClass::new)
}

/// Defines a polymorphic entity class in one call.
pub fn polymorphic_entity(options: PolymorphicOptions) -> PolymorphicEntityClass {
    polymorphic_entity_mixin(polymorphic_data(options))
}

/// Parses identity and resolves timestamps onto a variant-resolved instance.
fn attach_identity(instance: &mut Instance, raw: &Map<String, Value>) -> SchemaResult<()> {
    let id = parse_id(raw)?;

    let supplied_updated_at = coerce_timestamp(raw.get(UPDATED_AT));
    let created_at = coerce_timestamp(raw.get(CREATED_AT))
        .or(supplied_updated_at)
        .unwrap_or_else(Utc::now);
    let updated_at = supplied_updated_at.unwrap_or_else(Utc::now);

    instance.insert_field(ID, Value::String(id));
    instance.insert_field(CREATED_AT, timestamp_value(created_at));
    instance.insert_field(UPDATED_AT, timestamp_value(updated_at));
    Ok(())
}

struct PolymorphicEntityInner {
    base: PolymorphicDataClass,
}

/// A polymorphic entity-class constructor
#[derive(Clone)]
pub struct PolymorphicEntityClass {
    inner: Arc<PolymorphicEntityInner>,
}

impl PolymorphicEntityClass {
    fn new(base: PolymorphicDataClass) -> Self {
        Logger::trace(
            "POLYMORPHIC_ENTITY_LAYER_ATTACHED",
            &[
                ("discriminator", base.discriminator()),
                ("variants", &base.variants().join(",")),
            ],
        );
        Self {
            inner: Arc::new(PolymorphicEntityInner { base }),
        }
    }

    /// Constructs an entity instance of whichever variant the input's
    /// discriminator selects.
    pub fn construct(&self, input: Value) -> ConstructResult {
        let raw = require_object(&input)?.clone();

        // Entity fields are not part of the base's schema surface
        let mut rest = raw.clone();
        rest.remove(ID);
        rest.remove(CREATED_AT);
        rest.remove(UPDATED_AT);

        let mut instance = self.inner.base.construct(Value::Object(rest))?;
        attach_identity(&mut instance, &raw)?;
        instance.set_reconstruction(
            Arc::new(self.clone()),
            raw,
            CopyPolicy::RefreshTimestamps {
                ignored: ENTITY_TIMESTAMPS,
                touched: UPDATED_AT,
            },
        );

        Ok(instance)
    }

    /// Returns the base's discriminated descriptor
    pub fn schema(&self) -> &Descriptor {
        self.inner.base.schema()
    }

    /// Returns the discriminator field name
    pub fn discriminator(&self) -> &str {
        self.inner.base.discriminator()
    }

    /// Returns the known tags, in declaration order
    pub fn variants(&self) -> &[String] {
        self.inner.base.variants()
    }

    /// Returns the per-tag entity constructor for a known tag
    pub fn variant(&self, tag: &str) -> Option<EntityVariantClass> {
        let variant = self.inner.base.variant(tag)?;
        Some(EntityVariantClass { variant })
    }
}

impl Construct for PolymorphicEntityClass {
    fn construct(&self, input: Value) -> ConstructResult {
        PolymorphicEntityClass::construct(self, input)
    }

    fn schema(&self) -> &Descriptor {
        PolymorphicEntityClass::schema(self)
    }
}

/// A per-tag entity constructor
#[derive(Clone)]
pub struct EntityVariantClass {
    variant: VariantClass,
}

impl EntityVariantClass {
    /// Constructs an entity instance of this variant. The base ignores the
    /// entity fields, so the full input passes straight through.
    pub fn construct(&self, input: Value) -> ConstructResult {
        let raw = require_object(&input)?.clone();

        let mut instance = self.variant.construct(Value::Object(raw.clone()))?;
        attach_identity(&mut instance, &raw)?;
        instance.set_reconstruction(
            Arc::new(self.clone()),
            raw,
            CopyPolicy::RefreshTimestamps {
                ignored: ENTITY_TIMESTAMPS,
                touched: UPDATED_AT,
            },
        );

        Ok(instance)
    }

    /// Returns this constructor's tag
    pub fn tag(&self) -> &str {
        self.variant.tag()
    }

    /// Returns the discriminated descriptor
    pub fn schema(&self) -> &Descriptor {
        self.variant.schema()
    }
}

impl Construct for EntityVariantClass {
    fn construct(&self, input: Value) -> ConstructResult {
        EntityVariantClass::construct(self, input)
    }

    fn schema(&self) -> &Descriptor {
        EntityVariantClass::schema(self)
    }
}
