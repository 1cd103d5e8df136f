//! The entity extension.
//!
//! Layering an entity over any constructor adds identity (`id`) and
//! bitemporal bookkeeping (`createdAt`, `updatedAt`). Identity is parsed with
//! a non-empty-string rule and failures reject the construction; timestamps
//! silently resolve to the current time when absent or unparsable.
//!
//! Copy semantics: caller-supplied `createdAt`/`updatedAt` in a partial
//! update are ignored, the remainder merges over the instance's full field
//! set, and `updatedAt` is forced to the current time — so `createdAt`
//! survives every generation while `updatedAt` tracks the latest one.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::data::{data, Construct, ConstructResult, CopyPolicy, DataOptions, Instance};
use crate::mixin::layer;
use crate::observe::Logger;
use crate::schema::{json_type_name, require_object, Descriptor, SchemaError, SchemaResult};

use super::timestamps::{coerce_timestamp, timestamp_value};

/// Identity field name
pub const ID: &str = "id";
/// Creation timestamp field name
pub const CREATED_AT: &str = "createdAt";
/// Last-update timestamp field name
pub const UPDATED_AT: &str = "updatedAt";

/// The timestamp fields a copy never takes from the caller
pub(crate) const ENTITY_TIMESTAMPS: &[&str] = &[CREATED_AT, UPDATED_AT];

/// Parses `id` with the non-empty-string rule.
pub(crate) fn parse_id(raw: &Map<String, Value>) -> SchemaResult<String> {
    match raw.get(ID) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::String(_)) => Err(SchemaError::identity("'id' must be a non-empty string")),
        Some(other) => Err(SchemaError::identity(format!(
            "'id' must be a string, got {}",
            json_type_name(other)
        ))),
        None => Err(SchemaError::identity("'id' is required")),
    }
}

/// Layers identity and timestamps over an existing constructor.
pub fn entity_mixin(base: Arc<dyn Construct>) -> EntityClass {
    layer(base, EntityClass::new)
}

/// Defines an entity class in one call: a data layer plus the entity layer.
pub fn entity(options: DataOptions) -> EntityClass {
    entity_mixin(Arc::new(data(options)))
}

struct EntityInner {
    base: Arc<dyn Construct>,
}

/// An entity-class constructor
#[derive(Clone)]
pub struct EntityClass {
    inner: Arc<EntityInner>,
}

impl EntityClass {
    fn new(base: Arc<dyn Construct>) -> Self {
        Logger::trace("ENTITY_LAYER_ATTACHED", &[("base", base.schema().kind())]);
        Self {
            inner: Arc::new(EntityInner { base }),
        }
    }

    /// Constructs an entity instance.
    ///
    /// # Errors
    ///
    /// Returns `STRATA_IDENTITY_INVALID` when `id` is missing or empty, or
    /// whatever validation error the base layers raise. Timestamp problems
    /// never error.
    pub fn construct(&self, input: Value) -> ConstructResult {
        let raw = require_object(&input)?.clone();

        let id = parse_id(&raw)?;
        // Absent or unparsable timestamps silently resolve to now
        let created_at = coerce_timestamp(raw.get(CREATED_AT)).unwrap_or_else(Utc::now);
        let updated_at = coerce_timestamp(raw.get(UPDATED_AT)).unwrap_or_else(Utc::now);

        let mut instance = self.inner.base.construct(Value::Object(raw.clone()))?;

        instance.insert_field(ID, Value::String(id));
        instance.insert_field(CREATED_AT, timestamp_value(created_at));
        instance.insert_field(UPDATED_AT, timestamp_value(updated_at));
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

    /// Returns the base's descriptor: entity fields are validated ad hoc and
    /// are not part of the introspectable shape
    pub fn schema(&self) -> &Descriptor {
        self.inner.base.schema()
    }
}

impl Construct for EntityClass {
    fn construct(&self, input: Value) -> ConstructResult {
        EntityClass::construct(self, input)
    }

    fn schema(&self) -> &Descriptor {
        EntityClass::schema(self)
    }
}

/// Typed access to the entity fields of an instance
pub trait EntityFields {
    /// The identity, when present
    fn id(&self) -> Option<&str>;
    /// The creation timestamp, when present
    fn created_at(&self) -> Option<DateTime<Utc>>;
    /// The last-update timestamp, when present
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}

impl EntityFields for Instance {
    fn id(&self) -> Option<&str> {
        self.get(ID).and_then(Value::as_str)
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        coerce_timestamp(self.get(CREATED_AT))
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        coerce_timestamp(self.get(UPDATED_AT))
    }
}
