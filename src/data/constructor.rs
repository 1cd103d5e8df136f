//! The data constructor builder.
//!
//! `data()` turns a shape (schema) and behavior (methods) into a reusable
//! constructor. An optional base layers the new class on top of an existing
//! constructor: the effective descriptor is the AND of both, the base builds
//! the inner instance first, and the new layer's fields and methods win on
//! name collisions.
//!
//! The same raw input is validated at the top-level effective descriptor and
//! re-validated by every ancestor layer. The redundancy is intentional: each
//! layer's own invariants hold even when layers are composed independently.

use serde_json::Value;
use std::sync::Arc;

use crate::observe::Logger;
use crate::schema::{merge_and, require_object, validate, Descriptor, ObjectDescriptor};

use super::instance::{CopyPolicy, Instance};
use super::methods::MethodSet;
use super::{Construct, ConstructResult};

/// Options for defining a data class
pub struct DataOptions {
    pub schema: ObjectDescriptor,
    pub methods: MethodSet,
    pub base: Option<Arc<dyn Construct>>,
}

impl DataOptions {
    pub fn new(schema: ObjectDescriptor) -> Self {
        Self {
            schema,
            methods: MethodSet::new(),
            base: None,
        }
    }

    /// Attach this layer's methods
    pub fn methods(mut self, methods: MethodSet) -> Self {
        self.methods = methods;
        self
    }

    /// Layer on top of an existing constructor
    pub fn base(mut self, base: Arc<dyn Construct>) -> Self {
        self.base = Some(base);
        self
    }
}

/// Defines a data class: a validated construction pipeline plus copy.
pub fn data(options: DataOptions) -> DataClass {
    let DataOptions {
        schema,
        methods,
        base,
    } = options;

    let schema = match &base {
        Some(base) => merge_and(base.schema(), &schema),
        None => Descriptor::Object(schema),
    };

    Logger::trace(
        "DATA_CLASS_DEFINED",
        &[
            ("kind", schema.kind()),
            ("layered", if base.is_some() { "true" } else { "false" }),
        ],
    );

    DataClass {
        inner: Arc::new(DataInner {
            schema,
            methods,
            base,
        }),
    }
}

struct DataInner {
    schema: Descriptor,
    methods: MethodSet,
    base: Option<Arc<dyn Construct>>,
}

/// A reusable data-class constructor
#[derive(Clone)]
pub struct DataClass {
    inner: Arc<DataInner>,
}

impl DataClass {
    /// Constructs a validated instance from raw input.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the input violates the effective
    /// descriptor; no instance is produced.
    pub fn construct(&self, input: Value) -> ConstructResult {
        let raw = require_object(&input)?.clone();
        let parsed = validate(&self.inner.schema, &input)?;

        let mut instance = match &self.inner.base {
            Some(base) => base.construct(Value::Object(raw.clone()))?,
            None => Instance::bare(),
        };

        instance.apply_fields(parsed);
        instance.apply_methods(&self.inner.methods);
        instance.set_reconstruction(Arc::new(self.clone()), raw, CopyPolicy::MergeSnapshot);

        Ok(instance)
    }

    /// Returns the effective (composed) descriptor
    pub fn schema(&self) -> &Descriptor {
        &self.inner.schema
    }
}

impl Construct for DataClass {
    fn construct(&self, input: Value) -> ConstructResult {
        DataClass::construct(self, input)
    }

    fn schema(&self) -> &Descriptor {
        DataClass::schema(self)
    }
}
