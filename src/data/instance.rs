//! Instances and the copy operation.
//!
//! An instance is a validated field map plus the method table bound at
//! construction. Next to the public shape sits an internal reconstruction
//! record: the constructor that produced the instance, the raw-input snapshot
//! it was produced from, and the policy `copy` uses to compute the next
//! generation's input. The snapshot is never part of the public shape.
//!
//! Instances are never mutated after construction through this crate's
//! public API; `copy` re-runs the full construction pipeline and returns a
//! brand-new, independently validated instance.

use chrono::Utc;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::schema::require_object;

use super::methods::MethodSet;
use super::{Construct, ConstructResult};

/// How `copy` computes the next generation's construction input.
#[derive(Clone, Debug)]
pub(crate) enum CopyPolicy {
    /// Shallow-merge the partial update over the raw-input snapshot.
    MergeSnapshot,
    /// Drop `ignored` keys from the partial update, shallow-merge the
    /// remainder over the instance's validated fields, and stamp `touched`
    /// with the current time. Used by entity layers: derived timestamps are
    /// recomputed, everything else carries forward.
    RefreshTimestamps {
        ignored: &'static [&'static str],
        touched: &'static str,
    },
}

/// The internal companion record behind `copy`.
#[derive(Clone)]
pub(crate) struct Reconstruction {
    pub(crate) constructor: Arc<dyn Construct>,
    pub(crate) snapshot: Map<String, Value>,
    pub(crate) policy: CopyPolicy,
}

/// A fully validated, method-bearing value produced by a constructor
#[derive(Clone)]
pub struct Instance {
    fields: Map<String, Value>,
    methods: MethodSet,
    reconstruction: Option<Reconstruction>,
}

impl Instance {
    /// A fresh empty instance; the root of every layer stack.
    pub(crate) fn bare() -> Self {
        Self {
            fields: Map::new(),
            methods: MethodSet::new(),
            reconstruction: None,
        }
    }

    /// Apply validated fields, overwriting same-named fields from layers below
    pub(crate) fn apply_fields(&mut self, parsed: Map<String, Value>) {
        self.fields.extend(parsed);
    }

    /// Set a single field, overwriting anything same-named
    pub(crate) fn insert_field(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    /// Merge a layer's methods over whatever is already bound; the new layer
    /// wins on a name collision
    pub(crate) fn apply_methods(&mut self, methods: &MethodSet) {
        self.methods = methods.merged_over(&self.methods);
    }

    /// Install the reconstruction record; the outermost layer always wins
    pub(crate) fn set_reconstruction(
        &mut self,
        constructor: Arc<dyn Construct>,
        snapshot: Map<String, Value>,
        policy: CopyPolicy,
    ) {
        self.reconstruction = Some(Reconstruction {
            constructor,
            snapshot,
            policy,
        });
    }

    /// Returns a field by name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns all validated fields
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns whether a method is defined on this instance
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains(name)
    }

    /// Returns the method names bound to this instance, sorted
    pub fn method_names(&self) -> Vec<&str> {
        self.methods.names().collect()
    }

    /// Invokes a method with the instance as receiver; `None` if undefined
    pub fn call(&self, method: &str, args: &[Value]) -> Option<Value> {
        let method = self.methods.get(method)?;
        Some(method(self, args))
    }

    /// Produces a new instance by merging a partial update per the copy
    /// policy and re-running the full construction pipeline.
    ///
    /// # Errors
    ///
    /// Fails with a validation error when the merged result violates the
    /// composed descriptor, even though this instance was valid.
    pub fn copy(&self, partial: Value) -> ConstructResult {
        let partial = require_object(&partial)?.clone();
        // Every constructor installs the record before returning
        let reconstruction = self
            .reconstruction
            .as_ref()
            .expect("instance carries a reconstruction record");

        let input = match &reconstruction.policy {
            CopyPolicy::MergeSnapshot => {
                let mut merged = reconstruction.snapshot.clone();
                merged.extend(partial);
                merged
            }
            CopyPolicy::RefreshTimestamps { ignored, touched } => {
                let mut update = partial;
                for key in *ignored {
                    update.remove(*key);
                }
                let mut merged = self.fields.clone();
                merged.extend(update);
                merged.insert(
                    (*touched).to_string(),
                    Value::String(Utc::now().to_rfc3339()),
                );
                merged
            }
        };

        reconstruction.constructor.construct(Value::Object(input))
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .finish()
    }
}
