//! Method sets and dispatch tables.
//!
//! A method is a behavior whose receiver is the fully composed instance. Sets
//! are merged layer-ordered when a class is defined, never per instance:
//! construction binds a prebuilt table to the instance instead of copying
//! functions onto it.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::instance::Instance;

/// A method bound to an instance at call time
pub type MethodFn = Arc<dyn Fn(&Instance, &[Value]) -> Value + Send + Sync>;

/// A named set of methods; one per layer or variant
#[derive(Clone, Default)]
pub struct MethodSet {
    entries: BTreeMap<String, MethodFn>,
}

impl MethodSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method, replacing any same-named method
    pub fn with<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&Instance, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(method));
        self
    }

    /// Merge this set over a base set; this set wins on a name collision
    pub fn merged_over(&self, base: &MethodSet) -> MethodSet {
        let mut entries = base.entries.clone();
        for (name, method) in &self.entries {
            entries.insert(name.clone(), Arc::clone(method));
        }
        MethodSet { entries }
    }

    /// Look up a method by name
    pub fn get(&self, name: &str) -> Option<&MethodFn> {
        self.entries.get(name)
    }

    /// Returns whether a method is defined
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the method names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
