//! The polymorphic data constructor builder.
//!
//! A polymorphic class is a discriminated union of variants over a shared
//! base: one schema and method set common to all variants, plus one schema
//! and method set per tag. The builder produces a universal constructor that
//! dispatches on the discriminator value, and one constructor per tag that
//! supplies the discriminator itself.
//!
//! Method dispatch tables (base merged with variant, variant wins) are built
//! once when the class is defined and bound by the *resolved* tag at
//! construction, so an instance carries exactly the base methods plus its own
//! tag's methods — including after a copy that switches the branch.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::data::{Construct, ConstructResult, CopyPolicy, Instance, MethodSet};
use crate::observe::Logger;
use crate::schema::{merge_discriminated, require_object, validate, Descriptor, ObjectDescriptor};

/// One variant declaration: tag, variant-only schema, variant-only methods
struct Variant {
    tag: String,
    schema: ObjectDescriptor,
    methods: MethodSet,
}

/// Options for defining a polymorphic data class
pub struct PolymorphicOptions {
    discriminator: String,
    base_schema: ObjectDescriptor,
    base_methods: MethodSet,
    variants: Vec<Variant>,
}

impl PolymorphicOptions {
    pub fn new(discriminator: impl Into<String>) -> Self {
        Self {
            discriminator: discriminator.into(),
            base_schema: ObjectDescriptor::new(),
            base_methods: MethodSet::new(),
            variants: Vec::new(),
        }
    }

    /// Schema shared by every variant
    pub fn base_schema(mut self, schema: ObjectDescriptor) -> Self {
        self.base_schema = schema;
        self
    }

    /// Methods shared by every variant
    pub fn base_methods(mut self, methods: MethodSet) -> Self {
        self.base_methods = methods;
        self
    }

    /// Declare a variant; declaration order is the tag order
    pub fn variant(
        mut self,
        tag: impl Into<String>,
        schema: ObjectDescriptor,
        methods: MethodSet,
    ) -> Self {
        self.variants.push(Variant {
            tag: tag.into(),
            schema,
            methods,
        });
        self
    }
}

/// Defines a polymorphic data class.
pub fn polymorphic_data(options: PolymorphicOptions) -> PolymorphicDataClass {
    let schema = merge_discriminated(
        options.discriminator.clone(),
        &options.base_schema,
        options
            .variants
            .iter()
            .map(|variant| (variant.tag.clone(), variant.schema.clone()))
            .collect(),
    );

    // One dispatch table per tag, built once
    let mut tags = Vec::with_capacity(options.variants.len());
    let mut tables = HashMap::with_capacity(options.variants.len());
    for variant in &options.variants {
        tags.push(variant.tag.clone());
        tables.insert(
            variant.tag.clone(),
            variant.methods.merged_over(&options.base_methods),
        );
    }

    Logger::trace(
        "POLYMORPHIC_CLASS_DEFINED",
        &[
            ("discriminator", options.discriminator.as_str()),
            ("variants", &tags.join(",")),
        ],
    );

    PolymorphicDataClass {
        inner: Arc::new(PolymorphicInner {
            discriminator: options.discriminator,
            schema,
            tags,
            tables,
        }),
    }
}

struct PolymorphicInner {
    discriminator: String,
    schema: Descriptor,
    tags: Vec<String>,
    tables: HashMap<String, MethodSet>,
}

impl PolymorphicInner {
    /// Validates the staged input, binds the resolved tag's dispatch table,
    /// and installs the reconstruction record.
    fn assemble(
        &self,
        staged: Map<String, Value>,
        snapshot: Map<String, Value>,
        constructor: Arc<dyn Construct>,
    ) -> ConstructResult {
        let parsed = validate(&self.schema, &Value::Object(staged))?;

        let tag = parsed
            .get(&self.discriminator)
            .and_then(Value::as_str)
            .expect("discriminator validated as a branch literal")
            .to_string();
        let table = self
            .tables
            .get(&tag)
            .expect("every union tag has a dispatch table");

        let mut instance = Instance::bare();
        instance.apply_methods(table);
        instance.apply_fields(parsed);
        instance.set_reconstruction(constructor, snapshot, CopyPolicy::MergeSnapshot);

        Ok(instance)
    }
}

/// A polymorphic data-class constructor: a universal entry point plus one
/// constructor per variant tag
#[derive(Clone)]
pub struct PolymorphicDataClass {
    inner: Arc<PolymorphicInner>,
}

impl PolymorphicDataClass {
    /// Constructs an instance of whichever variant the input's discriminator
    /// selects.
    ///
    /// # Errors
    ///
    /// Returns an unknown-tag error when the discriminator is absent or not
    /// a known tag, or a validation error when the input violates the
    /// selected branch.
    pub fn construct(&self, input: Value) -> ConstructResult {
        let raw = require_object(&input)?.clone();
        self.inner
            .assemble(raw.clone(), raw, Arc::new(self.clone()))
    }

    /// Returns the discriminated descriptor
    pub fn schema(&self) -> &Descriptor {
        &self.inner.schema
    }

    /// Returns the discriminator field name
    pub fn discriminator(&self) -> &str {
        &self.inner.discriminator
    }

    /// Returns the known tags, in declaration order
    pub fn variants(&self) -> &[String] {
        &self.inner.tags
    }

    /// Returns the per-tag constructor for a known tag
    pub fn variant(&self, tag: &str) -> Option<VariantClass> {
        if !self.inner.tags.iter().any(|known| known == tag) {
            return None;
        }
        Some(VariantClass {
            inner: Arc::clone(&self.inner),
            tag: tag.to_string(),
        })
    }
}

impl Construct for PolymorphicDataClass {
    fn construct(&self, input: Value) -> ConstructResult {
        PolymorphicDataClass::construct(self, input)
    }

    fn schema(&self) -> &Descriptor {
        PolymorphicDataClass::schema(self)
    }
}

/// A per-tag constructor: callers need not supply the discriminator
#[derive(Clone)]
pub struct VariantClass {
    inner: Arc<PolymorphicInner>,
    tag: String,
}

impl VariantClass {
    /// Constructs an instance of this variant. An explicit discriminator in
    /// the input wins over the constructor's own tag.
    pub fn construct(&self, input: Value) -> ConstructResult {
        let raw = require_object(&input)?.clone();

        let mut staged = raw.clone();
        staged
            .entry(self.inner.discriminator.clone())
            .or_insert_with(|| Value::String(self.tag.clone()));

        self.inner.assemble(staged, raw, Arc::new(self.clone()))
    }

    /// Returns this constructor's tag
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the discriminated descriptor (shared with the universal
    /// constructor)
    pub fn schema(&self) -> &Descriptor {
        &self.inner.schema
    }
}

impl Construct for VariantClass {
    fn construct(&self, input: Value) -> ConstructResult {
        VariantClass::construct(self, input)
    }

    fn schema(&self) -> &Descriptor {
        VariantClass::schema(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;
    use serde_json::json;

    fn order_class() -> PolymorphicDataClass {
        polymorphic_data(
            PolymorphicOptions::new("status")
                .base_schema(ObjectDescriptor::new().field("userId", FieldDef::required_string()))
                .base_methods(MethodSet::new().with("owner", |instance, _| {
                    instance.get("userId").cloned().unwrap_or(Value::Null)
                }))
                .variant(
                    "pending",
                    ObjectDescriptor::new()
                        .field("pendingReason", FieldDef::required_string()),
                    MethodSet::new().with("reason", |instance, _| {
                        instance.get("pendingReason").cloned().unwrap_or(Value::Null)
                    }),
                )
                .variant(
                    "shipped",
                    ObjectDescriptor::new().field("shippedAt", FieldDef::required_date()),
                    MethodSet::new().with("track", |instance, _| {
                        instance.get("shippedAt").cloned().unwrap_or(Value::Null)
                    }),
                ),
        )
    }

    #[test]
    fn test_universal_constructor_dispatches() {
        let instance = order_class()
            .construct(json!({
                "status": "pending",
                "userId": "u1",
                "pendingReason": "stock"
            }))
            .unwrap();

        assert_eq!(instance.get("status"), Some(&json!("pending")));
        assert_eq!(instance.call("owner", &[]), Some(json!("u1")));
        assert_eq!(instance.call("reason", &[]), Some(json!("stock")));
    }

    #[test]
    fn test_method_isolation_per_tag() {
        let pending = order_class()
            .variant("pending")
            .unwrap()
            .construct(json!({ "userId": "u1", "pendingReason": "stock" }))
            .unwrap();
        assert!(pending.has_method("reason"));
        assert!(!pending.has_method("track"));
        assert!(pending.get("shippedAt").is_none());

        let shipped = order_class()
            .variant("shipped")
            .unwrap()
            .construct(json!({ "userId": "u2", "shippedAt": "2023-01-02T00:00:00Z" }))
            .unwrap();
        assert!(shipped.has_method("track"));
        assert!(!shipped.has_method("reason"));
        assert!(shipped.get("pendingReason").is_none());
    }

    #[test]
    fn test_variant_constructor_supplies_discriminator() {
        let instance = order_class()
            .variant("shipped")
            .unwrap()
            .construct(json!({ "userId": "u2", "shippedAt": "2023-01-02T00:00:00Z" }))
            .unwrap();

        assert_eq!(instance.get("status"), Some(&json!("shipped")));
    }

    #[test]
    fn test_explicit_discriminator_wins_over_variant_tag() {
        let instance = order_class()
            .variant("pending")
            .unwrap()
            .construct(json!({
                "status": "shipped",
                "userId": "u2",
                "shippedAt": "2023-01-02T00:00:00Z"
            }))
            .unwrap();

        // Dispatch follows the resolved tag, not the defining constructor
        assert_eq!(instance.get("status"), Some(&json!("shipped")));
        assert!(instance.has_method("track"));
        assert!(!instance.has_method("reason"));
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = order_class()
            .construct(json!({ "status": "archived", "userId": "u1" }))
            .unwrap_err();
        assert_eq!(err.code(), "STRATA_UNKNOWN_TAG");

        let err = order_class()
            .construct(json!({ "userId": "u1" }))
            .unwrap_err();
        assert_eq!(err.code(), "STRATA_UNKNOWN_TAG");
    }

    #[test]
    fn test_unknown_variant_constructor_is_none() {
        assert!(order_class().variant("archived").is_none());
    }

    #[test]
    fn test_variants_keep_declaration_order() {
        assert_eq!(order_class().variants(), &["pending", "shipped"]);
    }

    #[test]
    fn test_copy_preserves_variant() {
        let pending = order_class()
            .variant("pending")
            .unwrap()
            .construct(json!({ "userId": "u1", "pendingReason": "stock" }))
            .unwrap();

        let copied = pending.copy(json!({ "pendingReason": "customs" })).unwrap();
        assert_eq!(copied.get("status"), Some(&json!("pending")));
        assert_eq!(copied.get("userId"), Some(&json!("u1")));
        assert_eq!(copied.call("reason", &[]), Some(json!("customs")));
    }

    #[test]
    fn test_copy_switches_branch_and_methods() {
        let pending = order_class()
            .variant("pending")
            .unwrap()
            .construct(json!({ "userId": "u1", "pendingReason": "stock" }))
            .unwrap();

        let shipped = pending
            .copy(json!({
                "status": "shipped",
                "shippedAt": "2023-01-02T00:00:00Z"
            }))
            .unwrap();

        assert_eq!(shipped.get("status"), Some(&json!("shipped")));
        assert!(shipped.has_method("track"));
        assert!(!shipped.has_method("reason"));
        // The defunct branch's field is gone from the validated shape
        assert!(shipped.get("pendingReason").is_none());
    }

    #[test]
    fn test_copy_to_unknown_tag_rejected() {
        let pending = order_class()
            .variant("pending")
            .unwrap()
            .construct(json!({ "userId": "u1", "pendingReason": "stock" }))
            .unwrap();

        let err = pending.copy(json!({ "status": "archived" })).unwrap_err();
        assert_eq!(err.code(), "STRATA_UNKNOWN_TAG");
    }

    #[test]
    fn test_schema_surface() {
        let class = order_class();
        let union = class.schema().as_union().unwrap();
        assert_eq!(union.discriminator(), "status");
        assert_eq!(class.discriminator(), "status");
    }
}
