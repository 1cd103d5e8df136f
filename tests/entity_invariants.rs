//! Entity layer invariant tests.
//!
//! - `id` is required and non-empty; failures reject the construction
//! - Missing or malformed timestamps resolve to now without raising
//! - Copy preserves `createdAt`, refreshes `updatedAt`, and re-validates
//! - The asymmetry between identity errors and timestamp fallback is part of
//!   the contract

use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use uuid::Uuid;

use strata::data::{DataOptions, MethodSet};
use strata::entity::{entity, entity_mixin, EntityClass, EntityFields};
use strata::schema::{FieldDef, ObjectDescriptor};

// =============================================================================
// Helper Constructors
// =============================================================================

fn user_class() -> EntityClass {
    entity(
        DataOptions::new(ObjectDescriptor::new().field("name", FieldDef::required_string()))
            .methods(MethodSet::new().with("greet", |instance, _| {
                let id = instance.get("id").and_then(Value::as_str).unwrap_or("?");
                json!(format!("Hello, my id is {}", id))
            })),
    )
}

fn admin_class() -> EntityClass {
    entity(
        DataOptions::new(ObjectDescriptor::new().field("role", FieldDef::required_string()))
            .methods(MethodSet::new().with("hasRole", |instance, args| {
                let role = instance.get("role").and_then(Value::as_str);
                json!(role.is_some() && role == args.first().and_then(Value::as_str))
            }))
            .base(Arc::new(user_class())),
    )
}

// =============================================================================
// Identity
// =============================================================================

/// A fresh entity carries its id and both base fields.
#[test]
fn test_entity_construction() {
    let user = user_class()
        .construct(json!({ "id": "user-123", "name": "Alice" }))
        .unwrap();

    assert_eq!(user.id(), Some("user-123"));
    assert_eq!(user.get("name"), Some(&json!("Alice")));
}

/// Missing id is an identity error, not a validation error.
#[test]
fn test_missing_id_rejected() {
    let err = user_class().construct(json!({ "name": "NoId" })).unwrap_err();
    assert_eq!(err.code(), "STRATA_IDENTITY_INVALID");
}

/// Empty id is rejected the same way.
#[test]
fn test_empty_id_rejected() {
    let err = user_class()
        .construct(json!({ "id": "", "name": "Alice" }))
        .unwrap_err();
    assert_eq!(err.code(), "STRATA_IDENTITY_INVALID");
}

/// Generated identifiers are ordinary non-empty strings.
#[test]
fn test_uuid_identifiers_work() {
    let id = Uuid::new_v4().to_string();
    let user = user_class()
        .construct(json!({ "id": id, "name": "Alice" }))
        .unwrap();
    assert_eq!(user.id(), Some(id.as_str()));
}

// =============================================================================
// Timestamp Resolution (never an error)
// =============================================================================

/// Constructing without timestamps yields both set to now, without raising.
#[test]
fn test_timestamps_default_to_now() {
    let before = Utc::now();
    let user = user_class()
        .construct(json!({ "id": "user-456", "name": "Bob" }))
        .unwrap();
    let after = Utc::now();

    let created_at = user.created_at().unwrap();
    let updated_at = user.updated_at().unwrap();
    assert!(created_at >= before && created_at <= after);
    assert!(updated_at >= before && updated_at <= after);
}

/// Malformed timestamps resolve silently; this must not raise.
#[test]
fn test_malformed_timestamps_resolve_silently() {
    let user = user_class()
        .construct(json!({
            "id": "user-456",
            "name": "Bob",
            "createdAt": "definitely not a date",
            "updatedAt": { "nested": true }
        }))
        .unwrap();

    assert!(user.created_at().is_some());
    assert!(user.updated_at().is_some());
}

/// Supplied timestamps are kept, whether RFC 3339 strings or epoch millis.
#[test]
fn test_supplied_timestamps_kept() {
    let user = user_class()
        .construct(json!({
            "id": "user-101",
            "name": "Diana",
            "createdAt": "2023-01-01T00:00:00Z",
            "updatedAt": 1672617600000i64
        }))
        .unwrap();

    assert_eq!(user.created_at().unwrap().timestamp(), 1672531200);
    assert_eq!(user.updated_at().unwrap().timestamp(), 1672617600);
}

/// A caller-supplied createdAt later than updatedAt is not rejected:
/// ordering is intended, not enforced.
#[test]
fn test_timestamp_ordering_not_enforced() {
    let user = user_class()
        .construct(json!({
            "id": "user-101",
            "name": "Diana",
            "createdAt": "2023-02-01T00:00:00Z",
            "updatedAt": "2023-01-01T00:00:00Z"
        }))
        .unwrap();

    assert!(user.created_at().unwrap() > user.updated_at().unwrap());
}

// =============================================================================
// Base Layer Interaction
// =============================================================================

/// The base layer still validates its own fields.
#[test]
fn test_base_validation_applies() {
    let err = user_class().construct(json!({ "id": "user-102" })).unwrap_err();
    assert_eq!(err.code(), "STRATA_VALIDATION_FAILED");

    let err = user_class()
        .construct(json!({ "id": "user-103", "name": 123 }))
        .unwrap_err();
    assert_eq!(err.code(), "STRATA_VALIDATION_FAILED");
}

/// Base methods can read entity fields from the composed instance.
#[test]
fn test_methods_see_identity() {
    let user = user_class()
        .construct(json!({ "id": "user-789", "name": "Charlie" }))
        .unwrap();
    assert_eq!(
        user.call("greet", &[]),
        Some(json!("Hello, my id is user-789"))
    );
}

/// The entity layer does not add its fields to the introspectable schema.
#[test]
fn test_schema_passthrough() {
    let object = user_class();
    let object = object.schema().as_object().unwrap();
    assert!(object.fields().contains_key("name"));
    assert!(!object.fields().contains_key("id"));
}

// =============================================================================
// Copy Semantics
// =============================================================================

/// End-to-end: construct, wait, copy — name changes, createdAt is stable,
/// updatedAt strictly advances.
#[test]
fn test_copy_timestamp_monotonicity() {
    let user = user_class()
        .construct(json!({ "id": "u1", "name": "Al" }))
        .unwrap();

    thread::sleep(Duration::from_millis(10));
    let copied = user.copy(json!({ "name": "Bo" })).unwrap();

    assert_eq!(copied.get("name"), Some(&json!("Bo")));
    assert_eq!(copied.id(), Some("u1"));
    assert_eq!(copied.created_at(), user.created_at());
    assert!(copied.updated_at().unwrap() > user.updated_at().unwrap());
}

/// Chained copies keep the original createdAt through every generation.
#[test]
fn test_chained_copies_preserve_created_at() {
    let user = user_class()
        .construct(json!({ "id": "u1", "name": "Al" }))
        .unwrap();

    thread::sleep(Duration::from_millis(10));
    let second = user.copy(json!({ "name": "Bo" })).unwrap();
    thread::sleep(Duration::from_millis(10));
    let third = second.copy(json!({ "id": "2", "name": "Cy" })).unwrap();

    assert_eq!(third.id(), Some("2"));
    assert_eq!(third.created_at(), user.created_at());
    assert!(third.updated_at().unwrap() > second.updated_at().unwrap());
    assert_eq!(third.call("greet", &[]), Some(json!("Hello, my id is 2")));
}

/// Caller-supplied timestamps in a copy partial are ignored.
#[test]
fn test_copy_cannot_set_timestamps_directly() {
    let user = user_class()
        .construct(json!({ "id": "u1", "name": "Al" }))
        .unwrap();

    let copied = user
        .copy(json!({ "createdAt": "1999-01-01T00:00:00Z" }))
        .unwrap();
    assert_eq!(copied.created_at(), user.created_at());
}

/// Copy re-validates the base layer's rules.
#[test]
fn test_copy_revalidates_base() {
    let user = user_class()
        .construct(json!({ "id": "u1", "name": "Al" }))
        .unwrap();

    let err = user.copy(json!({ "name": 42 })).unwrap_err();
    assert_eq!(err.code(), "STRATA_VALIDATION_FAILED");
}

/// Clearing the id through copy is an identity error.
#[test]
fn test_copy_to_empty_id_rejected() {
    let user = user_class()
        .construct(json!({ "id": "u1", "name": "Al" }))
        .unwrap();

    let err = user.copy(json!({ "id": "" })).unwrap_err();
    assert_eq!(err.code(), "STRATA_IDENTITY_INVALID");
}

// =============================================================================
// Entity over Entity
// =============================================================================

/// An entity class can itself serve as the base of another entity class.
#[test]
fn test_stacked_entities() {
    let admin = admin_class()
        .construct(json!({ "id": "admin-123", "name": "Alice", "role": "admin" }))
        .unwrap();

    assert_eq!(admin.id(), Some("admin-123"));
    assert_eq!(admin.get("role"), Some(&json!("admin")));
    assert_eq!(
        admin.call("greet", &[]),
        Some(json!("Hello, my id is admin-123"))
    );
    assert_eq!(admin.call("hasRole", &[json!("admin")]), Some(json!(true)));
}

/// Copy on a stacked entity refreshes timestamps at the outermost layer.
#[test]
fn test_stacked_entity_copy() {
    let admin = admin_class()
        .construct(json!({ "id": "admin-123", "name": "Alice", "role": "admin" }))
        .unwrap();

    thread::sleep(Duration::from_millis(10));
    let copied = admin.copy(json!({ "role": "owner" })).unwrap();

    assert_eq!(copied.get("role"), Some(&json!("owner")));
    assert_eq!(copied.get("name"), Some(&json!("Alice")));
    assert_eq!(copied.created_at(), admin.created_at());
    assert!(copied.updated_at().unwrap() > admin.updated_at().unwrap());
}

/// The mixin form layers over an existing constructor directly.
#[test]
fn test_entity_mixin_over_data_class() {
    let base = strata::data::data(DataOptions::new(
        ObjectDescriptor::new().field("name", FieldDef::required_string()),
    ));
    let class = entity_mixin(Arc::new(base));

    let instance = class
        .construct(json!({ "id": "m1", "name": "Mix" }))
        .unwrap();
    assert_eq!(instance.id(), Some("m1"));
    assert!(instance.created_at().is_some());
}
