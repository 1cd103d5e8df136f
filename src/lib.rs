//! strata - immutable, schema-validated data classes with layered composition
//!
//! Declare a shape (schema) and behavior (methods) once; the framework
//! produces a validated construction pipeline plus an update-by-copy
//! operation. Layers — plain data, identity/timestamp entities, discriminated
//! unions with per-variant behavior, polymorphic entities — compose through a
//! single layering primitive, and every layer re-validates and recomputes its
//! own derived state on every construction and every copy.
//!
//! ```ignore
//! use serde_json::json;
//! use strata::data::{DataOptions, MethodSet};
//! use strata::entity::{entity, EntityFields};
//! use strata::schema::{FieldDef, ObjectDescriptor};
//!
//! let user = entity(
//!     DataOptions::new(ObjectDescriptor::new().field("name", FieldDef::required_string()))
//!         .methods(MethodSet::new().with("greet", |instance, _| {
//!             json!(format!("hello {}", instance.get("name").unwrap()))
//!         })),
//! );
//!
//! let alice = user.construct(json!({ "id": "u1", "name": "Alice" }))?;
//! let renamed = alice.copy(json!({ "name": "Alicia" }))?; // createdAt kept, updatedAt refreshed
//! assert_eq!(renamed.id(), alice.id());
//! ```

pub mod data;
pub mod entity;
pub mod mixin;
pub mod observe;
pub mod polymorphic;
pub mod schema;
