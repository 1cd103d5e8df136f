//! Data classes: validated construction pipelines over structural shapes.
//!
//! # Design Principles
//!
//! - Declare shape and behavior once; construct validated instances many times
//! - Construction is synchronous, side-effect-free, and all-or-nothing
//! - Instances are immutable; `copy` reconstructs and re-validates
//! - Layers compose through the `Construct` contract

mod constructor;
mod instance;
mod methods;

pub use constructor::{data, DataClass, DataOptions};
pub use instance::Instance;
pub use methods::{MethodFn, MethodSet};

pub(crate) use instance::CopyPolicy;

use crate::schema::{Descriptor, SchemaResult};
use serde_json::Value;

/// Result of a constructor call
pub type ConstructResult = SchemaResult<Instance>;

/// The layering contract: anything that can serve as a base constructor.
///
/// A conforming constructor validates its input, produces a complete
/// instance or a structured error, and exposes its composed descriptor.
pub trait Construct: Send + Sync {
    /// Constructs a validated instance from raw input
    fn construct(&self, input: Value) -> ConstructResult;

    /// Returns the composed descriptor this constructor validates against
    fn schema(&self) -> &Descriptor;
}
