//! Polymorphic data classes: discriminated unions with per-variant behavior.
//!
//! # Design Principles
//!
//! - One shared base schema/method set, one schema/method set per tag
//! - The universal constructor dispatches on the discriminator value;
//!   per-tag constructors supply it
//! - An instance carries exactly the base methods plus its resolved tag's
//!   methods, even after a copy switches the branch
//! - The variant set never entangles with the base schema: both are declared
//!   independently and merged at definition time

mod constructor;

pub use constructor::{polymorphic_data, PolymorphicDataClass, PolymorphicOptions, VariantClass};
