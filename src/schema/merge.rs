//! Schema composition.
//!
//! Two combinators exist:
//! - `merge_and`: logical AND of a base descriptor and an object-shaped
//!   extension. The field set is the union of both; the extension wins on a
//!   name collision; refinements of both sides are kept.
//! - `merge_discriminated`: logical OR partitioned by a discriminator. One
//!   branch per tag, where each branch is base fields, variant fields, and a
//!   required literal pinning the discriminator to the tag.
//!
//! Merging an object extension over a union base distributes the extension
//! into every branch, so a data layer can stack on a polymorphic base.

use super::types::{Descriptor, FieldDef, ObjectDescriptor, UnionDescriptor};

/// Combines a base descriptor with an object-shaped extension (logical AND).
pub fn merge_and(base: &Descriptor, extension: &ObjectDescriptor) -> Descriptor {
    match base {
        Descriptor::Object(object) => Descriptor::Object(merge_objects(object, extension)),
        Descriptor::Union(union) => {
            let branches = union
                .tags()
                .iter()
                .filter_map(|tag| {
                    union
                        .branch(tag)
                        .map(|branch| (tag.clone(), merge_objects(branch, extension)))
                })
                .collect();
            Descriptor::Union(UnionDescriptor::new(union.discriminator(), branches))
        }
    }
}

/// Builds a discriminated union over a shared base (logical OR, partitioned).
///
/// Each branch validates base fields, variant fields, and the discriminator
/// pinned to the branch tag. Tag order is the declaration order of
/// `variants`.
pub fn merge_discriminated(
    discriminator: impl Into<String>,
    base: &ObjectDescriptor,
    variants: Vec<(String, ObjectDescriptor)>,
) -> Descriptor {
    let discriminator = discriminator.into();

    let branches = variants
        .into_iter()
        .map(|(tag, variant)| {
            let branch = merge_objects(base, &variant)
                .field(discriminator.clone(), FieldDef::literal(tag.clone()));
            (tag, branch)
        })
        .collect();

    Descriptor::Union(UnionDescriptor::new(discriminator, branches))
}

/// Field union (extension wins) plus concatenated refinements.
fn merge_objects(base: &ObjectDescriptor, extension: &ObjectDescriptor) -> ObjectDescriptor {
    let mut fields = base.fields().clone();
    for (name, def) in extension.fields() {
        fields.insert(name.clone(), def.clone());
    }

    let mut refinements = base.refinements().to_vec();
    refinements.extend(extension.refinements().iter().cloned());

    ObjectDescriptor::from_parts(fields, refinements)
}
