//! The layering primitive.
//!
//! Every extension layer is a function from a base constructor to a new
//! constructor; `layer` is the single composition point they all funnel
//! through. It carries no state or behavior of its own, so future layers can
//! be added without changing how layering is invoked.

/// Applies an extension to a base constructor.
pub fn layer<B, M, F>(base: B, extend: F) -> M
where
    F: FnOnce(B) -> M,
{
    extend(base)
}
