//! Build-time observability.
//!
//! Construction and validation are side-effect-free by contract, so nothing
//! in the hot path logs. Class definition is the one lifecycle moment worth
//! tracing: each builder emits a single TRACE event describing the class it
//! produced.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on construction or validation
//! 3. No async or background threads
//! 4. Deterministic output

mod logger;

pub use logger::{Logger, Severity};
