//! wf-core: stable foundation for wellflow.
//!
//! Contains:
//! - numeric (Real + tolerances + float and statistics helpers)
//! - ids (well identifiers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use error::{WfError, WfResult};
pub use ids::*;
pub use numeric::*;
