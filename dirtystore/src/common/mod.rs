//! Common data-model types shared across the adapter.

mod record;
mod value;

pub use record::*;
pub use value::*;

/// Schema attribute name that triggers creation timestamping.
pub const CREATED_AT: &str = "createdAt";
/// Schema attribute name that triggers update timestamping.
pub const UPDATED_AT: &str = "updatedAt";
