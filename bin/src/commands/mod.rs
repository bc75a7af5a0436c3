//! CLI command implementations.

pub(crate) mod closing;
pub(crate) mod instruments;
pub(crate) mod issuer;
