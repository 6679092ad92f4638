//! Response header layers.

pub(crate) mod cors;
pub(crate) mod security;
