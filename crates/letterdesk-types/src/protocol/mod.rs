//! Upstream wire protocol types.

pub mod claude;
