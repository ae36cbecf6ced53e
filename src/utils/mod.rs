//! Shared helpers.

pub mod exec;
pub mod glob;
pub mod hash;
pub mod mime;
pub mod path;
