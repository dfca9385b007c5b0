//! Filesystem helpers and the [`Operations`](ops::Operations) capability.

pub mod fs;
pub mod ops;
