//! Windows package kinds.
//!
//! # Build Requirements
//!
//! | Kind | Required Tools |
//! |------|----------------|
//! | Setup (.exe) | Inno Setup 6 (`iscc`) on `PATH` |
//!
//! The installer script is generated from the configuration by [`setup`];
//! signing is delegated to Inno Setup through the `SignTool` directive.

pub mod setup;
