//! Configuration model for deploy operations.
//!
//! A deploy configuration is a `Key = Value` document (conventionally named
//! `*.deploy.conf`) describing the application, its publisher, desktop
//! integration, and options for each package kind. [`Configuration::parse`]
//! validates it into an immutable value; [`Configuration::render`] writes it
//! back out.
//!
//! Per-invocation choices that do not belong in the document (work
//! directory, architecture override, output name, timestamp) travel in
//! [`BuildOptions`]. Runtime classification lives in [`arch`].

pub mod arch;
mod config;
mod document;
mod fields;
mod options;
mod render;

pub use arch::{Arch, RuntimeDescriptor, describe_runtime, resolve_architecture};
pub use config::{AppVersion, Configuration};
pub use document::{Document, Entry};
pub use fields::{FieldKey, Mode};
pub use options::BuildOptions;
pub use render::RenderStyle;
