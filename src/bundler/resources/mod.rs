//! Icons, default assets and tool discovery.

pub mod assets;
pub mod icons;

pub use assets::AssetLocator;
pub use icons::{IconEntry, IconRole, IconSet};
