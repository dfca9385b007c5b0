//! Zip archive of the published application.
//!
//! No external tool is involved: the publish directory is archived directly.

use crate::bundler::settings::{Configuration, RuntimeDescriptor};

/// `{Name}-{Version}-{Release}.{RuntimeId}.zip`
pub fn output_name(conf: &Configuration, runtime: &RuntimeDescriptor) -> String {
    let version = conf.app_version();
    format!(
        "{}-{}-{}.{}.zip",
        conf.output_base_name(),
        version.version(),
        version.release(),
        runtime.id()
    )
}
