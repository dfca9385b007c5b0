//! CPU architecture and runtime platform classification.

use crate::bundler::error::{Error, Result};
use std::{fmt, str::FromStr};

/// CPU architecture of the packaged application.
///
/// A closed set: anything the resolver cannot classify becomes
/// [`Arch::Unknown`] when classification is lenient, or an
/// [`Error::InvalidArchitecture`] when an exact architecture is required.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_deploy::bundler::Arch;
///
/// let arch: Arch = "amd64".parse().unwrap();
/// assert_eq!(arch, Arch::X64);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// x86_64 / AMD64 (64-bit)
    X64,
    /// AArch64 / ARM64 (64-bit)
    Arm64,
    /// 32-bit ARM with hard-float
    Arm,
    /// x86 / i686 (32-bit)
    X86,
    /// Unclassified
    Unknown,
}

impl Arch {
    /// Short display name, as used in runtime identifiers (`linux-x64`).
    pub fn name(&self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::Arm64 => "arm64",
            Arch::Arm => "arm",
            Arch::X86 => "x86",
            Arch::Unknown => "unknown",
        }
    }

    /// Architecture of the machine running this process.
    pub fn host() -> Arch {
        Arch::classify(std::env::consts::ARCH)
    }

    /// Lenient form of [`resolve_architecture`]: unrecognized tokens become
    /// [`Arch::Unknown`] instead of an error.
    pub fn classify(token: &str) -> Arch {
        resolve_architecture(token).unwrap_or(Arch::Unknown)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Arch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        resolve_architecture(s)
    }
}

/// Maps an architecture token or alias to an [`Arch`].
///
/// Accepted aliases (case-insensitive):
///
/// | Arch | Aliases |
/// |------|---------|
/// | X64 | `x64`, `x86_64`, `amd64` |
/// | Arm64 | `arm64`, `aarch64`, `arm_aarch64` |
/// | Arm | `arm`, `armhf`, `armv7` |
/// | X86 | `x86`, `i686`, `i386` |
///
/// # Errors
///
/// Returns [`Error::InvalidArchitecture`] for anything else.
pub fn resolve_architecture(token: &str) -> Result<Arch> {
    match token.trim().to_ascii_lowercase().as_str() {
        "x64" | "x86_64" | "amd64" => Ok(Arch::X64),
        "arm64" | "aarch64" | "arm_aarch64" => Ok(Arch::Arm64),
        "arm" | "armhf" | "armv7" => Ok(Arch::Arm),
        "x86" | "i686" | "i386" => Ok(Arch::X86),
        _ => Err(Error::InvalidArchitecture(token.to_string())),
    }
}

/// Resolved classification of a runtime platform identifier such as
/// `linux-x64`, `win-arm64` or `osx-x64`.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct RuntimeDescriptor {
    id: String,
    arch: Arch,
    arch_uncertain: bool,
    is_linux: bool,
    is_windows: bool,
}

impl RuntimeDescriptor {
    /// The runtime identifier exactly as requested (or the host default).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Resolved CPU architecture.
    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// True when the architecture could not be classified with confidence.
    pub fn arch_uncertain(&self) -> bool {
        self.arch_uncertain
    }

    /// True for `linux-*` identifiers.
    pub fn is_linux(&self) -> bool {
        self.is_linux
    }

    /// True for `win-*` identifiers.
    pub fn is_windows(&self) -> bool {
        self.is_windows
    }
}

/// Identifier for the host platform, e.g. `linux-x64`.
pub fn host_runtime_id() -> String {
    let family = match std::env::consts::OS {
        "windows" => "win",
        "macos" => "osx",
        other => other,
    };
    format!("{}-{}", family, Arch::host())
}

/// Classifies a runtime identifier, defaulting to the host when `None`.
///
/// Never fails: the family is found by case-insensitive prefix/substring
/// matching and the architecture by the lenient resolver applied to the last
/// `-` separated segment. Identifiers outside the linux/win/osx families
/// (mobile, browser and other exotic targets) are always flagged uncertain.
pub fn describe_runtime(identifier: Option<&str>) -> RuntimeDescriptor {
    let id = match identifier.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => host_runtime_id(),
    };

    let lower = id.to_ascii_lowercase();
    let is_windows = lower.starts_with("win");
    let is_linux = lower.contains("linux");
    let is_osx = lower.starts_with("osx") || lower.starts_with("macos");

    let token = lower.rsplit('-').next().unwrap_or_default();
    let arch = if lower.contains('-') {
        Arch::classify(token)
    } else {
        Arch::Unknown
    };

    let arch_uncertain = arch == Arch::Unknown || !(is_windows || is_linux || is_osx);

    if arch_uncertain {
        log::debug!("Runtime '{}' classified with uncertain architecture {}", id, arch);
    }

    RuntimeDescriptor {
        id,
        arch,
        arch_uncertain,
        is_linux,
        is_windows,
    }
}
